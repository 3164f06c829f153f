//! Audio command dispatch over HTTP: AI only, never the local interpreter.

use commerce_admin::{Command, DispatchOptions, OrchestrationEvent, PathTaken};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::helpers::{core_for, mount_status};

async fn mount_text_never_called(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/reportes/voz/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn recording() -> Command {
    Command::audio(vec![0x1a, 0x45, 0xdf, 0xa3, 0x01, 0x02], "")
}

#[tokio::test]
async fn unavailable_ai_rejects_audio_before_upload() {
    let server = MockServer::start().await;
    mount_status(&server, false).await;
    Mock::given(method("POST"))
        .and(path("/reportes/voz/audio/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_text_never_called(&server).await;

    let (core, sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .dispatch(&recording(), &DispatchOptions::default(), &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::AiOnlyFailed);
    assert!(outcome.error_message.unwrap().contains("as text"));
    assert!(sink.contains(|e| *e == OrchestrationEvent::AudioRejected));
}

#[tokio::test]
async fn available_ai_uploads_with_default_filename() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reportes/voz/audio/"))
        .respond_with(|req: &Request| {
            let body = String::from_utf8_lossy(&req.body);
            if body.contains("name=\"audio\"") && body.contains("filename=\"reporte.webm\"") {
                ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "comando_detectado": "ventas de la semana",
                    "reporte": {"kpis": {"total": 3}}
                }))
            } else {
                ResponseTemplate::new(400).set_body_json(json!({"detail": "no audio part"}))
            }
        })
        .expect(1)
        .mount(&server)
        .await;
    mount_text_never_called(&server).await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .dispatch(&recording(), &DispatchOptions::default(), &CancellationToken::new())
        .await;

    assert!(outcome.succeeded, "{:?}", outcome.error_message);
    assert_eq!(outcome.path_taken, PathTaken::Ai);
    assert_eq!(
        outcome.interpreted_command.as_deref(),
        Some("ventas de la semana")
    );
}

#[tokio::test]
async fn provider_outage_tells_user_to_type() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reportes/voz/audio/"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"error": "OpenAI Whisper timeout"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_text_never_called(&server).await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .dispatch(&recording(), &DispatchOptions::default(), &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::AiOnlyFailed);
    assert!(outcome.error_message.unwrap().contains("as text"));
}
