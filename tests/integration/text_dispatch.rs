//! Text command dispatch over HTTP: AI first, one local fallback.

use std::time::Duration;

use commerce_admin::{Command, DispatchOptions, FallbackReason, OrchestrationEvent, PathTaken};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{TOKEN, core_for, mount_status, report_body};

async fn mount_interpreter(server: &MockServer, ai: bool, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/reportes/voz/"))
        .and(body_partial_json(json!({"usar_ia": ai})))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn ai_unavailable_uses_local_interpreter_only() {
    let server = MockServer::start().await;
    mount_status(&server, false).await;
    mount_interpreter(&server, true, ResponseTemplate::new(200), 0).await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(report_body("ventas del mes")),
        1,
    )
    .await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .dispatch(
            &Command::text("ventas del mes"),
            &DispatchOptions::default(),
            &CancellationToken::new(),
        )
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Local);
    assert_eq!(outcome.report.unwrap().datos.unwrap().len(), 2);
}

#[tokio::test]
async fn ai_success_is_returned_with_auth() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reportes/voz/"))
        .and(header("authorization", format!("Token {TOKEN}").as_str()))
        .and(body_partial_json(json!({"comando": "top clientes", "usar_ia": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body("top 10 clientes")))
        .expect(1)
        .mount(&server)
        .await;
    mount_interpreter(&server, false, ResponseTemplate::new(200), 0).await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("top clientes", &CancellationToken::new())
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Ai);
    assert_eq!(outcome.interpreted_command.as_deref(), Some("top 10 clientes"));
    assert_eq!(outcome.message.as_deref(), Some("Reporte generado"));
}

#[tokio::test]
async fn provider_error_falls_back_exactly_once() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_interpreter(
        &server,
        true,
        ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Error de OpenAI: insufficient_quota"
        })),
        1,
    )
    .await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(report_body("ventas")),
        1,
    )
    .await;

    let (core, sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("ventas", &CancellationToken::new())
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Local);
    assert_eq!(outcome.fallback_reason, Some(FallbackReason::ProviderError));
    assert!(sink.contains(|e| matches!(e, OrchestrationEvent::FallbackTriggered { .. })));
}

#[tokio::test]
async fn slow_ai_times_out_and_falls_back() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reportes/voz/"))
        .and(body_partial_json(json!({"usar_ia": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(report_body("demasiado tarde"))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(report_body("local")),
        1,
    )
    .await;

    let (core, _sink) = core_for(&server);
    let options = DispatchOptions::default().with_timeout(Duration::from_millis(50));
    let outcome = core
        .dispatcher()
        .dispatch(&Command::text("ventas"), &options, &CancellationToken::new())
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Local);
    assert_eq!(outcome.fallback_reason, Some(FallbackReason::Timeout));
    assert_eq!(outcome.interpreted_command.as_deref(), Some("local"));
}

#[tokio::test]
async fn validation_error_is_not_retried_locally() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_interpreter(
        &server,
        true,
        ResponseTemplate::new(400).set_body_json(json!({"detail": "Rango de fechas inválido"})),
        1,
    )
    .await;
    mount_interpreter(&server, false, ResponseTemplate::new(200), 0).await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("ventas de 2030", &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Ai);
    assert_eq!(outcome.error_message.as_deref(), Some("Rango de fechas inválido"));
}

#[tokio::test]
async fn status_outage_goes_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reportes/status/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_interpreter(&server, true, ResponseTemplate::new(200), 0).await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(report_body("ventas")),
        1,
    )
    .await;

    let (core, sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("ventas", &CancellationToken::new())
        .await;

    assert_eq!(outcome.path_taken, PathTaken::Local);
    assert!(sink.contains(|e| matches!(e, OrchestrationEvent::ProbeFailed { .. })));
}

#[tokio::test]
async fn local_failure_after_fallback_reports_ai_only_failed() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_interpreter(
        &server,
        true,
        ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "OpenAI no disponible"
        })),
        1,
    )
    .await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "No se reconoce el tipo de reporte"
        })),
        1,
    )
    .await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("???", &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::AiOnlyFailed);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("No se reconoce el tipo de reporte")
    );
}

#[tokio::test]
async fn server_error_with_domain_message_is_not_retried_locally() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_interpreter(
        &server,
        true,
        ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Rango de fechas inválido"
        })),
        1,
    )
    .await;
    mount_interpreter(&server, false, ResponseTemplate::new(200), 0).await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("ventas de 2030", &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Ai);
    assert_eq!(outcome.error_message.as_deref(), Some("Rango de fechas inválido"));
    assert!(outcome.fallback_reason.is_none());
}

#[tokio::test]
async fn bodyless_server_error_falls_back() {
    let server = MockServer::start().await;
    mount_status(&server, true).await;
    mount_interpreter(&server, true, ResponseTemplate::new(503), 1).await;
    mount_interpreter(
        &server,
        false,
        ResponseTemplate::new(200).set_body_json(report_body("ventas")),
        1,
    )
    .await;

    let (core, _sink) = core_for(&server);
    let outcome = core
        .dispatcher()
        .text()
        .dispatch("ventas", &CancellationToken::new())
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.path_taken, PathTaken::Local);
    assert_eq!(outcome.fallback_reason, Some(FallbackReason::Transport));
}
