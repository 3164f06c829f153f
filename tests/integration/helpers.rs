//! Shared helpers for integration tests.

use std::sync::Arc;

use commerce_admin::{AdminConfig, AdminCore, RecordingSink};
use commerce_gateway::HttpGateway;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const TOKEN: &str = "tok-integration";

/// Config pointing at `server` with an auth token.
pub(crate) fn config_for(server: &MockServer) -> AdminConfig {
    let mut config = AdminConfig::default();
    config.gateway.base_url = server.uri();
    config.gateway.token = Some(TOKEN.to_owned());
    config
}

/// Core wired to `server` that records every orchestration event.
pub(crate) fn core_for(server: &MockServer) -> (AdminCore, Arc<RecordingSink>) {
    core_with(&config_for(server))
}

pub(crate) fn core_with(config: &AdminConfig) -> (AdminCore, Arc<RecordingSink>) {
    let gateway = HttpGateway::new(config.gateway.clone()).expect("valid gateway config");
    let sink = Arc::new(RecordingSink::new());
    let core = AdminCore::with_gateway(Arc::new(gateway), sink.clone(), config);
    (core, sink)
}

/// Mount the availability endpoint.
pub(crate) async fn mount_status(server: &MockServer, ai_available: bool) {
    Mock::given(method("GET"))
        .and(path("/reportes/status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "operacional",
            "ia_disponible": ai_available
        })))
        .mount(server)
        .await;
}

/// Successful interpreter body.
pub(crate) fn report_body(interpreted: &str) -> Value {
    json!({
        "success": true,
        "mensaje": "Reporte generado",
        "comando_procesado": interpreted,
        "reporte": {
            "success": true,
            "total": 2,
            "kpis": {"total_ventas": 1520.5},
            "datos": [{"producto": "A", "ventas": 10}, {"producto": "B", "ventas": 4}]
        }
    })
}

/// Relation record as the backend returns it.
pub(crate) fn relation_body(id: u64, owner_id: u64, member_id: u64) -> Value {
    json!({
        "id": id,
        "promocion_id": owner_id,
        "producto_id": member_id,
        "fecha": "2026-10-01T12:00:00Z"
    })
}
