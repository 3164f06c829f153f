//! AI availability probe.
//!
//! One status call per dispatch attempt. Any failure (network, decode,
//! non-2xx, deadline, cancellation) reports the AI as unavailable so the
//! dispatcher takes the deterministic path; a probe outage never blocks a
//! command.

use std::sync::Arc;
use std::time::Duration;

use commerce_gateway::{BackendGateway, ServiceState};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::observability::{EventSink, OrchestrationEvent};

/// Result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// Whether the AI interpreter should be tried.
    pub ai_available: bool,
    /// Service state reported by the backend, when it answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_state: Option<ServiceState>,
}

impl ProbeReport {
    /// Report for a probe that did not get an answer.
    pub fn unavailable() -> Self {
        Self {
            ai_available: false,
            service_state: None,
        }
    }
}

/// Asks the backend whether the AI interpreter is up.
pub struct StatusProbe {
    gateway: Arc<dyn BackendGateway>,
    sink: Arc<dyn EventSink>,
    timeout: Duration,
}

impl StatusProbe {
    pub fn new(gateway: Arc<dyn BackendGateway>, sink: Arc<dyn EventSink>, timeout: Duration) -> Self {
        Self {
            gateway,
            sink,
            timeout,
        }
    }

    /// Probe once. Never fails; see the module docs.
    pub async fn probe(&self, cancel: &CancellationToken) -> ProbeReport {
        let call = tokio::time::timeout(self.timeout, self.gateway.status());

        let answered = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.sink.emit(&OrchestrationEvent::ProbeFailed {
                    error: "cancelled".to_owned(),
                });
                return ProbeReport::unavailable();
            }
            answered = call => answered,
        };

        match answered {
            Ok(Ok(status)) => {
                self.sink.emit(&OrchestrationEvent::ProbeCompleted {
                    ai_available: status.ia_disponible,
                });
                ProbeReport {
                    ai_available: status.ia_disponible,
                    service_state: status.status,
                }
            }
            Ok(Err(err)) => {
                self.sink.emit(&OrchestrationEvent::ProbeFailed {
                    error: err.to_string(),
                });
                ProbeReport::unavailable()
            }
            Err(_elapsed) => {
                self.sink.emit(&OrchestrationEvent::ProbeFailed {
                    error: format!("no answer within {}ms", self.timeout.as_millis()),
                });
                ProbeReport::unavailable()
            }
        }
    }
}
