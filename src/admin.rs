//! Wiring of the orchestration components over one shared gateway.

use std::sync::Arc;

use commerce_gateway::{BackendGateway, HttpGateway};

use crate::config::AdminConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::observability::{EventSink, TracingSink};
use crate::probe::StatusProbe;
use crate::reconcile::RelationReconciler;

/// Probe, dispatchers and reconciler sharing one gateway and one sink.
pub struct AdminCore {
    probe: StatusProbe,
    dispatcher: Dispatcher,
    reconciler: RelationReconciler,
}

impl AdminCore {
    /// Build the HTTP gateway from `config` and report events via `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        config.validate()?;
        let gateway = HttpGateway::new(config.gateway.clone())?;
        Ok(Self::with_gateway(
            Arc::new(gateway),
            Arc::new(TracingSink),
            config,
        ))
    }

    /// Wire the components over an existing gateway and sink.
    pub fn with_gateway(
        gateway: Arc<dyn BackendGateway>,
        sink: Arc<dyn EventSink>,
        config: &AdminConfig,
    ) -> Self {
        let probe = StatusProbe::new(
            Arc::clone(&gateway),
            Arc::clone(&sink),
            config.dispatch.probe_timeout(),
        );
        let dispatcher = Dispatcher::new(
            Arc::clone(&gateway),
            Arc::clone(&sink),
            config.dispatch.clone(),
        );
        let reconciler = RelationReconciler::new(gateway, sink)
            .with_max_in_flight(config.reconcile.max_in_flight);
        Self {
            probe,
            dispatcher,
            reconciler,
        }
    }

    pub fn probe(&self) -> &StatusProbe {
        &self.probe
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn reconciler(&self) -> &RelationReconciler {
        &self.reconciler
    }
}
