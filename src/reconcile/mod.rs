//! Relation reconciliation: bring an owner's many-to-many relation set to a
//! desired list of member ids through individual create/delete calls.
//!
//! Per-item failures never short-circuit a batch. Creates run at most
//! `max_in_flight` at a time (1 by default) and results are always reported
//! in input order. Replacement is best-effort with no rollback: a partial
//! failure leaves exactly the sub-calls that succeeded applied.

pub mod report;

use std::sync::Arc;

use commerce_gateway::BackendGateway;
use futures_util::StreamExt;
use futures_util::stream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::Result;
use crate::observability::{EventSink, OrchestrationEvent};

pub use report::{ItemError, ReconciliationReport, ReplacementReport};

/// Per-item message for members skipped because the caller cancelled.
pub const CANCELLED_BEFORE_SUBMISSION: &str = "cancelled before submission";

pub struct RelationReconciler {
    gateway: Arc<dyn BackendGateway>,
    sink: Arc<dyn EventSink>,
    max_in_flight: usize,
}

impl RelationReconciler {
    /// Strictly sequential reconciler.
    pub fn new(gateway: Arc<dyn BackendGateway>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            gateway,
            sink,
            max_in_flight: 1,
        }
    }

    /// Allow up to `max_in_flight` concurrent creates. Zero is treated as one.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Create one relation per member id.
    ///
    /// Every id gets exactly one create call unless `cancel` fires first, in
    /// which case the ids not yet submitted are reported as failures. Calls
    /// already in flight are allowed to finish so their result is attributed.
    pub async fn create_all(
        &self,
        owner_id: u64,
        member_ids: &[u64],
        cancel: &CancellationToken,
    ) -> ReconciliationReport {
        let span = tracing::info_span!("reconcile.create_all", owner_id, total = member_ids.len());
        async {
            let results: Vec<(u64, std::result::Result<(), String>)> =
                stream::iter(member_ids.iter().copied())
                    .map(|member_id| self.create_one(owner_id, member_id, cancel))
                    .buffered(self.max_in_flight)
                    .collect()
                    .await;

            let report = ReconciliationReport::from_results(results);
            if cancel.is_cancelled()
                && report
                    .per_item_errors
                    .iter()
                    .any(|e| e.message == CANCELLED_BEFORE_SUBMISSION)
            {
                self.sink.emit(&OrchestrationEvent::Cancelled {
                    operation: "relation creation".to_owned(),
                });
            }
            self.sink.emit(&OrchestrationEvent::ReconciliationFinished {
                owner_id,
                success_count: report.success_count,
                failure_count: report.failure_count,
            });
            report
        }
        .instrument(span)
        .await
    }

    async fn create_one(
        &self,
        owner_id: u64,
        member_id: u64,
        cancel: &CancellationToken,
    ) -> (u64, std::result::Result<(), String>) {
        if cancel.is_cancelled() {
            return (member_id, Err(CANCELLED_BEFORE_SUBMISSION.to_owned()));
        }
        match self.gateway.create_relation(owner_id, member_id).await {
            Ok(_record) => {
                self.sink.emit(&OrchestrationEvent::RelationCreated {
                    owner_id,
                    member_id,
                });
                (member_id, Ok(()))
            }
            Err(err) => {
                let message = err.message().to_owned();
                self.sink.emit(&OrchestrationEvent::RelationFailed {
                    owner_id,
                    member_id,
                    message: message.clone(),
                });
                (member_id, Err(message))
            }
        }
    }

    /// Delete every current relation of `owner_id`, then create one per id in
    /// `member_ids`.
    ///
    /// Listing and deletion failures are collected as warnings and never stop
    /// the creation phase.
    pub async fn replace_all(
        &self,
        owner_id: u64,
        member_ids: &[u64],
        cancel: &CancellationToken,
    ) -> ReplacementReport {
        let span = tracing::info_span!("reconcile.replace_all", owner_id, total = member_ids.len());
        async {
            let mut removed = 0;
            let mut removal_warnings = Vec::new();

            match self.gateway.list_relations(owner_id).await {
                Ok(existing) => {
                    for record in existing {
                        if cancel.is_cancelled() {
                            removal_warnings.push(format!(
                                "relation {}: cancelled before removal",
                                record.id
                            ));
                            continue;
                        }
                        match self.gateway.delete_relation(record.id).await {
                            Ok(()) => removed += 1,
                            Err(err) => {
                                self.sink.emit(&OrchestrationEvent::RelationRemovalFailed {
                                    relation_id: record.id,
                                    message: err.message().to_owned(),
                                });
                                removal_warnings.push(format!(
                                    "relation {} (member {}): {}",
                                    record.id,
                                    record.member_id,
                                    err.message()
                                ));
                            }
                        }
                    }
                }
                Err(err) => {
                    self.sink.emit(&OrchestrationEvent::RelationListingFailed {
                        owner_id,
                        message: err.message().to_owned(),
                    });
                    removal_warnings.push(format!(
                        "could not list current relations: {}",
                        err.message()
                    ));
                }
            }

            let creation = self.create_all(owner_id, member_ids, cancel).await;
            ReplacementReport {
                removed,
                removal_warnings,
                creation,
            }
        }
        .instrument(span)
        .await
    }

    /// Member ids currently related to `owner_id`, in backend order.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the relations cannot be listed.
    pub async fn current_member_ids(&self, owner_id: u64) -> Result<Vec<u64>> {
        let records = self.gateway.list_relations(owner_id).await?;
        Ok(records.into_iter().map(|r| r.member_id).collect())
    }
}
