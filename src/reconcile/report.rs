//! Aggregated results of relation batches.

use serde::Serialize;

/// One member id whose relation could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub member_id: u64,
    pub message: String,
}

/// Outcome of one `create_all` batch.
///
/// `success_count + failure_count` always equals the number of member ids
/// submitted, and `per_item_errors` follows input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub succeeded: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub per_item_errors: Vec<ItemError>,
}

impl ReconciliationReport {
    /// Build a report from per-item results, in input order.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (u64, Result<(), String>)>,
    {
        let mut success_count = 0;
        let mut per_item_errors = Vec::new();
        for (member_id, result) in results {
            match result {
                Ok(()) => success_count += 1,
                Err(message) => per_item_errors.push(ItemError { member_id, message }),
            }
        }
        let failure_count = per_item_errors.len();
        Self {
            succeeded: failure_count == 0,
            success_count,
            failure_count,
            per_item_errors,
        }
    }

    /// Number of member ids in the batch.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        if self.succeeded {
            return format!("all {} relations created", self.total());
        }
        let errors = self
            .per_item_errors
            .iter()
            .map(|e| format!("member {}: {}", e.member_id, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "created {} of {} relations; errors: {errors}",
            self.success_count,
            self.total()
        )
    }
}

/// Outcome of a `replace_all` run. Removal problems are warnings; only
/// creation results are aggregated per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementReport {
    /// Existing relations deleted.
    pub removed: usize,
    /// Listing or deletion problems, in the order they happened.
    pub removal_warnings: Vec<String>,
    pub creation: ReconciliationReport,
}

impl ReplacementReport {
    /// `true` when every removal and every creation went through.
    pub fn is_clean(&self) -> bool {
        self.removal_warnings.is_empty() && self.creation.succeeded
    }
}
