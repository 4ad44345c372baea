//! Fire-and-forget batch dispatch
//!
//! Every Delivery Task runs on its own tokio task, so a panic or a slow
//! provider in one never touches the others. A supervising task settles the
//! batch for logging only; callers drop its handle and return at once.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::orchestrator::DeliveryOrchestrator;
use super::task::{DeliveryOutcome, DeliveryTask};

/// Per-batch bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub delivered: usize,
    pub simulated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Tasks whose background unit panicked or was cancelled
    pub aborted: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered { .. } => self.delivered += 1,
            DeliveryOutcome::Simulated => self.simulated += 1,
            DeliveryOutcome::Skipped { .. } => self.skipped += 1,
            DeliveryOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.delivered + self.simulated + self.skipped + self.failed + self.aborted
    }
}

/// Spawn one detached delivery per task. Must be called inside a tokio
/// runtime. The returned handle resolves to the batch report; dropping it
/// does not cancel anything.
pub fn spawn_batch(
    orchestrator: Arc<DeliveryOrchestrator>,
    tasks: Vec<DeliveryTask>,
) -> JoinHandle<BatchReport> {
    let batch_id = Uuid::new_v4();
    let size = tasks.len();

    let handles: Vec<JoinHandle<DeliveryOutcome>> = tasks
        .into_iter()
        .map(|task| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.deliver(&task).await })
        })
        .collect();

    tokio::spawn(async move {
        let mut report = BatchReport::default();

        for result in join_all(handles).await {
            match result {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    error!(batch_id = %batch_id, error = ?e, "Delivery task aborted");
                    report.aborted += 1;
                }
            }
        }

        info!(
            batch_id = %batch_id,
            size,
            delivered = report.delivered,
            simulated = report.simulated,
            skipped = report.skipped,
            failed = report.failed,
            aborted = report.aborted,
            "Delivery batch settled"
        );
        report
    })
}
