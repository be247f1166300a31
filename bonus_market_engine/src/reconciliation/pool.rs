use std::sync::Arc;

use futures_util::future::join_all;
use log::*;
use tokio::task::JoinHandle;

use super::{Clock, JobQueue, ReconciliationOutcome, Reconciler};
use crate::{
    accrual::AccrualOracle,
    traits::{OrderLedger, WalletLedger},
};

pub const DEFAULT_WORKER_COUNT: usize = 10;

/// A fixed set of worker tasks draining a [`JobQueue`].
pub struct ReconciliationPool {
    queue: JobQueue,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ReconciliationPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationPool ({} workers, {:?})", self.workers.len(), self.queue)
    }
}

impl ReconciliationPool {
    /// Spawns `worker_count` workers (at least one) on the current tokio runtime. Do not await the workers directly;
    /// call [`Self::shutdown`] and then [`Self::join`] to stop them.
    pub fn start<L, O, C>(reconciler: Reconciler<L, O, C>, queue: JobQueue, worker_count: usize) -> Self
    where
        L: OrderLedger + WalletLedger + 'static,
        O: AccrualOracle + 'static,
        C: Clock,
    {
        let reconciler = Arc::new(reconciler);
        let workers = (0..worker_count.max(1))
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&reconciler), queue.clone())))
            .collect::<Vec<_>>();
        info!("👷️ {} reconciliation workers started", workers.len());
        Self { queue, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Closes the queue. Workers finish the jobs that are already queued, then exit.
    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    /// Waits for every worker to exit.
    pub async fn join(self) {
        let results = join_all(self.workers).await;
        for (id, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                error!("👷️ Worker {id} did not exit cleanly. {e}");
            }
        }
        info!("👷️ All reconciliation workers have stopped");
    }
}

async fn run_worker<L, O, C>(id: usize, reconciler: Arc<Reconciler<L, O, C>>, queue: JobQueue)
where
    L: OrderLedger + WalletLedger,
    O: AccrualOracle,
    C: Clock,
{
    debug!("👷️ Worker {id} waiting for jobs");
    while let Some(job) = queue.next().await {
        let number = &job.order_number;
        debug!("👷️ Worker {id} picked up order [{number}]");
        match reconciler.reconcile(&job).await {
            Ok(ReconciliationOutcome::Updated { status, accrual, credited }) => {
                info!("👷️ Order [{number}] is {status}. Accrual: {accrual}. Credited by this job: {credited}");
            },
            Ok(ReconciliationOutcome::NotRegistered) => {
                info!("👷️ Order [{number}] is not registered with the accrual service. Leaving it as it is.");
            },
            Ok(ReconciliationOutcome::OracleUnavailable) => {
                warn!("👷️ The accrual service failed on order [{number}]. Leaving it as it is.");
            },
            Err(e) => {
                error!("👷️ Reconciliation of order [{number}] failed. {e}");
            },
        }
    }
    debug!("👷️ Worker {id} stopped");
}
