use bonus_market_engine::{reconciliation::recover_unreconciled_orders, JobQueue, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the startup recovery job in the background. The reconciliation workers must already be running, since the
/// job blocks whenever the queue is full.
pub fn start_recovery_worker(db: SqliteDatabase, queue: JobQueue) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🚑️ Looking for orders that were left unfinished by the last run");
        match recover_unreconciled_orders(&db, &queue).await {
            Ok(report) => {
                debug!(
                    "🚑️ Startup recovery finished. {} credits repaired, {} orders re-queued",
                    report.credits_repaired, report.orders_requeued
                );
            },
            Err(e) => {
                error!("🚑️ Error running startup recovery: {e}");
            },
        }
    })
}
