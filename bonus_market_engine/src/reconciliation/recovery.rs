use log::*;

use super::{Job, JobQueue, ReconciliationError};
use crate::{
    db_types::OrderStatusType,
    traits::{OrderLedger, WalletLedger},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Processed orders whose missing wallet credit was applied.
    pub credits_repaired: usize,
    /// `New` and `Processing` orders put back on the queue.
    pub orders_requeued: usize,
}

/// Picks up work that was lost when the process last stopped.
///
/// The job queue only lives in memory, so orders that were waiting in it, or being polled, are found by status and
/// queued again. Processed orders without an accrual credit get their credit applied.
///
/// Workers must already be draining `queue`, since pushing waits when it is full.
pub async fn recover_unreconciled_orders<L>(ledger: &L, queue: &JobQueue) -> Result<RecoveryReport, ReconciliationError>
where L: OrderLedger + WalletLedger {
    let mut report = RecoveryReport::default();
    for order in ledger.fetch_uncredited_orders().await? {
        match ledger.credit_for_order(&order.number, order.user_id, order.accrual).await {
            Ok(true) => {
                info!(
                    "🚑️ Applied missing credit of {} to user #{} for order [{}]",
                    order.accrual, order.user_id, order.number
                );
                report.credits_repaired += 1;
            },
            Ok(false) => {},
            Err(e) => warn!("🚑️ Could not apply the missing credit for order [{}]. {e}", order.number),
        }
    }
    for order in ledger.fetch_unreconciled_orders().await? {
        queue.push(Job::new(order.number.clone())).await?;
        if order.status == OrderStatusType::New {
            ledger.mark_processing(&order.number).await?;
        }
        report.orders_requeued += 1;
    }
    info!(
        "🚑️ Recovery complete. {} credit(s) repaired, {} order(s) queued again",
        report.credits_repaired, report.orders_requeued
    );
    Ok(report)
}
