use std::fmt::Debug;

use bm_common::Bonus;
use log::*;

use super::{Clock, Job, ReconciliationError, RetryPolicy, RetryState, RetryStep};
use crate::{
    accrual::{AccrualError, AccrualOracle},
    db_types::{OrderNumber, OrderStatusType},
    traits::{OrderLedger, WalletLedger},
};

/// How a reconciliation job ended, when it ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// The accrual service reached a verdict and it has been stored. `credited` is true if this job added the accrual
    /// to the owner's wallet.
    Updated { status: OrderStatusType, accrual: Bonus, credited: bool },
    /// The accrual service has never heard of the order. The order is left alone.
    NotRegistered,
    /// The accrual service failed with an internal error. The order is left alone.
    OracleUnavailable,
}

/// Drives a single order from `Processing` to a verdict.
pub struct Reconciler<L, O, C> {
    ledger: L,
    oracle: O,
    clock: C,
    policy: RetryPolicy,
}

impl<L, O, C> Debug for Reconciler<L, O, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reconciler ({:?})", self.policy)
    }
}

impl<L, O, C> Reconciler<L, O, C>
where
    L: OrderLedger + WalletLedger,
    O: AccrualOracle,
    C: Clock,
{
    pub fn new(ledger: L, oracle: O, clock: C, policy: RetryPolicy) -> Self {
        Self { ledger, oracle, clock, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Polls the accrual service for the order in `job` and records the verdict.
    ///
    /// * `REGISTERED` and `PROCESSING` answers use up an attempt and back off for 1, 3, 5... seconds.
    /// * A rate-limit response waits out the cooldown and restarts the attempt budget.
    /// * "Not registered" and internal server errors end the job quietly.
    /// * Any other failure ends the job with an error.
    ///
    /// When the attempt budget runs out the order stays `Processing` and
    /// [`ReconciliationError::CannotGetAccrualResponse`] is returned.
    pub async fn reconcile(&self, job: &Job) -> Result<ReconciliationOutcome, ReconciliationError> {
        let number = &job.order_number;
        let mut state = RetryState::new();
        loop {
            match self.oracle.fetch_status(number).await {
                Ok(response) => {
                    if let Some(status) = response.status.terminal_order_status() {
                        return self.record_verdict(number, status, response.accrual_or_zero()).await;
                    }
                    trace!("🔄️ Order [{number}] is still {:?} at the accrual service", response.status);
                    match state.not_ready(&self.policy) {
                        RetryStep::Wait(wait) => {
                            debug!(
                                "🔄️ Retrying order [{number}] in {}s (attempt {} of {})",
                                wait.as_secs(),
                                state.attempt(),
                                self.policy.max_attempts
                            );
                            self.clock.sleep(wait).await;
                        },
                        RetryStep::Abandon => {},
                    }
                    if state.is_exhausted(&self.policy) {
                        return Err(ReconciliationError::CannotGetAccrualResponse(state.attempt()));
                    }
                },
                Err(AccrualError::NotRegistered) => return Ok(ReconciliationOutcome::NotRegistered),
                Err(AccrualError::InternalServerError) => return Ok(ReconciliationOutcome::OracleUnavailable),
                Err(AccrualError::TooManyRequests) => {
                    if let RetryStep::Wait(cooldown) = state.rate_limited(&self.policy) {
                        let secs = cooldown.as_secs();
                        info!("🔄️ Rate limited while checking order [{number}]. Cooling down for {secs}s");
                        self.clock.sleep(cooldown).await;
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn record_verdict(
        &self,
        number: &OrderNumber,
        status: OrderStatusType,
        accrual: Bonus,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let order = self.ledger.update_order_status(number, status, accrual).await?;
        let mut credited = false;
        if status == OrderStatusType::Processed && order.accrual.is_positive() {
            let owner = self.ledger.get_order_owner(number).await?;
            credited = self.credit_owner(number, owner, order.accrual).await;
        }
        Ok(ReconciliationOutcome::Updated { status, accrual: order.accrual, credited })
    }

    /// Adds the accrual to the owner's wallet. Failed attempts are retried with a short exponential backoff; if they
    /// all fail the credit is left for the startup repair scan.
    async fn credit_owner(&self, number: &OrderNumber, owner: i64, amount: Bonus) -> bool {
        let attempts = self.policy.credit_attempts.max(1);
        for attempt in 0..attempts {
            match self.ledger.credit_for_order(number, owner, amount).await {
                Ok(is_new) => {
                    if !is_new {
                        debug!("🔄️ Order [{number}] had already been credited to user #{owner}");
                    }
                    return is_new;
                },
                Err(e) => {
                    warn!("🔄️ Could not credit {amount} to user #{owner} for order [{number}]. {e}");
                    if attempt + 1 < attempts {
                        self.clock.sleep(self.policy.credit_backoff(attempt)).await;
                    }
                },
            }
        }
        error!(
            "🔄️ Giving up on crediting order [{number}] to user #{owner} after {attempts} attempts. It will be \
             repaired on the next restart."
        );
        false
    }
}
