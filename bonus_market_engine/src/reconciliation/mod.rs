//! # Order accrual reconciliation
//!
//! Newly submitted orders are pushed onto a bounded [`JobQueue`]. A fixed-size [`ReconciliationPool`] of workers
//! drains the queue. For each job, the [`Reconciler`] polls the accrual service until it reaches a verdict, records the
//! verdict against the order, and credits the owner's wallet.
//!
//! ```text
//!  submit_order ──► JobQueue (bounded) ──► worker 1..N ──► Reconciler ──► AccrualOracle
//!                                                              │
//!                                                              ├──► OrderLedger::update_order_status
//!                                                              └──► WalletLedger::credit_for_order
//! ```
//!
//! All waiting goes through a [`Clock`], so the retry schedule can be verified without real sleeps.
mod clock;
mod errors;
mod pool;
mod queue;
mod reconciler;
mod recovery;
mod retry;

pub use clock::{Clock, TokioClock};
pub use errors::{QueueClosed, ReconciliationError};
pub use pool::{ReconciliationPool, DEFAULT_WORKER_COUNT};
pub use queue::{Job, JobQueue, DEFAULT_QUEUE_CAPACITY};
pub use reconciler::{ReconciliationOutcome, Reconciler};
pub use recovery::{recover_unreconciled_orders, RecoveryReport};
pub use retry::{RetryPolicy, RetryState, RetryStep};
