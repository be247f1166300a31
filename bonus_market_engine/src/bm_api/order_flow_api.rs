use std::fmt::Debug;

use log::*;

use super::errors::OrderFlowError;
use crate::{
    db_types::{NewOrder, Order, OrderNumber},
    reconciliation::{Job, JobQueue},
    traits::{LedgerError, OrderLedger},
};

/// The result of uploading an order number.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOrderResult {
    /// The order is new. It has been stored and queued for reconciliation.
    Accepted(Order),
    /// The same user has uploaded this order before. Nothing was changed.
    AlreadyExists,
}

/// `OrderFlowApi` takes order numbers uploaded by users and feeds them into the reconciliation pipeline.
pub struct OrderFlowApi<B> {
    db: B,
    queue: JobQueue,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.queue)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, queue: JobQueue) -> Self {
        Self { db, queue }
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }
}

impl<B> OrderFlowApi<B>
where B: OrderLedger
{
    /// Registers an order number for `user_id` and schedules it for reconciliation.
    ///
    /// The order is written as `New` first, then pushed onto the job queue (waiting if the queue is full), and finally
    /// moved to `Processing`. If a worker has already stored a verdict by then, the status is left alone.
    ///
    /// Errors:
    /// * [`OrderFlowError::InvalidOrderNumber`] if the number is not a string of digits passing the Luhn check.
    /// * [`LedgerError::OrderOwnedByOtherUser`] (wrapped) if another user uploaded the number first.
    /// * [`OrderFlowError::QueueClosed`] if the server is shutting down. The order stays `New` and is picked up again
    ///   on the next start.
    pub async fn submit_order(&self, order_number: &str, user_id: i64) -> Result<SubmitOrderResult, OrderFlowError> {
        let number = OrderNumber::from(order_number.trim());
        if !number.is_valid() {
            debug!("🔄️📦️ User #{user_id} uploaded an invalid order number [{number}]");
            return Err(OrderFlowError::InvalidOrderNumber(number.0));
        }
        let order = match self.db.create_order(NewOrder::new(number.clone(), user_id)).await {
            Ok(order) => order,
            Err(LedgerError::OrderAlreadyExists(_)) => {
                debug!("🔄️📦️ User #{user_id} uploaded order [{number}] again. Nothing to do.");
                return Ok(SubmitOrderResult::AlreadyExists);
            },
            Err(e) => return Err(e.into()),
        };
        self.queue.push(Job::new(number.clone())).await?;
        self.db.mark_processing(&number).await?;
        info!("🔄️📦️ Order [{number}] from user #{user_id} accepted for processing");
        Ok(SubmitOrderResult::Accepted(order))
    }
}
