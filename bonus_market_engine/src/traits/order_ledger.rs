use std::future::Future;

use bm_common::Bonus;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType},
    traits::LedgerError,
};

/// Storage for purchase orders and their lifecycle.
///
/// An order number, once stored, is bound to one user for good. Orders are never deleted.
pub trait OrderLedger: Clone + Send + Sync {
    /// Stores a new order with status `New` and a zero accrual.
    ///
    /// Fails with [`LedgerError::OrderAlreadyExists`] if the same user already submitted this number, or
    /// [`LedgerError::OrderOwnedByOtherUser`] if somebody else did.
    fn create_order(&self, order: NewOrder) -> impl Future<Output = Result<Order, LedgerError>> + Send;

    /// Moves the order from `New` to `Processing`. Orders in any other state are left alone, and `false` is returned.
    fn mark_processing(&self, number: &OrderNumber) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Sets the order status, and the accrual too if it is positive, in a single transaction.
    fn update_order_status(
        &self,
        number: &OrderNumber,
        status: OrderStatusType,
        accrual: Bonus,
    ) -> impl Future<Output = Result<Order, LedgerError>> + Send;

    /// All the orders for the user, newest first. Returns [`LedgerError::NoData`] if there are none.
    fn get_orders_for_user(&self, user_id: i64) -> impl Future<Output = Result<Vec<Order>, LedgerError>> + Send;

    /// The id of the user the order number is bound to.
    fn get_order_owner(&self, number: &OrderNumber) -> impl Future<Output = Result<i64, LedgerError>> + Send;

    fn fetch_order(&self, number: &OrderNumber) -> impl Future<Output = Result<Option<Order>, LedgerError>> + Send;

    /// Orders that are still `New` or `Processing`, oldest first.
    fn fetch_unreconciled_orders(&self) -> impl Future<Output = Result<Vec<Order>, LedgerError>> + Send;
}
