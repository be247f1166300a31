use crate::{
    db_types::{Order, Wallet, Withdrawal},
    traits::LedgerError,
};

/// Read-only queries over a user's account.
///
/// Unlike the ledger traits, empty histories are returned as empty vectors.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// The user's orders, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;

    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, LedgerError>;

    /// The user's withdrawals, newest first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError>;
}
