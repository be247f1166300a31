//! Unifies API for reading a user's account.

use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{Order, Wallet, Withdrawal},
    traits::{AccountManagement, LedgerError},
};

/// The `AccountApi` provides read-only access to a user's orders, wallet and withdrawals.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// All orders uploaded by the user, newest first. An empty vector means the user has not uploaded anything yet.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("User #{user_id} has {} orders", orders.len());
        Ok(orders)
    }

    /// The user's wallet. Every registered user has one, so a missing wallet is reported as an error.
    pub async fn wallet_for_user(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        self.db.fetch_wallet_for_user(user_id).await?.ok_or(LedgerError::WalletNotFound(user_id))
    }

    pub async fn withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError> {
        self.db.fetch_withdrawals_for_user(user_id).await
    }
}
