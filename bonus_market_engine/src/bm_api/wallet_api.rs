use std::fmt::Debug;

use bm_common::Bonus;
use log::*;

use super::errors::WalletApiError;
use crate::{
    db_types::{NewWithdrawal, OrderNumber, Withdrawal},
    traits::WalletLedger,
};

/// `WalletApi` covers the spending side of a user's bonus wallet.
pub struct WalletApi<B> {
    db: B,
}

impl<B: Debug> Debug for WalletApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletApi ({:?})", self.db)
    }
}

impl<B> WalletApi<B>
where B: WalletLedger
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Spends `amount` bonuses from the user's wallet against `order_number`.
    ///
    /// The order number must pass the Luhn check, but it does not have to belong to an uploaded order. The balance
    /// check and the debit happen atomically in the ledger, so concurrent withdrawals can never overdraw a wallet.
    pub async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        amount: Bonus,
    ) -> Result<Withdrawal, WalletApiError> {
        let number = OrderNumber::from(order_number.trim());
        if !number.is_valid() {
            debug!("💰️ User #{user_id} tried to withdraw against an invalid order number [{number}]");
            return Err(WalletApiError::InvalidOrderNumber(number.0));
        }
        if !amount.is_positive() {
            return Err(WalletApiError::InvalidAmount(amount.to_string()));
        }
        let withdrawal = self.db.withdraw(NewWithdrawal::new(user_id, number, amount)).await?;
        info!("💰️ User #{user_id} withdrew {amount} against order [{}]", withdrawal.order_number);
        Ok(withdrawal)
    }
}
