use std::future::Future;

use bm_common::Bonus;

use crate::{
    db_types::{NewWithdrawal, Order, OrderNumber, Wallet, Withdrawal},
    traits::LedgerError,
};

/// Storage for user wallets, withdrawals and accrual credits.
///
/// Balances and withdrawal totals never go negative, and the total withdrawn never decreases.
pub trait WalletLedger: Clone + Send + Sync {
    /// Creates an empty wallet for a freshly registered user.
    fn create_wallet(&self, user_id: i64) -> impl Future<Output = Result<Wallet, LedgerError>> + Send;

    /// Adds `amount` to the balance. A zero amount leaves the wallet untouched.
    fn credit(&self, user_id: i64, amount: Bonus) -> impl Future<Output = Result<Wallet, LedgerError>> + Send;

    /// Removes `amount` from the balance and adds it to the total withdrawn.
    ///
    /// No balance check is made here. Use [`WalletLedger::withdraw`] to debit a wallet on behalf of a user.
    fn debit(&self, user_id: i64, amount: Bonus) -> impl Future<Output = Result<Wallet, LedgerError>> + Send;

    fn get_balance(&self, user_id: i64) -> impl Future<Output = Result<Bonus, LedgerError>> + Send;

    fn get_wallet(&self, user_id: i64) -> impl Future<Output = Result<Wallet, LedgerError>> + Send;

    /// Credits the accrual for `number` to the user's wallet exactly once.
    ///
    /// Returns `false` if the order has been credited before, in which case nothing changes.
    fn credit_for_order(
        &self,
        number: &OrderNumber,
        user_id: i64,
        amount: Bonus,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Checks the balance, records the withdrawal and debits the wallet as one atomic step.
    ///
    /// Fails with [`LedgerError::NotEnoughBonuses`] if the balance is smaller than the amount requested.
    fn withdraw(&self, withdrawal: NewWithdrawal) -> impl Future<Output = Result<Withdrawal, LedgerError>> + Send;

    /// The user's withdrawals, newest first. Returns [`LedgerError::NoData`] if there are none.
    fn get_withdrawals(&self, user_id: i64) -> impl Future<Output = Result<Vec<Withdrawal>, LedgerError>> + Send;

    /// Processed orders with a positive accrual that has not been credited yet.
    fn fetch_uncredited_orders(&self) -> impl Future<Output = Result<Vec<Order>, LedgerError>> + Send;
}
