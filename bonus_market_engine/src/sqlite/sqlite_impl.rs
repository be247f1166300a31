//! `SqliteDatabase` is a concrete implementation of a bonus market backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every handle cloned from the same instance shares one reader/writer lock. Writes run their whole transaction
//! under the exclusive side, reads take the shared side. This keeps read-check-write sequences, such as a withdrawal,
//! from interleaving with any other write.
use std::{fmt::Debug, sync::Arc};

use bm_common::Bonus;
use log::*;
use sqlx::{migrate, SqlitePool};
use tokio::sync::RwLock;

use super::db::{accruals, db_url, new_pool, orders, users, wallets, withdrawals};
use crate::{
    db_types::{
        AccrualCredit,
        NewOrder,
        NewWithdrawal,
        Order,
        OrderNumber,
        OrderStatusType,
        UserAccount,
        Wallet,
        Withdrawal,
    },
    traits::{AccountManagement, AuthApiError, LedgerError, OrderLedger, UserManagement, WalletLedger},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    lock: Arc<RwLock<()>>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database given in the `DATABASE_URI` environment variable, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Connects to the database at `url`, creating the file if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connection pool created for {url}");
        Ok(Self { url: url.to_string(), pool, lock: Arc::new(RwLock::new(())) })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Fetches the credit record for an order, if the accrual has been credited.
    pub async fn fetch_accrual_credit(&self, number: &OrderNumber) -> Result<Option<AccrualCredit>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let credit = accruals::fetch_accrual_credit(number, &mut conn).await?;
        Ok(credit)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderLedger for SqliteDatabase {
    async fn create_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let order = orders::create_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] has been saved in the DB for user #{}", order.number, order.user_id);
        Ok(order)
    }

    async fn mark_processing(&self, number: &OrderNumber) -> Result<bool, LedgerError> {
        let _guard = self.lock.write().await;
        let mut conn = self.pool.acquire().await?;
        let changed = orders::mark_processing(number, &mut conn).await?;
        if !changed {
            debug!("🗃️ Order [{number}] was no longer NEW. Status left unchanged.");
        }
        Ok(changed)
    }

    async fn update_order_status(
        &self,
        number: &OrderNumber,
        status: OrderStatusType,
        accrual: Bonus,
    ) -> Result<Order, LedgerError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(number, status, accrual, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{number}] is now {status} with accrual {}", order.accrual);
        Ok(order)
    }

    async fn get_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        if orders.is_empty() {
            return Err(LedgerError::NoData);
        }
        Ok(orders)
    }

    async fn get_order_owner(&self, number: &OrderNumber) -> Result<i64, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_owner(number, &mut conn).await?.ok_or_else(|| LedgerError::OrderNotFound(number.clone()))
    }

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_unreconciled_orders(&self) -> Result<Vec<Order>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let statuses = [OrderStatusType::New, OrderStatusType::Processing];
        let orders = orders::fetch_orders_with_status(&statuses, &mut conn).await?;
        Ok(orders)
    }
}

impl WalletLedger for SqliteDatabase {
    async fn create_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        let _guard = self.lock.write().await;
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::insert_wallet(user_id, &mut conn).await?;
        Ok(wallet)
    }

    async fn credit(&self, user_id: i64, amount: Bonus) -> Result<Wallet, LedgerError> {
        if amount.is_zero() {
            return self.get_wallet(user_id).await;
        }
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let wallet = wallets::increment_balance(user_id, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(wallet)
    }

    async fn debit(&self, user_id: i64, amount: Bonus) -> Result<Wallet, LedgerError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let wallet = wallets::debit_balance(user_id, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(wallet)
    }

    async fn get_balance(&self, user_id: i64) -> Result<Bonus, LedgerError> {
        let wallet = self.get_wallet(user_id).await?;
        Ok(wallet.balance)
    }

    async fn get_wallet(&self, user_id: i64) -> Result<Wallet, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        wallets::fetch_wallet(user_id, &mut conn).await?.ok_or(LedgerError::WalletNotFound(user_id))
    }

    async fn credit_for_order(&self, number: &OrderNumber, user_id: i64, amount: Bonus) -> Result<bool, LedgerError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let is_new = accruals::insert_accrual_credit(number, user_id, amount, &mut tx).await?;
        if !is_new {
            debug!("🗃️ The accrual for order [{number}] has already been credited. Skipping.");
            tx.rollback().await?;
            return Ok(false);
        }
        if amount.is_positive() {
            wallets::increment_balance(user_id, amount, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ {amount} credited to user #{user_id} for order [{number}]");
        Ok(true)
    }

    async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let user_id = withdrawal.user_id;
        let amount = withdrawal.amount;
        let wallet = wallets::fetch_wallet(user_id, &mut tx).await?.ok_or(LedgerError::WalletNotFound(user_id))?;
        if wallet.balance < amount {
            debug!("🗃️ User #{user_id} tried to withdraw {amount}, but only has {}", wallet.balance);
            return Err(LedgerError::NotEnoughBonuses);
        }
        let withdrawal = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
        let wallet = wallets::debit_balance(user_id, amount, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ User #{user_id} withdrew {amount} against order [{}]. Balance is now {}",
            withdrawal.order_number, wallet.balance
        );
        Ok(withdrawal)
    }

    async fn get_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let result = withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?;
        if result.is_empty() {
            return Err(LedgerError::NoData);
        }
        Ok(result)
    }

    async fn fetch_uncredited_orders(&self) -> Result<Vec<Order>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let orders = accruals::fetch_uncredited_orders(&mut conn).await?;
        Ok(orders)
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user_with_wallet(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<(UserAccount, Wallet), AuthApiError> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(login, password_hash, &mut tx).await?;
        let wallet = wallets::insert_wallet(user.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User {login} registered with id #{} and wallet #{}", user.id, wallet.id);
        Ok((user, wallet))
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<UserAccount>, AuthApiError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_login(login, &mut conn).await?;
        Ok(user)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::fetch_wallet(user_id, &mut conn).await?;
        Ok(wallet)
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let result = withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?;
        Ok(result)
    }
}
