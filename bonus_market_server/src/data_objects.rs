use std::fmt::Display;

use bm_common::Bonus;
use bonus_market_engine::db_types::{Order, OrderStatusType, Wallet, Withdrawal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Login and password, as sent to the register and login endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials {{ login: {}, password: **** }}", self.login)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// The number of the order the bonuses are spent on.
    pub order: String,
    pub sum: Bonus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatusType,
    /// Only present once the order has earned something.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Bonus>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let accrual = order.accrual.is_positive().then_some(order.accrual);
        Self { number: order.number.0, status: order.status, accrual, uploaded_at: order.created_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub current: Bonus,
    pub withdrawn: Bonus,
}

impl From<Wallet> for BalanceResponse {
    fn from(wallet: Wallet) -> Self {
        Self { current: wallet.balance, withdrawn: wallet.total_withdrawn }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalResponse {
    pub order: String,
    pub sum: Bonus,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self { order: withdrawal.order_number.0, sum: withdrawal.amount, processed_at: withdrawal.processed_at }
    }
}
