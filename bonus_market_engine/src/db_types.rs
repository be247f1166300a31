use std::{fmt::Display, str::FromStr};

use bm_common::{Bonus, Secret};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// A purchase order number as submitted by a user. Validation (digits + Luhn) happens at the API boundary, so this
/// type makes no promises about the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        bm_common::is_valid_luhn(&self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been stored but not yet handed to the reconciliation workers.
    New,
    /// A reconciliation job for the order has been queued.
    Processing,
    /// The accrual service confirmed the order. Any bonus has been recorded against it.
    Processed,
    /// The accrual service rejected the order. No bonus will ever be paid for it.
    Invalid,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            "INVALID" => Ok(Self::Invalid),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatusType,
    /// The bonus credited for this order. Always zero unless the status is `Processed`.
    pub accrual: Bonus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(number: OrderNumber, user_id: i64) -> Self {
        Self { number, user_id, created_at: Utc::now() }
    }
}

//--------------------------------------        Wallet         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub balance: Bonus,
    pub total_withdrawn: Bonus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    /// The order the bonus is being spent against. This is not necessarily an order known to the system.
    pub order_number: OrderNumber,
    pub amount: Bonus,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub user_id: i64,
    pub order_number: OrderNumber,
    pub amount: Bonus,
}

impl NewWithdrawal {
    pub fn new(user_id: i64, order_number: OrderNumber, amount: Bonus) -> Self {
        Self { user_id, order_number, amount }
    }
}

//--------------------------------------     AccrualCredit     ---------------------------------------------------------
/// Proof that the accrual for an order has been added to its owner's wallet.
#[derive(Debug, Clone, FromRow)]
pub struct AccrualCredit {
    pub order_number: OrderNumber,
    pub user_id: i64,
    pub amount: Bonus,
    pub credited_at: DateTime<Utc>,
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password: Secret<String>,
}

impl NewUser {
    pub fn new<S: Into<String>>(login: S, password: S) -> Self {
        Self { login: login.into(), password: Secret::new(password.into()) }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_strings() {
        for status in
            [OrderStatusType::New, OrderStatusType::Processing, OrderStatusType::Processed, OrderStatusType::Invalid]
        {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("Paid".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn order_number_validation() {
        assert!(OrderNumber::from("12345678903").is_valid());
        assert!(!OrderNumber::from("12345678904").is_valid());
        assert_eq!(serde_json::to_string(&OrderNumber::from("9278923470")).unwrap(), "\"9278923470\"");
    }
}
