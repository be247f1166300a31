use bm_common::Bonus;
use serde::{Deserialize, Serialize};

use crate::db_types::OrderStatusType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    /// The order is known, but its accrual has not been calculated yet.
    Registered,
    /// The order will never earn an accrual.
    Invalid,
    /// The accrual is being calculated.
    Processing,
    /// The accrual has been calculated and is final.
    Processed,
}

impl AccrualStatus {
    /// The order status to record once the accrual service has reached a verdict. `None` means "ask again later".
    pub fn terminal_order_status(&self) -> Option<OrderStatusType> {
        match self {
            AccrualStatus::Processed => Some(OrderStatusType::Processed),
            AccrualStatus::Invalid => Some(OrderStatusType::Invalid),
            AccrualStatus::Registered | AccrualStatus::Processing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualResponse {
    #[serde(alias = "number")]
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Bonus>,
}

impl AccrualResponse {
    pub fn new(order: &str, status: AccrualStatus, accrual: Option<Bonus>) -> Self {
        Self { order: order.to_string(), status, accrual }
    }

    /// The accrual, or zero if the service did not send one.
    pub fn accrual_or_zero(&self) -> Bonus {
        self.accrual.unwrap_or_default()
    }
}
