use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use bm_common::Bonus;
use bonus_market_engine::{
    accrual::{AccrualError, AccrualOracle, AccrualResponse, AccrualStatus},
    db_types::OrderNumber,
    reconciliation::Clock,
};

type Reply = Result<AccrualResponse, AccrualError>;

#[derive(Default)]
struct OracleState {
    scripts: HashMap<OrderNumber, VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: Vec<OrderNumber>,
}

/// An accrual service that plays back canned replies.
///
/// Each order has its own script. When a script runs out, or an order has none, the fallback reply is used. Without a
/// fallback the order is reported as not registered.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    state: Arc<Mutex<OracleState>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(self, reply: Reply) -> Self {
        self.state.lock().unwrap().fallback = Some(reply);
        self
    }

    pub fn script(self, number: &str, replies: Vec<Reply>) -> Self {
        self.state.lock().unwrap().scripts.insert(OrderNumber::from(number), replies.into());
        self
    }

    pub fn calls(&self) -> Vec<OrderNumber> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, number: &str) -> usize {
        let number = OrderNumber::from(number);
        self.state.lock().unwrap().calls.iter().filter(|n| **n == number).count()
    }
}

impl AccrualOracle for ScriptedOracle {
    async fn fetch_status(&self, number: &OrderNumber) -> Result<AccrualResponse, AccrualError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(number.clone());
        let scripted = state.scripts.get_mut(number).and_then(|s| s.pop_front());
        scripted.or_else(|| state.fallback.clone()).unwrap_or(Err(AccrualError::NotRegistered))
    }
}

pub fn processed(number: &str, accrual: i64) -> Reply {
    Ok(AccrualResponse::new(number, AccrualStatus::Processed, Some(Bonus::from(accrual))))
}

pub fn status(number: &str, status: AccrualStatus) -> Reply {
    Ok(AccrualResponse::new(number, status, None))
}

/// A clock that returns immediately and remembers every requested sleep.
#[derive(Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().unwrap().iter().map(|d| d.as_secs()).collect()
    }
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}
