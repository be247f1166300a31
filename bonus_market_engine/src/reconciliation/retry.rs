use std::time::Duration;

/// How persistently the accrual service is polled for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Polls that may come back without a verdict before the job is abandoned.
    pub max_attempts: u32,
    /// How long to back off after the service says it is rate limiting us.
    pub rate_limit_cooldown: Duration,
    /// Unit of the linear backoff. The wait after attempt `i` (zero-based) is `(2i + 1)` units.
    pub backoff_unit: Duration,
    /// Tries at the wallet credit once the order verdict has been stored.
    pub credit_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_cooldown: Duration::from_secs(60),
            backoff_unit: Duration::from_secs(1),
            credit_attempts: 4,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * (2 * attempt + 1)
    }

    /// The wait before retrying a failed wallet credit: 1, 2, 4... backoff units.
    pub fn credit_backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * 2u32.saturating_pow(attempt)
    }
}

/// What the reconciliation loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Sleep for the given time, then poll again.
    Wait(Duration),
    /// Stop polling. The order is left as it is.
    Abandon,
}

/// Retry bookkeeping for one reconciliation job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    rate_limit_cooldown_active: bool,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of attempts used up so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// True while waiting out a rate-limit cooldown.
    pub fn rate_limit_cooldown_active(&self) -> bool {
        self.rate_limit_cooldown_active
    }

    /// The service is rate limiting. The attempt budget starts over after the cooldown.
    pub fn rate_limited(&mut self, policy: &RetryPolicy) -> RetryStep {
        self.attempt = 0;
        self.rate_limit_cooldown_active = true;
        RetryStep::Wait(policy.rate_limit_cooldown)
    }

    /// The service answered, but has no verdict yet. Uses up one attempt.
    pub fn not_ready(&mut self, policy: &RetryPolicy) -> RetryStep {
        self.rate_limit_cooldown_active = false;
        if self.attempt >= policy.max_attempts {
            return RetryStep::Abandon;
        }
        let wait = policy.backoff(self.attempt);
        self.attempt += 1;
        RetryStep::Wait(wait)
    }

    /// True once the attempt budget has been spent.
    pub fn is_exhausted(&self, policy: &RetryPolicy) -> bool {
        self.attempt >= policy.max_attempts
    }
}
