//! Outbound gate: business hours, rate limits and the human-like delay.
//!
//! The gate runs before any automated send. Rejections are structured
//! "ignored" results with a reason code, not errors, and nothing is retried.
//! Agent-authored replies bypass the gate entirely.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use database::{bot_interaction, SqlitePool};

/// A daily window of whole hours, `start` inclusive to `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub start: u32,
    pub end: u32,
}

impl BusinessHours {
    /// Whether an hour falls inside the window.
    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }
}

/// Outcome of the pre-send checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Sending may proceed.
    Allowed,
    /// The current hour is outside the configured window.
    OutsideBusinessHours,
    /// The customer hit the per-day cap.
    DailyLimitReached,
    /// The customer hit the trailing-hour cap.
    WindowLimitReached,
}

impl GateDecision {
    /// Whether the send may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Reason code for rejections, `None` when allowed.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::OutsideBusinessHours => Some("outside_business_hours"),
            Self::DailyLimitReached => Some("daily_limit_reached"),
            Self::WindowLimitReached => Some("window_limit_reached"),
        }
    }
}

/// Pre-send checks applied to every automated message.
#[derive(Debug, Clone)]
pub struct OutboundGate {
    /// Optional send window; `None` means the bot answers around the clock.
    pub hours: Option<BusinessHours>,
    /// Maximum automated turns per customer per calendar day.
    pub max_per_day: i64,
    /// Maximum automated turns per customer in the trailing hour.
    pub max_per_window: i64,
}

impl Default for OutboundGate {
    fn default() -> Self {
        Self {
            hours: None,
            max_per_day: 5,
            max_per_window: 3,
        }
    }
}

impl OutboundGate {
    /// Check the configured send window against the current hour.
    pub fn check_hours(&self, current_hour: u32) -> GateDecision {
        match self.hours {
            Some(window) if !window.contains(current_hour) => GateDecision::OutsideBusinessHours,
            _ => GateDecision::Allowed,
        }
    }

    /// Check the per-day and trailing-hour caps for a customer.
    ///
    /// The caps count recorded bot interactions, so turns that were gated
    /// away never consume budget.
    pub async fn check_rate_limits(
        &self,
        pool: &SqlitePool,
        customer_key: &str,
    ) -> Result<GateDecision, database::DatabaseError> {
        let today = bot_interaction::count_today(pool, customer_key).await?;
        if today >= self.max_per_day {
            debug!(customer = %customer_key, today, "daily send limit reached");
            return Ok(GateDecision::DailyLimitReached);
        }

        let last_hour = bot_interaction::count_last_hour(pool, customer_key).await?;
        if last_hour >= self.max_per_window {
            debug!(customer = %customer_key, last_hour, "hourly send limit reached");
            return Ok(GateDecision::WindowLimitReached);
        }

        Ok(GateDecision::Allowed)
    }

    /// Run both checks in order: hours first, then rate limits.
    pub async fn check(
        &self,
        pool: &SqlitePool,
        customer_key: &str,
        current_hour: u32,
    ) -> Result<GateDecision, database::DatabaseError> {
        let hours = self.check_hours(current_hour);
        if !hours.is_allowed() {
            return Ok(hours);
        }
        self.check_rate_limits(pool, customer_key).await
    }
}

/// Random pre-send delay so automated replies do not land with inhuman
/// latency. Agent replies skip this entirely.
#[derive(Debug, Clone, Copy)]
pub struct HumanDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for HumanDelay {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(3),
            max: Duration::from_secs(8),
        }
    }
}

impl HumanDelay {
    /// Pick a uniformly random delay within the window.
    pub fn jitter(&self) -> Duration {
        let min = self.min.as_secs_f64();
        let max = self.max.as_secs_f64();
        if max <= min {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(min..=max);
        Duration::from_secs_f64(secs)
    }

    /// Sleep for a random duration within the window.
    pub async fn wait(&self) {
        let delay = self.jitter();
        debug!(delay_ms = delay.as_millis() as u64, "human-like send delay");
        tokio::time::sleep(delay).await;
    }
}
