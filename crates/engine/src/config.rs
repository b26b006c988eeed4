//! Engine configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use crate::escalation::EscalationPolicy;
use crate::gate::{BusinessHours, HumanDelay, OutboundGate};

/// Configuration for the routing engine and its gates.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Context time-to-live.
    pub context_ttl: chrono::Duration,
    /// Escalation policy parameters.
    pub policy: EscalationPolicy,
    /// Pre-send gate parameters.
    pub gate: OutboundGate,
    /// Human-like delay window for automated sends.
    pub delay: HumanDelay,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_ttl: responder_core::default_context_ttl(),
            policy: EscalationPolicy::default(),
            gate: OutboundGate::default(),
            delay: HumanDelay::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CONTEXT_TTL_SECS` | Context time-to-live in seconds | `7200` |
    /// | `MAX_BOT_RESPONSES` | Automated turns before forced escalation | `4` |
    /// | `POLICY_HOURS_START` / `POLICY_HOURS_END` | Hours for the after-hours escalation rule | `8` / `18` |
    /// | `BUSINESS_HOURS_START` / `BUSINESS_HOURS_END` | Send window; unset means 24/7 | unset |
    /// | `MAX_MESSAGES_PER_DAY` | Automated sends per customer per day | `5` |
    /// | `MAX_MESSAGES_PER_HOUR` | Automated sends per customer per trailing hour | `3` |
    /// | `MIN_RESPONSE_DELAY` / `MAX_RESPONSE_DELAY` | Human-like delay window in seconds | `3` / `8` |
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<i64>("CONTEXT_TTL_SECS") {
            config.context_ttl = chrono::Duration::seconds(secs);
        }
        if let Some(turns) = parse_var::<u32>("MAX_BOT_RESPONSES") {
            config.policy.max_bot_turns = turns;
        }
        if let (Some(start), Some(end)) = (
            parse_var::<u32>("POLICY_HOURS_START"),
            parse_var::<u32>("POLICY_HOURS_END"),
        ) {
            config.policy.business_hours = BusinessHours { start, end };
        }

        // The send window is only active when both ends are configured.
        if let (Some(start), Some(end)) = (
            parse_var::<u32>("BUSINESS_HOURS_START"),
            parse_var::<u32>("BUSINESS_HOURS_END"),
        ) {
            config.gate.hours = Some(BusinessHours { start, end });
        }
        if let Some(per_day) = parse_var::<i64>("MAX_MESSAGES_PER_DAY") {
            config.gate.max_per_day = per_day;
        }
        if let Some(per_hour) = parse_var::<i64>("MAX_MESSAGES_PER_HOUR") {
            config.gate.max_per_window = per_hour;
        }

        if let Some(min) = parse_var::<u64>("MIN_RESPONSE_DELAY") {
            config.delay.min = Duration::from_secs(min);
        }
        if let Some(max) = parse_var::<u64>("MAX_RESPONSE_DELAY") {
            config.delay.max = Duration::from_secs(max);
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_baseline() {
        let config = EngineConfig::default();
        assert_eq!(config.context_ttl, chrono::Duration::hours(2));
        assert_eq!(config.policy.max_bot_turns, 4);
        assert_eq!(config.policy.business_hours, BusinessHours { start: 8, end: 18 });
        assert!(config.gate.hours.is_none());
        assert_eq!(config.gate.max_per_day, 5);
        assert_eq!(config.gate.max_per_window, 3);
        assert_eq!(config.delay.min, Duration::from_secs(3));
        assert_eq!(config.delay.max, Duration::from_secs(8));
    }
}
