use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler key of the repayment reminder. One loan, one reminder.
pub const LOAN_REMINDER_KEY: &str = "moni";

/// A recurring reminder owned by the provider's scheduler. The workflow only
/// schedules it at loan approval and cancels it by key at full repayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub key: String,
    pub remind_at: DateTime<Utc>,
    pub interval: Duration,
    pub payload: String,
}

/// Escalation tier controlling the tone and channel of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTier {
    /// First nudge, friendly SMS.
    Friendly,
    /// Second nudge, firmer SMS.
    Firm,
    /// Third and later: synthesized voice call.
    Urgent,
}

impl ReminderTier {
    /// Pure mapping from strike level to tier. The stored strike counter is
    /// unbounded; everything from 3 up stays `Urgent`.
    pub fn for_strike(strike: u32) -> Self {
        match strike {
            0 | 1 => Self::Friendly,
            2 => Self::Firm,
            _ => Self::Urgent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_progression() {
        assert_eq!(ReminderTier::for_strike(1), ReminderTier::Friendly);
        assert_eq!(ReminderTier::for_strike(2), ReminderTier::Firm);
        assert_eq!(ReminderTier::for_strike(3), ReminderTier::Urgent);
    }

    #[test]
    fn test_tier_saturates_above_three() {
        for strike in [4, 10, 1000] {
            assert_eq!(ReminderTier::for_strike(strike), ReminderTier::Urgent);
        }
    }
}
