use crate::domain::profile::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The merchant's funding source for outbound disbursements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurseId(String);

impl PurseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Provider-side status of a disbursement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Queued,
    PendingConfirmation,
    PendingValidation,
    Failed,
    InvalidRequest,
    InsufficientFunds,
}

impl PaymentStatus {
    /// Statuses under which a disbursement counts as sent. Anything else
    /// aborts the loan before any state is recorded.
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Queued | Self::PendingConfirmation | Self::PendingValidation
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Queued => "queued",
            Self::PendingConfirmation => "pending_confirmation",
            Self::PendingValidation => "pending_validation",
            Self::Failed => "failed",
            Self::InvalidRequest => "invalid_request",
            Self::InsufficientFunds => "insufficient_funds",
        };
        f.write_str(name)
    }
}

/// Result of a disbursement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementReceipt {
    pub status: PaymentStatus,
    pub description: String,
}

/// An inbound repayment, consumed once by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Amount,
}
