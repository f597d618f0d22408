use serde::{Deserialize, Serialize};
use std::fmt;

/// A delivery medium for outbound traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Sms,
    Voice,
    /// Mobile-money rail used for loan disbursement.
    Cellular,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sms => "sms",
            Self::Voice => "voice",
            Self::Cellular => "cellular",
        };
        f.write_str(name)
    }
}

/// A channel plus its addressing number (short code, voice line or paybill).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub kind: ChannelKind,
    pub number: String,
}

impl Channel {
    pub fn sms(number: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Sms,
            number: number.into(),
        }
    }

    pub fn voice(number: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Voice,
            number: number.into(),
        }
    }

    pub fn cellular(number: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Cellular,
            number: number.into(),
        }
    }
}

/// Payload of an outbound message: plain SMS text or synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Text(String),
    Voice(String),
}

impl MessageBody {
    /// The human-readable content regardless of rendering.
    pub fn content(&self) -> &str {
        match self {
            Self::Text(text) | Self::Voice(text) => text,
        }
    }
}
