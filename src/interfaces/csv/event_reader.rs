use crate::application::dispatcher::InboundEvent;
use crate::domain::payment::Payment;
use crate::domain::profile::{Amount, CustomerId};
use crate::domain::reminder::LOAN_REMINDER_KEY;
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ScriptEventKind {
    Ussd,
    Payment,
    Reminder,
}

/// One row of an event script: `type, customer, value`. `value` is the USSD
/// input text, the payment amount, or the reminder key (defaulting to the
/// loan reminder).
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptEvent {
    pub r#type: ScriptEventKind,
    pub customer: String,
    pub value: Option<String>,
}

impl ScriptEvent {
    pub fn into_inbound(self) -> Result<InboundEvent> {
        let customer = CustomerId::new(self.customer);
        match self.r#type {
            ScriptEventKind::Ussd => Ok(InboundEvent::Ussd {
                customer,
                input: self.value.unwrap_or_default(),
            }),
            ScriptEventKind::Payment => {
                let raw = self.value.ok_or_else(|| {
                    EngineError::Validation("payment event without an amount".to_string())
                })?;
                let amount: Decimal = raw.trim().parse().map_err(|_| {
                    EngineError::Validation(format!("invalid payment amount: {raw}"))
                })?;
                Ok(InboundEvent::Payment {
                    customer,
                    payment: Payment {
                        amount: Amount::new(amount)?,
                    },
                })
            }
            ScriptEventKind::Reminder => Ok(InboundEvent::Reminder {
                customer,
                key: self
                    .value
                    .unwrap_or_else(|| LOAN_REMINDER_KEY.to_string()),
            }),
        }
    }
}

/// Reads script events from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<ScriptEvent>`,
/// with whitespace trimming and flexible record lengths, so large scripts
/// stream without loading the whole file.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events.
    pub fn events(self) -> impl Iterator<Item = Result<ScriptEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "type, customer, value\nussd, +254711000050, 1\npayment, +254711000050, 150.0";
        let reader = EventReader::new(data.as_bytes());
        let results: Vec<Result<ScriptEvent>> = reader.events().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.r#type, ScriptEventKind::Ussd);
        assert_eq!(first.value.as_deref(), Some("1"));
    }

    #[test]
    fn test_reader_malformed_kind() {
        let data = "type, customer, value\nwebhook, +254711000050, 1";
        let reader = EventReader::new(data.as_bytes());
        let results: Vec<Result<ScriptEvent>> = reader.events().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_empty_value_becomes_empty_ussd_input() {
        let data = "type, customer, value\nussd, +254711000050,";
        let event = EventReader::new(data.as_bytes())
            .events()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(event.value, None);

        match event.into_inbound().unwrap() {
            InboundEvent::Ussd { input, .. } => assert_eq!(input, ""),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_payment_amount_parsing() {
        let event = ScriptEvent {
            r#type: ScriptEventKind::Payment,
            customer: "+254711000050".to_string(),
            value: Some("150.5".to_string()),
        };
        match event.into_inbound().unwrap() {
            InboundEvent::Payment { payment, .. } => {
                assert_eq!(payment.amount.value(), dec!(150.5));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let bad = ScriptEvent {
            r#type: ScriptEventKind::Payment,
            customer: "+254711000050".to_string(),
            value: Some("not-a-number".to_string()),
        };
        assert!(matches!(
            bad.into_inbound(),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_reminder_key_defaults() {
        let event = ScriptEvent {
            r#type: ScriptEventKind::Reminder,
            customer: "+254711000050".to_string(),
            value: None,
        };
        match event.into_inbound().unwrap() {
            InboundEvent::Reminder { key, .. } => assert_eq!(key, LOAN_REMINDER_KEY),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
