use crate::domain::session::Screen;
use crate::error::EngineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A customer identity: the subscriber's phone number in international form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed KES amount.
///
/// Wraps `rust_decimal::Decimal` to enforce domain rules and keep monetary
/// arithmetic out of raw floats. An outstanding loan balance can go negative
/// when a customer over-pays; the surplus is forgiven at teardown.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A positive KES amount, used for payments and disbursements.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, EngineError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EngineError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// The per-customer keys the store can delete individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Name,
    Balance,
    Strike,
    Items,
    Screen,
}

/// The loan-specific keys cleared when a loan is fully repaid. The captured
/// item list survives teardown.
pub const LOAN_FIELDS: [ProfileField; 4] = [
    ProfileField::Name,
    ProfileField::Strike,
    ProfileField::Balance,
    ProfileField::Screen,
];

/// A customer's persistent record.
///
/// The store has full-snapshot overwrite semantics: handlers read the whole
/// profile, mutate it, and write the whole profile back. Loan fields are only
/// meaningful while a loan is outstanding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: Option<String>,
    pub balance: Option<Balance>,
    /// Escalation level, starting at 1 and incremented on every reminder
    /// fire. Unbounded; visible behavior saturates at tier 3.
    pub strike: Option<u32>,
    #[serde(default)]
    pub items: Vec<String>,
    pub screen: Option<Screen>,
}

impl CustomerProfile {
    /// A loan is active while a name is recorded against the customer.
    pub fn has_active_loan(&self) -> bool {
        self.name.is_some()
    }

    pub fn outstanding_balance(&self) -> Balance {
        self.balance.unwrap_or(Balance::ZERO)
    }

    /// Current escalation level, defaulting to 1 for the first fire.
    pub fn strike_level(&self) -> u32 {
        self.strike.unwrap_or(1)
    }

    pub fn clear_field(&mut self, field: ProfileField) {
        match field {
            ProfileField::Name => self.name = None,
            ProfileField::Balance => self.balance = None,
            ProfileField::Strike => self.strike = None,
            ProfileField::Items => self.items.clear(),
            ProfileField::Screen => self.screen = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_balance_can_go_negative() {
        let balance = Balance::new(dec!(100.0)) - Balance::new(dec!(150.0));
        assert_eq!(balance, Balance::new(dec!(-50.0)));
        assert!(balance <= Balance::ZERO);
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_loan_teardown_keeps_items() {
        let mut profile = CustomerProfile {
            name: Some("Wanjiru".to_string()),
            balance: Some(Balance::new(dec!(200.0))),
            strike: Some(3),
            items: vec!["apple".to_string(), "banana".to_string()],
            screen: Some(Screen::Home),
        };

        for field in LOAN_FIELDS {
            profile.clear_field(field);
        }

        assert!(!profile.has_active_loan());
        assert_eq!(profile.outstanding_balance(), Balance::ZERO);
        assert_eq!(profile.strike_level(), 1);
        assert_eq!(profile.items.len(), 2);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_empty_profile_defaults() {
        let profile = CustomerProfile::default();
        assert!(!profile.has_active_loan());
        assert_eq!(profile.outstanding_balance(), Balance::ZERO);
        assert_eq!(profile.strike_level(), 1);
        assert!(profile.is_empty());
    }
}
