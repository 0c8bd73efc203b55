use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Expense category that only counts when the disaster allows food loss alone.
pub const FOOD_LOSS: &str = "food_loss";

/// Identifier wrapper for disaster records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisasterId(pub u32);

impl fmt::Display for DisasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount of money held as whole cents. Payloads may carry fractional dollar
/// amounts; they are rounded to the nearest cent. Arithmetic saturates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn dollars(dollars: i64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Rounds to the nearest cent; out of range amounts clamp to the `i64` bounds.
    pub fn from_dollars_f64(amount: f64) -> Self {
        Self((amount * 100.0).round() as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub const fn saturating_sub(self, other: Money) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let (whole, cents) = (magnitude / 100, magnitude % 100);
        if cents == 0 {
            write!(f, "{sign}{whole}")
        } else {
            write!(f, "{sign}{whole}.{cents:02}")
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in dollars")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        Ok(Money::dollars(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        Ok(Money::dollars(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        if value.is_finite() {
            Ok(Money::from_dollars_f64(value))
        } else {
            Err(E::custom("amount must be finite"))
        }
    }
}

/// Unreimbursed disaster expenses keyed by category (e.g. `food_loss`,
/// `home_or_business_repairs`). Missing categories read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisasterExpenses(BTreeMap<String, Money>);

impl DisasterExpenses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form taking whole dollars.
    pub fn with(mut self, category: impl Into<String>, dollars: i64) -> Self {
        self.0.insert(category.into(), Money::dollars(dollars));
        self
    }

    pub fn get(&self, category: &str) -> Money {
        self.0.get(category).copied().unwrap_or_default()
    }

    pub fn total(&self, include_food_loss: bool) -> Money {
        self.0
            .iter()
            .filter(|(category, _)| include_food_loss || category.as_str() != FOOD_LOSS)
            .fold(Money::ZERO, |total, (_, amount)| total.saturating_add(*amount))
    }
}

/// Applicant self-reported facts, treated as a read-only snapshot while rules run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub disaster_id: DisasterId,
    #[serde(default)]
    pub disaster_expenses: DisasterExpenses,
    pub is_head_of_household: bool,
    #[serde(default)]
    pub is_authorized_representative: bool,
    pub has_lost_or_inaccessible_income: bool,
    pub has_inaccessible_liquid_resources: bool,
    pub purchased_or_plans_to_purchase_food: bool,
    pub resided_in_disaster_area_at_disaster_time: bool,
    pub worked_in_disaster_area_at_disaster_time: bool,
    pub total_take_home_income: Money,
    pub accessible_liquid_resources: Money,
    pub size_of_household: u32,
    #[serde(rename = "receives_SNAP_benefits")]
    pub receives_snap_benefits: bool,
    #[serde(default, rename = "receives_FDPIR_benefits")]
    pub receives_fdpir_benefits: bool,
    #[serde(default, rename = "receives_TEFAP_food_distribution")]
    pub receives_tefap_food_distribution: bool,
    pub residence_state: String,
}

impl Application {
    /// Sum of the reported disaster expenses, optionally leaving out food loss.
    pub fn deductible_disaster_expenses(&self, include_food_loss: bool) -> Money {
        self.disaster_expenses.total(include_food_loss)
    }

    pub fn food_loss(&self) -> Money {
        self.disaster_expenses.get(FOOD_LOSS)
    }
}

/// Alaska splits its benefit tables by region category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionCategory {
    Urban,
    Rural1,
    Rural2,
}

impl RegionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RegionCategory::Urban => "URBAN",
            RegionCategory::Rural1 => "RURAL1",
            RegionCategory::Rural2 => "RURAL2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "URBAN" => Some(Self::Urban),
            "RURAL1" => Some(Self::Rural1),
            "RURAL2" => Some(Self::Rural2),
            _ => None,
        }
    }
}

/// Window during which households may register for a disaster's benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPeriod {
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_begin_date: NaiveDate,
    pub registration_end_date: NaiveDate,
    #[serde(default)]
    pub counties: Vec<String>,
}

impl ApplicationPeriod {
    pub fn validate(&self) -> Result<(), DisasterRecordError> {
        if self.begin_date > self.end_date {
            return Err(DisasterRecordError::PeriodDatesReversed {
                begin: self.begin_date,
                end: self.end_date,
            });
        }
        if self.registration_begin_date > self.registration_end_date {
            return Err(DisasterRecordError::RegistrationDatesReversed {
                begin: self.registration_begin_date,
                end: self.registration_end_date,
            });
        }
        Ok(())
    }

    pub fn registration_open_on(&self, today: NaiveDate) -> bool {
        self.registration_begin_date <= today && today <= self.registration_end_date
    }
}

/// Jurisdiction policy for a declared disaster. Read-only during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disaster {
    pub id: DisasterId,
    pub disaster_request_no: String,
    pub title: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_category: Option<RegionCategory>,
    pub benefit_begin_date: NaiveDate,
    pub benefit_end_date: NaiveDate,
    pub residency_required: bool,
    #[serde(rename = "uses_DSED")]
    pub uses_dsed: bool,
    pub allows_food_loss_alone: bool,
    #[serde(default)]
    pub application_periods: Vec<ApplicationPeriod>,
}

impl Disaster {
    /// Checks the date invariants an administrator must satisfy before the
    /// record is used for evaluation.
    pub fn validate(&self) -> Result<(), DisasterRecordError> {
        if self.benefit_begin_date > self.benefit_end_date {
            return Err(DisasterRecordError::BenefitDatesReversed {
                begin: self.benefit_begin_date,
                end: self.benefit_end_date,
            });
        }
        self.application_periods
            .iter()
            .try_for_each(ApplicationPeriod::validate)
    }

    pub fn is_open_for_registration(&self, today: NaiveDate) -> bool {
        self.application_periods
            .iter()
            .any(|period| period.registration_open_on(today))
    }
}

/// Raised when an administrator-supplied disaster record is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisasterRecordError {
    #[error("benefit begin date {begin} cannot be later than benefit end date {end}")]
    BenefitDatesReversed { begin: NaiveDate, end: NaiveDate },
    #[error("period begin date {begin} cannot be later than period end date {end}")]
    PeriodDatesReversed { begin: NaiveDate, end: NaiveDate },
    #[error("registration begin date {begin} cannot be later than registration end date {end}")]
    RegistrationDatesReversed { begin: NaiveDate, end: NaiveDate },
}
