//! Disaster SNAP eligibility: the rule engine, the income and allotment
//! tables it consults, and the validation, lookup and HTTP collaborators
//! around it.
//!
//! Evaluation is a pure, synchronous function of an [`Application`] and a
//! [`Disaster`]. Configuration problems (misordered tables, unknown
//! jurisdictions) surface while the rule set is assembled, never while it runs.

pub mod calculator;
mod config;
pub mod domain;
pub mod dsnap;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests;

pub use calculator::{CalculatorError, JurisdictionKey, TierTable, TierTableError, TierTableRegistry};
pub use config::EligibilityConfig;
pub use domain::{
    Application, ApplicationPeriod, Disaster, DisasterExpenses, DisasterId, DisasterRecordError,
    Money, RegionCategory, FOOD_LOSS,
};
pub use dsnap::{
    dsnap_rule_set, AdverseEffectRule, AuthorizedRule, ConflictingUSDAProgramRule,
    DisasterAreaResidencyRule, FoodPurchaseRule, IncomeAndResourceRule,
    SNAPSupplementalBenefitsRule, StateResidencyRule,
};
pub use repository::{DisasterRepository, InMemoryDisasterRepository, RepositoryError};
pub use router::eligibility_router;
pub use rules::{And, Finding, PredicateRule, Rule, RuleResult, ALLOTMENT_METRIC};
pub use service::{EligibilityService, EligibilityServiceError, EligibilityVerdict};
pub use validate::{ApplicationValidator, InputError, SchemaError};
