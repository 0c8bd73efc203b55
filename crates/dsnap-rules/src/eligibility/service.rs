use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::calculator::{CalculatorError, TierTableError, TierTableRegistry};
use super::config::EligibilityConfig;
use super::domain::{Application, Disaster, DisasterId};
use super::dsnap::dsnap_rule_set;
use super::repository::{DisasterRepository, RepositoryError};
use super::rules::{Finding, Rule, RuleResult};
use super::validate::{ApplicationValidator, InputError, SchemaError};

/// Response shape for an eligibility determination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub findings: Vec<Finding>,
    pub metrics: BTreeMap<String, i64>,
    pub state: String,
}

impl EligibilityVerdict {
    pub fn from_result(result: RuleResult, disaster: &Disaster) -> Self {
        Self {
            eligible: result.successful,
            findings: result.findings,
            metrics: result.metrics,
            state: disaster.state.clone(),
        }
    }
}

/// Service composing input validation, disaster lookup and the rule engine.
pub struct EligibilityService<R> {
    validator: Arc<ApplicationValidator>,
    repository: Arc<R>,
    tables: Arc<TierTableRegistry>,
    config: EligibilityConfig,
}

impl<R> EligibilityService<R>
where
    R: DisasterRepository + 'static,
{
    /// Builds the service with the federal benefit tables.
    pub fn new(
        repository: Arc<R>,
        config: EligibilityConfig,
    ) -> Result<Self, EligibilityServiceError> {
        let tables = TierTableRegistry::standard()?;
        Self::with_tables(repository, Arc::new(tables), config)
    }

    pub fn with_tables(
        repository: Arc<R>,
        tables: Arc<TierTableRegistry>,
        config: EligibilityConfig,
    ) -> Result<Self, EligibilityServiceError> {
        Ok(Self {
            validator: Arc::new(ApplicationValidator::new()?),
            repository,
            tables,
            config,
        })
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    /// Validates a raw payload, then evaluates it against its disaster.
    pub fn evaluate_payload(
        &self,
        payload: Value,
    ) -> Result<EligibilityVerdict, EligibilityServiceError> {
        let application = self.validator.parse(payload).map_err(|err| {
            debug!(errors = err.messages.len(), "application rejected by schema");
            err
        })?;
        self.evaluate(&application)
    }

    /// Looks up the referenced disaster and evaluates the application.
    pub fn evaluate(
        &self,
        application: &Application,
    ) -> Result<EligibilityVerdict, EligibilityServiceError> {
        let disaster = self
            .repository
            .fetch(application.disaster_id)?
            .ok_or_else(|| {
                warn!(disaster_id = %application.disaster_id, "disaster not found");
                EligibilityServiceError::DisasterNotFound(application.disaster_id)
            })?;

        let verdict = self.evaluate_against(application, &disaster)?;
        Ok(verdict)
    }

    /// Runs the rule chain for an application against a known disaster.
    pub fn evaluate_against(
        &self,
        application: &Application,
        disaster: &Disaster,
    ) -> Result<EligibilityVerdict, CalculatorError> {
        let rules = dsnap_rule_set(&self.config, &self.tables, disaster)?;
        let result = rules.execute(application, disaster);

        info!(
            disaster_id = %disaster.id,
            state = %disaster.state,
            eligible = result.successful,
            failed = result.failed_findings().count(),
            "eligibility evaluated"
        );

        Ok(EligibilityVerdict::from_result(result, disaster))
    }

    pub fn disaster(&self, id: DisasterId) -> Result<Disaster, EligibilityServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(EligibilityServiceError::DisasterNotFound(id))
    }

    /// Disasters with at least one registration window open on `today`.
    pub fn active_disasters(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Disaster>, EligibilityServiceError> {
        let disasters = self
            .repository
            .list()?
            .into_iter()
            .filter(|disaster| disaster.is_open_for_registration(today))
            .collect();
        Ok(disasters)
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Disaster {0} not found")]
    DisasterNotFound(DisasterId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Configuration(#[from] CalculatorError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<TierTableError> for EligibilityServiceError {
    fn from(value: TierTableError) -> Self {
        Self::Configuration(CalculatorError::Table(value))
    }
}
