//! Rule abstraction shared by every eligibility check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Application, Disaster};

/// Metric key carrying the benefit amount for an eligible household.
pub const ALLOTMENT_METRIC: &str = "allotment";

/// Structured explanation attached to a rule verdict for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: String,
    pub succeeded: bool,
    pub text: String,
}

impl Finding {
    pub fn new(rule: &str, succeeded: bool, text: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            succeeded,
            text: text.into(),
        }
    }
}

/// Verdict produced by a rule or a combination of rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleResult {
    pub successful: bool,
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub metrics: BTreeMap<String, i64>,
}

impl RuleResult {
    pub fn new(successful: bool, findings: Vec<Finding>) -> Self {
        Self {
            successful,
            findings,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: i64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    pub fn failed_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| !finding.succeeded)
    }

    fn findings_by_rule(&self) -> Vec<&Finding> {
        let mut findings: Vec<&Finding> = self.findings.iter().collect();
        findings.sort_by(|left, right| left.rule.cmp(&right.rule));
        findings
    }
}

/// Findings compare without regard to order; success and metrics compare exactly.
impl PartialEq for RuleResult {
    fn eq(&self, other: &Self) -> bool {
        self.successful == other.successful
            && self.metrics == other.metrics
            && self.findings_by_rule() == other.findings_by_rule()
    }
}

impl Eq for RuleResult {}

/// A pure unit of eligibility logic over an application and a disaster.
pub trait Rule: Send + Sync {
    /// Stable identifier used to tag findings.
    fn name(&self) -> &'static str;

    fn execute(&self, application: &Application, disaster: &Disaster) -> RuleResult;

    fn finding(&self, succeeded: bool, text: impl Into<String>) -> Finding
    where
        Self: Sized,
    {
        Finding::new(self.name(), succeeded, text)
    }
}

/// Shortcut for rules whose outcome is a single boolean with fixed texts.
pub trait PredicateRule: Send + Sync {
    const NAME: &'static str;
    const SUCCESS_FINDING: &'static str;
    const FAILURE_FINDING: &'static str;

    fn predicate(&self, application: &Application, disaster: &Disaster) -> bool;
}

impl<T: PredicateRule> Rule for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn execute(&self, application: &Application, disaster: &Disaster) -> RuleResult {
        let succeeded = self.predicate(application, disaster);
        let text = if succeeded {
            T::SUCCESS_FINDING
        } else {
            T::FAILURE_FINDING
        };
        RuleResult::new(succeeded, vec![Finding::new(T::NAME, succeeded, text)])
    }
}

/// Conjunction of rules. Every rule runs, even after a failure, so callers
/// receive the complete list of findings.
#[derive(Default)]
pub struct And {
    rules: Vec<Box<dyn Rule>>,
}

impl And {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}

impl Rule for And {
    fn name(&self) -> &'static str {
        "And"
    }

    fn execute(&self, application: &Application, disaster: &Disaster) -> RuleResult {
        self.rules.iter().fold(
            RuleResult::new(true, Vec::new()),
            |mut overall, rule| {
                let result = rule.execute(application, disaster);
                overall.successful &= result.successful;
                overall.findings.extend(result.findings);
                overall.metrics.extend(result.metrics);
                overall
            },
        )
    }
}
