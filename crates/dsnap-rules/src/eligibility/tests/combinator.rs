use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::common::*;
use crate::eligibility::domain::{Application, Disaster};
use crate::eligibility::rules::{And, Finding, PredicateRule, Rule, RuleResult};

struct AlwaysSucceeds;

impl PredicateRule for AlwaysSucceeds {
    const NAME: &'static str = "AlwaysSucceeds";
    const SUCCESS_FINDING: &'static str = "passed";
    const FAILURE_FINDING: &'static str = "unreachable";

    fn predicate(&self, _application: &Application, _disaster: &Disaster) -> bool {
        true
    }
}

struct AlwaysFails;

impl PredicateRule for AlwaysFails {
    const NAME: &'static str = "AlwaysFails";
    const SUCCESS_FINDING: &'static str = "unreachable";
    const FAILURE_FINDING: &'static str = "failed";

    fn predicate(&self, _application: &Application, _disaster: &Disaster) -> bool {
        false
    }
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Rule for Counting {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn execute(&self, _application: &Application, _disaster: &Disaster) -> RuleResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RuleResult::new(true, vec![self.finding(true, "counted")])
    }
}

struct Metric(&'static str, i64);

impl Rule for Metric {
    fn name(&self) -> &'static str {
        "Metric"
    }

    fn execute(&self, _application: &Application, _disaster: &Disaster) -> RuleResult {
        RuleResult::new(true, Vec::new()).with_metric(self.0, self.1)
    }
}

#[test]
fn and_rule_combines_findings_in_order() {
    let rules = And::default().with(AlwaysSucceeds).with(AlwaysFails);
    let result = rules.execute(&application(), &disaster(false, false, false));

    assert!(!result.successful);
    assert_eq!(
        result.findings,
        vec![
            Finding::new("AlwaysSucceeds", true, "passed"),
            Finding::new("AlwaysFails", false, "failed"),
        ]
    );
}

#[test]
fn and_rule_runs_every_rule_after_a_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rules = And::default()
        .with(AlwaysFails)
        .with(Counting {
            calls: Arc::clone(&calls),
        })
        .with(Counting {
            calls: Arc::clone(&calls),
        });

    let result = rules.execute(&application(), &disaster(false, false, false));

    assert!(!result.successful);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.findings.len(), 3);
}

#[test]
fn empty_and_rule_succeeds() {
    let rules = And::default();
    assert!(rules.is_empty());

    let result = rules.execute(&application(), &disaster(false, false, false));
    assert_eq!(result, RuleResult::new(true, Vec::new()));
}

#[test]
fn and_rule_succeeds_only_when_all_succeed() {
    let disaster = disaster(false, false, false);
    let application = application();

    let cases: Vec<(And, bool)> = vec![
        (And::default().with(AlwaysSucceeds).with(AlwaysSucceeds), true),
        (And::default().with(AlwaysSucceeds).with(AlwaysFails), false),
        (And::default().with(AlwaysFails).with(AlwaysSucceeds), false),
        (And::default().with(AlwaysFails).with(AlwaysFails), false),
    ];

    for (rules, successful) in cases {
        assert_eq!(rules.execute(&application, &disaster).successful, successful);
    }
}

#[test]
fn and_rule_merges_metrics() {
    let rules = And::default()
        .with(Metric("allotment", 642))
        .with(Metric("household", 4))
        .with(Metric("allotment", 700));

    let result = rules.execute(&application(), &disaster(false, false, false));

    assert_eq!(result.metrics.len(), 2);
    assert_eq!(result.metrics.get("allotment"), Some(&700));
    assert_eq!(result.metrics.get("household"), Some(&4));
}

#[test]
fn nested_and_rules_flatten_findings() {
    let inner = And::new(vec![Box::new(AlwaysSucceeds), Box::new(AlwaysFails)]);
    let outer = And::default().with(inner).with(AlwaysSucceeds);

    assert_eq!(outer.len(), 2);
    assert_eq!(outer.rule_names(), vec!["And", "AlwaysSucceeds"]);

    let result = outer.execute(&application(), &disaster(false, false, false));
    assert!(!result.successful);
    assert_eq!(result.findings.len(), 3);
    assert_eq!(result.failed_findings().count(), 1);
}
