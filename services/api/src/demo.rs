use crate::infra::{default_disasters, load_repository};
use chrono::{Local, NaiveDate};
use clap::Args;
use dsnap_rules::eligibility::{
    Application, DisasterExpenses, DisasterId, EligibilityConfig, EligibilityService,
    EligibilityVerdict, InMemoryDisasterRepository, Money, ALLOTMENT_METRIC,
};
use dsnap_rules::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Application JSON document to evaluate
    #[arg(long)]
    pub(crate) application: PathBuf,
    /// Disaster CSV export (defaults to the built-in demo disasters)
    #[arg(long)]
    pub(crate) disasters: Option<PathBuf>,
    /// Reference date for the demo disasters' registration windows (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the demo disasters (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Leave the FDPIR/TEFAP conflicting program check out of the rule chain
    #[arg(long)]
    pub(crate) skip_conflicting_program_rule: bool,
    /// Print every finding, not only the failed ones
    #[arg(long)]
    pub(crate) all_findings: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        application,
        disasters,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let repository = load_repository(disasters.as_deref(), today)?;
    let service = EligibilityService::new(Arc::new(repository), EligibilityConfig::default())?;

    let raw = std::fs::read_to_string(application)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    let verdict = service.evaluate_payload(payload)?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_conflicting_program_rule,
        all_findings,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = EligibilityConfig {
        conflicting_program_rule: !skip_conflicting_program_rule,
        ..EligibilityConfig::default()
    };
    let repository = InMemoryDisasterRepository::with_disasters(default_disasters(today))?;
    let service = EligibilityService::new(Arc::new(repository), config)?;

    println!("D-SNAP eligibility demo ({today})");
    println!("Disasters accepting registrations:");
    for disaster in service.active_disasters(today)? {
        println!(
            "- #{} {} [{}] {}{}",
            disaster.id,
            disaster.title,
            disaster.state,
            disaster.disaster_request_no,
            if disaster.uses_dsed { " (DSED)" } else { "" }
        );
    }

    for (label, application) in demo_households() {
        let verdict = service.evaluate(&application)?;
        render_verdict(label, &verdict, all_findings);
    }

    Ok(())
}

fn render_verdict(label: &str, verdict: &EligibilityVerdict, all_findings: bool) {
    let decision = if verdict.eligible {
        "ELIGIBLE"
    } else {
        "INELIGIBLE"
    };
    match verdict.metrics.get(ALLOTMENT_METRIC) {
        Some(allotment) if verdict.eligible => {
            println!("\n{label} ({}): {decision}, allotment ${allotment}", verdict.state)
        }
        _ => println!("\n{label} ({}): {decision}", verdict.state),
    }

    for finding in &verdict.findings {
        if all_findings || !finding.succeeded {
            let mark = if finding.succeeded { "pass" } else { "fail" };
            println!("  - [{mark}] {}: {}", finding.rule, finding.text);
        }
    }
}

fn demo_households() -> Vec<(&'static str, Application)> {
    let family = household(DisasterId(1), "FL");

    let mut high_income = household(DisasterId(1), "FL");
    high_income.total_take_home_income = Money::dollars(5000);

    let mut commuter = household(DisasterId(1), "FL");
    commuter.resided_in_disaster_area_at_disaster_time = false;
    commuter.worked_in_disaster_area_at_disaster_time = true;

    let mut snap_client = household(DisasterId(1), "FL");
    snap_client.receives_snap_benefits = true;

    let mut guam = household(DisasterId(2), "GU");
    guam.size_of_household = 10;

    let mut anchorage = household(DisasterId(3), "AK");
    anchorage.receives_tefap_food_distribution = true;

    vec![
        ("Household of four in Monroe County", family),
        ("Household reporting $5000 take-home income", high_income),
        ("Commuter who only worked in the disaster area", commuter),
        ("Ongoing SNAP client", snap_client),
        ("Household of ten under DSED", guam),
        ("Anchorage household receiving TEFAP", anchorage),
    ]
}

fn household(disaster_id: DisasterId, state: &str) -> Application {
    Application {
        disaster_id,
        disaster_expenses: DisasterExpenses::new()
            .with("food_loss", 80)
            .with("home_or_business_repairs", 50),
        is_head_of_household: true,
        is_authorized_representative: false,
        has_lost_or_inaccessible_income: true,
        has_inaccessible_liquid_resources: false,
        purchased_or_plans_to_purchase_food: true,
        resided_in_disaster_area_at_disaster_time: true,
        worked_in_disaster_area_at_disaster_time: false,
        total_take_home_income: Money::dollars(200),
        accessible_liquid_resources: Money::dollars(300),
        size_of_household: 4,
        receives_snap_benefits: false,
        receives_fdpir_benefits: false,
        receives_tefap_food_distribution: false,
        residence_state: state.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EligibilityService<InMemoryDisasterRepository> {
        let today = NaiveDate::from_ymd_opt(2025, 9, 15).expect("valid date");
        let repository = InMemoryDisasterRepository::with_disasters(default_disasters(today))
            .expect("demo disasters are valid");
        EligibilityService::new(Arc::new(repository), EligibilityConfig::default())
            .expect("service builds")
    }

    #[test]
    fn demo_households_cover_both_outcomes() {
        let service = service();
        let verdicts: Vec<(&str, bool)> = demo_households()
            .into_iter()
            .map(|(label, application)| {
                let verdict = service.evaluate(&application).expect("demo evaluates");
                (label, verdict.eligible)
            })
            .collect();

        assert_eq!(
            verdicts.iter().map(|(_, eligible)| *eligible).collect::<Vec<_>>(),
            vec![true, false, false, false, true, false]
        );
    }

    fn write_application(name: &str, application: &Application) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.json", std::process::id()));
        let payload = serde_json::to_string(application).expect("application serializes");
        std::fs::write(&path, payload).expect("write fixture");
        path
    }

    #[test]
    fn evaluate_reads_application_file() {
        let path = write_application("dsnap-application", &household(DisasterId(1), "FL"));

        let result = run_evaluate(EvaluateArgs {
            application: path.clone(),
            disasters: None,
            today: None,
        });
        std::fs::remove_file(&path).ok();

        result.expect("evaluation succeeds");
    }

    #[test]
    fn evaluate_reports_missing_disaster() {
        let path = write_application("dsnap-missing", &household(DisasterId(99), "FL"));

        let result = run_evaluate(EvaluateArgs {
            application: path.clone(),
            disasters: None,
            today: None,
        });
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(AppError::Eligibility(
                dsnap_rules::eligibility::EligibilityServiceError::DisasterNotFound(_)
            ))
        ));
    }
}
