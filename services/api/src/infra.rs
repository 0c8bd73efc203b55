use chrono::{Duration, NaiveDate};
use dsnap_rules::eligibility::{
    ApplicationPeriod, Disaster, DisasterId, InMemoryDisasterRepository, RegionCategory,
};
use dsnap_rules::error::AppError;
use dsnap_rules::import::DisasterCsvImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads disasters from a CSV export when one is configured, otherwise seeds
/// the demo disasters with registration open around `today`.
pub(crate) fn load_repository(
    csv: Option<&Path>,
    today: NaiveDate,
) -> Result<InMemoryDisasterRepository, AppError> {
    let disasters = match csv {
        Some(path) => DisasterCsvImporter::from_path(path)?,
        None => default_disasters(today),
    };
    Ok(InMemoryDisasterRepository::with_disasters(disasters)?)
}

pub(crate) fn default_disasters(today: NaiveDate) -> Vec<Disaster> {
    let begin = today - Duration::days(7);
    let end = today + Duration::days(21);
    let period = |counties: &[&str]| ApplicationPeriod {
        begin_date: begin,
        end_date: end,
        registration_begin_date: begin,
        registration_end_date: today + Duration::days(7),
        counties: counties.iter().map(|name| name.to_string()).collect(),
    };

    vec![
        Disaster {
            id: DisasterId(1),
            disaster_request_no: "DR-4337".to_string(),
            title: "Hurricane Irma".to_string(),
            state: "FL".to_string(),
            region_category: None,
            benefit_begin_date: begin,
            benefit_end_date: end,
            residency_required: true,
            uses_dsed: false,
            allows_food_loss_alone: true,
            application_periods: vec![period(&["Monroe", "Collier", "Lee"])],
        },
        Disaster {
            id: DisasterId(2),
            disaster_request_no: "DR-4340".to_string(),
            title: "Typhoon Mangkhut".to_string(),
            state: "GU".to_string(),
            region_category: None,
            benefit_begin_date: begin,
            benefit_end_date: end,
            residency_required: false,
            uses_dsed: true,
            allows_food_loss_alone: false,
            application_periods: vec![period(&["Guam"])],
        },
        Disaster {
            id: DisasterId(3),
            disaster_request_no: "DR-4413".to_string(),
            title: "Anchorage Earthquake".to_string(),
            state: "AK".to_string(),
            region_category: Some(RegionCategory::Urban),
            benefit_begin_date: begin,
            benefit_end_date: end,
            residency_required: false,
            uses_dsed: false,
            allows_food_loss_alone: false,
            application_periods: Vec::new(),
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsnap_rules::eligibility::DisasterRepository;

    #[test]
    fn demo_disasters_are_valid_and_open_today() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 15).expect("valid date");
        let repository = load_repository(None, today).expect("demo disasters load");

        assert_eq!(repository.len(), 3);
        let open: Vec<Disaster> = repository
            .list()
            .expect("list succeeds")
            .into_iter()
            .filter(|disaster| disaster.is_open_for_registration(today))
            .collect();
        assert_eq!(open.len(), 2);
    }

    #[test]
    fn missing_csv_is_reported() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 15).expect("valid date");
        let err = load_repository(Some(Path::new("does/not/exist.csv")), today)
            .err()
            .expect("file is missing");

        assert!(matches!(err, AppError::Import(_)));
    }

    #[test]
    fn parse_date_reports_format() {
        assert!(parse_date("2025-09-15").is_ok());
        let err = parse_date("09/15/2025").expect_err("wrong format");
        assert!(err.contains("YYYY-MM-DD"));
    }
}
