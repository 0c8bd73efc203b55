use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::eligibility::domain::{
    Application, ApplicationPeriod, Disaster, DisasterExpenses, DisasterId, Money,
};
use crate::eligibility::repository::{
    DisasterRepository, InMemoryDisasterRepository, RepositoryError,
};
use crate::eligibility::{eligibility_router, EligibilityConfig, EligibilityService, TierTable};

pub(super) const DISASTER_ID: DisasterId = DisasterId(42);

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn application() -> Application {
    Application {
        disaster_id: DISASTER_ID,
        disaster_expenses: DisasterExpenses::new().with("food_loss", 0),
        is_head_of_household: true,
        is_authorized_representative: false,
        has_lost_or_inaccessible_income: false,
        has_inaccessible_liquid_resources: true,
        purchased_or_plans_to_purchase_food: true,
        resided_in_disaster_area_at_disaster_time: true,
        worked_in_disaster_area_at_disaster_time: false,
        total_take_home_income: Money::dollars(200),
        accessible_liquid_resources: Money::dollars(0),
        size_of_household: 4,
        receives_snap_benefits: false,
        receives_fdpir_benefits: false,
        receives_tefap_food_distribution: false,
        residence_state: "FL".to_string(),
    }
}

pub(super) fn payload() -> Value {
    json!({
        "disaster_id": DISASTER_ID.0,
        "disaster_expenses": {"food_loss": 0},
        "is_head_of_household": true,
        "is_authorized_representative": false,
        "has_lost_or_inaccessible_income": false,
        "has_inaccessible_liquid_resources": true,
        "purchased_or_plans_to_purchase_food": true,
        "resided_in_disaster_area_at_disaster_time": true,
        "worked_in_disaster_area_at_disaster_time": false,
        "total_take_home_income": 200,
        "accessible_liquid_resources": 0,
        "size_of_household": 4,
        "receives_SNAP_benefits": false,
        "residence_state": "FL"
    })
}

pub(super) fn disaster(
    residency_required: bool,
    uses_dsed: bool,
    allows_food_loss_alone: bool,
) -> Disaster {
    Disaster {
        id: DISASTER_ID,
        disaster_request_no: "DR-4337".to_string(),
        title: "Hurricane Irma".to_string(),
        state: "FL".to_string(),
        region_category: None,
        benefit_begin_date: date(2025, 9, 10),
        benefit_end_date: date(2025, 10, 10),
        residency_required,
        uses_dsed,
        allows_food_loss_alone,
        application_periods: Vec::new(),
    }
}

pub(super) fn registration_period(begin: NaiveDate, end: NaiveDate) -> ApplicationPeriod {
    ApplicationPeriod {
        begin_date: begin,
        end_date: end,
        registration_begin_date: begin,
        registration_end_date: end,
        counties: vec!["Monroe".to_string()],
    }
}

/// Single-row table whose limit and allotment hold for every household size.
pub(super) fn flat_table(limit: i64, allotment: i64) -> TierTable {
    TierTable::new(&[(limit, allotment)], 0, 0).expect("flat table is ascending")
}

pub(super) fn repository_with(disasters: Vec<Disaster>) -> Arc<InMemoryDisasterRepository> {
    Arc::new(InMemoryDisasterRepository::with_disasters(disasters).expect("disasters are valid"))
}

pub(super) fn build_service(
    disasters: Vec<Disaster>,
) -> EligibilityService<InMemoryDisasterRepository> {
    EligibilityService::new(repository_with(disasters), EligibilityConfig::default())
        .expect("service builds")
}

pub(super) fn router_with(disasters: Vec<Disaster>) -> axum::Router {
    eligibility_router(Arc::new(build_service(disasters)))
}

pub(super) struct UnavailableRepository;

impl DisasterRepository for UnavailableRepository {
    fn fetch(&self, _id: DisasterId) -> Result<Option<Disaster>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Disaster>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
