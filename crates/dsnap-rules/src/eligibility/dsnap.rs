//! Concrete D-SNAP eligibility rules.

use super::calculator::{CalculatorError, TierTable, TierTableRegistry};
use super::config::EligibilityConfig;
use super::domain::{Application, Disaster, Money};
use super::rules::{And, PredicateRule, Rule, RuleResult, ALLOTMENT_METRIC};

/// The applicant must be the head of household or its authorized representative.
pub struct AuthorizedRule;

impl PredicateRule for AuthorizedRule {
    const NAME: &'static str = "AuthorizedRule";
    const SUCCESS_FINDING: &'static str = "Either head of household or authorized representative";
    const FAILURE_FINDING: &'static str =
        "Neither head of household nor authorized representative";

    fn predicate(&self, application: &Application, _disaster: &Disaster) -> bool {
        application.is_head_of_household || application.is_authorized_representative
    }
}

/// The household must have lost income, lost access to resources, or
/// incurred deductible disaster expenses.
pub struct AdverseEffectRule;

impl AdverseEffectRule {
    /// DSED households never itemize, and food loss only counts when the
    /// disaster allows food loss alone.
    pub fn incurred_deductible_disaster_expenses(
        application: &Application,
        disaster: &Disaster,
    ) -> bool {
        !disaster.uses_dsed
            && application
                .deductible_disaster_expenses(disaster.allows_food_loss_alone)
                .is_positive()
    }
}

impl PredicateRule for AdverseEffectRule {
    const NAME: &'static str = "AdverseEffectRule";
    const SUCCESS_FINDING: &'static str = "Experienced disaster-related adverse effects";
    const FAILURE_FINDING: &'static str = "Did not experience any disaster-related adverse \
        effect, or they experienced only food loss and this disaster does not allow food \
        loss alone";

    fn predicate(&self, application: &Application, disaster: &Disaster) -> bool {
        application.has_lost_or_inaccessible_income
            || application.has_inaccessible_liquid_resources
            || Self::incurred_deductible_disaster_expenses(application, disaster)
    }
}

/// The household must purchase, or plan to purchase, food during the
/// benefit period.
pub struct FoodPurchaseRule;

impl PredicateRule for FoodPurchaseRule {
    const NAME: &'static str = "FoodPurchaseRule";
    const SUCCESS_FINDING: &'static str =
        "Either purchased or plans to purchase food during benefit period";
    const FAILURE_FINDING: &'static str =
        "Neither purchased nor plans to purchase food during benefit period";

    fn predicate(&self, application: &Application, _disaster: &Disaster) -> bool {
        application.purchased_or_plans_to_purchase_food
    }
}

/// Residents of the disaster area qualify. Those who only worked there
/// qualify unless the disaster requires residency.
pub struct DisasterAreaResidencyRule;

impl DisasterAreaResidencyRule {
    pub const NAME: &'static str = "DisasterAreaResidencyRule";
    pub const RESIDED_FINDING: &'static str = "Resided in disaster area at disaster time";
    pub const WORKED_INELIGIBLE_FINDING: &'static str =
        "Worked in disaster area at disaster time but only residents are eligible";
    pub const WORKED_ELIGIBLE_FINDING: &'static str = "Worked in disaster area at disaster \
        time and those who worked are eligible to receive benefits for this disaster";
    pub const FAILURE_FINDING: &'static str =
        "Did not reside or work in disaster area at disaster time";
}

impl Rule for DisasterAreaResidencyRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, application: &Application, disaster: &Disaster) -> RuleResult {
        let (succeeded, text) = if application.resided_in_disaster_area_at_disaster_time {
            (true, Self::RESIDED_FINDING)
        } else if application.worked_in_disaster_area_at_disaster_time {
            if disaster.residency_required {
                (false, Self::WORKED_INELIGIBLE_FINDING)
            } else {
                (true, Self::WORKED_ELIGIBLE_FINDING)
            }
        } else {
            (false, Self::FAILURE_FINDING)
        };

        RuleResult::new(succeeded, vec![self.finding(succeeded, text)])
    }
}

/// The applicant must live in the state or territory that declared the disaster.
pub struct StateResidencyRule;

impl PredicateRule for StateResidencyRule {
    const NAME: &'static str = "StateResidencyRule";
    const SUCCESS_FINDING: &'static str = "Resides in the state or territory of the disaster";
    const FAILURE_FINDING: &'static str =
        "Does not reside in the state or territory of the disaster";

    fn predicate(&self, application: &Application, disaster: &Disaster) -> bool {
        application
            .residence_state
            .trim()
            .eq_ignore_ascii_case(disaster.state.trim())
    }
}

/// Households receiving FDPIR benefits or TEFAP food distribution during the
/// benefit period are served by those programs instead.
pub struct ConflictingUSDAProgramRule;

impl PredicateRule for ConflictingUSDAProgramRule {
    const NAME: &'static str = "ConflictingUSDAProgramRule";
    const SUCCESS_FINDING: &'static str =
        "Does not receive FDPIR benefits or TEFAP food distribution";
    const FAILURE_FINDING: &'static str =
        "Recipients of FDPIR benefits or TEFAP food distribution are not eligible";

    fn predicate(&self, application: &Application, _disaster: &Disaster) -> bool {
        !(application.receives_fdpir_benefits || application.receives_tefap_food_distribution)
    }
}

/// Ongoing SNAP clients receive supplemental benefits through SNAP, not D-SNAP.
pub struct SNAPSupplementalBenefitsRule;

impl PredicateRule for SNAPSupplementalBenefitsRule {
    const NAME: &'static str = "SNAPSupplementalBenefitsRule";
    const SUCCESS_FINDING: &'static str = "Does not receive benefits from SNAP";
    const FAILURE_FINDING: &'static str =
        "SNAP beneficiaries should apply for supplemental benefits through SNAP";

    fn predicate(&self, application: &Application, _disaster: &Disaster) -> bool {
        !application.receives_snap_benefits
    }
}

/// Take-home income plus accessible liquid resources, less deductible
/// disaster expenses, must not exceed the Disaster Gross Income Limit for the
/// household size. Eligible households report their allotment.
pub struct IncomeAndResourceRule {
    table: TierTable,
}

impl IncomeAndResourceRule {
    pub const NAME: &'static str = "IncomeAndResourceRule";

    pub fn new(table: TierTable) -> Self {
        Self { table }
    }

    /// Resolves the governing table up front so evaluation cannot fail.
    pub fn for_disaster(
        tables: &TierTableRegistry,
        disaster: &Disaster,
    ) -> Result<Self, CalculatorError> {
        tables.for_disaster(disaster).cloned().map(Self::new)
    }

    pub fn disaster_gross_income(application: &Application, disaster: &Disaster) -> Money {
        let deduction = if disaster.uses_dsed {
            Money::ZERO
        } else {
            Self::food_loss_adjusted_disaster_expenses(application, disaster)
        };
        application
            .total_take_home_income
            .saturating_add(application.accessible_liquid_resources)
            .saturating_sub(deduction)
    }

    /// Food loss counts on its own only when the disaster allows it; otherwise
    /// it is added on top of an already non-zero non-food expense total.
    pub fn food_loss_adjusted_disaster_expenses(
        application: &Application,
        disaster: &Disaster,
    ) -> Money {
        if disaster.allows_food_loss_alone {
            return application.deductible_disaster_expenses(true);
        }
        match application.deductible_disaster_expenses(false) {
            non_food if non_food.is_positive() => {
                non_food.saturating_add(application.food_loss())
            }
            _ => Money::ZERO,
        }
    }
}

impl Rule for IncomeAndResourceRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, application: &Application, disaster: &Disaster) -> RuleResult {
        let gross_income = Self::disaster_gross_income(application, disaster);
        let (limit, allotment) = self
            .table
            .limit_and_allotment(application.size_of_household);

        if gross_income <= Money::dollars(limit) {
            let text = format!("Disaster Gross Income {gross_income} within limit of {limit}");
            RuleResult::new(true, vec![self.finding(true, text)])
                .with_metric(ALLOTMENT_METRIC, allotment)
        } else {
            let text = format!("Disaster Gross Income {gross_income} exceeds limit of {limit}");
            RuleResult::new(false, vec![self.finding(false, text)])
        }
    }
}

/// Assembles the D-SNAP rule chain for a disaster in reporting order.
pub fn dsnap_rule_set(
    config: &EligibilityConfig,
    tables: &TierTableRegistry,
    disaster: &Disaster,
) -> Result<And, CalculatorError> {
    let mut rules = And::default()
        .with(AuthorizedRule)
        .with(AdverseEffectRule)
        .with(FoodPurchaseRule)
        .with(DisasterAreaResidencyRule);

    if config.state_residency_rule {
        rules = rules.with(StateResidencyRule);
    }
    if config.conflicting_program_rule {
        rules = rules.with(ConflictingUSDAProgramRule);
    }

    Ok(rules
        .with(SNAPSupplementalBenefitsRule)
        .with(IncomeAndResourceRule::for_disaster(tables, disaster)?))
}
