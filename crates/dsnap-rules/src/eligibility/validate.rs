use jsonschema::{JSONSchema, ValidationError};
use serde_json::{json, Value};

use super::domain::Application;

/// JSON schema every application payload must satisfy before rules run.
pub fn application_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "disaster_id": {"type": "integer", "minimum": 0},
            "disaster_expenses": {
                "type": "object",
                "additionalProperties": {"type": "number", "minimum": 0}
            },
            "is_head_of_household": {"type": "boolean"},
            "is_authorized_representative": {"type": "boolean"},
            "has_lost_or_inaccessible_income": {"type": "boolean"},
            "has_inaccessible_liquid_resources": {"type": "boolean"},
            "purchased_or_plans_to_purchase_food": {"type": "boolean"},
            "resided_in_disaster_area_at_disaster_time": {"type": "boolean"},
            "worked_in_disaster_area_at_disaster_time": {"type": "boolean"},
            "total_take_home_income": {"type": "number", "minimum": 0},
            "accessible_liquid_resources": {"type": "number", "minimum": 0},
            "size_of_household": {"type": "integer", "minimum": 1},
            "receives_SNAP_benefits": {"type": "boolean"},
            "receives_FDPIR_benefits": {"type": "boolean"},
            "receives_TEFAP_food_distribution": {"type": "boolean"},
            "residence_state": {"type": "string"}
        },
        "required": [
            "accessible_liquid_resources",
            "disaster_id",
            "has_inaccessible_liquid_resources",
            "has_lost_or_inaccessible_income",
            "is_head_of_household",
            "purchased_or_plans_to_purchase_food",
            "resided_in_disaster_area_at_disaster_time",
            "size_of_household",
            "total_take_home_income",
            "worked_in_disaster_area_at_disaster_time",
            "receives_SNAP_benefits",
            "residence_state"
        ]
    })
}

/// Compiled schema check turning raw payloads into typed applications.
pub struct ApplicationValidator {
    schema: JSONSchema,
}

impl ApplicationValidator {
    pub fn new() -> Result<Self, SchemaError> {
        let schema = application_schema();
        let compiled =
            JSONSchema::compile(&schema).map_err(|err| SchemaError(err.to_string()))?;
        Ok(Self { schema: compiled })
    }

    /// Collects every schema violation rather than stopping at the first.
    pub fn validate(&self, payload: &Value) -> Result<(), InputError> {
        match self.schema.validate(payload) {
            Ok(()) => Ok(()),
            Err(errors) => {
                let errors: Vec<ValidationError> = errors.collect();
                Err(InputError {
                    messages: errors.iter().map(ToString::to_string).collect(),
                })
            }
        }
    }

    pub fn parse(&self, payload: Value) -> Result<Application, InputError> {
        self.validate(&payload)?;
        serde_json::from_value(payload).map_err(|err| InputError {
            messages: vec![err.to_string()],
        })
    }
}

/// The application payload failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid application: {}", .messages.join("; "))]
pub struct InputError {
    pub messages: Vec<String>,
}

/// The built-in schema could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to compile application schema: {0}")]
pub struct SchemaError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::domain::Money;

    fn good_payload() -> Value {
        json!({
            "disaster_id": 42,
            "disaster_expenses": {"food_loss": 0},
            "is_head_of_household": true,
            "has_lost_or_inaccessible_income": false,
            "has_inaccessible_liquid_resources": false,
            "purchased_or_plans_to_purchase_food": true,
            "resided_in_disaster_area_at_disaster_time": true,
            "worked_in_disaster_area_at_disaster_time": false,
            "size_of_household": 2,
            "total_take_home_income": 10,
            "accessible_liquid_resources": 0,
            "receives_SNAP_benefits": false,
            "residence_state": "CA"
        })
    }

    fn validator() -> ApplicationValidator {
        ApplicationValidator::new().expect("schema compiles")
    }

    #[test]
    fn accepts_complete_payload() {
        let application = validator().parse(good_payload()).expect("valid payload");
        assert_eq!(application.size_of_household, 2);
        assert!(!application.is_authorized_representative);
        assert!(!application.receives_fdpir_benefits);
        assert_eq!(application.food_loss(), Money::ZERO);
    }

    #[test]
    fn reports_every_missing_required_field() {
        let err = validator()
            .validate(&json!({
                "is_head_of_household": true,
                "has_lost_or_inaccessible_income": false,
                "residence_state": "CA"
            }))
            .expect_err("payload is incomplete");

        assert_eq!(err.messages.len(), 9);
        for field in [
            "accessible_liquid_resources",
            "disaster_id",
            "has_inaccessible_liquid_resources",
            "purchased_or_plans_to_purchase_food",
            "resided_in_disaster_area_at_disaster_time",
            "size_of_household",
            "total_take_home_income",
            "worked_in_disaster_area_at_disaster_time",
            "receives_SNAP_benefits",
        ] {
            assert!(
                err.messages.iter().any(|message| message.contains(field)),
                "missing message for {field}: {:?}",
                err.messages
            );
        }
    }

    #[test]
    fn rejects_wrong_types_and_negative_amounts() {
        let mut payload = good_payload();
        payload["size_of_household"] = json!("2");
        payload["disaster_expenses"] = json!({"food_loss": -5});

        let err = validator().validate(&payload).expect_err("payload invalid");

        assert_eq!(err.messages.len(), 2);
        assert!(err.messages.iter().any(|message| message.contains("integer")));
    }

    #[test]
    fn rejects_empty_household() {
        let mut payload = good_payload();
        payload["size_of_household"] = json!(0);

        assert!(validator().parse(payload).is_err());
    }

    #[test]
    fn accepts_fractional_dollar_amounts() {
        let mut payload = good_payload();
        payload["total_take_home_income"] = json!(200.5);
        payload["accessible_liquid_resources"] = json!(0.25);
        payload["disaster_expenses"] = json!({"food_loss": 12.75});

        let application = validator().parse(payload).expect("fractional amounts are valid");

        assert_eq!(application.total_take_home_income, Money::from_cents(20050));
        assert_eq!(application.accessible_liquid_resources, Money::from_cents(25));
        assert_eq!(application.food_loss(), Money::from_cents(1275));
    }

    #[test]
    fn rejects_negative_fractional_income() {
        let mut payload = good_payload();
        payload["total_take_home_income"] = json!(-0.5);

        let err = validator().validate(&payload).expect_err("negative income");

        assert_eq!(err.messages.len(), 1);
    }

    #[test]
    fn disaster_expenses_may_be_omitted() {
        let mut payload = good_payload();
        payload
            .as_object_mut()
            .expect("payload is an object")
            .remove("disaster_expenses");

        let application = validator().parse(payload).expect("expenses are optional");

        assert_eq!(application.deductible_disaster_expenses(true), Money::ZERO);
    }
}
