//! Evaluation report contract.
//!
//! The second model call must come back as a flat JSON object with exactly
//! the five keys below, each holding a string. The contract is expressed as
//! data (`ObjectSchema`) and checked against the parsed `serde_json::Value`
//! before the value is turned into an `EvaluationReport`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const UNDERSTANDING_KEY: &str = "Can the child understand the scenario?";
pub const OBJECT_COUNT_KEY: &str = "Is the object count accurate and relevant?";
pub const POSITIONING_KEY: &str = "Can the object be positioned correctly?";
pub const ACCURACY_KEY: &str = "How far is it accurate?";
pub const ASD_FEEDBACK_KEY: &str = "ASD-related feedback";

/// Report keys in the order they are requested from the model.
pub const REPORT_KEYS: [&str; 5] = [
    UNDERSTANDING_KEY,
    OBJECT_COUNT_KEY,
    POSITIONING_KEY,
    ACCURACY_KEY,
    ASD_FEEDBACK_KEY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
}

impl ValueKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("'{0}' is a required property")]
    MissingKey(String),

    #[error("additional property '{0}' is not allowed")]
    UnexpectedKey(String),

    #[error("property '{key}' must be a {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Shape of a flat JSON object: typed properties, which of them are
/// required, and whether keys outside `properties` are tolerated.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub properties: &'static [(&'static str, ValueKind)],
    pub required: &'static [&'static str],
    pub additional_properties: bool,
}

impl ObjectSchema {
    fn property(&self, key: &str) -> Option<ValueKind> {
        self.properties
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    /// Checks `value` against the schema, reporting the first violation.
    /// Missing keys are reported before unexpected keys and type mismatches.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaViolation::NotAnObject(json_type_name(value)))?;

        for key in self.required {
            if !obj.contains_key(*key) {
                return Err(SchemaViolation::MissingKey((*key).to_string()));
            }
        }

        for (key, val) in obj {
            match self.property(key) {
                Some(kind) if !kind.matches(val) => {
                    return Err(SchemaViolation::WrongType {
                        key: key.clone(),
                        expected: kind.name(),
                        found: json_type_name(val),
                    });
                }
                Some(_) => {}
                None if !self.additional_properties => {
                    return Err(SchemaViolation::UnexpectedKey(key.clone()));
                }
                None => {}
            }
        }

        Ok(())
    }
}

pub const EVALUATION_SCHEMA: ObjectSchema = ObjectSchema {
    properties: &[
        (UNDERSTANDING_KEY, ValueKind::String),
        (OBJECT_COUNT_KEY, ValueKind::String),
        (POSITIONING_KEY, ValueKind::String),
        (ACCURACY_KEY, ValueKind::String),
        (ASD_FEEDBACK_KEY, ValueKind::String),
    ],
    required: &REPORT_KEYS,
    additional_properties: false,
};

/// A validated evaluation. Serializes back to the exact five-key object the
/// model returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationReport {
    #[serde(rename = "Can the child understand the scenario?")]
    pub understanding: String,
    #[serde(rename = "Is the object count accurate and relevant?")]
    pub object_count: String,
    #[serde(rename = "Can the object be positioned correctly?")]
    pub positioning: String,
    #[serde(rename = "How far is it accurate?")]
    pub accuracy: String,
    #[serde(rename = "ASD-related feedback")]
    pub asd_feedback: String,
}

impl EvaluationReport {
    /// Validates `value` against `EVALUATION_SCHEMA` and converts it.
    pub fn from_value(value: Value) -> crate::error::AppResult<Self> {
        EVALUATION_SCHEMA.validate(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "Can the child understand the scenario?": "Yes",
            "Is the object count accurate and relevant?": "Mostly, one bird is missing",
            "Can the object be positioned correctly?": "Yes",
            "How far is it accurate?": "85%",
            "ASD-related feedback": "Strong attention to detail"
        })
    }

    #[test]
    fn test_valid_object_passes() {
        assert_eq!(EVALUATION_SCHEMA.validate(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_key_is_named() {
        let mut v = valid();
        v.as_object_mut().unwrap().remove(ASD_FEEDBACK_KEY);
        assert_eq!(
            EVALUATION_SCHEMA.validate(&v),
            Err(SchemaViolation::MissingKey(ASD_FEEDBACK_KEY.to_string()))
        );
    }

    #[test]
    fn test_extra_key_rejected() {
        let mut v = valid();
        v["Overall score"] = json!("9/10");
        assert_eq!(
            EVALUATION_SCHEMA.validate(&v),
            Err(SchemaViolation::UnexpectedKey("Overall score".to_string()))
        );
    }

    #[test]
    fn test_non_string_value_rejected() {
        let mut v = valid();
        v[ACCURACY_KEY] = json!(85);
        assert_eq!(
            EVALUATION_SCHEMA.validate(&v),
            Err(SchemaViolation::WrongType {
                key: ACCURACY_KEY.to_string(),
                expected: "string",
                found: "number",
            })
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            EVALUATION_SCHEMA.validate(&json!(["Yes"])),
            Err(SchemaViolation::NotAnObject("array"))
        );
    }

    #[test]
    fn test_report_round_trips_unchanged() {
        let report = EvaluationReport::from_value(valid()).unwrap();
        assert_eq!(report.accuracy, "85%");
        assert_eq!(serde_json::to_value(&report).unwrap(), valid());
    }

    #[test]
    fn test_from_value_surfaces_violation() {
        let err = EvaluationReport::from_value(json!({})).unwrap_err();
        assert!(matches!(err, AppError::Validation(SchemaViolation::MissingKey(_))));
        assert!(err.to_string().contains(UNDERSTANDING_KEY));
    }

    #[test]
    fn test_serialized_keys_follow_report_order() {
        let report = EvaluationReport::from_value(valid()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let positions: Vec<_> = REPORT_KEYS.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
