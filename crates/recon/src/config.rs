//! Reconciliation policy: the registry dictionaries and substitution
//! defaults, loadable from TOML.
//!
//! The policy is immutable configuration handed to the pipeline; nothing
//! here is process-wide state.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ReconError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconPolicy {
    /// Response codes denoting a negative/empty registry answer, with the
    /// reason text used in the diagnostics report. Any row carrying one of
    /// these dooms every row of that taxpayer.
    pub failure_responses: Vec<FailureResponse>,
    /// Response code substituted for a null g4s before filtering.
    pub default_response: i64,
    /// Quarter substituted where g11 is null. Annual and aggregate
    /// declarations carry no natural quarter.
    pub default_quarter: i64,
    /// Income-type code substituted for a null g10 ("other income").
    pub other_income_code: i64,
    /// Employer-name placeholder for rows missing g7s.
    pub missing_employer_name: String,
    /// Employer name written onto single-tax (sole proprietor) rows.
    pub own_business_label: String,
    /// Income-type code → display label, consumed by exports.
    pub income_type_labels: Vec<IncomeTypeLabel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailureResponse {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomeTypeLabel {
    pub code: i64,
    pub label: String,
}

impl Default for ReconPolicy {
    fn default() -> Self {
        fn failure(code: i64, message: &str) -> FailureResponse {
            FailureResponse {
                code,
                message: message.to_string(),
            }
        }
        fn label(code: i64, label: &str) -> IncomeTypeLabel {
            IncomeTypeLabel {
                code,
                label: label.to_string(),
            }
        }
        ReconPolicy {
            failure_responses: vec![
                failure(2, "person not found in registry"),
                failure(3, "no income records for the requested period"),
                failure(5, "request refused by the registry"),
            ],
            default_response: 10,
            default_quarter: 4,
            other_income_code: 14,
            missing_employer_name: "not specified".to_string(),
            own_business_label: "OWN BUSINESS ACTIVITY INCOME".to_string(),
            income_type_labels: vec![
                label(14, "other income"),
                label(101, "salary"),
                label(102, "civil-law contract payment"),
                label(126, "additional benefit"),
                label(512, "own business-activity income"),
            ],
        }
    }
}

impl ReconPolicy {
    pub fn from_toml(text: &str) -> Result<Self, ReconError> {
        toml::from_str(text).map_err(|e| ReconError::PolicyParse(e.to_string()))
    }

    pub fn is_failure(&self, code: i64) -> bool {
        self.failure_responses.iter().any(|r| r.code == code)
    }

    pub fn failure_message(&self, code: i64) -> Option<&str> {
        self.failure_responses
            .iter()
            .find(|r| r.code == code)
            .map(|r| r.message.as_str())
    }

    pub fn income_type_label(&self, code: i64) -> Option<&str> {
        self.income_type_labels
            .iter()
            .find(|l| l.code == code)
            .map(|l| l.label.as_str())
    }

    /// Label lookup table in the shape exports consume.
    pub fn label_map(&self) -> BTreeMap<i64, String> {
        self.income_type_labels
            .iter()
            .map(|l| (l.code, l.label.clone()))
            .collect()
    }
}
