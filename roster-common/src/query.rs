//! Request/response shapes of the upstream member API
//!
//! The filtered-table endpoint takes `offset`/`limit` as query parameters
//! and an include/exclude body keyed by backend column name. Values are OR'd
//! within a column and AND'd across columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend column names accepted in filter bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "Country_Code")]
    CountryCode,
    #[serde(rename = "Country_Name")]
    CountryName,
    #[serde(rename = "Timezone")]
    Timezone,
    #[serde(rename = "GMT_Offset")]
    GmtOffset,
    #[serde(rename = "Goal")]
    Goal,
    #[serde(rename = "Source")]
    Source,
    #[serde(rename = "Solo_Project_Tier")]
    SoloProjectTier,
    #[serde(rename = "Role")]
    Role,
    #[serde(rename = "Voyage_Signup_ids")]
    VoyageSignupIds,
    #[serde(rename = "Voyage_Tiers")]
    VoyageTiers,
}

impl Attribute {
    /// Column name as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Gender => "Gender",
            Attribute::CountryCode => "Country_Code",
            Attribute::CountryName => "Country_Name",
            Attribute::Timezone => "Timezone",
            Attribute::GmtOffset => "GMT_Offset",
            Attribute::Goal => "Goal",
            Attribute::Source => "Source",
            Attribute::SoloProjectTier => "Solo_Project_Tier",
            Attribute::Role => "Role",
            Attribute::VoyageSignupIds => "Voyage_Signup_ids",
            Attribute::VoyageTiers => "Voyage_Tiers",
        }
    }
}

/// One accepted value; the backend types integer columns as INT64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

/// Include/exclude filter body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterBody {
    #[serde(default)]
    pub include: BTreeMap<Attribute, Vec<FilterValue>>,
    #[serde(default)]
    pub exclude: BTreeMap<Attribute, Vec<FilterValue>>,
}

impl FilterBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted value for `attribute`
    pub fn include(mut self, attribute: Attribute, value: impl Into<FilterValue>) -> Self {
        self.include.entry(attribute).or_default().push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Pagination window sent as query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Filtered-table reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteredTableResponse {
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub response_schema: Vec<String>,
    #[serde(default)]
    pub response: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_body_wire_shape() {
        let body = FilterBody::new()
            .include(Attribute::Gender, "FEMALE")
            .include(Attribute::SoloProjectTier, 2)
            .include(Attribute::Gender, "NON-BINARY");

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "include": {
                    "Gender": ["FEMALE", "NON-BINARY"],
                    "Solo_Project_Tier": [2],
                },
                "exclude": {},
            })
        );
    }

    #[test]
    fn test_response_tolerates_missing_metadata() {
        let resp: FilteredTableResponse =
            serde_json::from_value(json!({"response": [{"id": 1}]})).unwrap();
        assert_eq!(resp.row_count, 0);
        assert_eq!(resp.response.len(), 1);
    }

    #[test]
    fn test_attribute_names_match_serde() {
        for attr in [Attribute::CountryCode, Attribute::VoyageTiers, Attribute::GmtOffset] {
            let v = serde_json::to_value(attr).unwrap();
            assert_eq!(v, json!(attr.as_str()));
        }
    }
}
