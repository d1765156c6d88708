//! Member model and lenient decoding of upstream records
//!
//! Upstream rows carry backend column names (`Country_Code`,
//! `Voyage_Tiers`, ...). Decoding is a 1:1 rename plus type coercion:
//! missing or mistyped fields become empty values, never errors, so one bad
//! row cannot fail a page.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One roster entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub email: String,
    /// Signup date-time, kept as received
    pub timestamp: String,
    pub gender: String,
    pub country_code: String,
    pub country_name: String,
    pub goal: String,
    pub goal_other: String,
    pub source: String,
    pub source_other: String,
    pub solo_project_tier: Option<i64>,
    pub role_type: String,
    pub role: String,
    pub voyages: Vec<String>,
    pub voyage_tiers: Vec<String>,
}

impl Member {
    /// Decode one raw upstream record
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: raw.get("id").and_then(as_int).unwrap_or(0),
            email: text(raw, &["Email"]),
            timestamp: text(raw, &["Timestamp"]),
            gender: text(raw, &["Gender"]),
            country_code: text(raw, &["Country_Code"]),
            country_name: text(raw, &["Country_Name", "Country_name_from_Country"]),
            goal: text(raw, &["Goal"]),
            goal_other: text(raw, &["Goal_Other"]),
            source: text(raw, &["Source"]),
            source_other: text(raw, &["Source_Other"]),
            solo_project_tier: raw.get("Solo_Project_Tier").and_then(parse_tier),
            role_type: text(raw, &["Role_Type"]),
            role: text(raw, &["Role"]),
            voyages: list(raw, &["Voyage_from_Voyage_Signups", "Voyage"]),
            voyage_tiers: list(raw, &["Voyage_Tiers", "Voyage_Tier"]),
        }
    }

    /// Calendar year the member signed up, if the timestamp is readable
    pub fn signup_year(&self) -> Option<i32> {
        parse_year(&self.timestamp)
    }
}

/// Decode a page of raw records, preserving order
pub fn decode_page(rows: &[Value]) -> Vec<Member> {
    rows.iter().map(Member::from_raw).collect()
}

/// Parse a solo-project tier from an integer, numeric string or `"Tier N"` label
pub fn parse_tier(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            let digits = s
                .strip_prefix("Tier")
                .or_else(|| s.strip_prefix("tier"))
                .or_else(|| s.strip_prefix("TIER"))
                .unwrap_or(s)
                .trim();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First present, non-null key wins
fn field<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
}

fn text(raw: &Value, keys: &[&str]) -> String {
    field(raw, keys).and_then(scalar_text).unwrap_or_default()
}

fn list(raw: &Value, keys: &[&str]) -> Vec<String> {
    match field(raw, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other)
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

fn parse_year(timestamp: &str) -> Option<i32> {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.year());
    }

    let naive = ts.trim_end_matches(" UTC").trim_end_matches('Z');
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.year());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        return Some(d.year());
    }

    // Last resort: leading four digits
    let head = ts.get(..4)?;
    if head.bytes().all(|b| b.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}
