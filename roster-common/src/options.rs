//! Search form option lists and the bundled country table

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

pub const GENDERS: &[&str] = &[
    "Male",
    "Female",
    "Non-Binary",
    "Transgender",
    "Prefer Not To Say",
];

pub const ROLES: &[&str] = &[
    "Data Scientist",
    "Product Owner",
    "Python Developer",
    "Scrum Master",
    "Web Developer",
    "UI/UX Designer",
];

pub const SOLO_PROJECT_TIERS: &[i64] = &[1, 2, 3];

pub const VOYAGE_TIERS: &[&str] = &["Tier 1", "Tier 2", "Tier 3"];

/// Everything a search form offers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOptions {
    pub genders: Vec<String>,
    pub roles: Vec<String>,
    pub solo_project_tiers: Vec<i64>,
    pub voyage_tiers: Vec<String>,
    /// `(code, name)` pairs sorted by name
    pub countries: Vec<(String, String)>,
}

impl SearchOptions {
    /// Fixed lists plus the country codes the upstream reports
    pub fn with_countries(codes: &[Option<String>]) -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            genders: owned(GENDERS),
            roles: owned(ROLES),
            solo_project_tiers: SOLO_PROJECT_TIERS.to_vec(),
            voyage_tiers: owned(VOYAGE_TIERS),
            countries: CountryTable::bundled().sorted_options(codes),
        }
    }
}

const BUNDLED_COUNTRIES: &str = include_str!("../data/countries.json");

/// One country with its display name and centroid
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Country {
    #[serde(rename = "country")]
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Code → country lookup (codes are stored upper-case)
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    by_code: HashMap<String, Country>,
}

impl CountryTable {
    /// Parse a JSON array of `{country, name, latitude, longitude}`
    pub fn from_json(json: &str) -> Result<Self> {
        let countries: Vec<Country> = serde_json::from_str(json)
            .map_err(|e| Error::Decode(format!("country table: {}", e)))?;

        let by_code = countries
            .into_iter()
            .map(|c| (c.code.to_ascii_uppercase(), c))
            .collect();

        Ok(Self { by_code })
    }

    /// Table shipped with the crate
    pub fn bundled() -> &'static CountryTable {
        static TABLE: Lazy<CountryTable> = Lazy::new(|| {
            CountryTable::from_json(BUNDLED_COUNTRIES).unwrap_or_else(|e| {
                warn!("Bundled country table unreadable, map markers disabled: {}", e);
                CountryTable::default()
            })
        });
        &TABLE
    }

    pub fn get(&self, code: &str) -> Option<&Country> {
        self.by_code.get(&code.trim().to_ascii_uppercase())
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&Country> {
        let name = name.trim();
        self.by_code.values().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Search form options for the codes the upstream reports.
    ///
    /// Null/unknown codes are dropped; the rest are sorted by display name.
    pub fn sorted_options(&self, codes: &[Option<String>]) -> Vec<(String, String)> {
        let mut options: Vec<(String, String)> = codes
            .iter()
            .flatten()
            .filter_map(|code| self.get(code).map(|c| (c.code.clone(), c.name.clone())))
            .collect();
        options.sort_by(|a, b| a.1.cmp(&b.1));
        options.dedup();
        options
    }
}

/// Display name for an ISO code, empty when unknown
pub fn country_name(code: &str) -> String {
    CountryTable::bundled()
        .get(code)
        .map(|c| c.name.clone())
        .unwrap_or_default()
}
