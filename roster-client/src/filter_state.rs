//! Filter State
//!
//! The active search predicate. Every field starts empty; "empty" means the
//! field does not constrain results. A predicate with every field empty must
//! send the user back to the search form instead of showing results.

use roster_common::config::CountryField;
use roster_common::events::{DirectoryEvent, EventBus};
use roster_common::options::CountryTable;
use roster_common::query::{Attribute, FilterBody};
use roster_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub gender: String,
    pub country_code: String,
    pub role: String,
    pub solo_project_tier: Option<i64>,
    pub voyage: String,
    pub voyage_tier: String,
    /// Four-digit year or empty
    pub year_joined: String,
}

impl FilterPredicate {
    /// True when no field constrains results
    pub fn is_empty(&self) -> bool {
        [
            &self.gender,
            &self.country_code,
            &self.role,
            &self.voyage,
            &self.voyage_tier,
            &self.year_joined,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
            && self.solo_project_tier.is_none()
    }
}

/// Injectable filter store
///
/// Mutations publish [`DirectoryEvent::FilterChanged`] before returning.
#[derive(Debug, Default)]
pub struct FilterState {
    predicate: FilterPredicate,
    events: EventBus,
}

impl FilterState {
    pub fn new(events: EventBus) -> Self {
        Self {
            predicate: FilterPredicate::default(),
            events,
        }
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    pub fn has_active_filters(&self) -> bool {
        !self.predicate.is_empty()
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) {
        self.predicate.gender = gender.into();
        self.notify();
    }

    pub fn set_country_code(&mut self, country_code: impl Into<String>) {
        self.predicate.country_code = country_code.into();
        self.notify();
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.predicate.role = role.into();
        self.notify();
    }

    pub fn set_solo_project_tier(&mut self, tier: Option<i64>) {
        self.predicate.solo_project_tier = tier;
        self.notify();
    }

    pub fn set_voyage(&mut self, voyage: impl Into<String>) {
        self.predicate.voyage = voyage.into();
        self.notify();
    }

    pub fn set_voyage_tier(&mut self, voyage_tier: impl Into<String>) {
        self.predicate.voyage_tier = voyage_tier.into();
        self.notify();
    }

    /// Set the year filter; anything but empty or up to four digits is rejected
    pub fn set_year_joined(&mut self, year: &str) -> Result<()> {
        let year = year.trim();
        if !year.is_empty() && (year.len() > 4 || !year.bytes().all(|b| b.is_ascii_digit())) {
            return Err(Error::InvalidInput(format!(
                "year joined must be numeric, got '{}'",
                year
            )));
        }
        self.predicate.year_joined = year.to_string();
        self.notify();
        Ok(())
    }

    /// Restore every field to empty
    pub fn reset_filters(&mut self) {
        self.predicate = FilterPredicate::default();
        self.notify();
    }

    fn notify(&self) {
        let has_active_filters = self.has_active_filters();
        debug!(has_active_filters, "Filter changed");
        self.events
            .emit_lossy(DirectoryEvent::FilterChanged { has_active_filters });
    }
}

/// Translate a predicate into the upstream include map.
///
/// Only gender, country, role and solo-project tier are filtered server-side;
/// voyage, voyage tier and year are matched on the client. With
/// `CountryField::Name` the country is sent as its ISO code when the
/// bundled table knows the name, otherwise as `Country_Name`.
pub fn build_filters(predicate: &FilterPredicate, country_field: CountryField) -> FilterBody {
    let mut body = FilterBody::new();

    let gender = predicate.gender.trim();
    if !gender.is_empty() {
        body = body.include(Attribute::Gender, gender.to_uppercase());
    }

    let country = predicate.country_code.trim();
    if !country.is_empty() {
        body = match country_field {
            CountryField::Code => body.include(Attribute::CountryCode, country),
            CountryField::Name => match CountryTable::bundled().find_by_name(country) {
                Some(found) => body.include(Attribute::CountryCode, found.code.clone()),
                None => body.include(Attribute::CountryName, country),
            },
        };
    }

    let role = predicate.role.trim();
    if !role.is_empty() {
        body = body.include(Attribute::Role, role);
    }

    if let Some(tier) = predicate.solo_project_tier {
        body = body.include(Attribute::SoloProjectTier, tier);
    }

    debug!(
        columns = ?body.include.keys().map(Attribute::as_str).collect::<Vec<_>>(),
        "Upstream filter built"
    );
    body
}
