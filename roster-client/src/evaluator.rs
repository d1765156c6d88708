//! Filter Predicate Evaluator
//!
//! Pure matching of members against a [`FilterPredicate`]. Every non-empty
//! field must match (AND); there is no OR mode and no scoring. Output keeps
//! input order.

use roster_common::config::CountryField;
use roster_common::options::country_name;
use roster_common::Member;

use crate::filter_state::FilterPredicate;

/// Matching knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorOptions {
    pub country_field: CountryField,
}

/// Members of `members` that satisfy `predicate`, in order
pub fn evaluate(members: &[Member], predicate: &FilterPredicate, options: &EvaluatorOptions) -> Vec<Member> {
    members
        .iter()
        .filter(|m| matches(m, predicate, options))
        .cloned()
        .collect()
}

/// Whether one member satisfies every active predicate field
pub fn matches(member: &Member, predicate: &FilterPredicate, options: &EvaluatorOptions) -> bool {
    let gender = predicate.gender.trim();
    if !gender.is_empty() && !member.gender.trim().eq_ignore_ascii_case(gender) {
        return false;
    }

    let country = predicate.country_code.trim();
    if !country.is_empty() {
        let matched = match options.country_field {
            CountryField::Code => member.country_code.trim().eq_ignore_ascii_case(country),
            CountryField::Name => {
                let name = member.country_name.trim();
                if name.is_empty() {
                    country_name(&member.country_code).eq_ignore_ascii_case(country)
                } else {
                    name.eq_ignore_ascii_case(country)
                }
            }
        };
        if !matched {
            return false;
        }
    }

    let role = predicate.role.trim();
    if !role.is_empty() && !role_matches(&member.role, role) {
        return false;
    }

    if let Some(tier) = predicate.solo_project_tier {
        if member.solo_project_tier != Some(tier) {
            return false;
        }
    }

    let voyage = predicate.voyage.trim();
    if !voyage.is_empty() && !member.voyages.iter().any(|v| v.trim().eq_ignore_ascii_case(voyage)) {
        return false;
    }

    let voyage_tier = predicate.voyage_tier.trim();
    if !voyage_tier.is_empty() && !member.voyage_tiers.iter().any(|t| t.trim() == voyage_tier) {
        return false;
    }

    let year = predicate.year_joined.trim();
    if !year.is_empty() {
        match member.signup_year() {
            Some(y) if format!("{:04}", y) == year => {}
            _ => return false,
        }
    }

    true
}

/// Case-insensitive containment in either direction.
///
/// An empty member role never matches: it would be "contained" in anything.
fn role_matches(member_role: &str, wanted: &str) -> bool {
    let member_role = member_role.trim().to_lowercase();
    if member_role.is_empty() {
        return false;
    }
    let wanted = wanted.to_lowercase();
    member_role.contains(&wanted) || wanted.contains(&member_role)
}
