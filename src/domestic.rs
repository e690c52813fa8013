//! Domestic (US) location resolution.
//!
//! The first stage of the location cascade: pin a mention to a US state
//! where possible, so only the remainder reaches the international
//! resolver. State knowledge sits behind the [`StateGazetteer`] trait so
//! tests can substitute fixtures; [`StateTable`] is the built-in
//! implementation backed by constant tables.

use crate::locations::LocationEntity;
use crate::span::{EntityKind, EntitySpan};

/// State lookups needed by the domestic resolver.
pub trait StateGazetteer {
    /// Two-letter code for a US state or district name.
    fn state_for(&self, name: &str) -> Option<String>;

    /// Two-letter state code for a well-known US city name.
    fn city_for(&self, city: &str) -> Option<String>;
}

/// The 50 US states plus the District of Columbia.
const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Major US cities whose names alone imply a state in interview speech.
const MAJOR_CITIES: &[(&str, &str)] = &[
    ("Atlanta", "GA"),
    ("Baltimore", "MD"),
    ("Boston", "MA"),
    ("Buffalo", "NY"),
    ("Chicago", "IL"),
    ("Cleveland", "OH"),
    ("Dallas", "TX"),
    ("Denver", "CO"),
    ("Detroit", "MI"),
    ("Houston", "TX"),
    ("Los Angeles", "CA"),
    ("Memphis", "TN"),
    ("Miami", "FL"),
    ("Milwaukee", "WI"),
    ("Minneapolis", "MN"),
    ("Nashville", "TN"),
    ("New Orleans", "LA"),
    ("New York City", "NY"),
    ("Oakland", "CA"),
    ("Philadelphia", "PA"),
    ("Phoenix", "AZ"),
    ("Pittsburgh", "PA"),
    ("San Francisco", "CA"),
    ("Seattle", "WA"),
    ("St. Louis", "MO"),
];

/// Two-letter code for a US state name, case-insensitively.
///
/// Also used by the gazetteer loader to keep US-state-named places out of
/// the international place table.
#[must_use]
pub fn state_code(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    US_STATES
        .iter()
        .find(|(state, _)| state.eq_ignore_ascii_case(wanted))
        .map(|&(_, code)| code)
}

/// Constant-table implementation of [`StateGazetteer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StateTable;

impl StateGazetteer for StateTable {
    fn state_for(&self, name: &str) -> Option<String> {
        state_code(name).map(str::to_string)
    }

    fn city_for(&self, city: &str) -> Option<String> {
        let wanted = city.trim();
        MAJOR_CITIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|&(_, code)| code.to_string())
    }
}

/// Resolve location spans against US state knowledge.
///
/// Returns `(resolved, unresolved)`. A mention resolves domestically when
/// its text is a state name (+1 confidence), its bracket context names a
/// state (`Buffalo [New York]`, +2), or its text is a well-known US city
/// (+2). Everything else passes through untouched for the international
/// resolver.
#[must_use]
pub fn resolve_domestic(
    spans: &[EntitySpan],
    states: &dyn StateGazetteer,
) -> (Vec<LocationEntity>, Vec<LocationEntity>) {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for span in spans {
        if span.kind != EntityKind::Location {
            continue;
        }
        let mut loc = LocationEntity::from_span(span);

        if let Some(code) = states.state_for(&loc.text) {
            loc.state = Some(code);
            loc.confidence += 1;
            resolved.push(loc);
            continue;
        }
        if let Some(code) = bracket_context(&loc.contextualized_text)
            .and_then(|ctx| states.state_for(ctx))
        {
            loc.state = Some(code);
            loc.confidence += 2;
            resolved.push(loc);
            continue;
        }
        if let Some(code) = states.city_for(&loc.text) {
            loc.state = Some(code);
            loc.confidence += 2;
            resolved.push(loc);
            continue;
        }
        unresolved.push(loc);
    }

    (resolved, unresolved)
}

/// The content of a trailing bracketed fragment, if any.
pub(crate) fn bracket_context(contextualized: &str) -> Option<&str> {
    let open = contextualized.find('[')?;
    let close = contextualized[open..].find(']')? + open;
    Some(contextualized[open + 1..close].trim())
}
