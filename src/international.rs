//! International location resolution.
//!
//! Runs after the domestic pass, over the mentions no US state claimed.
//! Each mention goes through a cascade of progressively weaker evidence:
//!
//! 1. a comma-qualified text (`Toronto, Canada`) whose right side names a
//!    country;
//! 2. a bracket context naming a country (`Kingston [Jamaica]`);
//! 3. a comma-qualified *context* whose right side names a country;
//! 4. an adjacent mention a few characters downstream whose text is a bare
//!    country name — the pair resolves together and the country mention is
//!    absorbed;
//! 5. the bare name alone: a default-country hint (`Montreal`), or the name
//!    itself being a country.
//!
//! Place-level resolution earns +2 confidence, country-only +1. Generic
//! street-and-landscape names (`Jamaica Avenue`) are recognized up front
//! and never resolved — the speaker means a street, not the country.
//!
//! The cascade is computed in two phases: all outcomes are decided against
//! the immutable input list first, then the output list is built, so an
//! absorption at position `i+1` can never affect how position `i+1` itself
//! was judged.

use crate::domestic::bracket_context;
use crate::gazetteer::Gazetteer;
use crate::locations::LocationEntity;

/// How close (in characters) a bare country mention must follow a place
/// mention for the two to resolve together.
pub const ADJACENCY_EPSILON: usize = 4;

/// A place mentioned more than this many times gets a one-time +1 boost.
pub const MENTION_BOOST_THRESHOLD: u32 = 3;

/// Final words that mark a name as a street or landscape feature rather
/// than a settlement.
const GENERIC_SUFFIXES: &[&str] = &[
    "avenue", "ave", "street", "st", "boulevard", "blvd", "road", "rd", "lane", "ln", "lake",
    "river",
];

/// Leading phrases stripped from place candidates before lookup.
const STRIP_PREFIXES: &[&str] = &["the capital city of ", "the city of ", "city of ", "sic "];

/// Decision for one mention, computed in phase 1 of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// No tier produced evidence; the mention passes through untouched.
    Unresolved,
    /// Resolved to a country, and possibly to a place within it.
    Resolved {
        place_id: u32,
        country_code: u32,
        boost: u32,
    },
    /// A bare country mention absorbed by the adjacent place before it.
    Absorbed,
}

/// Resolve the leftover mentions against the world gazetteer.
///
/// Returns the aggregated place-level and country-level entities; mentions
/// no tier could resolve are dropped. See the module docs for the cascade.
#[must_use]
pub fn resolve_international(entities: &[LocationEntity], gaz: &Gazetteer) -> Vec<LocationEntity> {
    let mut outcomes = vec![Outcome::Unresolved; entities.len()];

    for i in 0..entities.len() {
        if outcomes[i] == Outcome::Absorbed {
            continue;
        }
        let entity = &entities[i];
        if is_general_location(&entity.text) {
            log::debug!("leaving generic name {:?} unresolved", entity.text);
            continue;
        }

        if let Some(outcome) = comma_split_resolution(&entity.text, gaz) {
            outcomes[i] = outcome;
            continue;
        }
        if let Some(outcome) = bracket_country_resolution(entity, gaz) {
            outcomes[i] = outcome;
            continue;
        }
        if let Some(outcome) = context_comma_resolution(entity, gaz) {
            outcomes[i] = outcome;
            continue;
        }
        if let Some((outcome, absorbed)) = adjacency_resolution(entities, i, &outcomes, gaz) {
            outcomes[i] = outcome;
            outcomes[absorbed] = Outcome::Absorbed;
            continue;
        }
        if let Some(outcome) = solo_resolution(&entity.text, gaz) {
            outcomes[i] = outcome;
        }
    }

    let mut resolved = Vec::with_capacity(entities.len());
    for (entity, outcome) in entities.iter().zip(&outcomes) {
        match *outcome {
            Outcome::Absorbed => {}
            Outcome::Unresolved => resolved.push(entity.clone()),
            Outcome::Resolved { place_id, country_code, boost } => {
                let mut entity = entity.clone();
                entity.place_id = place_id;
                entity.country_code = country_code;
                entity.confidence += boost;
                resolved.push(entity);
            }
        }
    }

    propagate_story_matches(&mut resolved);
    aggregate(resolved)
}

/// Tier 1: `Place, Country` inside the mention text itself.
fn comma_split_resolution(text: &str, gaz: &Gazetteer) -> Option<Outcome> {
    let (place_part, country_part) = text.split_once(',')?;
    let country_code = gaz.country_code(&proper_name_for_place(country_part, gaz))?;
    Some(place_outcome(&proper_name_for_place(place_part, gaz), country_code, gaz))
}

/// Tier 2: a bracket context naming a country (`Kingston [Jamaica]`).
fn bracket_country_resolution(entity: &LocationEntity, gaz: &Gazetteer) -> Option<Outcome> {
    let ctx = bracket_context(&entity.contextualized_text)?;
    let country_code = gaz.country_code(&proper_name_for_place(ctx, gaz))?;
    Some(place_outcome(
        &proper_name_for_place(&entity.text, gaz),
        country_code,
        gaz,
    ))
}

/// Tier 3: `..., Country` at the end of the context, with the mention text
/// as the place candidate.
fn context_comma_resolution(entity: &LocationEntity, gaz: &Gazetteer) -> Option<Outcome> {
    let (_, country_part) = entity.contextualized_text.rsplit_once(',')?;
    let country_code = gaz.country_code(&proper_name_for_place(country_part, gaz))?;
    Some(place_outcome(
        &proper_name_for_place(&entity.text, gaz),
        country_code,
        gaz,
    ))
}

/// Tier 4: a bare country mention within [`ADJACENCY_EPSILON`] characters
/// downstream (`Toronto` then `Canada` as two separate spans).
fn adjacency_resolution(
    entities: &[LocationEntity],
    i: usize,
    outcomes: &[Outcome],
    gaz: &Gazetteer,
) -> Option<(Outcome, usize)> {
    let entity = &entities[i];
    let next = i + 1;
    if next >= entities.len() || outcomes[next] == Outcome::Absorbed {
        return None;
    }
    let follower = &entities[next];
    if follower.start < entity.end() || follower.start - entity.end() > ADJACENCY_EPSILON {
        return None;
    }
    let country_code = gaz.country_code(&proper_name_for_place(&follower.text, gaz))?;
    let outcome = place_outcome(&proper_name_for_place(&entity.text, gaz), country_code, gaz);
    Some((outcome, next))
}

/// Tier 5: the bare name alone — a default-country hint, or a country name.
fn solo_resolution(text: &str, gaz: &Gazetteer) -> Option<Outcome> {
    let name = proper_name_for_place(text, gaz);
    if let Some(hint) = gaz.city_hint(&name) {
        return Some(Outcome::Resolved {
            place_id: hint.place_id,
            country_code: hint.country_code,
            boost: 2,
        });
    }
    gaz.country_code(&name).map(|country_code| Outcome::Resolved {
        place_id: 0,
        country_code,
        boost: 1,
    })
}

/// A resolution within a known country: place-level when the world list
/// confirms the place there (+2), country-only otherwise (+1).
fn place_outcome(place_name: &str, country_code: u32, gaz: &Gazetteer) -> Outcome {
    match gaz.place_in_country(place_name, country_code) {
        Some(place_id) => Outcome::Resolved { place_id, country_code, boost: 2 },
        None => Outcome::Resolved { place_id: 0, country_code, boost: 1 },
    }
}

/// Whether a name's final word marks it as a street or landscape feature
/// (`Jamaica Avenue`, `Powder River`) rather than a settlement.
#[must_use]
pub fn is_general_location(name: &str) -> bool {
    let last = match name.split_whitespace().next_back() {
        Some(w) => w,
        None => return false,
    };
    let word = last
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();
    GENERIC_SUFFIXES.contains(&word.as_str())
}

/// Clean a raw mention into a gazetteer lookup candidate.
///
/// Strips leading editorial phrases (`the city of `, `sic `), collapses a
/// self-confirming context (`Dakar [Dakar]` becomes `Dakar`), truncates at
/// leftover bracket or clause punctuation, and normalizes a `St. ` prefix
/// to `Saint ` when the gazetteer knows the Saint form.
#[must_use]
pub fn proper_name_for_place(raw: &str, gaz: &Gazetteer) -> String {
    let mut name = raw.trim();

    for prefix in STRIP_PREFIXES {
        if let Some(rest) = strip_prefix_ci(name, prefix) {
            name = rest.trim_start();
        }
    }

    // "X [X]" is an editor confirming the name, not a qualifier.
    if let Some(ctx) = bracket_context(name) {
        let before = name[..name.find('[').unwrap_or(name.len())].trim();
        if ctx.eq_ignore_ascii_case(before) {
            name = before;
        }
    }

    // Truncate at any leftover bracket or clause punctuation.
    if let Some(cut) = name.find(['[', ']', ':', ';', ',']) {
        name = name[..cut].trim_end();
    }
    let name = name.trim();

    if let Some(rest) = strip_prefix_ci(name, "st. ") {
        let saint = format!("Saint {}", rest);
        if !gaz.places(&saint).is_empty() || gaz.city_hint(&saint).is_some() {
            return saint;
        }
    }

    name.to_string()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Copy resolutions across identical mention texts within one story.
///
/// A speaker who says `Paris, France` once and plain `Paris` three times
/// means the same place every time. Place-level donors are preferred over
/// country-only ones.
pub fn propagate_story_matches(entities: &mut [LocationEntity]) {
    let donors: Vec<(String, u32, u32, u32)> = entities
        .iter()
        .filter(|e| e.country_code != 0)
        .map(|e| (e.text.to_lowercase(), e.place_id, e.country_code, e.confidence))
        .collect();

    for entity in entities.iter_mut() {
        if entity.country_code != 0 {
            continue;
        }
        let key = entity.text.to_lowercase();
        let best = donors
            .iter()
            .filter(|(text, ..)| *text == key)
            .max_by_key(|&&(_, place_id, _, confidence)| (place_id != 0, confidence));
        if let Some(&(_, place_id, country_code, confidence)) = best {
            entity.place_id = place_id;
            entity.country_code = country_code;
            entity.confidence = confidence;
        }
    }
}

/// Collapse resolved mentions into one entity per `(country, place)`.
///
/// Counts sum, confidence is the max across mentions, and a place mentioned
/// more than [`MENTION_BOOST_THRESHOLD`] times gets a one-time +1.
/// Unresolved leftovers are dropped. First-mention order is preserved.
#[must_use]
pub fn aggregate(entities: Vec<LocationEntity>) -> Vec<LocationEntity> {
    let mut out: Vec<LocationEntity> = Vec::new();
    for entity in entities {
        if entity.country_code == 0 && entity.place_id == 0 {
            continue;
        }
        match out
            .iter_mut()
            .find(|e| e.country_code == entity.country_code && e.place_id == entity.place_id)
        {
            Some(existing) => {
                existing.count += entity.count;
                existing.confidence = existing.confidence.max(entity.confidence);
            }
            None => out.push(entity),
        }
    }
    for entity in &mut out {
        if entity.count > MENTION_BOOST_THRESHOLD {
            entity.confidence += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationEntity;
    use crate::span::{EntityKind, EntitySpan, Tagger};

    fn fixture() -> Gazetteer {
        Gazetteer::from_parts(
            &[("Canada", 124), ("France", 250), ("Jamaica", 388), ("Senegal", 686)],
            &[("Montreal", 6077, 124), ("Dakar", 3021, 686)],
            &[
                ("Toronto", 1850, 124),
                ("Paris", 2988, 250),
                ("Kingston", 4410, 388),
                ("Saint John", 1905, 124),
            ],
        )
    }

    fn mention(text: &str, context: &str, start: usize) -> LocationEntity {
        let mut span = EntitySpan::new(text, start, Tagger::PassTwo, EntityKind::Location);
        span.contextualized_text = context.to_string();
        LocationEntity::from_span(&span)
    }

    #[test]
    fn comma_qualified_text_resolves_place_level() {
        let entities = vec![mention("Toronto, Canada", "Toronto, Canada", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place_id, 1850);
        assert_eq!(out[0].country_code, 124);
        assert_eq!(out[0].confidence, 3); // tier 1 + 2
    }

    #[test]
    fn comma_qualified_unknown_place_resolves_country_only() {
        let entities = vec![mention("Moose Factory, Canada", "Moose Factory, Canada", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out[0].place_id, 0);
        assert_eq!(out[0].country_code, 124);
        assert_eq!(out[0].confidence, 2); // tier 1 + 1
    }

    #[test]
    fn bracket_country_context_resolves() {
        let entities = vec![mention("Kingston", "Kingston [Jamaica]", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out[0].place_id, 4410);
        assert_eq!(out[0].country_code, 388);
    }

    #[test]
    fn context_comma_country_resolves() {
        let entities = vec![mention("Paris", "Paris [Paris, France]", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out[0].place_id, 2988);
        assert_eq!(out[0].country_code, 250);
    }

    #[test]
    fn adjacent_country_mention_is_absorbed() {
        // "Toronto" at [0,7), "Canada" at [9,15): two spans, 2 chars apart.
        let entities = vec![mention("Toronto", "Toronto", 0), mention("Canada", "Canada", 9)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Toronto");
        assert_eq!(out[0].place_id, 1850);
        assert_eq!(out[0].country_code, 124);
    }

    #[test]
    fn distant_country_mention_is_not_absorbed() {
        let entities = vec![mention("Toronto", "Toronto", 0), mention("Canada", "Canada", 40)];
        let out = resolve_international(&entities, &fixture());
        // Toronto has no hint and no context, so it is dropped;
        // Canada resolves as a bare country.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Canada");
        assert_eq!(out[0].place_id, 0);
        assert_eq!(out[0].country_code, 124);
    }

    #[test]
    fn default_country_hint_resolves() {
        let entities = vec![mention("Montreal", "Montreal", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out[0].place_id, 6077);
        assert_eq!(out[0].country_code, 124);
        assert_eq!(out[0].confidence, 3); // tier 1 + 2
    }

    #[test]
    fn self_confirming_context_resolves_via_hint() {
        let entities = vec![mention("Dakar", "Dakar [Dakar]", 0)];
        let out = resolve_international(&entities, &fixture());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place_id, 3021);
        assert_eq!(out[0].country_code, 686);
    }

    #[test]
    fn generic_street_names_never_resolve() {
        let entities = vec![mention("Jamaica Avenue", "Jamaica Avenue", 0)];
        let out = resolve_international(&entities, &fixture());
        assert!(out.is_empty());
        assert!(is_general_location("Jamaica Avenue"));
        assert!(is_general_location("Powder River"));
        assert!(is_general_location("125th Street,"));
        assert!(!is_general_location("Jamaica"));
    }

    #[test]
    fn proper_name_cleanup() {
        let gaz = fixture();
        assert_eq!(proper_name_for_place("the city of Paris", &gaz), "Paris");
        assert_eq!(proper_name_for_place("sic Kingston", &gaz), "Kingston");
        assert_eq!(proper_name_for_place("Dakar [Dakar]", &gaz), "Dakar");
        assert_eq!(proper_name_for_place("Paris; well", &gaz), "Paris");
        assert_eq!(proper_name_for_place("St. John", &gaz), "Saint John");
        // No Saint form in the gazetteer: the abbreviation stays.
        assert_eq!(proper_name_for_place("St. Tropez", &gaz), "St. Tropez");
    }

    #[test]
    fn story_propagation_copies_resolutions() {
        let entities = vec![
            mention("Paris, France", "Paris, France", 0),
            mention("Paris", "Paris", 30),
        ];
        let out = resolve_international(&entities, &fixture());
        // Both resolve to the same place and aggregate into one entity.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place_id, 2988);
        assert_eq!(out[0].count, 2);
    }

    #[test]
    fn propagation_prefers_place_level_donor() {
        let mut entities = vec![
            mention("Kingston", "Kingston", 0),
            mention("Kingston", "Kingston", 20),
            mention("Kingston", "Kingston", 40),
        ];
        entities[0].country_code = 388; // country-only
        entities[0].confidence = 2;
        entities[1].place_id = 4410;
        entities[1].country_code = 388;
        entities[1].confidence = 3;
        propagate_story_matches(&mut entities);
        assert_eq!(entities[2].place_id, 4410);
        assert_eq!(entities[2].confidence, 3);
    }

    #[test]
    fn aggregation_counts_and_boosts() {
        let mut mentions_list = Vec::new();
        for i in 0..4 {
            let mut m = mention("Montreal", "Montreal", i * 20);
            m.place_id = 6077;
            m.country_code = 124;
            m.confidence = 3;
            mentions_list.push(m);
        }
        let out = aggregate(mentions_list);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].count, 4);
        // Max 3, +1 for passing the mention threshold.
        assert_eq!(out[0].confidence, 4);
    }

    #[test]
    fn unresolved_mentions_are_dropped() {
        let entities = vec![mention("Narnia", "Narnia", 0)];
        let out = resolve_international(&entities, &fixture());
        assert!(out.is_empty());
    }
}
