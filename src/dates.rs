//! Date extraction and validation.
//!
//! Produces year and decade references for a story from one tagger's span
//! list plus direct transcript scanning. Dates do not need dual-tagger
//! agreement, so this pass runs independently of the merge step.
//!
//! Three lexical patterns are recognized, in priority order:
//!
//! 1. a bare four-digit year `yyyy`, optionally followed by a literal `s`
//!    (decade), inside the plausible range `[YEAR_MIN, YEAR_MAX]`;
//! 2. an apostrophe-year `'xx` whose two digits recur elsewhere in the same
//!    context window behind a plausible century (`'57 ... 1957`) — counts as
//!    a full year at higher confidence;
//! 3. an unqualified `'xx`, which defaults to century 19 at lower
//!    confidence.
//!
//! Every year-looking number passes an address guard first: a number
//! directly followed by a compass word or a street-type word is a street
//! address (`1900 South Michigan Avenue`), not a year — unless the next
//! token is itself a bracketed year confirmation (`'87 [1987]`), which
//! overrides the guard. Numbers ending in `0` followed by `s` are decades
//! and never addresses.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::span::{EntityKind, EntitySpan};

/// Lower bound of the plausible year range.
pub const YEAR_MIN: u32 = 1500;
/// Upper bound of the plausible year range.
pub const YEAR_MAX: u32 = 2199;
/// Ceiling for accumulated date confidence.
pub const MAX_DATE_CONFIDENCE: u32 = 6;
/// A value mentioned more than this many times gets a one-time +1 bump.
pub const MENTION_BUMP_THRESHOLD: u32 = 3;
/// How far around an apostrophe-year to look for a century confirmation.
const CONFIRM_WINDOW: usize = 200;

/// A bare four-digit number with an optional decade `s`.
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})(s)?").expect("valid regex"));

/// An apostrophe-year `'xx`, optionally a decade `'xxs`.
static APOSTROPHE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['\u{2019}](\d{2})(s)?").expect("valid regex"));

/// A bracketed year or decade confirmation such as `[1987]` or `[1960s]`.
static BRACKET_CONFIRM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\d{4}s?\]").expect("valid regex"));

const COMPASS_WORDS: &[&str] = &["south", "north", "east", "west"];
const STREET_WORDS: &[&str] = &[
    "street", "st", "avenue", "ave", "boulevard", "blvd", "road", "rd", "lane", "ln",
];

/// A resolved year or decade reference within one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReference {
    /// The literal year (`"1957"`) or decade (`"1950s"`) string.
    pub value: String,
    /// Whether the value is a decade.
    pub decade: bool,
    /// How many times the value was mentioned in the story.
    pub count: u32,
    /// Accumulated confidence, capped at [`MAX_DATE_CONFIDENCE`].
    pub confidence: u32,
    /// True when the value was found only by transcript scanning, with no
    /// corroborating tagger span.
    pub from_transcript_only: bool,
}

/// One piece of year evidence found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearEvidence {
    /// The year (`"1957"`) or decade (`"1950s"`) string.
    pub value: String,
    /// Whether the evidence is a decade reference.
    pub decade: bool,
    /// Pattern-derived confidence before accumulation.
    pub confidence: u32,
}

/// Find the first piece of year evidence in a text, if any.
///
/// Returns a year only inside `[YEAR_MIN, YEAR_MAX]`; decade values always
/// end in `"0s"`.
#[must_use]
pub fn found_year_evidence(text: &str, current_year: u32) -> Option<YearEvidence> {
    scan_year_evidence(text, current_year).into_iter().next()
}

/// Find every piece of year evidence in a text.
#[must_use]
pub fn scan_year_evidence(text: &str, current_year: u32) -> Vec<YearEvidence> {
    let mut found = Vec::new();

    for caps in BARE_YEAR.captures_iter(text) {
        let m = caps.get(1).expect("group 1 always present");
        let has_s = caps.get(2).is_some();
        if !digit_boundaries_ok(text, m.start(), caps.get(0).expect("whole match").end()) {
            continue;
        }
        let year: u32 = match m.as_str().parse() {
            Ok(y) => y,
            Err(_) => continue,
        };
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            continue;
        }
        let decade = has_s && year % 10 == 0;
        // Decade references are never street addresses.
        if !decade && is_street_address(&text[caps.get(0).expect("whole match").end()..]) {
            log::debug!("rejecting {:?} as street address", m.as_str());
            continue;
        }
        found.push(YearEvidence {
            value: if decade {
                format!("{}s", year)
            } else {
                year.to_string()
            },
            decade,
            confidence: base_confidence(year, current_year),
        });
    }

    for caps in APOSTROPHE_YEAR.captures_iter(text) {
        let whole = caps.get(0).expect("whole match");
        let m = caps.get(1).expect("group 1 always present");
        let has_s = caps.get(2).is_some();
        if text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
        {
            continue;
        }
        let two: u32 = match m.as_str().parse() {
            Ok(d) => d,
            Err(_) => continue,
        };
        let decade = has_s && two % 10 == 0;
        if !decade && is_street_address(&text[whole.end()..]) {
            log::debug!("rejecting {:?} as street address", whole.as_str());
            continue;
        }
        let confirmed = confirm_century(text, whole.start(), two);
        let (year, confidence) = match confirmed {
            // Same two digits seen behind a plausible century nearby:
            // a full year at boosted confidence (double qualification).
            Some(full) => (full, (base_confidence(full, current_year) + 1).min(MAX_DATE_CONFIDENCE)),
            // No confirmation: default to century 19, lower confidence.
            None => (1900 + two, 2),
        };
        found.push(YearEvidence {
            value: if decade {
                format!("{}s", year)
            } else {
                year.to_string()
            },
            decade,
            confidence,
        });
    }

    found
}

/// Extract all date references for one story.
///
/// `spans` is a single tagger's offset-corrected span list (date extraction
/// needs only one tagger). Transcript scanning establishes the mention
/// counts; spans corroborate values for a +1 confidence boost. Repeated
/// mentions of an identical value accumulate into one reference — its count
/// increments, and its confidence gets a single +1 bump once the count
/// passes [`MENTION_BUMP_THRESHOLD`].
#[must_use]
pub fn extract_dates(
    transcript: &str,
    spans: &[EntitySpan],
    current_year: u32,
) -> Vec<DateReference> {
    let mut acc: BTreeMap<String, DateReference> = BTreeMap::new();

    for ev in scan_year_evidence(transcript, current_year) {
        accumulate(&mut acc, &ev, true);
    }

    for span in spans {
        if !matches!(span.kind, EntityKind::YearPerhaps | EntityKind::Year(_)) {
            continue;
        }
        for ev in scan_year_evidence(&span.contextualized_text, current_year) {
            corroborate(&mut acc, &ev);
        }
    }

    acc.into_values().collect()
}

/// Fold transcript evidence into the accumulator.
fn accumulate(acc: &mut BTreeMap<String, DateReference>, ev: &YearEvidence, transcript_only: bool) {
    let entry = acc.entry(ev.value.clone()).or_insert_with(|| DateReference {
        value: ev.value.clone(),
        decade: ev.decade,
        count: 0,
        confidence: ev.confidence,
        from_transcript_only: transcript_only,
    });
    entry.count += 1;
    entry.confidence = entry.confidence.max(ev.confidence);
    if entry.count == MENTION_BUMP_THRESHOLD + 1 {
        entry.confidence += 1;
    }
    entry.confidence = entry.confidence.min(MAX_DATE_CONFIDENCE);
}

/// Apply tagger corroboration to a value: +1 confidence, and the value is no
/// longer transcript-only. A span value the transcript scan missed (e.g.
/// present only in bracket context) is inserted fresh.
fn corroborate(acc: &mut BTreeMap<String, DateReference>, ev: &YearEvidence) {
    match acc.get_mut(&ev.value) {
        Some(existing) => {
            if existing.from_transcript_only {
                existing.from_transcript_only = false;
                existing.confidence =
                    (existing.confidence.max(ev.confidence) + 1).min(MAX_DATE_CONFIDENCE);
            }
        }
        None => {
            acc.insert(
                ev.value.clone(),
                DateReference {
                    value: ev.value.clone(),
                    decade: ev.decade,
                    count: 1,
                    confidence: (ev.confidence + 1).min(MAX_DATE_CONFIDENCE),
                    from_transcript_only: false,
                },
            );
        }
    }
}

/// Base confidence for an in-range year: a year between 1900 and the current
/// year is strongly believable; anything else in range is merely plausible.
fn base_confidence(year: u32, current_year: u32) -> u32 {
    if (1900..=current_year).contains(&year) {
        4
    } else {
        3
    }
}

/// Check that a digit run is not embedded in a longer number.
fn digit_boundaries_ok(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_ascii_digit());
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_ascii_alphanumeric());
    before_ok && after_ok
}

/// Street-address guard. `following` is the text immediately after the
/// number. Checks up to two whitespace-separated tokens, skipping bracket
/// punctuation, for a compass word or street-type word. A bracketed
/// year/decade confirmation as the next token overrides the guard.
fn is_street_address(following: &str) -> bool {
    let trimmed = following.trim_start();
    if BRACKET_CONFIRM.is_match(trimmed) {
        return false;
    }
    for token in trimmed.split_whitespace().take(2) {
        let cleaned: String = token
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
            .collect();
        let word = cleaned
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase();
        if COMPASS_WORDS.contains(&word.as_str()) || STREET_WORDS.contains(&word.as_str()) {
            return true;
        }
    }
    false
}

/// Look near an apostrophe-year for the same two digits behind a plausible
/// century (`'57` confirmed by `1957`). Returns the confirmed full year.
fn confirm_century(text: &str, at: usize, two_digits: u32) -> Option<u32> {
    let lo = floor_boundary(text, at.saturating_sub(CONFIRM_WINDOW));
    let hi = ceil_boundary(text, (at + CONFIRM_WINDOW).min(text.len()));
    let window = &text[lo..hi];
    for m in BARE_YEAR.find_iter(window) {
        if let Ok(year) = window[m.start()..m.start() + 4].parse::<u32>() {
            if year % 100 == two_digits && (YEAR_MIN..=YEAR_MAX).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Tagger;

    const CURRENT_YEAR: u32 = 2026;

    fn first(text: &str) -> Option<YearEvidence> {
        found_year_evidence(text, CURRENT_YEAR)
    }

    #[test]
    fn bare_year_in_range() {
        let ev = first("we moved there in 1951, I think").unwrap();
        assert_eq!(ev.value, "1951");
        assert!(!ev.decade);
        assert_eq!(ev.confidence, 4);
    }

    #[test]
    fn out_of_range_years_rejected() {
        assert!(first("back in 1490 or so").is_none());
        assert!(first("the year 2250 perhaps").is_none());
        assert!(first("room 12345 down the hall").is_none());
    }

    #[test]
    fn decade_reference() {
        let ev = first("during the 1950s things changed").unwrap();
        assert_eq!(ev.value, "1950s");
        assert!(ev.decade);
    }

    #[test]
    fn future_but_plausible_year_is_weaker() {
        let ev = first("by 2150 they say").unwrap();
        assert_eq!(ev.value, "2150");
        assert_eq!(ev.confidence, 3);
    }

    #[test]
    fn address_guard_rejects_street_numbers() {
        assert!(first("1900 South Michigan Avenue").is_none());
        assert!(first("we lived at 1957 Hastings Street back then").is_none());
        assert!(first("over on 1843 West Road").is_none());
    }

    #[test]
    fn address_guard_allows_plain_years() {
        let ev = first("in 1900 we moved north").unwrap();
        assert_eq!(ev.value, "1900");
        assert!(ev.confidence >= 3);
    }

    #[test]
    fn decades_never_guarded_as_addresses() {
        // Trailing 0 + s is a decade even before a street-ish word.
        let ev = first("the 1950s Street scene in Harlem").unwrap();
        assert_eq!(ev.value, "1950s");
    }

    #[test]
    fn bracket_confirmation_overrides_guard() {
        let ev = first("'87 [1987] South Side").unwrap();
        assert!(ev.value == "1987");
    }

    #[test]
    fn apostrophe_year_with_century_confirmation() {
        let evs = scan_year_evidence("it was '57 -- 1957, that is", CURRENT_YEAR);
        let confirmed = evs.iter().find(|e| e.value == "1957" && e.confidence >= 5);
        assert!(confirmed.is_some(), "evidence: {:?}", evs);
    }

    #[test]
    fn apostrophe_year_defaults_to_century_19() {
        let evs = scan_year_evidence("around '43 sometime", CURRENT_YEAR);
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].value, "1943");
        assert_eq!(evs[0].confidence, 2);
    }

    #[test]
    fn apostrophe_decade() {
        let evs = scan_year_evidence("back in the '60s", CURRENT_YEAR);
        assert_eq!(evs[0].value, "1960s");
        assert!(evs[0].decade);
    }

    #[test]
    fn repeated_mentions_accumulate() {
        let transcript = "In 1957 this. Then 1957 that. Again 1957. Finally 1957.";
        let dates = extract_dates(transcript, &[], CURRENT_YEAR);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].count, 4);
        // Base 4, +1 bump once count exceeded the threshold.
        assert_eq!(dates[0].confidence, 5);
        assert!(dates[0].from_transcript_only);
    }

    #[test]
    fn span_corroboration_boosts_confidence() {
        let transcript = "We arrived in 1951.";
        let mut span = EntitySpan::new("1951", 14, Tagger::PassThree, EntityKind::YearPerhaps);
        span.contextualized_text = "1951".into();
        let dates = extract_dates(transcript, &[span], CURRENT_YEAR);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].confidence, 5);
        assert!(!dates[0].from_transcript_only);
    }

    #[test]
    fn confidence_never_exceeds_cap() {
        let transcript = "1957 1957 1957 1957 1957 1957 1957 1957";
        let mut span = EntitySpan::new("1957", 0, Tagger::PassThree, EntityKind::YearPerhaps);
        span.contextualized_text = "1957 [1957]".into();
        let dates = extract_dates(transcript, &[span], CURRENT_YEAR);
        assert_eq!(dates[0].confidence, MAX_DATE_CONFIDENCE);
    }

    #[test]
    fn non_date_spans_are_ignored() {
        let span = EntitySpan::new("Chicago", 0, Tagger::PassThree, EntityKind::Location);
        let dates = extract_dates("no dates here", &[span], CURRENT_YEAR);
        assert!(dates.is_empty());
    }
}
