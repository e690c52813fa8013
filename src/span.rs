//! Entity span types shared across the resolution passes.
//!
//! A span is a contiguous substring of a transcript flagged by a tagger as a
//! named-entity candidate. Spans are created from raw tagger rows, reconciled
//! by the merge pass, and finally specialized into dates, organizations, and
//! locations. The `start`/`len` fields always index the *original
//! transcript*, never `text` or `contextualized_text`.

use serde::{Deserialize, Serialize};

/// Which tagger produced a span.
///
/// The two taggers are opaque line-oriented producers; their intermediate
/// files are conventionally named "pass 2" and "pass 3".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tagger {
    /// The first tagger ("pass 2" intermediate files).
    PassTwo,
    /// The second tagger ("pass 3" intermediate files). Date extraction
    /// runs on this tagger's raw output alone.
    PassThree,
}

/// Resolved type of an entity span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Person name.
    Person,
    /// Organization name.
    Org,
    /// Geographic location (domestic or international).
    Location,
    /// Loosely-conflated date/cardinal/event span. Must be re-verified as a
    /// four-digit year before it can survive the merge pass.
    YearPerhaps,
    /// Verified four-digit year in `[YEAR_MIN, YEAR_MAX]`.
    Year(u32),
    /// A recognized but deliberately unusable type. Carried through the
    /// merge so a typed span still blocks confidence inflation of a
    /// person/org/location match, then discarded.
    SomethingElse,
    /// Explicitly ignored label.
    Ignore,
    /// No type assigned yet.
    Unset,
}

impl EntityKind {
    /// Parse a tagger type label into a kind.
    ///
    /// Labels follow OntoNotes/spaCy conventions. Unknown labels become
    /// [`EntityKind::SomethingElse`] rather than being dropped, so they can
    /// still suppress a cross-type agreement during the merge.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "PERSON" | "PER" => EntityKind::Person,
            "ORG" | "ORGANIZATION" => EntityKind::Org,
            "GPE" | "LOC" | "LOCATION" | "FAC" => EntityKind::Location,
            "DATE" | "TIME" | "CARDINAL" | "EVENT" => EntityKind::YearPerhaps,
            "" => EntityKind::Unset,
            _ => EntityKind::SomethingElse,
        }
    }

    /// Whether two kinds count as the same type for merge agreement.
    ///
    /// `Year` and `YearPerhaps` agree: a verified year from one tagger and a
    /// loose date span from the other describe the same candidate.
    #[must_use]
    pub fn agrees_with(&self, other: &EntityKind) -> bool {
        match (self, other) {
            (EntityKind::Year(_) | EntityKind::YearPerhaps, EntityKind::Year(_) | EntityKind::YearPerhaps) => true,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    /// Whether this kind can be emitted as a resolved entity.
    #[must_use]
    pub fn is_emittable(&self) -> bool {
        matches!(
            self,
            EntityKind::Person | EntityKind::Org | EntityKind::Location | EntityKind::Year(_)
        )
    }
}

/// Agreement-based confidence tier for a span.
///
/// Tiers are set by the merge pass: a span corroborated by both taggers with
/// matching types is `Better`; a partially-agreeing or type-conflicted span
/// is `Good`; a span seen by only one tagger is `Some`. Downstream filtering
/// uses the tier score; the resolvers themselves never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Single-tagger evidence.
    Some,
    /// Partial agreement, or a type conflict won by the driving tagger.
    Good,
    /// Full dual-tagger agreement.
    Better,
}

impl Tier {
    /// Numeric confidence score for the tier.
    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            Tier::Some => 1,
            Tier::Good => 2,
            Tier::Better => 3,
        }
    }
}

/// A named-entity candidate span within one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// The tagger's verbatim span text.
    pub text: String,
    /// `text` extended with adjoining bracketed disambiguation pulled from
    /// the transcript (e.g. `Buffalo [New York]`). Equal to `text` when no
    /// bracket context follows the span.
    pub contextualized_text: String,
    /// Corrected start offset into the original transcript.
    pub start: usize,
    /// Length of `text` in the transcript.
    pub len: usize,
    /// Which tagger produced the span.
    pub tagger: Tagger,
    /// Resolved type.
    pub kind: EntityKind,
    /// Agreement-based confidence tier.
    pub tier: Tier,
    /// Set once the merge pass has matched this span against the other
    /// tagger's output, whichever span's text was kept.
    pub dual_coverage: bool,
}

impl EntitySpan {
    /// Create a span with single-tagger confidence.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        start: usize,
        tagger: Tagger,
        kind: EntityKind,
    ) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            contextualized_text: text.clone(),
            text,
            start,
            len,
            tagger,
            kind,
            tier: Tier::Some,
            dual_coverage: false,
        }
    }

    /// Exclusive end offset in the transcript.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether this span overlaps the half-open range `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end()
    }

    /// Whether this span fully contains the half-open range `[start, end)`.
    #[must_use]
    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end()
    }

    /// Whether the span text carries a bracketed context fragment.
    #[must_use]
    pub fn has_bracket(&self) -> bool {
        self.text.contains('[')
    }
}

/// Enforce the ascending-offset precondition of the merge and resolve passes.
///
/// Span lists are expected to arrive in transcript order; if a caller hands
/// us an unsorted list we sort rather than silently mis-merge.
pub fn ensure_offset_order(spans: &mut [EntitySpan]) {
    if !spans.windows(2).all(|w| w[0].start <= w[1].start) {
        log::debug!("span list arrived unsorted; sorting by start offset");
        spans.sort_by_key(|s| (s.start, s.end()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parsing() {
        assert_eq!(EntityKind::from_label("PERSON"), EntityKind::Person);
        assert_eq!(EntityKind::from_label("org"), EntityKind::Org);
        assert_eq!(EntityKind::from_label("GPE"), EntityKind::Location);
        assert_eq!(EntityKind::from_label("DATE"), EntityKind::YearPerhaps);
        assert_eq!(EntityKind::from_label("CARDINAL"), EntityKind::YearPerhaps);
        assert_eq!(EntityKind::from_label(""), EntityKind::Unset);
        assert_eq!(EntityKind::from_label("NORP"), EntityKind::SomethingElse);
    }

    #[test]
    fn year_agrees_with_year_perhaps() {
        assert!(EntityKind::Year(1957).agrees_with(&EntityKind::YearPerhaps));
        assert!(EntityKind::YearPerhaps.agrees_with(&EntityKind::Year(1957)));
        assert!(!EntityKind::Person.agrees_with(&EntityKind::Location));
        assert!(EntityKind::Location.agrees_with(&EntityKind::Location));
    }

    #[test]
    fn tier_scores_are_ordered() {
        assert!(Tier::Some.score() < Tier::Good.score());
        assert!(Tier::Good.score() < Tier::Better.score());
        assert!(Tier::Some < Tier::Better);
    }

    #[test]
    fn span_geometry() {
        let s = EntitySpan::new("Chicago", 10, Tagger::PassTwo, EntityKind::Location);
        assert_eq!(s.end(), 17);
        assert!(s.overlaps(15, 20));
        assert!(!s.overlaps(17, 20));
        assert!(s.contains(11, 16));
        assert!(!s.contains(9, 16));
    }

    #[test]
    fn ensure_order_sorts_when_needed() {
        let mut spans = vec![
            EntitySpan::new("b", 20, Tagger::PassTwo, EntityKind::Person),
            EntitySpan::new("a", 5, Tagger::PassTwo, EntityKind::Person),
        ];
        ensure_offset_order(&mut spans);
        assert_eq!(spans[0].start, 5);
        assert_eq!(spans[1].start, 20);
    }
}
