//! The working record type shared by the domestic and international
//! location resolvers.

use serde::{Deserialize, Serialize};

use crate::span::EntitySpan;

/// A location mention in the middle of resolution.
///
/// Both resolvers pass these through their cascades, filling in whichever
/// identity fields they can. A zero `place_id` or `country_code` means
/// "not resolved at that level" — the gazetteer never assigns zero to a
/// real place or country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntity {
    /// The span's verbatim text.
    pub text: String,
    /// Span text plus adjoining bracket context (`Buffalo [New York]`).
    pub contextualized_text: String,
    /// Start offset in the transcript.
    pub start: usize,
    /// Length of `text` in the transcript.
    pub len: usize,
    /// Gazetteer place identifier, or 0 when unresolved at place level.
    pub place_id: u32,
    /// Numeric country code, or 0 when unresolved at country level.
    pub country_code: u32,
    /// Two-letter US state code, when resolved domestically.
    pub state: Option<String>,
    /// Accumulated resolution confidence.
    pub confidence: u32,
    /// How many mentions this entity stands for after aggregation.
    pub count: u32,
}

impl LocationEntity {
    /// Build an unresolved location from a merged span, seeding confidence
    /// from the span's agreement tier.
    #[must_use]
    pub fn from_span(span: &EntitySpan) -> Self {
        Self {
            text: span.text.clone(),
            contextualized_text: span.contextualized_text.clone(),
            start: span.start,
            len: span.len,
            place_id: 0,
            country_code: 0,
            state: None,
            confidence: span.tier.score(),
            count: 1,
        }
    }

    /// Exclusive end offset in the transcript.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether any resolver has pinned this entity to a state, country, or
    /// place.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state.is_some() || self.country_code != 0 || self.place_id != 0
    }
}
