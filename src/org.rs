//! Organization resolution against a name authority.
//!
//! Organizations are only emitted when an external authority recognizes
//! the name and hands back a canonical identifier; everything else is
//! noise (tagger misfires, one-off mentions of a corner store). The
//! authority sits behind a trait so the corpus-specific backing list can
//! be swapped for a fixture in tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::span::{EntityKind, EntitySpan};

/// Canonical-name lookups for organization mentions.
pub trait NameAuthority {
    /// The canonical identifier for an organization name, if the authority
    /// recognizes it.
    fn canonical_id(&self, name: &str) -> Option<String>;
}

/// A resolved organization within one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgEntity {
    /// The mention text as tagged.
    pub text: String,
    /// The authority's canonical identifier.
    pub authority_id: String,
    /// Agreement-based confidence carried from the span tier.
    pub confidence: u32,
}

/// A [`NameAuthority`] backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct TableAuthority {
    entries: HashMap<String, String>,
}

impl TableAuthority {
    /// Build an authority from `(name, canonical_id)` pairs.
    #[must_use]
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|&(name, id)| (name.trim().to_lowercase(), id.to_string()))
            .collect();
        Self { entries }
    }
}

impl NameAuthority for TableAuthority {
    fn canonical_id(&self, name: &str) -> Option<String> {
        self.entries.get(&name.trim().to_lowercase()).cloned()
    }
}

/// Resolve organization spans against the authority.
///
/// Unrecognized names are excluded. Mentions resolving to the same
/// canonical id collapse into one entity keeping the highest confidence;
/// first-mention order is preserved.
#[must_use]
pub fn resolve_orgs(spans: &[EntitySpan], authority: &dyn NameAuthority) -> Vec<OrgEntity> {
    let mut out: Vec<OrgEntity> = Vec::new();
    for span in spans {
        if span.kind != EntityKind::Org {
            continue;
        }
        let authority_id = match authority.canonical_id(&span.text) {
            Some(id) => id,
            None => {
                log::debug!("no authority entry for org {:?}", span.text);
                continue;
            }
        };
        let confidence = span.tier.score();
        match out.iter_mut().find(|o| o.authority_id == authority_id) {
            Some(existing) => existing.confidence = existing.confidence.max(confidence),
            None => out.push(OrgEntity {
                text: span.text.clone(),
                authority_id,
                confidence,
            }),
        }
    }
    out
}
