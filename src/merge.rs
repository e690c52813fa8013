//! Span merging — the "polish" pass.
//!
//! Reconciles the two taggers' per-story span lists into a single
//! offset-ordered list with agreement-based confidence tiers. The second
//! tagger ("pass 3") drives the walk; a cursor advances through the first
//! tagger's spans, and every pairing decision is made from the overlap
//! geometry and type agreement of the two candidates:
//!
//! - both taggers, same type, one span contains the other → the tighter
//!   bounds win at `Better` confidence;
//! - both taggers, same type, partial overlap → the bracket-free (then
//!   longer) span wins at `Good`;
//! - both taggers, conflicting types → the driving span alone at `Good`;
//! - one tagger only → the span alone at `Some`.
//!
//! After the walk, loosely-typed `YearPerhaps` spans are re-verified against
//! the plausible year range and either retyped to `Year` or discarded, and
//! `SomethingElse`/`Ignore` spans are dropped — they exist only so a typed
//! span from one tagger cannot inflate the confidence of a different-typed
//! span from the other.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::{YEAR_MAX, YEAR_MIN};
use crate::span::{ensure_offset_order, EntityKind, EntitySpan, Tier};

/// Four consecutive digits anywhere in a span's own text.
static FOUR_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}").expect("valid regex"));

/// Merge two per-story span lists and verify year candidates.
///
/// This is the full polish pass: [`merge_spans`] followed by
/// [`verify_year_candidates`]. Input lists are sorted on entry if needed.
#[must_use]
pub fn polish(pass_two: Vec<EntitySpan>, pass_three: Vec<EntitySpan>) -> Vec<EntitySpan> {
    verify_year_candidates(merge_spans(pass_two, pass_three))
}

/// Reconcile the two taggers' span lists into one offset-ordered list.
///
/// `pass_two` is the first tagger's output, `pass_three` the second's; both
/// must cover the same transcript. Every emitted span carries the tier its
/// agreement earned, and spans matched across taggers are marked
/// `dual_coverage` whichever text was kept.
#[must_use]
pub fn merge_spans(
    mut pass_two: Vec<EntitySpan>,
    mut pass_three: Vec<EntitySpan>,
) -> Vec<EntitySpan> {
    ensure_offset_order(&mut pass_two);
    ensure_offset_order(&mut pass_three);

    let mut merged = Vec::with_capacity(pass_two.len() + pass_three.len());
    let mut cursor = 0usize;

    for b in pass_three {
        let (b_start, b_end) = (b.start, b.end());

        // Flush A-spans that end at or before this B-span. Any not yet
        // claimed by an earlier pairing is emitted standalone.
        while cursor < pass_two.len() && pass_two[cursor].end() <= b_start {
            if !pass_two[cursor].dual_coverage {
                let mut solo = pass_two[cursor].clone();
                solo.tier = Tier::Some;
                merged.push(solo);
            }
            cursor += 1;
        }

        if cursor < pass_two.len() && pass_two[cursor].overlaps(b_start, b_end) {
            let a = &mut pass_two[cursor];
            if a.kind.agrees_with(&b.kind) {
                merged.push(merge_agreeing(a, &b));
            } else {
                // Type conflict: the driving span wins, alone, at reduced
                // confidence. The A-span is still claimed so it does not
                // re-emit standalone later.
                let mut winner = b.clone();
                winner.tier = Tier::Good;
                winner.dual_coverage = true;
                merged.push(winner);
            }
            a.dual_coverage = true;
        } else {
            // B is ahead of (or between) all remaining A-spans.
            let mut solo = b;
            solo.tier = Tier::Some;
            merged.push(solo);
        }
    }

    // Trailing unclaimed A-spans.
    while cursor < pass_two.len() {
        if !pass_two[cursor].dual_coverage {
            let mut solo = pass_two[cursor].clone();
            solo.tier = Tier::Some;
            merged.push(solo);
        }
        cursor += 1;
    }

    ensure_offset_order(&mut merged);
    merged
}

/// Merge two overlapping, type-agreeing spans into one.
fn merge_agreeing(a: &EntitySpan, b: &EntitySpan) -> EntitySpan {
    let mut out = if a.start == b.start && a.len == b.len {
        // Identical bounds: prefer the bracket-free rendering, then the
        // longer contextualized form.
        pick_preferred(a, b).clone()
    } else if b.contains(a.start, a.end()) {
        // A is the tighter span.
        a.clone()
    } else if a.contains(b.start, b.end()) {
        b.clone()
    } else {
        // Partial overlap without containment: bracket-free first, longer
        // second, and the tier drops to Good.
        let mut chosen = pick_preferred(a, b).clone();
        chosen.tier = Tier::Good;
        chosen.dual_coverage = true;
        // Carry the verified year if either side has one.
        chosen.kind = verified_kind(a, b, chosen.kind);
        return chosen;
    };
    out.tier = Tier::Better;
    out.dual_coverage = true;
    out.kind = verified_kind(a, b, out.kind);
    out
}

/// Prefer the span without a bracketed context fragment; break ties toward
/// the longer span, then toward the driving (B) span.
fn pick_preferred<'a>(a: &'a EntitySpan, b: &'a EntitySpan) -> &'a EntitySpan {
    match (a.has_bracket(), b.has_bracket()) {
        (false, true) => a,
        (true, false) => b,
        _ => {
            if a.len > b.len {
                a
            } else {
                b
            }
        }
    }
}

/// When either side already carries a verified `Year`, keep it.
fn verified_kind(a: &EntitySpan, b: &EntitySpan, fallback: EntityKind) -> EntityKind {
    match (a.kind, b.kind) {
        (EntityKind::Year(y), _) | (_, EntityKind::Year(y)) => EntityKind::Year(y),
        _ => fallback,
    }
}

/// Re-verify `YearPerhaps` spans and drop untyped noise.
///
/// A `YearPerhaps` span survives only if its own text contains a four-digit
/// sequence inside `[YEAR_MIN, YEAR_MAX]`, in which case it is retyped to
/// `Year` with the numeric value. `SomethingElse`, `Ignore`, and `Unset`
/// spans are always discarded here.
#[must_use]
pub fn verify_year_candidates(spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans
        .into_iter()
        .filter_map(|mut span| match span.kind {
            EntityKind::YearPerhaps => {
                let year = FOUR_DIGITS
                    .find_iter(&span.text)
                    .filter_map(|m| m.as_str().parse::<u32>().ok())
                    .find(|&y| (YEAR_MIN..=YEAR_MAX).contains(&y))?;
                span.kind = EntityKind::Year(year);
                Some(span)
            }
            EntityKind::SomethingElse | EntityKind::Ignore | EntityKind::Unset => None,
            _ => Some(span),
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::span::Tagger;
    use proptest::prelude::*;

    fn arb_spans(tagger: Tagger) -> impl Strategy<Value = Vec<EntitySpan>> {
        proptest::collection::vec((0usize..200, 1usize..10, 0u8..4), 0..12).prop_map(
            move |triples| {
                triples
                    .into_iter()
                    .map(|(start, len, k)| {
                        let kind = match k {
                            0 => EntityKind::Person,
                            1 => EntityKind::Org,
                            2 => EntityKind::Location,
                            _ => EntityKind::YearPerhaps,
                        };
                        EntitySpan::new("x".repeat(len), start, tagger, kind)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        /// The merged list is always in ascending offset order.
        #[test]
        fn merged_output_sorted(
            two in arb_spans(Tagger::PassTwo),
            three in arb_spans(Tagger::PassThree),
        ) {
            let merged = merge_spans(two, three);
            prop_assert!(merged.windows(2).all(|w| w[0].start <= w[1].start));
        }

        /// Merging never invents spans: output length is bounded by the sum
        /// of the inputs.
        #[test]
        fn merge_never_invents_spans(
            two in arb_spans(Tagger::PassTwo),
            three in arb_spans(Tagger::PassThree),
        ) {
            let (n2, n3) = (two.len(), three.len());
            let merged = merge_spans(two, three);
            prop_assert!(merged.len() <= n2 + n3);
        }

        /// After the polish pass no noise kinds survive, and every
        /// YearPerhaps has been retyped or dropped.
        #[test]
        fn polish_leaves_no_noise(
            two in arb_spans(Tagger::PassTwo),
            three in arb_spans(Tagger::PassThree),
        ) {
            let polished = polish(two, three);
            for s in polished {
                prop_assert!(!matches!(
                    s.kind,
                    EntityKind::SomethingElse
                        | EntityKind::Ignore
                        | EntityKind::Unset
                        | EntityKind::YearPerhaps
                ));
            }
        }
    }
}
