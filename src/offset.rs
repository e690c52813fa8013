//! Offset correction for tagger-reported spans.
//!
//! Taggers report character offsets into the transcript they were run on,
//! but the two taggers pre-process text differently, so reported offsets
//! drift by a character or two around punctuation. This module realigns a
//! claimed `(text, start)` pair against the source transcript, tolerating a
//! small drift window and skipping spans corrupted by known tokenization
//! artifacts rather than treating them as errors.

/// Forgiveness window, in characters, around a claimed offset.
pub const DRIFT_TOLERANCE: usize = 2;

/// Outcome of locating a claimed span in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetMatch {
    /// Text found exactly at the claimed offset.
    Verbatim(usize),
    /// Text found within the drift window.
    Drifted {
        /// Corrected start offset.
        start: usize,
        /// Signed distance from the claimed offset.
        drift: isize,
    },
}

impl OffsetMatch {
    /// The corrected start offset, wherever the text was found.
    #[must_use]
    pub fn start(&self) -> usize {
        match *self {
            OffsetMatch::Verbatim(s) => s,
            OffsetMatch::Drifted { start, .. } => start,
        }
    }
}

/// Why a span was skipped rather than matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Span text contains a double quote. The taggers mis-tokenize quoted
    /// speech, so this mismatch is tolerated silently and is not an error.
    QuotedSpeech,
    /// Span text contains a tab, the field separator in the on-disk
    /// intermediate files. Such a span is unusable.
    TabInText,
    /// Text not found anywhere inside the drift window.
    BeyondTolerance,
}

impl SkipReason {
    /// Whether this skip should be surfaced as a warning. Quote artifacts
    /// are a known tagger quirk and stay quiet.
    #[must_use]
    pub fn warrants_warning(&self) -> bool {
        matches!(self, SkipReason::BeyondTolerance)
    }
}

/// Locate `text` in `transcript` at or near `claimed_start`.
///
/// Searches the exact claimed offset first, then every offset within
/// [`DRIFT_TOLERANCE`] characters of it. A span that cannot be found inside
/// the window fails with [`SkipReason::BeyondTolerance`] unless the text
/// contains a double quote, in which case the mismatch is attributed to
/// quote tokenization and skipped silently.
///
/// # Example
///
/// ```
/// use glean::offset::{locate, OffsetMatch};
///
/// let transcript = "We moved to Chicago in 1951.";
/// assert_eq!(locate(transcript, "Chicago", 12), Ok(OffsetMatch::Verbatim(12)));
/// // One character of drift is corrected, not rejected.
/// assert_eq!(
///     locate(transcript, "Chicago", 13),
///     Ok(OffsetMatch::Drifted { start: 12, drift: -1 })
/// );
/// ```
pub fn locate(
    transcript: &str,
    text: &str,
    claimed_start: usize,
) -> std::result::Result<OffsetMatch, SkipReason> {
    if text.contains('\t') {
        return Err(SkipReason::TabInText);
    }
    if text.is_empty() {
        return Err(SkipReason::BeyondTolerance);
    }

    if slice_at(transcript, claimed_start, text.len()) == Some(text) {
        return Ok(OffsetMatch::Verbatim(claimed_start));
    }

    let lo = claimed_start.saturating_sub(DRIFT_TOLERANCE);
    let hi = claimed_start.saturating_add(DRIFT_TOLERANCE);
    for start in lo..=hi {
        if start == claimed_start {
            continue;
        }
        if slice_at(transcript, start, text.len()) == Some(text) {
            let drift = start as isize - claimed_start as isize;
            log::debug!(
                "span {:?} drifted {} chars from claimed offset {}",
                text,
                drift,
                claimed_start
            );
            return Ok(OffsetMatch::Drifted { start, drift });
        }
    }

    if text.contains('"') {
        return Err(SkipReason::QuotedSpeech);
    }
    Err(SkipReason::BeyondTolerance)
}

/// Slice `len` bytes starting at `start`, or `None` if out of bounds or not
/// on a character boundary.
fn slice_at(transcript: &str, start: usize, len: usize) -> Option<&str> {
    transcript.get(start..start.checked_add(len)?)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Offset correction is idempotent: text present verbatim at the
        /// claimed offset is returned at that same offset.
        #[test]
        fn verbatim_offsets_are_stable(
            prefix in "[a-z ]{0,40}",
            needle in "[A-Za-z]{1,12}",
            suffix in "[a-z ]{0,40}",
        ) {
            let transcript = format!("{}{}{}", prefix, needle, suffix);
            let start = prefix.len();
            let m = locate(&transcript, &needle, start);
            // The needle may also occur earlier inside prefix, but at the
            // claimed offset itself the match must be verbatim.
            prop_assert_eq!(m, Ok(OffsetMatch::Verbatim(start)));
        }

        /// locate never panics for arbitrary inputs and offsets.
        #[test]
        fn never_panics(t in ".{0,80}", needle in ".{0,12}", start in 0usize..200) {
            let _ = locate(&t, &needle, start);
        }

        /// A corrected offset is always within the drift window.
        #[test]
        fn drift_is_bounded(
            prefix in "[a-z]{0,30}",
            needle in "[A-Z][a-z]{2,8}",
            jitter in -2isize..=2,
        ) {
            let transcript = format!("{} {} end", prefix, needle);
            let true_start = prefix.len() + 1;
            let claimed = (true_start as isize + jitter).max(0) as usize;
            if let Ok(m) = locate(&transcript, &needle, claimed) {
                let drift = m.start() as isize - claimed as isize;
                prop_assert!(drift.unsigned_abs() <= DRIFT_TOLERANCE);
            }
        }
    }
}
