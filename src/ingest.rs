//! Parsing of raw tagger output into offset-corrected entity spans.
//!
//! Each tagger writes one comma-delimited row per detected span:
//! `text,startOffset,endOffset,typeLabel`, with a header line first. Rows
//! are best-effort: a malformed row is skipped with a warning and the story
//! continues — a single bad row must never abort a corpus run.

use crate::offset::{locate, SkipReason};
use crate::span::{ensure_offset_order, EntityKind, EntitySpan, Tagger};

/// Field delimiter in tagger output rows.
const FIELD_DELIMITER: char = ',';

/// Expected number of fields per row.
const FIELD_COUNT: usize = 4;

/// How far past a span to look for a bracketed context fragment.
const CONTEXT_SCAN_LIMIT: usize = 80;

/// One raw row from a tagger output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// The tagger's verbatim span text.
    pub text: String,
    /// Claimed start offset in the transcript.
    pub start: usize,
    /// Claimed end offset (exclusive).
    pub end: usize,
    /// Tagger type label (e.g. `PERSON`, `GPE`, `DATE`).
    pub label: String,
}

/// Parse the rows of one tagger output file.
///
/// The first line is a discarded header. Rows with the wrong field count
/// (which includes rows whose `text` contains the delimiter) or unparsable
/// offsets are skipped with a warning.
#[must_use]
pub fn parse_rows(content: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            log::warn!(
                "skipping tagger row {}: expected {} fields, found {}",
                idx + 1,
                FIELD_COUNT,
                fields.len()
            );
            continue;
        }
        let (start, end) = match (fields[1].trim().parse(), fields[2].trim().parse()) {
            (Ok(s), Ok(e)) => (s, e),
            _ => {
                log::warn!(
                    "skipping tagger row {}: unparsable offsets {:?}/{:?}",
                    idx + 1,
                    fields[1],
                    fields[2]
                );
                continue;
            }
        };
        rows.push(RawRow {
            text: fields[0].to_string(),
            start,
            end,
            label: fields[3].trim().to_string(),
        });
    }
    rows
}

/// Convert raw rows into offset-corrected, contextualized spans.
///
/// Each row's claimed offset is realigned against the transcript; spans that
/// cannot be located inside the drift window are dropped (warned, unless the
/// mismatch is a known quote-tokenization artifact). Surviving spans pick up
/// any bracketed disambiguation text that immediately follows them. The
/// returned list is in ascending transcript order.
#[must_use]
pub fn spans_from_rows(transcript: &str, rows: &[RawRow], tagger: Tagger) -> Vec<EntitySpan> {
    let mut spans = Vec::with_capacity(rows.len());
    for row in rows {
        let start = match locate(transcript, &row.text, row.start) {
            Ok(m) => m.start(),
            Err(reason) => {
                if reason.warrants_warning() {
                    log::warn!(
                        "dropping span {:?} at claimed offset {}: not found within tolerance",
                        row.text,
                        row.start
                    );
                } else {
                    log::debug!("skipping span {:?}: {:?}", row.text, reason);
                }
                continue;
            }
        };
        let mut span = EntitySpan::new(row.text.clone(), start, tagger, EntityKind::from_label(&row.label));
        span.contextualized_text = contextualize(transcript, start, span.len);
        spans.push(span);
    }
    ensure_offset_order(&mut spans);
    spans
}

/// Extend span text with a bracketed disambiguation fragment that
/// immediately follows it in the transcript.
///
/// Interview transcripts carry editorial annotations like
/// `Buffalo [New York]` or `'87 [1987]`; the bracket content disambiguates
/// the span for the location and date passes. Only a bracket adjoining the
/// span (at most one space away) is picked up, and only if it closes within
/// a short window.
#[must_use]
pub fn contextualize(transcript: &str, start: usize, len: usize) -> String {
    let text = match transcript.get(start..start + len) {
        Some(t) => t,
        None => return String::new(),
    };
    let mut rest = transcript[start + len..].char_indices().peekable();
    // Allow a single separating space before the bracket.
    if let Some((_, c)) = rest.peek() {
        if *c == ' ' {
            rest.next();
        }
    }
    match rest.peek() {
        Some((open_at, '[')) => {
            let tail_start = start + len + open_at;
            let tail = &transcript[tail_start..];
            match tail.find(']') {
                Some(close) if close <= CONTEXT_SCAN_LIMIT => {
                    format!("{} {}", text, &tail[..=close])
                }
                _ => text.to_string(),
            }
        }
        _ => text.to_string(),
    }
}
