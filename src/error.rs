//! Error types for glean.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for glean operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for glean operations.
///
/// Fatal configuration problems (missing or unreadable reference data) are
/// separate variants from per-row input problems, and lookup misses are never
/// errors at all — they surface as the unresolved zero state on the entity.
/// Resolvers only fail on structurally broken input, never on "no match".
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required gazetteer file is missing from the data directory.
    #[error("missing gazetteer file: {0}")]
    MissingGazetteer(PathBuf),

    /// A required gazetteer file exists but contains no data rows.
    #[error("empty gazetteer file: {0}")]
    EmptyGazetteer(PathBuf),

    /// A gazetteer row that cannot be parsed (wrong column count,
    /// non-numeric code). Raised at load time, before any story is
    /// processed — resolution is meaningless on broken reference data.
    #[error("malformed gazetteer row {line} in {path}: {reason}")]
    MalformedGazetteer {
        /// File containing the bad row.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// A tagger output row that cannot be parsed. Callers are expected to
    /// skip the row and continue the story rather than abort the corpus.
    #[error("malformed tagger row {line}: {reason}")]
    MalformedRow {
        /// 1-based line number in the tagger output file.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The persistence sink rejected a record.
    #[error("sink error: {0}")]
    Sink(String),
}

impl Error {
    /// Create a malformed-row error.
    #[must_use]
    pub fn malformed_row(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Create a malformed-gazetteer error.
    #[must_use]
    pub fn malformed_gazetteer(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedGazetteer {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a sink error.
    #[must_use]
    pub fn sink(msg: impl Into<String>) -> Self {
        Error::Sink(msg.into())
    }
}
