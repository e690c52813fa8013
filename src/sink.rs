//! Persistence of resolved entity records.
//!
//! Every resolution pass ends in the same flat record shape: which story
//! segment, what kind of entity, and its canonical value. Sinks sit
//! behind a trait so the pipeline can write to memory in tests and to
//! JSON Lines in production without caring which.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What kind of entity a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A verified four-digit year.
    Year,
    /// A decade reference (`"1950s"`).
    Decade,
    /// An organization, valued by its authority id.
    Organization,
    /// A US state, valued by its two-letter code.
    State,
    /// A country, valued by its numeric code.
    Country,
}

/// One resolved entity of one story segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Identifier of the story segment the entity was resolved from.
    pub segment_id: u64,
    /// Entity kind.
    pub kind: RecordKind,
    /// Canonical value; its interpretation depends on `kind`.
    pub value: String,
}

impl EntityRecord {
    /// Create a record.
    #[must_use]
    pub fn new(segment_id: u64, kind: RecordKind, value: impl Into<String>) -> Self {
        Self {
            segment_id,
            kind,
            value: value.into(),
        }
    }
}

/// Destination for resolved entity records.
pub trait EntitySink {
    /// Persist one record.
    fn accept(&mut self, record: EntityRecord) -> Result<()>;
}

/// In-memory sink for tests and small runs.
#[derive(Debug, Default)]
pub struct VecSink {
    /// Accepted records, in acceptance order.
    pub records: Vec<EntityRecord>,
}

impl EntitySink for VecSink {
    fn accept(&mut self, record: EntityRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}

/// Sink writing one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> EntitySink for JsonLinesSink<W> {
    fn accept(&mut self, record: EntityRecord) -> Result<()> {
        let line = serde_json::to_string(&record).map_err(|e| Error::sink(e.to_string()))?;
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink = VecSink::default();
        sink.accept(EntityRecord::new(7, RecordKind::Year, "1957")).unwrap();
        sink.accept(EntityRecord::new(7, RecordKind::State, "NY")).unwrap();
        assert_eq!(sink.records.len(), 2);
        assert_eq!(sink.records[0].value, "1957");
        assert_eq!(sink.records[1].kind, RecordKind::State);
    }

    #[test]
    fn json_lines_are_one_record_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept(EntityRecord::new(7, RecordKind::Country, "124")).unwrap();
        sink.accept(EntityRecord::new(7, RecordKind::Decade, "1950s")).unwrap();
        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: EntityRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, EntityRecord::new(7, RecordKind::Country, "124"));
        assert!(lines[1].contains("\"decade\""));
    }
}
