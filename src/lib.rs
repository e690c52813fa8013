//! # glean
//!
//! Entity resolution for oral-history interview transcripts: takes the raw
//! output of two independent NER taggers over a story segment and resolves
//! it into dates, organizations, US states, and international places.
//!
//! - **Ingestion**: offset correction against the source transcript, with a
//!   small drift window and bracket-context pickup
//! - **Merging**: dual-tagger reconciliation into agreement-tiered spans
//! - **Resolution**: dates (years, decades, apostrophe-years), organizations
//!   against a name authority, domestic locations against the US state
//!   table, everything else through the international gazetteer cascade
//!
//! The usual entry point is [`pipeline::Pipeline`], which runs one story
//! segment end to end and emits flat [`sink::EntityRecord`]s.

#![warn(missing_docs)]

pub mod dates;
pub mod domestic;
pub mod error;
pub mod gazetteer;
pub mod ingest;
pub mod international;
pub mod locations;
pub mod merge;
pub mod offset;
pub mod org;
pub mod pipeline;
pub mod sink;
pub mod span;

// Re-export error types
pub use error::{Error, Result};

pub use dates::DateReference;
pub use gazetteer::Gazetteer;
pub use locations::LocationEntity;
pub use org::OrgEntity;
pub use pipeline::{Pipeline, Story, StoryStats};
pub use sink::{EntityRecord, EntitySink, JsonLinesSink, RecordKind, VecSink};
pub use span::{EntityKind, EntitySpan, Tagger, Tier};
