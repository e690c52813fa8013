//! The per-story resolution pipeline.
//!
//! One story segment in, one batch of deduplicated entity records out.
//! The pipeline owns no reference data — the gazetteer, state table, and
//! name authority are borrowed immutably, so one loaded bundle serves a
//! whole corpus run.

use std::collections::HashSet;

use chrono::Datelike;

use crate::dates::extract_dates;
use crate::domestic::{resolve_domestic, StateGazetteer};
use crate::error::Result;
use crate::gazetteer::Gazetteer;
use crate::ingest::{parse_rows, spans_from_rows};
use crate::international::resolve_international;
use crate::merge::polish;
use crate::org::{resolve_orgs, NameAuthority};
use crate::sink::{EntityRecord, EntitySink, RecordKind};
use crate::span::Tagger;

/// One story segment's raw inputs.
#[derive(Debug, Clone)]
pub struct Story {
    /// Corpus-wide segment identifier.
    pub segment_id: u64,
    /// The interview transcript text.
    pub transcript: String,
    /// Contents of the first tagger's output file.
    pub pass_two: String,
    /// Contents of the second tagger's output file.
    pub pass_three: String,
}

/// Counts of what one story resolved to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoryStats {
    /// Offset-corrected spans surviving ingestion, both taggers.
    pub spans: usize,
    /// Spans surviving the merge pass.
    pub merged: usize,
    /// Year and decade references found.
    pub dates: usize,
    /// Organizations the authority recognized.
    pub orgs: usize,
    /// Mentions resolved to a US state.
    pub states: usize,
    /// Entities resolved internationally.
    pub international: usize,
    /// Records accepted by the sink after deduplication.
    pub records: usize,
}

/// The resolution pipeline, parameterized by its reference data.
pub struct Pipeline<'a> {
    gazetteer: &'a Gazetteer,
    states: &'a dyn StateGazetteer,
    authority: &'a dyn NameAuthority,
    current_year: u32,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline using today's date for year plausibility.
    #[must_use]
    pub fn new(
        gazetteer: &'a Gazetteer,
        states: &'a dyn StateGazetteer,
        authority: &'a dyn NameAuthority,
    ) -> Self {
        Self::with_current_year(
            gazetteer,
            states,
            authority,
            chrono::Utc::now().year().max(0) as u32,
        )
    }

    /// Build a pipeline with an explicit current year. Tests use this to
    /// stay deterministic.
    #[must_use]
    pub fn with_current_year(
        gazetteer: &'a Gazetteer,
        states: &'a dyn StateGazetteer,
        authority: &'a dyn NameAuthority,
        current_year: u32,
    ) -> Self {
        Self {
            gazetteer,
            states,
            authority,
            current_year,
        }
    }

    /// Resolve one story and emit its records into the sink.
    ///
    /// Records are deduplicated per story: a year mentioned five times is
    /// one `Year` record. Emission order is dates, organizations, states,
    /// countries, each in first-mention order.
    pub fn resolve_story(&self, story: &Story, sink: &mut dyn EntitySink) -> Result<StoryStats> {
        let mut stats = StoryStats::default();

        let pass_two = spans_from_rows(
            &story.transcript,
            &parse_rows(&story.pass_two),
            Tagger::PassTwo,
        );
        let pass_three = spans_from_rows(
            &story.transcript,
            &parse_rows(&story.pass_three),
            Tagger::PassThree,
        );
        stats.spans = pass_two.len() + pass_three.len();

        let dates = extract_dates(&story.transcript, &pass_three, self.current_year);
        stats.dates = dates.len();

        let merged = polish(pass_two, pass_three);
        stats.merged = merged.len();

        let orgs = resolve_orgs(&merged, self.authority);
        stats.orgs = orgs.len();

        let (domestic, leftover) = resolve_domestic(&merged, self.states);
        stats.states = domestic.len();

        let international = resolve_international(&leftover, self.gazetteer);
        stats.international = international.len();

        let mut seen: HashSet<(RecordKind, String)> = HashSet::new();
        let mut emit = |sink: &mut dyn EntitySink, kind: RecordKind, value: String| -> Result<bool> {
            if !seen.insert((kind, value.clone())) {
                return Ok(false);
            }
            sink.accept(EntityRecord::new(story.segment_id, kind, value))?;
            Ok(true)
        };

        for date in &dates {
            let kind = if date.decade { RecordKind::Decade } else { RecordKind::Year };
            if emit(sink, kind, date.value.clone())? {
                stats.records += 1;
            }
        }
        for org in &orgs {
            if emit(sink, RecordKind::Organization, org.authority_id.clone())? {
                stats.records += 1;
            }
        }
        for loc in &domestic {
            if let Some(state) = &loc.state {
                if emit(sink, RecordKind::State, state.clone())? {
                    stats.records += 1;
                }
            }
        }
        for loc in &international {
            if loc.country_code == 0 {
                continue;
            }
            if emit(sink, RecordKind::Country, loc.country_code.to_string())? {
                stats.records += 1;
            }
        }

        log::debug!(
            "segment {}: {} spans in, {} records out",
            story.segment_id,
            stats.spans,
            stats.records
        );
        Ok(stats)
    }
}
