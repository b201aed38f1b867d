//! The read-only traceability view of one batch.

use crate::{
    aggregate::{
        AggregateStats, aggregate_by_tier_with_sink, aggregate_with_sink, consolidate_passport,
    },
    batch::BatchInput,
    error::EngineError,
    event::MergedEvent,
    merge::merge_all_with_sink,
    obs::{MetricsEvent, MetricsSink, NoopSink},
    passport::{Passport, decode_batch_passport},
    tier::{TierGroup, TierKey, TierLabels, group_by_tier_with},
    time::parse_event_time,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

///
/// ViewOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ViewOptions {
    pub labels: TierLabels,
    pub per_tier_stats: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            labels: TierLabels::default(),
            per_tier_stats: true,
        }
    }
}

///
/// TraceabilityView
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TraceabilityView {
    pub batch_id: Option<String>,
    pub anchor_status: Option<String>,
    pub groups: Vec<TierGroup>,
    pub stats: AggregateStats,
    pub tier_stats: BTreeMap<TierKey, AggregateStats>,
    pub passport: Option<Passport>,
    pub summary: BatchSummary,
    pub diagnostics: Vec<EngineError>,
}

impl TraceabilityView {
    /// All events across groups, in display order.
    pub fn events(&self) -> impl Iterator<Item = &MergedEvent> {
        self.groups.iter().flat_map(|group| group.events.iter())
    }
}

///
/// BatchSummary
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BatchSummary {
    pub event_count: usize,
    pub epc_count: usize,
    pub first_event_time: Option<String>,
    pub last_event_time: Option<String>,
}

impl BatchSummary {
    /// Summarize chronologically ordered events.
    #[must_use]
    pub fn from_events(events: &[MergedEvent]) -> Self {
        let epcs: BTreeSet<&str> = events
            .iter()
            .flat_map(|event| event.epc_list.iter().map(String::as_str))
            .collect();
        let parseable = |event: &&MergedEvent| {
            event
                .event_time
                .as_deref()
                .and_then(parse_event_time)
                .is_some()
        };

        Self {
            event_count: events.len(),
            epc_count: epcs.len(),
            first_event_time: events
                .iter()
                .find(parseable)
                .and_then(|e| e.event_time.clone()),
            last_event_time: events
                .iter()
                .rev()
                .find(parseable)
                .and_then(|e| e.event_time.clone()),
        }
    }
}

/// Reconstruct the traceability view of one batch with default options.
#[must_use]
pub fn reconstruct(input: &BatchInput) -> TraceabilityView {
    reconstruct_with(input, &ViewOptions::default(), &NoopSink)
}

/// Reconstruct the traceability view of one batch.
///
/// Never fails: a batch passport that cannot be decoded is recorded in
/// `diagnostics` and treated as absent.
#[must_use]
pub fn reconstruct_with(
    input: &BatchInput,
    options: &ViewOptions,
    sink: &dyn MetricsSink,
) -> TraceabilityView {
    let mut diagnostics = Vec::new();
    let batch_passport = match input.batch_passport.as_ref().map(decode_batch_passport) {
        Some(Ok(passport)) => passport,
        Some(Err(err)) => {
            warn!(
                batch_id = input.batch_id.as_deref().unwrap_or_default(),
                error = %err,
                "batch passport could not be decoded; treating it as absent"
            );
            sink.record(MetricsEvent::PassportDecodeFailed);
            diagnostics.push(err.with_field("batch_passport"));
            None
        }
        None => None,
    };

    let events = merge_all_with_sink(&input.sources(), sink);
    let groups = group_by_tier_with(&events, &options.labels, sink);
    let stats = aggregate_with_sink(&events, batch_passport.as_ref(), sink);
    let tier_stats = if options.per_tier_stats {
        aggregate_by_tier_with_sink(&groups, batch_passport.as_ref(), sink)
    } else {
        BTreeMap::new()
    };

    debug!(
        batch_id = input.batch_id.as_deref().unwrap_or_default(),
        events = events.len(),
        groups = groups.len(),
        "reconstructed batch view"
    );

    TraceabilityView {
        batch_id: input.batch_id.clone(),
        anchor_status: input.anchor_status.clone(),
        passport: consolidate_passport(&events, batch_passport.as_ref()),
        summary: BatchSummary::from_events(&events),
        groups,
        stats,
        tier_stats,
        diagnostics,
    }
}
