//! Identity merge across prioritized source feeds.
//!
//! Source lists are folded in the order given: primary feed first, then
//! supplementary passport feeds, then per-event embedded sub-lists. A record
//! whose `event_id` was already seen folds into the existing slot; records
//! without an id are always kept as distinct events.


use crate::{
    error::EngineError,
    event::{MergedEvent, RawEventRecord, normalize},
    obs::{MetricsEvent, MetricsSink, NoopSink},
};
use serde_json::Value;
use std::collections::{HashMap, hash_map::Entry};
use tracing::debug;

/// Merge prioritized source lists into one chronologically ordered list.
#[must_use]
pub fn merge_all(sources: &[Vec<RawEventRecord>]) -> Vec<MergedEvent> {
    merge_all_with_sink(sources, &NoopSink)
}

/// [`merge_all`], reporting into `sink`.
#[must_use]
pub fn merge_all_with_sink(
    sources: &[Vec<RawEventRecord>],
    sink: &dyn MetricsSink,
) -> Vec<MergedEvent> {
    let mut merger = Merger::new(sink);
    for source in sources {
        for raw in source {
            merger.fold(raw);
        }
    }

    merger.finish()
}

/// Merge source lists still in JSON form.
///
/// Every source must be a JSON array (null counts as empty). Elements that
/// are not objects are skipped.
pub fn merge_all_json(sources: &[Value]) -> Result<Vec<MergedEvent>, EngineError> {
    merge_all_json_with_sink(sources, &NoopSink)
}

/// [`merge_all_json`], reporting into `sink`.
pub fn merge_all_json_with_sink(
    sources: &[Value],
    sink: &dyn MetricsSink,
) -> Result<Vec<MergedEvent>, EngineError> {
    let lists = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            source_records(source, index, sink)
                .map_err(|err| err.with_index(index).with_field("sources"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(merge_all_with_sink(&lists, sink))
}

/// Read one JSON source list into raw records.
pub(crate) fn source_records(
    source: &Value,
    index: usize,
    sink: &dyn MetricsSink,
) -> Result<Vec<RawEventRecord>, EngineError> {
    let items = match source {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => return Err(EngineError::invalid_shape("array", other)),
    };

    let records = items
        .iter()
        .filter_map(|item| {
            let record = RawEventRecord::from_value(item.clone());
            if record.is_none() {
                sink.record(MetricsEvent::RecordSkipped { source: index });
            }
            record
        })
        .collect();

    Ok(records)
}

///
/// Merger
///
/// Fold state for one merge run: result slots in first-seen order plus an
/// identity index into them.
///

struct Merger<'a> {
    events: Vec<MergedEvent>,
    slots: HashMap<String, usize>,
    sink: &'a dyn MetricsSink,
}

impl<'a> Merger<'a> {
    fn new(sink: &'a dyn MetricsSink) -> Self {
        Self {
            events: Vec::new(),
            slots: HashMap::new(),
            sink,
        }
    }

    fn fold(&mut self, raw: &RawEventRecord) {
        let event = normalize(raw);
        self.sink.record(MetricsEvent::RecordNormalized);

        let Some(id) = event.event_id.clone() else {
            self.sink.record(MetricsEvent::UnidentifiedAppended);
            self.events.push(event);
            return;
        };

        match self.slots.entry(id) {
            Entry::Occupied(slot) => {
                debug!(event_id = %slot.key(), "folding duplicate event record");
                self.events[*slot.get()].absorb(event);
                self.sink.record(MetricsEvent::EventMerged);
            }
            Entry::Vacant(slot) => {
                slot.insert(self.events.len());
                self.events.push(event);
            }
        }
    }

    // stable: ties and unparseable times keep first-seen order
    fn finish(self) -> Vec<MergedEvent> {
        let mut events = self.events;
        events.sort_by_cached_key(MergedEvent::time_key);

        debug!(
            events = events.len(),
            identified = self.slots.len(),
            "merged event sources"
        );

        events
    }
}
