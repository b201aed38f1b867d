//! Batch documents: the caller-facing input of one reconstruction.

use crate::{
    error::EngineError,
    event::RawEventRecord,
    field::{self, Aliases, first_present, first_text},
    merge::source_records,
    obs::{MetricsSink, NoopSink},
};
use serde_json::{Map, Value};

const BATCH_ID: Aliases = &["batch_id", "batchId", "id"];
const EVENTS: Aliases = &["events", "epcis_events"];
const PASSPORT_EVENTS: Aliases = &["passport_events", "dpp_events"];
const BATCH_PASSPORT: Aliases = &["batch_passport", "dpp", "passport"];
const ANCHOR_STATUS: Aliases = &["anchor_status", "blockchain_status"];

///
/// BatchInput
///
/// One batch as fetched by the caller. The anchoring status is carried as an
/// opaque upstream value; nothing here inspects it.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchInput {
    pub batch_id: Option<String>,
    pub events: Vec<RawEventRecord>,
    pub passport_events: Vec<RawEventRecord>,
    pub batch_passport: Option<Value>,
    pub anchor_status: Option<String>,
}

impl BatchInput {
    #[must_use]
    pub fn new(events: Vec<RawEventRecord>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_passport_events(mut self, passport_events: Vec<RawEventRecord>) -> Self {
        self.passport_events = passport_events;
        self
    }

    #[must_use]
    pub fn with_batch_passport(mut self, batch_passport: Value) -> Self {
        self.batch_passport = Some(batch_passport);
        self
    }

    /// Read a batch document.
    ///
    /// The document must be an object and its event feeds must be arrays;
    /// everything else about it is read leniently.
    pub fn from_value(value: &Value) -> Result<Self, EngineError> {
        Self::from_value_with_sink(value, &NoopSink)
    }

    /// [`BatchInput::from_value`], reporting skipped records into `sink`.
    pub fn from_value_with_sink(
        value: &Value,
        sink: &dyn MetricsSink,
    ) -> Result<Self, EngineError> {
        let Value::Object(doc) = value else {
            return Err(EngineError::invalid_shape("object", value));
        };

        Ok(Self {
            batch_id: first_text(doc, BATCH_ID),
            events: feed(doc, EVENTS, 0, sink)?,
            passport_events: feed(doc, PASSPORT_EVENTS, 1, sink)?,
            batch_passport: first_present(doc, BATCH_PASSPORT).cloned(),
            anchor_status: first_text(doc, ANCHOR_STATUS),
        })
    }

    /// Source lists in merge priority order: primary events, passport
    /// duplicates, then every primary event's embedded traceability list.
    #[must_use]
    pub fn sources(&self) -> Vec<Vec<RawEventRecord>> {
        let embedded = self
            .events
            .iter()
            .filter_map(|event| field::first_present(event.as_map(), field::TRACEABILITY))
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|item| RawEventRecord::from_value(item.clone()))
            .collect();

        vec![self.events.clone(), self.passport_events.clone(), embedded]
    }
}

// one event feed of a batch document; absent or null reads as empty
fn feed(
    doc: &Map<String, Value>,
    aliases: Aliases,
    index: usize,
    sink: &dyn MetricsSink,
) -> Result<Vec<RawEventRecord>, EngineError> {
    let Some((name, value)) = aliases
        .iter()
        .find_map(|alias| doc.get(*alias).map(|value| (*alias, value)))
    else {
        return Ok(Vec::new());
    };

    source_records(value, index, sink).map_err(|err| err.with_field(name))
}

///
/// TESTS
///
