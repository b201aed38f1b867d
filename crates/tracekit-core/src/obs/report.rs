use crate::{
    aggregate::PassportOrigin,
    obs::sink::{MetricsEvent, MetricsSink},
    tier::{ClassificationBasis, TierKey},
};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Counters folded from the metrics events of one or more reconstruction calls.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    // Normalization and merge
    pub records_normalized: u64,
    pub records_skipped: u64,
    pub events_merged: u64,
    pub unidentified_events: u64,

    // Classification
    pub classified_by_role: u64,
    pub classified_by_biz_step: u64,
    pub tiers: BTreeMap<TierKey, u64>,

    // Passport resolution
    pub passport_from_event: u64,
    pub passport_from_batch: u64,
    pub passport_absent: u64,
    pub passport_decode_failures: u64,
}

impl EventReport {
    fn apply(&mut self, event: MetricsEvent) {
        match event {
            MetricsEvent::RecordNormalized => {
                self.records_normalized = self.records_normalized.saturating_add(1);
            }
            MetricsEvent::RecordSkipped { .. } => {
                self.records_skipped = self.records_skipped.saturating_add(1);
            }
            MetricsEvent::EventMerged => {
                self.events_merged = self.events_merged.saturating_add(1);
            }
            MetricsEvent::UnidentifiedAppended => {
                self.unidentified_events = self.unidentified_events.saturating_add(1);
            }
            MetricsEvent::TierClassified { tier, basis } => {
                match basis {
                    ClassificationBasis::Role => {
                        self.classified_by_role = self.classified_by_role.saturating_add(1);
                    }
                    ClassificationBasis::BizStep => {
                        self.classified_by_biz_step = self.classified_by_biz_step.saturating_add(1);
                    }
                    ClassificationBasis::Unresolved => {}
                }
                let entry = self.tiers.entry(tier).or_default();
                *entry = entry.saturating_add(1);
            }
            MetricsEvent::PassportResolved { origin } => match origin {
                PassportOrigin::EventFragment => {
                    self.passport_from_event = self.passport_from_event.saturating_add(1);
                }
                PassportOrigin::BatchPassport => {
                    self.passport_from_batch = self.passport_from_batch.saturating_add(1);
                }
                PassportOrigin::Absent => {
                    self.passport_absent = self.passport_absent.saturating_add(1);
                }
            },
            MetricsEvent::PassportDecodeFailed => {
                self.passport_decode_failures = self.passport_decode_failures.saturating_add(1);
            }
        }
    }
}

///
/// CounterSink
///
/// Caller-owned sink that folds events into an [`EventReport`].
/// Not `Sync`; give each concurrent reconstruction its own sink.
///

#[derive(Debug, Default)]
pub struct CounterSink {
    report: RefCell<EventReport>,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counters recorded so far.
    #[must_use]
    pub fn report(&self) -> EventReport {
        self.report.borrow().clone()
    }

    /// Clear all counters.
    pub fn reset(&self) {
        *self.report.borrow_mut() = EventReport::default();
    }
}

impl MetricsSink for CounterSink {
    fn record(&self, event: MetricsEvent) {
        self.report.borrow_mut().apply(event);
    }
}

///
/// TESTS
///
