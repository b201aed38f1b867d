//! Metrics sink boundary.
//!
//! Engine stages MUST NOT keep global or thread-local counters.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{
    aggregate::PassportOrigin,
    tier::{ClassificationBasis, TierKey},
};

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    RecordNormalized,
    RecordSkipped {
        source: usize,
    },
    EventMerged,
    UnidentifiedAppended,
    TierClassified {
        tier: TierKey,
        basis: ClassificationBasis,
    },
    PassportResolved {
        origin: PassportOrigin,
    },
    PassportDecodeFailed,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// NoopSink
///
/// Sink used by the plain entry points; drops every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _event: MetricsEvent) {}
}
