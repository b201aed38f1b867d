//! Observability: engine telemetry events and the sink boundary.
//!
//! Stages never hold counters of their own. Everything they want to report
//! is emitted as a [`MetricsEvent`] into a caller-supplied [`MetricsSink`].

mod report;
mod sink;

pub use report::{CounterSink, EventReport};
pub use sink::{MetricsEvent, MetricsSink, NoopSink};
