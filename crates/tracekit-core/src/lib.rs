//! Batch provenance reconstruction for EPCIS traceability events.
//!
//! Raw event lists flow one way through four pure stages:
//! normalize → merge → classify/group → aggregate, ending in a read-only
//! [`view::TraceabilityView`]. Nothing in this crate performs I/O or keeps
//! state between calls.
#![warn(unreachable_pub)]

pub mod aggregate;
pub mod batch;
pub mod coerce;
pub mod error;
pub mod event;
pub mod field;
pub mod merge;
pub mod obs;
pub mod passport;
pub mod tier;
pub mod time;
pub mod view;

// test
#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

///
/// Prelude
///
/// Domain vocabulary and the stage entry points.
///

pub mod prelude {
    pub use crate::{
        aggregate::{AggregateStats, aggregate, aggregate_by_tier, consolidate_passport},
        batch::BatchInput,
        error::{EngineError, ErrorKind},
        event::{MergedEvent, NormalizedEvent, RawEventRecord, normalize},
        merge::{merge_all, merge_all_json},
        passport::{Passport, decode_batch_passport},
        tier::{TierGroup, TierKey, TierLabels, classify, events_in_tier, group_by_tier},
        view::{TraceabilityView, ViewOptions, reconstruct, reconstruct_with},
    };
}
