//! Roll-up statistics over a scope of merged events.
//!
//! A scope is a whole batch or any filtered subset of it (one tier, for
//! example). Numeric passport fields resolve field by field along a chain:
//! event fragments in chronological order, then the batch-level passport,
//! then zero.

use crate::{
    event::MergedEvent,
    obs::{MetricsEvent, MetricsSink, NoopSink},
    passport::{Passport, PassportNumber},
    tier::{TierGroup, TierKey, tier_counts},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

///
/// PassportOrigin
///
/// Where the primary passport of a scope came from.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassportOrigin {
    EventFragment,
    BatchPassport,
    Absent,
}

///
/// AggregateStats
///
/// Derived per call; never stored. Numbers are always present (zero when no
/// passport supplied them) and `tier_counts` always covers all five tiers.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateStats {
    pub co2: f64,
    pub water: f64,
    pub energy: f64,
    pub circularity_score: f64,
    pub tier_counts: BTreeMap<TierKey, usize>,
}

impl AggregateStats {
    /// Total number of events counted across tiers.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.tier_counts.values().sum()
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            co2: 0.0,
            water: 0.0,
            energy: 0.0,
            circularity_score: 0.0,
            tier_counts: tier_counts(&[]),
        }
    }
}

/// Compute stats for one scope of events.
#[must_use]
pub fn aggregate(events: &[MergedEvent], batch_passport: Option<&Passport>) -> AggregateStats {
    aggregate_with_sink(events, batch_passport, &NoopSink)
}

/// [`aggregate`], reporting into `sink`.
#[must_use]
pub fn aggregate_with_sink(
    events: &[MergedEvent],
    batch_passport: Option<&Passport>,
    sink: &dyn MetricsSink,
) -> AggregateStats {
    let chain = PassportChain::resolve(events, batch_passport);
    sink.record(MetricsEvent::PassportResolved {
        origin: chain.origin,
    });
    debug!(
        events = events.len(),
        origin = ?chain.origin,
        sources = chain.sources.len(),
        "resolved passport chain"
    );

    AggregateStats {
        co2: chain.number(PassportNumber::Co2),
        water: chain.number(PassportNumber::Water),
        energy: chain.number(PassportNumber::Energy),
        circularity_score: PassportNumber::CIRCULARITY
            .into_iter()
            .map(|component| chain.number(component))
            .sum(),
        tier_counts: tier_counts(events),
    }
}

/// Compute stats for every tier group, each group being its own scope.
#[must_use]
pub fn aggregate_by_tier(
    groups: &[TierGroup],
    batch_passport: Option<&Passport>,
) -> BTreeMap<TierKey, AggregateStats> {
    aggregate_by_tier_with_sink(groups, batch_passport, &NoopSink)
}

/// [`aggregate_by_tier`], reporting into `sink`.
#[must_use]
pub fn aggregate_by_tier_with_sink(
    groups: &[TierGroup],
    batch_passport: Option<&Passport>,
    sink: &dyn MetricsSink,
) -> BTreeMap<TierKey, AggregateStats> {
    groups
        .iter()
        .map(|group| {
            let stats = aggregate_with_sink(&group.events, batch_passport, sink);
            (group.key, stats)
        })
        .collect()
}

/// Merge every passport source of a scope into one passport.
///
/// The batch-level passport is the base; event fragments are laid over it
/// in chronological order, later keys replacing earlier ones.
#[must_use]
pub fn consolidate_passport(
    events: &[MergedEvent],
    batch_passport: Option<&Passport>,
) -> Option<Passport> {
    let mut consolidated = batch_passport.filter(|p| !p.is_empty()).cloned();
    for fragment in chronological_fragments(events) {
        consolidated
            .get_or_insert_with(Passport::default)
            .merge_from(fragment.clone());
    }

    consolidated
}

// event fragments ordered by event time, ties in input order
fn chronological_fragments(events: &[MergedEvent]) -> Vec<&Passport> {
    let mut fragments: Vec<_> = events
        .iter()
        .enumerate()
        .filter_map(|(index, event)| {
            event
                .passport_fragment
                .as_ref()
                .map(|passport| (event.time_key(), index, passport))
        })
        .collect();
    fragments.sort_by_key(|(time, index, _)| (*time, *index));

    fragments.into_iter().map(|(_, _, passport)| passport).collect()
}

///
/// PassportChain
///
/// Ordered passport sources for one scope. The first source is the primary
/// passport; later ones only fill fields the earlier ones do not carry.
///

struct PassportChain<'a> {
    sources: Vec<&'a Passport>,
    origin: PassportOrigin,
}

impl<'a> PassportChain<'a> {
    fn resolve(events: &'a [MergedEvent], batch_passport: Option<&'a Passport>) -> Self {
        let mut sources = chronological_fragments(events);
        let batch_passport = batch_passport.filter(|p| !p.is_empty());

        let origin = if !sources.is_empty() {
            PassportOrigin::EventFragment
        } else if batch_passport.is_some() {
            PassportOrigin::BatchPassport
        } else {
            PassportOrigin::Absent
        };
        sources.extend(batch_passport);

        Self { sources, origin }
    }

    fn number(&self, number: PassportNumber) -> f64 {
        self.sources
            .iter()
            .find_map(|passport| passport.number(number))
            .unwrap_or(0.0)
    }
}

///
/// TESTS
///
