//! Supply-chain tier classification and grouping.
//!
//! There is exactly one classifier. Views that need one tier filter the
//! canonical groups; they never reclassify.

use crate::{
    event::MergedEvent,
    obs::{MetricsEvent, MetricsSink, NoopSink},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error as ThisError;

// role evidence, checked in this order
const ROLE_KEYWORDS: [(&str, TierKey); 4] = [
    ("FARM", TierKey::Farm),
    ("SUPPLIER", TierKey::Supplier),
    ("MANUFACTURER", TierKey::Manufacturer),
    ("BRAND", TierKey::Brand),
];

const FARM_STEPS: [&str; 3] = ["growing", "planting", "harvesting"];
const SUPPLIER_STEPS: [&str; 3] = ["receiving", "shipping", "packing"];

///
/// TierKey
///
/// Supply-chain stage an event is attributed to. Declaration order is the
/// display order.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierKey {
    #[display("FARM")]
    Farm,
    #[display("SUPPLIER")]
    Supplier,
    #[display("MANUFACTURER")]
    Manufacturer,
    #[display("BRAND")]
    Brand,
    #[display("UNKNOWN")]
    Unknown,
}

impl TierKey {
    pub const ALL: [Self; 5] = [
        Self::Farm,
        Self::Supplier,
        Self::Manufacturer,
        Self::Brand,
        Self::Unknown,
    ];

    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Farm => "Farm",
            Self::Supplier => "Supplier",
            Self::Manufacturer => "Manufacturer",
            Self::Brand => "Brand",
            Self::Unknown => "Unknown",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for TierKey {
    type Err = UnknownTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();

        Self::ALL
            .into_iter()
            .find(|key| key.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTierError {
                value: wanted.to_string(),
            })
    }
}

///
/// UnknownTierError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown tier '{value}', expected one of FARM, SUPPLIER, MANUFACTURER, BRAND, UNKNOWN")]
pub struct UnknownTierError {
    pub value: String,
}

///
/// ClassificationBasis
///
/// Which evidence decided a classification.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClassificationBasis {
    Role,
    BizStep,
    Unresolved,
}

/// Assign one merged event to its tier.
#[must_use]
pub fn classify(event: &MergedEvent) -> TierKey {
    classify_parts(event.owner_role.as_deref(), event.biz_step.as_deref()).0
}

/// Classify from the raw role and business step.
///
/// Role substrings always take precedence over business-step vocabulary;
/// upstream roles carry suffixes such as `_LEVEL_1`, so containment is used
/// rather than equality.
#[must_use]
pub fn classify_parts(
    owner_role: Option<&str>,
    biz_step: Option<&str>,
) -> (TierKey, ClassificationBasis) {
    let role = owner_role.unwrap_or_default().trim().to_uppercase();
    if let Some((_, key)) = ROLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| role.contains(keyword))
    {
        return (*key, ClassificationBasis::Role);
    }

    let step = biz_step.unwrap_or_default().to_lowercase();
    if FARM_STEPS.iter().any(|word| step.contains(word)) {
        return (TierKey::Farm, ClassificationBasis::BizStep);
    }
    if SUPPLIER_STEPS.iter().any(|word| step.contains(word)) {
        return (TierKey::Supplier, ClassificationBasis::BizStep);
    }

    (TierKey::Unknown, ClassificationBasis::Unresolved)
}

///
/// TierLabels
///
/// Display labels per tier. Defaults to [`TierKey::default_label`].
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TierLabels {
    labels: [String; 5],
}

impl TierLabels {
    #[must_use]
    pub fn label(&self, key: TierKey) -> &str {
        &self.labels[key.index()]
    }

    /// Replace the label for one tier.
    #[must_use]
    pub fn with_label(mut self, key: TierKey, label: impl Into<String>) -> Self {
        self.labels[key.index()] = label.into();
        self
    }
}

impl Default for TierLabels {
    fn default() -> Self {
        Self {
            labels: TierKey::ALL.map(|key| key.default_label().to_string()),
        }
    }
}

///
/// TierGroup
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TierGroup {
    pub key: TierKey,
    pub label: String,
    pub events: Vec<MergedEvent>,
}

/// Group events by tier in display order, omitting empty tiers.
///
/// Events keep the relative order they arrive in, which for merge output is
/// the global chronological order.
#[must_use]
pub fn group_by_tier(events: &[MergedEvent]) -> Vec<TierGroup> {
    group_by_tier_with(events, &TierLabels::default(), &NoopSink)
}

/// [`group_by_tier`] with custom labels, reporting into `sink`.
#[must_use]
pub fn group_by_tier_with(
    events: &[MergedEvent],
    labels: &TierLabels,
    sink: &dyn MetricsSink,
) -> Vec<TierGroup> {
    let mut buckets: [Vec<MergedEvent>; 5] = Default::default();
    for event in events {
        let (tier, basis) = classify_parts(event.owner_role.as_deref(), event.biz_step.as_deref());
        sink.record(MetricsEvent::TierClassified { tier, basis });
        buckets[tier.index()].push(event.clone());
    }

    TierKey::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, events)| !events.is_empty())
        .map(|(key, events)| TierGroup {
            key,
            label: labels.label(key).to_string(),
            events,
        })
        .collect()
}

/// Events of one tier, or an empty slice when the tier has none.
#[must_use]
pub fn events_in_tier(groups: &[TierGroup], key: TierKey) -> &[MergedEvent] {
    groups
        .iter()
        .find(|group| group.key == key)
        .map(|group| group.events.as_slice())
        .unwrap_or_default()
}

/// Complete per-tier counts; every tier is present, zero or not.
#[must_use]
pub fn tier_counts(events: &[MergedEvent]) -> BTreeMap<TierKey, usize> {
    let mut counts: BTreeMap<TierKey, usize> = TierKey::ALL.into_iter().map(|k| (k, 0)).collect();
    for event in events {
        *counts.entry(classify(event)).or_default() += 1;
    }

    counts
}

///
/// TESTS
///
