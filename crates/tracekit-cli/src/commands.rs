use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::{fs, path::Path};
use tracekit_config::Config;
use tracekit_core::{
    batch::BatchInput,
    obs::{CounterSink, NoopSink},
    tier::{TierKey, TierLabels},
    view::{ViewOptions, reconstruct_with},
};
use tracing::info;

/// Read and parse one batch document from disk.
pub(crate) fn load_batch(path: &Path) -> Result<BatchInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    BatchInput::from_value(&value)
        .with_context(|| format!("{} is not a batch document", path.display()))
}

/// Engine options derived from the config file.
pub(crate) fn view_options(config: &Config) -> ViewOptions {
    let labels = TierKey::ALL
        .into_iter()
        .zip(config.labels.entries())
        .fold(TierLabels::default(), |labels, (key, (_, label))| match label {
            Some(label) => labels.with_label(key, label),
            None => labels,
        });

    ViewOptions {
        labels,
        per_tier_stats: config.output.per_tier_stats,
    }
}

pub(crate) fn reconstruct(input: &Path, config: &Config, metrics: bool) -> Result<Value> {
    let batch = load_batch(input)?;
    let sink = CounterSink::new();
    let view = reconstruct_with(&batch, &view_options(config), &sink);

    info!(
        input = %input.display(),
        events = view.summary.event_count,
        diagnostics = view.diagnostics.len(),
        "reconstructed batch"
    );

    if metrics {
        Ok(json!({ "view": view, "metrics": sink.report() }))
    } else {
        to_value(&view)
    }
}

pub(crate) fn stats(input: &Path, config: &Config, tier: Option<TierKey>) -> Result<Value> {
    let batch = load_batch(input)?;
    let options = ViewOptions {
        per_tier_stats: true,
        ..view_options(config)
    };
    let mut view = reconstruct_with(&batch, &options, &NoopSink);

    match tier {
        // a tier without events has no scope to roll up
        Some(tier) => to_value(&view.tier_stats.remove(&tier).unwrap_or_default()),
        None => to_value(&view.stats),
    }
}

pub(crate) fn tiers(input: &Path, config: &Config) -> Result<Value> {
    let batch = load_batch(input)?;
    let options = ViewOptions {
        per_tier_stats: false,
        ..view_options(config)
    };
    let view = reconstruct_with(&batch, &options, &NoopSink);

    let groups = view
        .groups
        .iter()
        .map(|group| {
            json!({
                "key": group.key,
                "label": group.label,
                "count": group.events.len(),
                "event_ids": group
                    .events
                    .iter()
                    .map(|event| event.event_id.as_deref())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(Value::Array(groups))
}

pub(crate) fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");

    Ok(())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to serialize output")
}

///
/// TESTS
///
