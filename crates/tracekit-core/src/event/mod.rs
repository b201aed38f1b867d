mod normalize;
mod raw;

#[cfg(test)]
mod tests;

pub use normalize::normalize;
pub use raw::RawEventRecord;

use crate::{
    passport::Passport,
    time::{TimeKey, time_key},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

///
/// NormalizedEvent
///
/// Canonical event shape produced by the normalizer. The same shape is used
/// after the merge stage (see [`MergedEvent`]).
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NormalizedEvent {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub action: Option<String>,
    pub biz_step: Option<String>,
    pub disposition: Option<String>,
    pub event_time: Option<String>,
    pub read_point: Option<String>,
    pub biz_location: Option<String>,
    pub epc_list: BTreeSet<String>,
    pub passport_fragment: Option<Passport>,
    pub extensions: Map<String, Value>,
    pub owner_role: Option<String>,
}

/// A normalized event after identity merge. `epc_list` is the union of all
/// contributing records; `extensions` and `passport_fragment` are
/// shallow-merged in source priority order.
pub type MergedEvent = NormalizedEvent;

impl NormalizedEvent {
    /// Chronological sort key; missing or unparseable times sort first.
    #[must_use]
    pub fn time_key(&self) -> TimeKey {
        time_key(self.event_time.as_deref())
    }

    /// Fold a later record of the same identity into this one.
    ///
    /// Scalars present on `later` overwrite ours, identifier sets union, and
    /// maps merge key-by-key with `later` winning collisions.
    pub fn absorb(&mut self, later: Self) {
        overwrite(&mut self.event_id, later.event_id);
        overwrite(&mut self.event_type, later.event_type);
        overwrite(&mut self.action, later.action);
        overwrite(&mut self.biz_step, later.biz_step);
        overwrite(&mut self.disposition, later.disposition);
        overwrite(&mut self.event_time, later.event_time);
        overwrite(&mut self.read_point, later.read_point);
        overwrite(&mut self.biz_location, later.biz_location);
        overwrite(&mut self.owner_role, later.owner_role);

        self.epc_list.extend(later.epc_list);
        self.extensions.extend(later.extensions);

        if let Some(incoming) = later.passport_fragment {
            self.passport_fragment
                .get_or_insert_with(Passport::default)
                .merge_from(incoming);
        }
    }

    /// Render back to a raw record under the canonical keys.
    ///
    /// Normalizing the result yields this event again.
    #[must_use]
    pub fn to_raw(&self) -> RawEventRecord {
        let mut map = Map::new();
        let scalars = [
            ("event_id", &self.event_id),
            ("event_type", &self.event_type),
            ("action", &self.action),
            ("biz_step", &self.biz_step),
            ("disposition", &self.disposition),
            ("event_time", &self.event_time),
            ("read_point", &self.read_point),
            ("biz_location", &self.biz_location),
            ("owner_role", &self.owner_role),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        if !self.epc_list.is_empty() {
            let epcs = self.epc_list.iter().cloned().map(Value::String).collect();
            map.insert("epc_list".to_string(), Value::Array(epcs));
        }
        if !self.extensions.is_empty() {
            map.insert(
                "extensions".to_string(),
                Value::Object(self.extensions.clone()),
            );
        }
        if let Some(passport) = &self.passport_fragment {
            map.insert("dpp".to_string(), Value::from(passport.clone()));
        }

        RawEventRecord::new(map)
    }
}

// last-write-wins for one optional scalar
fn overwrite(slot: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}
