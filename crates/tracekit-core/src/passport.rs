//! Product passport fragments and batch-level passport decoding.

use crate::{
    coerce::coerce_number,
    error::{EngineError, json_kind},
    field::{self, Aliases},
};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ENVIRONMENTAL: Aliases = &["environmental_impact", "environmentalImpact"];
const CIRCULARITY: Aliases = &["circularity", "circularity_metrics"];

///
/// Passport
///
/// One product-passport payload: an event fragment, a batch-level passport,
/// or the consolidation of several. Always a JSON object.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Passport(Map<String, Value>);

impl Passport {
    /// Read an event-attached fragment: an object, or a string that decodes
    /// to one. Anything else is treated as absent.
    #[must_use]
    pub fn from_fragment(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.clone())),
            Value::String(text) => serde_json::from_str::<Map<String, Value>>(text)
                .ok()
                .map(Self),
            _ => None,
        }
    }

    /// Shallow merge: every top-level key of `other` replaces ours.
    pub fn merge_from(&mut self, other: Self) {
        for (key, value) in other {
            self.0.insert(key, value);
        }
    }

    /// Read one numeric field, or `None` when the passport does not carry it.
    ///
    /// A carried but unreadable value is `Some(0.0)`, not `None`.
    #[must_use]
    pub fn number(&self, number: PassportNumber) -> Option<f64> {
        let section = field::first_object(&self.0, number.section());

        section
            .and_then(|section| field::first_present(section, number.keys()))
            .or_else(|| field::first_present(&self.0, number.keys()))
            .map(|value| coerce_number(Some(value)))
    }
}

impl From<Passport> for Value {
    fn from(passport: Passport) -> Self {
        Self::Object(passport.0)
    }
}

///
/// PassportNumber
///
/// Numeric passport fields the aggregator rolls up.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PassportNumber {
    Co2,
    Water,
    Energy,
    RecycledContent,
    Reusability,
    WasteReduction,
}

impl PassportNumber {
    /// Components summed into the circularity score.
    pub const CIRCULARITY: [Self; 3] =
        [Self::RecycledContent, Self::Reusability, Self::WasteReduction];

    const fn section(self) -> Aliases {
        match self {
            Self::Co2 | Self::Water | Self::Energy => ENVIRONMENTAL,
            Self::RecycledContent | Self::Reusability | Self::WasteReduction => CIRCULARITY,
        }
    }

    const fn keys(self) -> Aliases {
        match self {
            Self::Co2 => &["co2"],
            Self::Water => &["water"],
            Self::Energy => &["energy"],
            Self::RecycledContent => &["recycled_content", "recycledContent"],
            Self::Reusability => &["reusability"],
            Self::WasteReduction => &["waste_reduction", "wasteReduction"],
        }
    }
}

/// Decode a batch-level passport.
///
/// Accepted shapes: a JSON string holding any accepted shape, a wrapper
/// object with a `dpp` sub-field, or the passport object itself. Null,
/// blank strings and empty objects decode to `None`. A string that is not
/// valid JSON, or decodes to something other than an object, fails.
pub fn decode_batch_passport(value: &Value) -> Result<Option<Passport>, EngineError> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => {
            let decoded: Value = serde_json::from_str(text)
                .map_err(|err| EngineError::passport_decode(err.to_string()))?;

            match decoded {
                Value::Object(_) | Value::String(_) => decode_batch_passport(&decoded),
                Value::Null => Ok(None),
                other => Err(EngineError::passport_decode(format!(
                    "expected object, found {}",
                    json_kind(&other)
                ))),
            }
        }
        Value::Object(map) => match field::first_present(map, field::PASSPORT) {
            Some(inner) => decode_batch_passport(inner).map_err(|err| err.with_field("dpp")),
            None if map.is_empty() => Ok(None),
            None => Ok(Some(Passport(map.clone()))),
        },
        _ => Ok(None),
    }
}

///
/// TESTS
///
