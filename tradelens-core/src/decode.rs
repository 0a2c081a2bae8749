//! Lenient numeric decoding for indexer payloads.
//!
//! The indexer serializes decimals as strings (`"3150.5"`), sometimes as
//! numbers, and omits or nulls fields it has no value for. These helpers
//! accept all of those shapes. Anything unparseable or non-finite becomes
//! zero (or `None` for the optional variant).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn parse(self) -> Option<f64> {
        let value = match self {
            NumberOrText::Number(v) => v,
            NumberOrText::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Decode a number or numeric string; null and garbage decode to 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(NumberOrText::parse).unwrap_or(0.0))
}

/// Decode an optional number; null and garbage decode to `None`.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(NumberOrText::parse))
}
