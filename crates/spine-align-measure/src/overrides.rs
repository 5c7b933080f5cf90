//! Manual millimeter overrides for pixel-derived offsets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use spine_align_core::Region;

/// Parameters a clinician may override with a known millimeter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKey {
    Csva,
    Sva,
}

impl OverrideKey {
    pub fn as_str(self) -> &'static str {
        match self {
            OverrideKey::Csva => "csva",
            OverrideKey::Sva => "sva",
        }
    }

    pub fn region(self) -> Region {
        match self {
            OverrideKey::Csva => Region::Cervical,
            OverrideKey::Sva => Region::Lumbar,
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown override key `{0}` (expected `csva` or `sva`)")]
pub struct ParseOverrideKeyError(pub String);

impl FromStr for OverrideKey {
    type Err = ParseOverrideKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csva" => Ok(OverrideKey::Csva),
            "sva" => Ok(OverrideKey::Sva),
            _ => Err(ParseOverrideKeyError(s.to_string())),
        }
    }
}

/// Sparse map of accepted overrides, in mm.
///
/// Only finite values > 0 are kept; anything else removes the entry so the
/// pixel-derived value applies again. Deserialization follows the same rule.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<OverrideKey, f64>")]
pub struct OverrideMap {
    values: BTreeMap<OverrideKey, f64>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear an override. Returns whether the value was accepted.
    pub fn set(&mut self, key: OverrideKey, value_mm: f64) -> bool {
        if value_mm.is_finite() && value_mm > 0.0 {
            self.values.insert(key, value_mm);
            true
        } else {
            if self.values.remove(&key).is_some() {
                log::debug!("override {key} cleared");
            }
            false
        }
    }

    /// Set from user text; non-numeric input clears the override.
    pub fn set_raw(&mut self, key: OverrideKey, raw: &str) -> bool {
        let value = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
        self.set(key, value)
    }

    /// Builder-style [`OverrideMap::set`].
    pub fn with(mut self, key: OverrideKey, value_mm: f64) -> Self {
        self.set(key, value_mm);
        self
    }

    #[inline]
    pub fn get(&self, key: OverrideKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn remove(&mut self, key: OverrideKey) -> Option<f64> {
        self.values.remove(&key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverrideKey, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}

impl From<BTreeMap<OverrideKey, f64>> for OverrideMap {
    fn from(raw: BTreeMap<OverrideKey, f64>) -> Self {
        let mut map = OverrideMap::new();
        for (key, value) in raw {
            map.set(key, value);
        }
        map
    }
}

impl Serialize for OverrideMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
