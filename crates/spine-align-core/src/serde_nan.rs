//! Serde helpers for `f64` fields where `NaN` means "not yet computable".
//!
//! JSON has no NaN, so pending values travel as `null`. Use with
//! `#[serde(with = "spine_align_core::serde_nan")]`.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Probe {
        #[serde(with = "super")]
        v: f64,
    }

    #[test]
    fn nan_travels_as_null() {
        let json = serde_json::to_string(&Probe { v: f64::NAN }).unwrap();
        assert_eq!(json, r#"{"v":null}"#);
        let back: Probe = serde_json::from_str(&json).unwrap();
        assert!(back.v.is_nan());

        let back: Probe = serde_json::from_str(r#"{"v":12.5}"#).unwrap();
        assert_eq!(back.v, 12.5);
    }
}
