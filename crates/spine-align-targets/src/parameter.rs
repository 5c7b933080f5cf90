use std::fmt;

use serde::{Deserialize, Serialize};
use spine_align_core::{serde_nan, Region};

use crate::severity::{OverallSeverity, Severity};

/// Graded clinical parameters, with their wire ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterId {
    #[serde(rename = "cl")]
    Cl,
    #[serde(rename = "csva")]
    Csva,
    #[serde(rename = "t1s_cl")]
    T1sCl,
    #[serde(rename = "cbva")]
    Cbva,
    #[serde(rename = "sva")]
    Sva,
    #[serde(rename = "pill")]
    PiLl,
    #[serde(rename = "pt")]
    Pt,
    #[serde(rename = "ll")]
    Ll,
}

impl ParameterId {
    /// Cervical output order.
    pub const CERVICAL: [ParameterId; 4] = [
        ParameterId::Cl,
        ParameterId::Csva,
        ParameterId::T1sCl,
        ParameterId::Cbva,
    ];
    /// Lumbar output order.
    pub const LUMBAR: [ParameterId; 4] = [
        ParameterId::Sva,
        ParameterId::PiLl,
        ParameterId::Pt,
        ParameterId::Ll,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ParameterId::Cl => "cl",
            ParameterId::Csva => "csva",
            ParameterId::T1sCl => "t1s_cl",
            ParameterId::Cbva => "cbva",
            ParameterId::Sva => "sva",
            ParameterId::PiLl => "pill",
            ParameterId::Pt => "pt",
            ParameterId::Ll => "ll",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParameterId::Cl => "Cervical Lordosis (CL)",
            ParameterId::Csva => "Cervical SVA (cSVA)",
            ParameterId::T1sCl => "T1S – CL Mismatch",
            ParameterId::Cbva => "Chin-Brow Vertical Angle (CBVA)",
            ParameterId::Sva => "Sagittal Vertical Axis (SVA)",
            ParameterId::PiLl => "PI-LL Mismatch",
            ParameterId::Pt => "Pelvic Tilt (PT)",
            ParameterId::Ll => "Lumbar Lordosis (LL)",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ParameterId::Csva | ParameterId::Sva => "mm",
            _ => "°",
        }
    }

    pub fn region(self) -> Region {
        match self {
            ParameterId::Cl | ParameterId::Csva | ParameterId::T1sCl | ParameterId::Cbva => {
                Region::Cervical
            }
            _ => Region::Lumbar,
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One graded row of the correction plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClinicalParameter {
    pub id: ParameterId,
    pub label: String,
    /// Unrounded current value; `NaN` while pending.
    #[serde(with = "serde_nan")]
    pub current: f64,
    pub unit: String,
    /// Human readable target, e.g. `"< 30 mm"`.
    pub target_expression: String,
    #[serde(with = "serde_nan")]
    pub target_val: f64,
    pub correction_text: String,
    /// `None` while pending.
    pub severity: Option<Severity>,
    pub explanation: String,
}

impl ClinicalParameter {
    pub(crate) fn new(id: ParameterId, current: f64, target_expression: String, target_val: f64) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            current,
            unit: id.unit().to_string(),
            target_expression,
            target_val,
            correction_text: String::from("Pending"),
            severity: None,
            explanation: String::new(),
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.severity.is_none()
    }

    /// Current value as shown: one decimal, `--` while pending.
    pub fn display_current(&self) -> String {
        if self.current.is_finite() {
            format!("{:.1}{}", self.current, self.unit)
        } else {
            "--".to_string()
        }
    }
}

/// Worst graded tier; `None` when nothing is graded yet.
pub fn overall_severity<'a>(
    params: impl IntoIterator<Item = &'a ClinicalParameter>,
) -> OverallSeverity {
    params
        .into_iter()
        .filter_map(|p| p.severity.as_ref())
        .map(|s| OverallSeverity::from(s.tier))
        .max()
        .unwrap_or(OverallSeverity::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::SeverityTier;

    fn graded(id: ParameterId, tier: Option<SeverityTier>) -> ClinicalParameter {
        let mut p = ClinicalParameter::new(id, 1.0, String::new(), 0.0);
        p.severity = tier.map(Severity::plain);
        p
    }

    #[test]
    fn overall_is_worst_graded_tier() {
        let params = [
            graded(ParameterId::Sva, Some(SeverityTier::Mild)),
            graded(ParameterId::PiLl, Some(SeverityTier::Moderate)),
            graded(ParameterId::Pt, None),
            graded(ParameterId::Ll, Some(SeverityTier::Normal)),
        ];
        assert_eq!(overall_severity(&params), OverallSeverity::Moderate);
    }

    #[test]
    fn overall_is_none_without_graded_parameters() {
        let none: [ClinicalParameter; 0] = [];
        assert_eq!(overall_severity(&none), OverallSeverity::None);
        let pending = [graded(ParameterId::Cl, None)];
        assert_eq!(overall_severity(&pending), OverallSeverity::None);
    }

    #[test]
    fn wire_ids() {
        assert_eq!(serde_json::to_string(&ParameterId::PiLl).unwrap(), "\"pill\"");
        assert_eq!(serde_json::to_string(&ParameterId::T1sCl).unwrap(), "\"t1s_cl\"");
        let keys: Vec<_> = ParameterId::CERVICAL
            .iter()
            .chain(&ParameterId::LUMBAR)
            .map(|p| p.key())
            .collect();
        assert_eq!(
            keys,
            ["cl", "csva", "t1s_cl", "cbva", "sva", "pill", "pt", "ll"]
        );
    }

    #[test]
    fn pending_parameter_serializes_nulls() {
        let p = graded(ParameterId::Cbva, None);
        let p = ClinicalParameter {
            current: f64::NAN,
            ..p
        };
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["current"].is_null());
        assert!(json["severity"].is_null());
        assert_eq!(json["correction_text"], "Pending");
        assert_eq!(p.display_current(), "--");
    }
}
