use std::fmt;

use serde::{Deserialize, Serialize};
use spine_align_core::{serde_nan, Region};

/// Raw radiographic measurements, as extracted from landmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementId {
    Cl,
    Csva,
    T1s,
    Cbva,
    Ll,
    Sva,
    Pi,
    Pt,
}

impl MeasurementId {
    pub const CERVICAL: [MeasurementId; 4] = [
        MeasurementId::Cl,
        MeasurementId::Csva,
        MeasurementId::T1s,
        MeasurementId::Cbva,
    ];
    pub const LUMBAR: [MeasurementId; 4] = [
        MeasurementId::Ll,
        MeasurementId::Sva,
        MeasurementId::Pi,
        MeasurementId::Pt,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MeasurementId::Cl => "cl",
            MeasurementId::Csva => "csva",
            MeasurementId::T1s => "t1s",
            MeasurementId::Cbva => "cbva",
            MeasurementId::Ll => "ll",
            MeasurementId::Sva => "sva",
            MeasurementId::Pi => "pi",
            MeasurementId::Pt => "pt",
        }
    }

    /// Short sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            MeasurementId::Cl => "CL",
            MeasurementId::Csva => "cSVA",
            MeasurementId::T1s => "T1S",
            MeasurementId::Cbva => "CBVA",
            MeasurementId::Ll => "LL",
            MeasurementId::Sva => "SVA",
            MeasurementId::Pi => "PI",
            MeasurementId::Pt => "PT",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MeasurementId::Csva | MeasurementId::Sva => "mm",
            _ => "°",
        }
    }

    pub fn region(self) -> Region {
        match self {
            MeasurementId::Cl | MeasurementId::Csva | MeasurementId::T1s | MeasurementId::Cbva => {
                Region::Cervical
            }
            _ => Region::Lumbar,
        }
    }

    /// Number of placed landmarks the measurement needs.
    pub fn min_landmarks(self) -> usize {
        match self {
            MeasurementId::Cl => 5,
            MeasurementId::Csva => 6,
            MeasurementId::T1s => 8,
            MeasurementId::Cbva => 10,
            MeasurementId::Ll => 4,
            MeasurementId::Sva => 6,
            MeasurementId::Pi | MeasurementId::Pt => 8,
        }
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cervical measurements. `NaN` marks a value that is not computable yet.
///
/// `cl` is signed: lordosis is negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CervicalMeasurements {
    #[serde(with = "serde_nan")]
    pub cl: f64,
    #[serde(with = "serde_nan")]
    pub csva: f64,
    #[serde(with = "serde_nan")]
    pub t1s: f64,
    #[serde(with = "serde_nan")]
    pub cbva: f64,
}

impl CervicalMeasurements {
    pub const PENDING: CervicalMeasurements = CervicalMeasurements {
        cl: f64::NAN,
        csva: f64::NAN,
        t1s: f64::NAN,
        cbva: f64::NAN,
    };
}

/// Lumbopelvic measurements. `NaN` marks a value that is not computable yet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LumbarMeasurements {
    #[serde(with = "serde_nan")]
    pub ll: f64,
    #[serde(with = "serde_nan")]
    pub sva: f64,
    #[serde(with = "serde_nan")]
    pub pi: f64,
    #[serde(with = "serde_nan")]
    pub pt: f64,
}

impl LumbarMeasurements {
    pub const PENDING: LumbarMeasurements = LumbarMeasurements {
        ll: f64::NAN,
        sva: f64::NAN,
        pi: f64::NAN,
        pt: f64::NAN,
    };
}

/// Region-tagged measurement record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum Measurements {
    Cervical(CervicalMeasurements),
    Lumbar(LumbarMeasurements),
}

impl Measurements {
    pub fn pending(region: Region) -> Self {
        match region {
            Region::Cervical => Measurements::Cervical(CervicalMeasurements::PENDING),
            Region::Lumbar => Measurements::Lumbar(LumbarMeasurements::PENDING),
        }
    }

    pub fn region(&self) -> Region {
        match self {
            Measurements::Cervical(_) => Region::Cervical,
            Measurements::Lumbar(_) => Region::Lumbar,
        }
    }

    /// Unrounded value; `None` when `id` belongs to the other region.
    pub fn get(&self, id: MeasurementId) -> Option<f64> {
        match (self, id) {
            (Measurements::Cervical(m), MeasurementId::Cl) => Some(m.cl),
            (Measurements::Cervical(m), MeasurementId::Csva) => Some(m.csva),
            (Measurements::Cervical(m), MeasurementId::T1s) => Some(m.t1s),
            (Measurements::Cervical(m), MeasurementId::Cbva) => Some(m.cbva),
            (Measurements::Lumbar(m), MeasurementId::Ll) => Some(m.ll),
            (Measurements::Lumbar(m), MeasurementId::Sva) => Some(m.sva),
            (Measurements::Lumbar(m), MeasurementId::Pi) => Some(m.pi),
            (Measurements::Lumbar(m), MeasurementId::Pt) => Some(m.pt),
            _ => None,
        }
    }

    /// Display form: one decimal, or `--` while pending.
    pub fn display(&self, id: MeasurementId) -> String {
        match self.get(id) {
            Some(v) if v.is_finite() => format!("{v:.1}"),
            _ => "--".to_string(),
        }
    }

    /// Measurement ids of this record, in sidebar order.
    pub fn ids(&self) -> &'static [MeasurementId] {
        match self {
            Measurements::Cervical(_) => &MeasurementId::CERVICAL,
            Measurements::Lumbar(_) => &MeasurementId::LUMBAR,
        }
    }

    pub fn is_fully_pending(&self) -> bool {
        self.ids()
            .iter()
            .all(|&id| self.get(id).is_none_or(f64::is_nan))
    }

    pub fn as_cervical(&self) -> Option<&CervicalMeasurements> {
        match self {
            Measurements::Cervical(m) => Some(m),
            Measurements::Lumbar(_) => None,
        }
    }

    pub fn as_lumbar(&self) -> Option<&LumbarMeasurements> {
        match self {
            Measurements::Lumbar(m) => Some(m),
            Measurements::Cervical(_) => None,
        }
    }
}
