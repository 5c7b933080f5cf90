use serde::{Deserialize, Serialize};

/// Coefficients of the illustrative correction.
///
/// Fractions are in `(0, 1)`: the simulated layout moves towards the target
/// without reaching it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Share of the SVA shift applied to the L1 endplate pair.
    pub lumbar_shift_fraction: f64,
    /// Share of the cSVA shift applied to the C2 endplate pair.
    pub cervical_shift_fraction: f64,
    /// Share of the lordosis deficit applied to the upper endplate.
    pub rotation_fraction: f64,
    /// Share of the lumbar deficit applied to the C7 centroid.
    pub distal_rotation_fraction: f64,
    /// Assumed L1–S1 midpoint distance, mm.
    pub lumbar_reference_mm: f64,
    /// Assumed C2–C7 midpoint distance, mm.
    pub cervical_reference_mm: f64,
    /// Cervical lordosis deltas up to this size are left alone, degrees.
    pub cl_dead_band_deg: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            lumbar_shift_fraction: 0.4,
            cervical_shift_fraction: 0.8,
            rotation_fraction: 0.3,
            distal_rotation_fraction: 0.2,
            lumbar_reference_mm: 150.0,
            cervical_reference_mm: 100.0,
            cl_dead_band_deg: 2.0,
        }
    }
}
