//! Illustrative post-correction landmark layouts.
//!
//! [`simulate`] moves a copy of the landmark set part of the way towards the
//! computed targets: a horizontal shift for SVA/cSVA and a rotation of the
//! upper endplate for lordosis. The fractions in [`SimulationParams`] are
//! deliberately below one, so re-measuring the output never reaches the
//! target. Treat the result as a visual aid, not as a surgical plan.

mod params;
mod simulate;

pub use params::SimulationParams;
pub use simulate::{estimate_px_per_mm, pixel_scale, simulate};
