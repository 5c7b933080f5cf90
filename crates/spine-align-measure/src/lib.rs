//! Landmark-to-parameter extraction for sagittal spine alignment.
//!
//! Given a [`LandmarkSet`](spine_align_core::LandmarkSet) for one region,
//! [`extract`] returns a fixed-shape [`Measurements`] record:
//! - cervical: CL (signed, lordosis negative), cSVA, T1S, CBVA;
//! - lumbar: LL, SVA, PI, PT.
//!
//! Values whose landmarks are not placed yet are `NaN` ("pending"); callers
//! treat them as not computable rather than as errors. Manual millimeter
//! overrides for cSVA/SVA come from an [`OverrideMap`].

mod extract;
mod measurements;
mod overrides;

pub use extract::{cervical_lordosis, extract, extract_cervical, extract_lumbar};
pub use measurements::{CervicalMeasurements, LumbarMeasurements, MeasurementId, Measurements};
pub use overrides::{OverrideKey, OverrideMap, ParseOverrideKeyError};
