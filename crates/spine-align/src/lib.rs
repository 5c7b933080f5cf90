//! High-level facade crate for the `spine-align-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry, measurement, target and simulation crates
//! - [`AnnotationSession`], an immutable snapshot of one annotated radiograph
//! - [`plan`], the end-to-end pipeline from landmarks to graded parameters
//!   and an illustrative corrected layout
//! - JSON case files and reports ([`CaseConfig`], [`PlanReport`])
//!
//! ## Quickstart
//!
//! ```
//! use nalgebra::Point2;
//! use spine_align::{plan, AnnotationSession, Region, SimulationParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = AnnotationSession::new(Region::Lumbar, 62.0);
//! for (x, y) in [(300.0, 200.0), (350.0, 205.0), (320.0, 600.0), (365.0, 640.0)] {
//!     session = session.with_landmark(Point2::new(x, y))?;
//! }
//!
//! let result = plan(&session, &SimulationParams::default());
//! println!("LL = {}", result.measurements.display(spine_align::measure::MeasurementId::Ll));
//! println!("overall: {}", result.overall);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `spine_align::core`: regions, landmark catalogs, landmark sets, geometry, calibration.
//! - `spine_align::measure`: landmark → measurement extraction and overrides.
//! - `spine_align::targets`: normative table, targets and severity grading.
//! - `spine_align::sim`: illustrative corrected landmark layout.
//!
//! Results are decision support only. Targets come from population norms and
//! the corrected layout is deliberately partial; neither replaces clinical
//! judgement.

pub use spine_align_core as core;
pub use spine_align_measure as measure;
pub use spine_align_sim as sim;
pub use spine_align_targets as targets;

pub use spine_align_core::{Calibration, LandmarkId, LandmarkSet, Region};
pub use spine_align_measure::{Measurements, OverrideKey, OverrideMap};
pub use spine_align_sim::SimulationParams;
pub use spine_align_targets::{ClinicalParameter, OverallSeverity, ParameterId, TargetPlan};

mod io;
mod pipeline;
mod session;

pub use io::{CalibrationSpec, CaseConfig, CaseConfigError, PlanIoError, PlanReport};
pub use pipeline::{catalog_report, plan, CatalogRow, PlanResult};
pub use session::AnnotationSession;
