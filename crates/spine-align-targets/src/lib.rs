//! Age-adjusted correction targets and severity grading.
//!
//! [`compute_targets`] turns a [`Measurements`](spine_align_measure::Measurements)
//! record and the patient age into a [`TargetPlan`]: per-region targets plus
//! four graded [`ClinicalParameter`] rows. All reference values live in
//! [`NORMS`].
//!
//! ```
//! use spine_align_measure::{LumbarMeasurements, Measurements};
//! use spine_align_targets::{compute_targets, OverallSeverity, ParameterId};
//!
//! let m = Measurements::Lumbar(LumbarMeasurements { ll: 40.0, sva: 65.0, pi: 55.0, pt: 14.0 });
//! let plan = compute_targets(&m, 50.0);
//! let pill = plan.parameter(ParameterId::PiLl).unwrap();
//! assert_eq!(pill.severity.as_ref().unwrap().text, "Moderate (Schwab ++)");
//! assert_eq!(plan.overall(), OverallSeverity::Moderate);
//! ```

mod engine;
mod norms;
mod parameter;
mod severity;

pub use engine::{
    compute_cervical_targets, compute_lumbar_targets, compute_targets, CervicalTargets,
    LumbarTargets, TargetPlan,
};
pub use norms::{
    AgeBucket, AgeNorms, CervicalNorms, ExcessBreakpoints, LumbarNorms, NormativeTable, NORMS,
};
pub use parameter::{overall_severity, ClinicalParameter, ParameterId};
pub use severity::{OverallSeverity, Severity, SeverityTier};
