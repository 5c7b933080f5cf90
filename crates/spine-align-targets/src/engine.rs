//! Age-adjusted targets and severity grading.

use serde::{Deserialize, Serialize};
use spine_align_core::{serde_nan, Region};
use spine_align_measure::{CervicalMeasurements, LumbarMeasurements, Measurements};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::norms::{AgeBucket, NORMS};
use crate::parameter::{overall_severity, ClinicalParameter, ParameterId};
use crate::severity::{grade_excess, OverallSeverity, Severity, SeverityTier};

/// Cervical targets and graded parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CervicalTargets {
    /// `-(T1S - 16.5)`, lordosis negative.
    pub target_cl: f64,
    pub target_csva: f64,
    /// `T1S - |CL|`; `NaN` while either input is pending.
    #[serde(with = "serde_nan")]
    pub t1s_cl: f64,
    pub params: Vec<ClinicalParameter>,
}

/// Lumbopelvic targets and graded parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LumbarTargets {
    /// `PI - LL`; `NaN` while either input is pending.
    #[serde(with = "serde_nan")]
    pub pi_ll: f64,
    pub target_sva: f64,
    pub target_pt: f64,
    pub target_pi_ll: f64,
    /// `PI - target PI-LL`; `NaN` while PI is pending.
    #[serde(with = "serde_nan")]
    pub target_ll: f64,
    pub params: Vec<ClinicalParameter>,
}

/// Targets for one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum TargetPlan {
    Cervical(CervicalTargets),
    Lumbar(LumbarTargets),
}

impl TargetPlan {
    pub fn region(&self) -> Region {
        match self {
            TargetPlan::Cervical(_) => Region::Cervical,
            TargetPlan::Lumbar(_) => Region::Lumbar,
        }
    }

    /// Graded parameters in output order (4 entries).
    pub fn parameters(&self) -> &[ClinicalParameter] {
        match self {
            TargetPlan::Cervical(t) => &t.params,
            TargetPlan::Lumbar(t) => &t.params,
        }
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&ClinicalParameter> {
        self.parameters().iter().find(|p| p.id == id)
    }

    pub fn overall(&self) -> OverallSeverity {
        overall_severity(self.parameters())
    }

    pub fn as_cervical(&self) -> Option<&CervicalTargets> {
        match self {
            TargetPlan::Cervical(t) => Some(t),
            TargetPlan::Lumbar(_) => None,
        }
    }

    pub fn as_lumbar(&self) -> Option<&LumbarTargets> {
        match self {
            TargetPlan::Lumbar(t) => Some(t),
            TargetPlan::Cervical(_) => None,
        }
    }
}

/// Compute targets and grades for the region of `measurements`.
///
/// Pending inputs produce pending parameters, never an error.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(measurements), fields(region = %measurements.region()))
)]
pub fn compute_targets(measurements: &Measurements, age: f64) -> TargetPlan {
    let plan = match measurements {
        Measurements::Cervical(m) => TargetPlan::Cervical(compute_cervical_targets(m, age)),
        Measurements::Lumbar(m) => TargetPlan::Lumbar(compute_lumbar_targets(m, age)),
    };
    log::debug!(
        "{} targets for age {age} ({}): overall {}",
        plan.region(),
        AgeBucket::from_age(age).label(),
        plan.overall()
    );
    plan
}

fn within_or(needed: bool, text: impl FnOnce() -> String) -> String {
    if needed {
        text()
    } else {
        String::from("Within target")
    }
}

pub fn compute_cervical_targets(m: &CervicalMeasurements, age: f64) -> CervicalTargets {
    let norms = &NORMS.cervical;
    let target_csva = AgeBucket::from_age(age).norms().target_csva_mm;

    let t1s_for_target = if m.t1s.is_nan() {
        norms.t1s_fallback_deg
    } else {
        m.t1s
    };
    let target_cl = -(t1s_for_target - norms.cl_t1s_offset_deg);
    let t1s_cl = m.t1s - m.cl.abs();

    let mut cl = ClinicalParameter::new(
        ParameterId::Cl,
        m.cl,
        format!("{target_cl:.1}°"),
        target_cl,
    );
    cl.explanation =
        format!("Target: CL ≈ T1S({t1s_for_target:.1}°) − 16.5° = {target_cl:.1}°");
    if !m.cl.is_nan() {
        let diff = m.cl - target_cl;
        cl.correction_text = within_or(diff.abs() >= norms.cl_tolerance_deg, || {
            format!("{diff:.1}° correction needed")
        });
        cl.severity = Some(Severity::plain(classify_cl(diff.abs())));
    }

    let mut csva = ClinicalParameter::new(
        ParameterId::Csva,
        m.csva,
        format!("< {target_csva} mm"),
        target_csva,
    );
    csva.explanation = format!("Threshold < 40mm (HRQOL); age-adjusted target: {target_csva}mm");
    if !m.csva.is_nan() {
        csva.correction_text = within_or(m.csva > target_csva, || {
            format!("{:.1} mm reduction needed", m.csva - target_csva)
        });
        csva.severity = Some(Severity::plain(classify_csva(m.csva, age)));
    }

    let (lo, hi) = norms.t1s_cl_corridor_deg;
    let mut mismatch = ClinicalParameter::new(
        ParameterId::T1sCl,
        t1s_cl,
        format!("{lo}° – {hi}°"),
        norms.t1s_cl_target_deg,
    );
    if !t1s_cl.is_nan() {
        mismatch.explanation = format!(
            "T1S({:.1}°) − |CL|({:.1}°) = {t1s_cl:.1}°",
            m.t1s,
            m.cl.abs()
        );
        mismatch.correction_text = if t1s_cl > hi {
            format!("{:.1}° excess — increase lordosis", t1s_cl - hi)
        } else if t1s_cl < lo {
            format!("{:.1}° deficit", lo - t1s_cl)
        } else {
            String::from("Within target")
        };
        mismatch.severity = Some(Severity::plain(classify_t1s_cl(t1s_cl)));
    } else {
        mismatch.explanation = String::from("T1S − |CL|");
    }

    let gaze = norms.cbva_abs_deg[0];
    let mut cbva = ClinicalParameter::new(
        ParameterId::Cbva,
        m.cbva,
        format!("−{gaze}° to +{gaze}°"),
        0.0,
    );
    cbva.explanation = String::from("Neutral horizontal gaze window");
    if !m.cbva.is_nan() {
        cbva.correction_text = if m.cbva.abs() <= gaze {
            String::from("Within target")
        } else if m.cbva > gaze {
            format!("{:.1}° extension correction needed", m.cbva - gaze)
        } else {
            format!("{:.1}° flexion correction needed", m.cbva.abs() - gaze)
        };
        cbva.severity = Some(Severity::plain(classify_cbva(m.cbva)));
    }

    CervicalTargets {
        target_cl,
        target_csva,
        t1s_cl,
        params: vec![cl, csva, mismatch, cbva],
    }
}

pub fn compute_lumbar_targets(m: &LumbarMeasurements, age: f64) -> LumbarTargets {
    let bucket = AgeBucket::from_age(age).norms();
    let norms = &NORMS.lumbar;
    let target_sva = bucket.target_sva_mm;
    let target_pt = bucket.target_pt_deg;
    let target_pi_ll = bucket.target_pi_ll_deg;

    let pi_ll = m.pi - m.ll;
    let target_ll = m.pi - target_pi_ll;

    let mut sva = ClinicalParameter::new(
        ParameterId::Sva,
        m.sva,
        format!("< {target_sva} mm"),
        target_sva,
    );
    sva.explanation = String::from("Age-adjusted threshold (Schwab-SRS/Lafage)");
    if !m.sva.is_nan() {
        sva.correction_text = within_or(m.sva > target_sva, || {
            format!("{:.1} mm reduction needed", m.sva - target_sva)
        });
        sva.severity = Some(if m.sva <= target_sva {
            Severity::plain(SeverityTier::Normal)
        } else {
            Severity::schwab(grade_excess(m.sva - target_sva, norms.sva_excess))
        });
    }

    let mut mismatch = ClinicalParameter::new(
        ParameterId::PiLl,
        pi_ll,
        format!("< {target_pi_ll}°"),
        target_pi_ll,
    );
    if !pi_ll.is_nan() {
        mismatch.explanation = format!(
            "PI = {:.1}° | Current LL = {:.1}° | Target LL ≈ {target_ll:.0}°",
            m.pi, m.ll
        );
        mismatch.correction_text = within_or(pi_ll > target_pi_ll, || {
            format!(
                "{:.1}° of additional lordosis needed (target LL ≈ {target_ll:.0}°)",
                pi_ll - target_pi_ll
            )
        });
        mismatch.severity = Some(if pi_ll <= target_pi_ll {
            Severity::new(SeverityTier::Normal, "Matched")
        } else {
            Severity::schwab(grade_excess(pi_ll - target_pi_ll, norms.pi_ll_excess))
        });
    } else {
        mismatch.explanation = String::from("PI − LL");
    }

    let mut pt = ClinicalParameter::new(
        ParameterId::Pt,
        m.pt,
        format!("< {target_pt}°"),
        target_pt,
    );
    pt.explanation =
        String::from("Compensatory retroversion indicator; normalizes with LL correction");
    if !m.pt.is_nan() {
        pt.correction_text = within_or(m.pt > target_pt, || {
            format!(
                "{:.1}° reduction expected with lordosis restoration",
                m.pt - target_pt
            )
        });
        pt.severity = Some(if m.pt <= target_pt {
            Severity::plain(SeverityTier::Normal)
        } else {
            Severity::plain(grade_excess(m.pt - target_pt, norms.pt_excess))
        });
    }

    let ll_target_expr = if target_ll.is_nan() {
        String::from("PI − target PI-LL")
    } else {
        format!("≥ {target_ll:.1}°")
    };
    let mut ll = ClinicalParameter::new(ParameterId::Ll, m.ll, ll_target_expr, target_ll);
    ll.explanation = format!("Target LL = PI − {target_pi_ll}° (age-adjusted PI-LL)");
    let deficit = target_ll - m.ll;
    if !deficit.is_nan() {
        ll.correction_text = within_or(deficit > 0.0, || {
            format!("{deficit:.1}° of lordosis to restore")
        });
        ll.severity = Some(if deficit <= 0.0 {
            Severity::plain(SeverityTier::Normal)
        } else {
            Severity::schwab(grade_excess(deficit, norms.pi_ll_excess))
        });
    }

    LumbarTargets {
        pi_ll,
        target_sva,
        target_pt,
        target_pi_ll,
        target_ll,
        params: vec![sva, mismatch, pt, ll],
    }
}

fn classify_cl(deviation: f64) -> SeverityTier {
    let [normal, mild, moderate] = NORMS.cervical.cl_deviation;
    if deviation < normal {
        SeverityTier::Normal
    } else if deviation < mild {
        SeverityTier::Mild
    } else if deviation < moderate {
        SeverityTier::Moderate
    } else {
        SeverityTier::Severe
    }
}

fn classify_csva(csva: f64, age: f64) -> SeverityTier {
    let norms = &NORMS.cervical;
    let [normal, mild, moderate] = norms.csva_abs_mm;
    if csva < normal {
        SeverityTier::Normal
    } else if csva < mild {
        if age >= norms.csva_elderly_age {
            SeverityTier::Normal
        } else {
            SeverityTier::Mild
        }
    } else if csva < moderate {
        SeverityTier::Moderate
    } else {
        SeverityTier::Severe
    }
}

fn classify_t1s_cl(mismatch: f64) -> SeverityTier {
    let norms = &NORMS.cervical;
    let (lo, hi) = norms.t1s_cl_corridor_deg;
    if (lo..=hi).contains(&mismatch) {
        return SeverityTier::Normal;
    }
    let outside = if mismatch > hi {
        mismatch - hi
    } else {
        lo - mismatch
    };
    grade_excess(outside, norms.t1s_cl_outside)
}

fn classify_cbva(cbva: f64) -> SeverityTier {
    let [normal, mild, moderate] = NORMS.cervical.cbva_abs_deg;
    let v = cbva.abs();
    if v <= normal {
        SeverityTier::Normal
    } else if v <= mild {
        SeverityTier::Mild
    } else if v <= moderate {
        SeverityTier::Moderate
    } else {
        SeverityTier::Severe
    }
}
