//! Corrected landmark layout.
//!
//! Two independent steps, each a no-op unless the current value exceeds its
//! target and the landmarks it moves are placed:
//! 1. translate the upper reference towards the inferior one (SVA / cSVA);
//! 2. rotate the upper endplate about the lower endplate midpoint (lordosis).
//!
//! The translation never carries the offset past its target: re-measuring
//! the corrected layout gives a value between the target and the original.

use nalgebra::{Point2, Vector2};
use spine_align_core::{geometry, Calibration, LandmarkId, LandmarkSet, Region};
use spine_align_measure::{CervicalMeasurements, LumbarMeasurements, Measurements};
use spine_align_targets::{CervicalTargets, LumbarTargets, TargetPlan};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::SimulationParams;

/// Pixels per millimeter from the anthropometric prior.
///
/// Lumbar uses the L1–S1 endplate midpoint distance, cervical the C2–C7 one.
/// Falls back to `1.0` when those landmarks are missing or coincide.
pub fn estimate_px_per_mm(set: &LandmarkSet, params: &SimulationParams) -> f64 {
    use LandmarkId::*;

    let (upper, lower, reference_mm) = match set.region() {
        Region::Lumbar => (
            (L1SupAnt, L1SupPost),
            (S1SupAnt, S1SupPost),
            params.lumbar_reference_mm,
        ),
        Region::Cervical => (
            (C2SupAnt, C2SupPost),
            (C7InfAnt, C7InfPost),
            params.cervical_reference_mm,
        ),
    };
    let mid = |(a, b): (LandmarkId, LandmarkId)| Some(geometry::midpoint(set.get(a)?, set.get(b)?));

    match (mid(upper), mid(lower)) {
        (Some(u), Some(l)) if !geometry::is_degenerate_segment(u, l) && reference_mm > 0.0 => {
            geometry::distance(u, l) / reference_mm
        }
        _ => 1.0,
    }
}

/// Pixel scale used by the simulation: calibration first, prior otherwise.
pub fn pixel_scale(
    set: &LandmarkSet,
    calibration: Option<&Calibration>,
    params: &SimulationParams,
) -> f64 {
    calibration.map_or_else(|| estimate_px_per_mm(set, params), Calibration::px_per_mm)
}

/// The two pixel scales a correction works with.
#[derive(Clone, Copy, Debug)]
struct Scale {
    /// Scale used to turn a millimeter excess into a shift.
    px_per_mm: f64,
    /// Scale the extractor reports offsets with (1 px = 1 mm uncalibrated).
    measured_px_per_mm: f64,
}

/// Produce the illustrative corrected layout for `set`.
///
/// The result has the region and cardinality of `set`; `set` itself is not
/// touched. Mismatched regions between inputs return an unchanged copy.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(region = %set.region(), placed = set.len()))
)]
pub fn simulate(
    set: &LandmarkSet,
    measurements: &Measurements,
    targets: &TargetPlan,
    params: &SimulationParams,
    calibration: Option<&Calibration>,
) -> LandmarkSet {
    let mut corrected = set.clone();
    let scale = Scale {
        px_per_mm: pixel_scale(set, calibration, params),
        measured_px_per_mm: calibration.map_or(1.0, Calibration::px_per_mm),
    };

    match (set.region(), measurements, targets) {
        (Region::Lumbar, Measurements::Lumbar(m), TargetPlan::Lumbar(t)) => {
            correct_lumbar(&mut corrected, m, t, params, scale);
        }
        (Region::Cervical, Measurements::Cervical(m), TargetPlan::Cervical(t)) => {
            correct_cervical(&mut corrected, m, t, params, scale);
        }
        _ => {
            log::warn!(
                "simulation skipped: {} landmarks with {} measurements and {} targets",
                set.region(),
                measurements.region(),
                targets.region()
            );
        }
    }
    corrected
}

fn correct_lumbar(
    set: &mut LandmarkSet,
    m: &LumbarMeasurements,
    t: &LumbarTargets,
    params: &SimulationParams,
    scale: Scale,
) {
    use LandmarkId::*;

    if m.sva > t.target_sva {
        translate(
            set,
            (C7Centroid, S1PostSup),
            &[L1SupAnt, L1SupPost],
            Shift {
                px: (m.sva - t.target_sva) * scale.px_per_mm,
                keep_px: t.target_sva * scale.measured_px_per_mm,
                fraction: params.lumbar_shift_fraction,
            },
        );
    }

    let deficit = t.target_ll - m.ll;
    if deficit > 0.0 {
        let (Some(l1a), Some(l1p), Some(s1a), Some(s1p)) = (
            set.get(L1SupAnt),
            set.get(L1SupPost),
            set.get(S1SupAnt),
            set.get(S1SupPost),
        ) else {
            return;
        };
        // Turning L1 away from S1 opens the Cobb angle.
        let opening = geometry::signed_cobb_angle(l1a, l1p, s1a, s1p);
        let sign = if opening < 0.0 { -1.0 } else { 1.0 };
        let delta_rad = sign * deficit.to_radians();
        let pivot = geometry::midpoint(s1a, s1p);

        log::debug!("lumbar: LL deficit {deficit:.1}°, rotating about S1 midpoint");
        rotate(set, &[L1SupAnt, L1SupPost], pivot, delta_rad * params.rotation_fraction);
        rotate(set, &[C7Centroid], pivot, delta_rad * params.distal_rotation_fraction);
    }
}

fn correct_cervical(
    set: &mut LandmarkSet,
    m: &CervicalMeasurements,
    t: &CervicalTargets,
    params: &SimulationParams,
    scale: Scale,
) {
    use LandmarkId::*;

    if m.csva > t.target_csva {
        translate(
            set,
            (C2Centroid, C7SupPost),
            &[C2SupAnt, C2SupPost],
            Shift {
                px: (m.csva - t.target_csva) * scale.px_per_mm,
                keep_px: t.target_csva * scale.measured_px_per_mm,
                fraction: params.cervical_shift_fraction,
            },
        );
    }

    let delta = t.target_cl - m.cl;
    if delta.abs() > params.cl_dead_band_deg {
        let (Some(c7a), Some(c7p)) = (set.get(C7InfAnt), set.get(C7InfPost)) else {
            return;
        };
        // With the posterior corner to the right, turning C2 clockwise on
        // the film (positive angle, y down) deepens lordosis.
        let facing = if c7p.x > c7a.x { -1.0 } else { 1.0 };
        let pivot = geometry::midpoint(c7a, c7p);
        log::debug!("cervical: CL delta {delta:.1}°, rotating about C7 midpoint");
        rotate(
            set,
            &[C2SupAnt, C2SupPost, C2Centroid],
            pivot,
            facing * delta.to_radians() * params.rotation_fraction,
        );
    }
}

/// Horizontal translation request.
#[derive(Clone, Copy, Debug)]
struct Shift {
    /// Requested shift of the top reference.
    px: f64,
    /// Horizontal gap to the inferior reference that must remain.
    keep_px: f64,
    /// Share of the shift applied to the partial landmarks.
    fraction: f64,
}

/// Move `top` horizontally towards `inferior`, and `partial` landmarks by
/// `shift.fraction` of that. The shift is capped so at least
/// `shift.keep_px` of horizontal gap remains.
fn translate(
    set: &mut LandmarkSet,
    (top, inferior): (LandmarkId, LandmarkId),
    partial: &[LandmarkId],
    shift: Shift,
) {
    let (Some(top_pt), Some(inferior_pt)) = (set.get(top), set.get(inferior)) else {
        return;
    };
    let dx = inferior_pt.x - top_pt.x;
    if dx == 0.0 || !shift.px.is_finite() {
        return;
    }
    let room = (dx.abs() - shift.keep_px.max(0.0)).max(0.0);
    let shift_px = shift.px.min(room);
    if shift_px < shift.px {
        log::debug!(
            "{}: shift capped at {room:.1} px (requested {:.1} px)",
            set.region(),
            shift.px
        );
    }
    let fraction = shift.fraction;
    let dir = Vector2::new(dx.signum(), 0.0);
    log::debug!("{}: shifting {} by {shift_px:.1} px", set.region(), top.key());

    set.set(top, top_pt + dir * shift_px);
    for &id in partial {
        if let Some(p) = set.get(id) {
            set.set(id, p + dir * (shift_px * fraction));
        }
    }
}

fn rotate(set: &mut LandmarkSet, ids: &[LandmarkId], pivot: Point2<f64>, angle_rad: f64) {
    for &id in ids {
        if let Some(p) = set.get(id) {
            set.set(id, geometry::rotate_about(p, pivot, angle_rad));
        }
    }
}
