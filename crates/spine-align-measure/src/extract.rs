//! Landmark → measurement extraction.
//!
//! Every value is computed only once its landmark prerequisites are placed;
//! until then it stays `NaN`. Degenerate geometry (coincident endplate
//! points) also yields `NaN` instead of a meaningless angle.

use nalgebra::Point2;
use spine_align_core::{geometry, Calibration, LandmarkId, LandmarkSet, Region};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::measurements::{CervicalMeasurements, LumbarMeasurements, Measurements};
use crate::overrides::{OverrideKey, OverrideMap};

type Segment = (Point2<f64>, Point2<f64>);

fn segment(set: &LandmarkSet, a: LandmarkId, b: LandmarkId) -> Option<Segment> {
    Some((set.get(a)?, set.get(b)?))
}

fn usable(seg: Segment, what: &str) -> Option<Segment> {
    if geometry::is_degenerate_segment(seg.0, seg.1) {
        log::debug!("{what}: degenerate segment, value left pending");
        None
    } else {
        Some(seg)
    }
}

/// Horizontal offset between two points, converted to mm.
///
/// Without a calibration one pixel is reported as one millimeter.
fn horizontal_offset_mm(
    upper: Point2<f64>,
    lower: Point2<f64>,
    calibration: Option<&Calibration>,
) -> f64 {
    let px = (upper.x - lower.x).abs();
    calibration.map_or(px, |c| c.px_to_mm(px))
}

/// Extract the measurement record for the set's region.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(region = %set.region(), placed = set.len()))
)]
pub fn extract(
    set: &LandmarkSet,
    overrides: &OverrideMap,
    calibration: Option<&Calibration>,
) -> Measurements {
    match set.region() {
        Region::Cervical => {
            Measurements::Cervical(extract_cervical(set, overrides, calibration))
        }
        Region::Lumbar => Measurements::Lumbar(extract_lumbar(set, overrides, calibration)),
    }
}

/// Cervical parameters: CL, cSVA, T1S, CBVA.
///
/// A lumbar set yields an all-pending record.
pub fn extract_cervical(
    set: &LandmarkSet,
    overrides: &OverrideMap,
    calibration: Option<&Calibration>,
) -> CervicalMeasurements {
    use LandmarkId::*;

    let mut out = CervicalMeasurements::PENDING;
    if set.region() != Region::Cervical {
        return out;
    }

    let c2 = segment(set, C2SupAnt, C2SupPost);
    let c7 = segment(set, C7InfAnt, C7InfPost);
    if let (Some(c2), Some(c7)) = (c2, c7) {
        if let (Some(c2), Some(c7)) = (usable(c2, "CL (C2)"), usable(c7, "CL (C7)")) {
            out.cl = cervical_lordosis(c2, c7);
        }
    }

    if let Some((c2_centroid, c7_post_sup)) = segment(set, C2Centroid, C7SupPost) {
        out.csva = overrides
            .get(OverrideKey::Csva)
            .unwrap_or_else(|| horizontal_offset_mm(c2_centroid, c7_post_sup, calibration));
    }

    if let Some((ant, post)) = segment(set, T1SupAnt, T1SupPost).and_then(|s| usable(s, "T1S")) {
        out.t1s = geometry::line_angle(ant, post);
    }

    if let Some((chin, brow)) = segment(set, Chin, Brow).and_then(|s| usable(s, "CBVA")) {
        out.cbva = geometry::angle_to_vertical(chin, brow);
    }

    log::debug!(
        "cervical measurements ({} landmarks): cl={:.1} csva={:.1} t1s={:.1} cbva={:.1}",
        set.len(),
        out.cl,
        out.csva,
        out.t1s,
        out.cbva
    );
    out
}

/// Signed cervical lordosis between the C2 superior and C7 inferior
/// endplates, both given anterior → posterior. Lordosis is negative.
///
/// The magnitude is the Cobb angle. The sign comes from where the endplates
/// converge: closer together at the posterior corners than at the anterior
/// ones reads as lordosis. Mirroring the film leaves both distances, and so
/// the result, unchanged.
pub fn cervical_lordosis(c2: Segment, c7: Segment) -> f64 {
    let magnitude = geometry::cobb_angle(c2.0, c2.1, c7.0, c7.1);
    let anterior = geometry::distance(c2.0, c7.0);
    let posterior = geometry::distance(c2.1, c7.1);
    if posterior < anterior {
        -magnitude
    } else {
        magnitude
    }
}

/// Lumbopelvic parameters: LL, SVA, PI, PT.
///
/// A cervical set yields an all-pending record.
pub fn extract_lumbar(
    set: &LandmarkSet,
    overrides: &OverrideMap,
    calibration: Option<&Calibration>,
) -> LumbarMeasurements {
    use LandmarkId::*;

    let mut out = LumbarMeasurements::PENDING;
    if set.region() != Region::Lumbar {
        return out;
    }

    let l1 = segment(set, L1SupAnt, L1SupPost);
    let s1 = segment(set, S1SupAnt, S1SupPost);
    if let (Some(l1), Some(s1)) = (l1, s1) {
        if let (Some(l1), Some(s1)) = (usable(l1, "LL (L1)"), usable(s1, "LL (S1)")) {
            out.ll = geometry::cobb_angle(l1.0, l1.1, s1.0, s1.1);
        }
    }

    if let Some((s1_post_sup, c7)) = segment(set, S1PostSup, C7Centroid) {
        out.sva = overrides
            .get(OverrideKey::Sva)
            .unwrap_or_else(|| horizontal_offset_mm(c7, s1_post_sup, calibration));
    }

    if let (Some(s1), Some((fh_left, fh_right))) = (s1, segment(set, FhLeft, FhRight)) {
        let hip_center = geometry::midpoint(fh_left, fh_right);
        let s1_mid = geometry::midpoint(s1.0, s1.1);
        let endplate_ok = usable(s1, "PI (S1)").is_some();
        let hip_ok = usable((s1_mid, hip_center), "PI/PT (hip axis)").is_some();
        if endplate_ok && hip_ok {
            out.pi = geometry::compute_pi(s1.0, s1.1, hip_center);
        }
        if hip_ok {
            out.pt = geometry::compute_pt(s1_mid, hip_center);
        }
    }

    log::debug!(
        "lumbar measurements ({} landmarks): ll={:.1} sva={:.1} pi={:.1} pt={:.1}",
        set.len(),
        out.ll,
        out.sva,
        out.pi,
        out.pt
    );
    out
}
