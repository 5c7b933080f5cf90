use approx::assert_relative_eq;
use nalgebra::Point2;
use spine_align::measure::{LumbarMeasurements, MeasurementId};
use spine_align::targets::{compute_targets, SeverityTier};
use spine_align::{
    plan, AnnotationSession, Calibration, CaseConfig, LandmarkId, Measurements, OverallSeverity,
    OverrideKey, ParameterId, PlanReport, Region, SimulationParams,
};

const CERVICAL: [(f64, f64); 10] = [
    (200.0, 95.0),
    (250.0, 100.0),
    (230.0, 120.0),
    (210.0, 310.0),
    (260.0, 300.0),
    (255.0, 280.0),
    (212.0, 318.0),
    (262.0, 330.0),
    (150.0, 200.0),
    (160.0, 60.0),
];

const LUMBAR: [(f64, f64); 8] = [
    (300.0, 200.0),
    (350.0, 205.0),
    (320.0, 600.0),
    (365.0, 640.0),
    (368.0, 645.0),
    (420.0, 20.0),
    (300.0, 700.0),
    (310.0, 704.0),
];

fn annotate(region: Region, age: f64, pts: &[(f64, f64)]) -> AnnotationSession {
    pts.iter()
        .fold(AnnotationSession::new(region, age), |s, &(x, y)| {
            s.with_landmark(Point2::new(x, y)).expect("room for landmark")
        })
}

#[test]
fn cervical_case_end_to_end() {
    let session = annotate(Region::Cervical, 40.0, &CERVICAL);
    let result = plan(&session, &SimulationParams::default());

    let m = result.measurements.as_cervical().expect("cervical");
    assert_relative_eq!(m.cl, -17.02, epsilon = 0.01);
    assert_relative_eq!(m.csva, 25.0);
    assert_relative_eq!(m.t1s, 13.50, epsilon = 0.01);
    assert_relative_eq!(m.cbva, 4.09, epsilon = 0.01);

    let ids: Vec<_> = result.parameters.iter().map(|p| p.id).collect();
    assert_eq!(ids, ParameterId::CERVICAL);
    assert!(result.parameters.iter().all(|p| !p.is_pending()));

    // cSVA 25 mm at age 40 against a 17 mm target.
    let csva = &result.parameters[1];
    assert_eq!(csva.correction_text, "8.0 mm reduction needed");
    assert_eq!(csva.severity.as_ref().unwrap().tier, SeverityTier::Mild);

    // T1S - |CL| is far below the 16-26° corridor.
    let mismatch = &result.parameters[2];
    assert_eq!(mismatch.severity.as_ref().unwrap().tier, SeverityTier::Severe);
    assert_eq!(result.overall, OverallSeverity::Severe);
    assert_eq!(result.corrected.len(), session.landmarks().len());
}

#[test]
fn override_precedence_through_session() {
    let session = annotate(Region::Cervical, 40.0, &CERVICAL);
    let pixel = session.measurements().get(MeasurementId::Csva).unwrap();
    assert_ne!(pixel, 15.0);

    let overridden = session.with_override_raw(OverrideKey::Csva, "15");
    assert_eq!(overridden.measurements().get(MeasurementId::Csva), Some(15.0));

    let reverted = overridden.with_override_raw(OverrideKey::Csva, "-1");
    assert_eq!(reverted.measurements().get(MeasurementId::Csva), Some(pixel));
}

#[test]
fn lumbar_reference_scenario_grades() {
    let m = Measurements::Lumbar(LumbarMeasurements {
        ll: 40.0,
        sva: 65.0,
        pi: 55.0,
        pt: 14.0,
    });
    let targets = compute_targets(&m, 50.0);
    let lumbar = targets.as_lumbar().unwrap();
    assert_relative_eq!(lumbar.pi_ll, 15.0);
    assert_eq!(lumbar.target_pi_ll, 5.0);
    assert_eq!(lumbar.target_sva, 30.0);

    let tier = |id| {
        targets
            .parameter(id)
            .and_then(|p| p.severity.as_ref())
            .map(|s| s.tier)
    };
    assert_eq!(tier(ParameterId::PiLl), Some(SeverityTier::Moderate));
    assert_eq!(tier(ParameterId::Sva), Some(SeverityTier::Moderate));
}

#[test]
fn partial_annotation_keeps_later_values_pending() {
    let session = annotate(Region::Lumbar, 70.0, &LUMBAR[..4]);
    let result = plan(&session, &SimulationParams::default());
    let m = result.measurements.as_lumbar().unwrap();
    assert!(m.ll.is_finite());
    assert!(m.sva.is_nan() && m.pi.is_nan() && m.pt.is_nan());

    let ll = result.parameters.iter().find(|p| p.id == ParameterId::Ll).unwrap();
    assert!(ll.is_pending(), "LL target needs PI");
    let sva = result.parameters.iter().find(|p| p.id == ParameterId::Sva).unwrap();
    assert_eq!(sva.correction_text, "Pending");
    assert_eq!(result.overall, OverallSeverity::None);
    assert_eq!(result.corrected, *session.landmarks());
}

#[test]
fn corrected_layout_reduces_cervical_deformity_partially() {
    let session = annotate(Region::Cervical, 40.0, &CERVICAL);
    let result = plan(&session, &SimulationParams::default());
    let before = result.measurements.as_cervical().unwrap();
    let target_cl = result.targets.as_cervical().unwrap().target_cl;

    let after = AnnotationSession::from_landmarks(result.corrected.clone(), 40.0).measurements();
    let after = after.as_cervical().unwrap();
    assert!(after.cl > before.cl && after.cl < target_cl);
    // T1 and the gaze line are never moved.
    assert_eq!(after.t1s, before.t1s);
    assert_eq!(after.cbva, before.cbva);
}

#[test]
fn uncalibrated_translation_never_overshoots_target() {
    let params = SimulationParams {
        rotation_fraction: 0.0,
        distal_rotation_fraction: 0.0,
        ..SimulationParams::default()
    };
    let mut lumbar = LUMBAR;
    lumbar[5] = (468.0, 20.0);

    for (region, pts, id, param) in [
        (Region::Lumbar, &lumbar[..], MeasurementId::Sva, ParameterId::Sva),
        (Region::Cervical, &CERVICAL[..], MeasurementId::Csva, ParameterId::Csva),
    ] {
        let session = annotate(region, 30.0, pts);
        let result = plan(&session, &params);
        let before = result.measurements.get(id).unwrap();
        let target = result.targets.parameter(param).unwrap().target_val;
        assert!(before > target, "{id}: {before} vs {target}");

        let after = AnnotationSession::from_landmarks(result.corrected, 30.0)
            .measurements()
            .get(id)
            .unwrap();
        assert!(
            after >= target - 1e-9 && after < before,
            "{id}: {before} -> {after} (target {target})"
        );
    }
}

#[test]
fn mirrored_film_grades_the_same() {
    let mirrored: Vec<_> = CERVICAL.iter().map(|&(x, y)| (500.0 - x, y)).collect();
    let a = plan(&annotate(Region::Cervical, 40.0, &CERVICAL), &SimulationParams::default());
    let b = plan(&annotate(Region::Cervical, 40.0, &mirrored), &SimulationParams::default());

    let cl = |r: &spine_align::PlanResult| r.measurements.as_cervical().unwrap().cl;
    assert_relative_eq!(cl(&a), cl(&b), epsilon = 1e-9);
    assert!(cl(&a) < 0.0);
    let tiers = |r: &spine_align::PlanResult| {
        r.parameters
            .iter()
            .map(|p| p.severity.as_ref().map(|s| s.tier))
            .collect::<Vec<_>>()
    };
    assert_eq!(tiers(&a), tiers(&b));
    assert_eq!(a.overall, b.overall);
}

#[test]
fn calibration_scales_sva_and_shift() {
    let session = annotate(Region::Lumbar, 50.0, &LUMBAR)
        .with_calibration(Some(Calibration::from_mm_per_px(2.0).unwrap()));
    let params = SimulationParams {
        rotation_fraction: 0.0,
        distal_rotation_fraction: 0.0,
        ..SimulationParams::default()
    };
    let result = plan(&session, &params);
    let m = result.measurements.as_lumbar().unwrap();
    assert_relative_eq!(m.sva, 104.0);

    // (104 - 30) mm at 0.5 px/mm, towards S1 (leftwards).
    let c7 = result.corrected.get(LandmarkId::C7Centroid).unwrap();
    assert_relative_eq!(c7.x, 420.0 - 37.0, epsilon = 1e-9);
    assert_relative_eq!(c7.y, 20.0, epsilon = 1e-9);
    let l1 = result.corrected.get(LandmarkId::L1SupPost).unwrap();
    assert_relative_eq!(l1.x, 350.0 - 0.4 * 37.0, epsilon = 1e-9);
}

#[test]
fn case_file_round_trip_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = annotate(Region::Lumbar, 66.0, &LUMBAR).with_override(OverrideKey::Sva, 48.0);

    let case_path = dir.path().join("case.json");
    CaseConfig::from_session(&session)
        .write_json(&case_path)
        .expect("write case");
    let case = CaseConfig::load_json(&case_path).expect("load case");
    let rebuilt = case.build_session().expect("valid case");
    assert_eq!(rebuilt, session);

    let result = plan(&rebuilt, &case.simulation_params());
    let report_path = dir.path().join("report.json");
    PlanReport::from_result(case, &result)
        .write_json(&report_path)
        .expect("write report");

    let report = PlanReport::load_json(&report_path).expect("load report");
    assert_eq!(report.age_bucket, "65-74");
    assert_eq!(report.parameters.len(), 4);
    assert_eq!(report.corrected_landmarks.len(), 8);
    assert_eq!(report.overall, result.overall);
    assert_eq!(
        report.measurements.and_then(|m| m.get(MeasurementId::Sva)),
        Some(48.0)
    );
    assert!(report.error.is_none());
}
