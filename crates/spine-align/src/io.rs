//! JSON case files and plan reports.

use std::{
    fs,
    path::{Path, PathBuf},
};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use spine_align_core::{Calibration, CalibrationError, LandmarkSet, LandmarkSetError, Region};
use spine_align_measure::{Measurements, OverrideKey, OverrideMap};
use spine_align_sim::SimulationParams;
use spine_align_targets::{AgeBucket, ClinicalParameter, OverallSeverity, TargetPlan, NORMS};

use crate::pipeline::PlanResult;
use crate::session::AnnotationSession;

#[derive(thiserror::Error, Debug)]
pub enum PlanIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CaseConfigError {
    #[error(transparent)]
    Landmarks(#[from] LandmarkSetError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error("override `{key}` does not apply to a {region} case")]
    OverrideRegion { key: OverrideKey, region: Region },
}

/// Film calibration as written in a case file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalibrationSpec {
    /// Known scale.
    Scale { mm_per_px: f64 },
    /// Ruler of known length between two image points.
    Reference {
        p1: [f64; 2],
        p2: [f64; 2],
        known_mm: f64,
    },
}

impl CalibrationSpec {
    pub fn build(&self) -> Result<Calibration, CalibrationError> {
        match *self {
            CalibrationSpec::Scale { mm_per_px } => Calibration::from_mm_per_px(mm_per_px),
            CalibrationSpec::Reference { p1, p2, known_mm } => {
                Calibration::from_reference(point(p1), point(p2), known_mm)
            }
        }
    }
}

fn point([x, y]: [f64; 2]) -> Point2<f64> {
    Point2::new(x, y)
}

fn to_pairs(set: &LandmarkSet) -> Vec<[f64; 2]> {
    set.points().iter().map(|p| [p.x, p.y]).collect()
}

/// One annotated case, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    pub region: Region,
    /// Patient age in years.
    pub age: f64,
    /// Placed landmarks `[x, y]` in catalog order.
    #[serde(default)]
    pub landmarks: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "OverrideMap::is_empty")]
    pub overrides: OverrideMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl CaseConfig {
    /// Load a JSON case from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PlanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this case to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PlanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Case file describing `session`.
    pub fn from_session(session: &AnnotationSession) -> Self {
        Self {
            region: session.region(),
            age: session.age(),
            landmarks: to_pairs(session.landmarks()),
            overrides: session.overrides().clone(),
            calibration: session.calibration().map(|c| CalibrationSpec::Scale {
                mm_per_px: c.mm_per_px(),
            }),
            simulation: None,
            output_path: None,
        }
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("spine_align_plan.json"))
    }

    pub fn simulation_params(&self) -> SimulationParams {
        self.simulation.clone().unwrap_or_default()
    }

    /// Build a validated session from the case.
    pub fn build_session(&self) -> Result<AnnotationSession, CaseConfigError> {
        let landmarks =
            LandmarkSet::from_points(self.region, self.landmarks.iter().copied().map(point))?;
        let calibration = self.calibration.as_ref().map(CalibrationSpec::build).transpose()?;

        if let Some((key, _)) = self.overrides.iter().find(|(k, _)| k.region() != self.region) {
            return Err(CaseConfigError::OverrideRegion {
                key,
                region: self.region,
            });
        }

        Ok(AnnotationSession::from_landmarks(landmarks, self.age)
            .with_overrides(self.overrides.clone())
            .with_calibration(calibration))
    }
}

/// Plan report written by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub case: CaseConfig,
    pub norms_version: String,
    pub age_bucket: String,
    #[serde(default)]
    pub measurements: Option<Measurements>,
    #[serde(default)]
    pub targets: Option<TargetPlan>,
    #[serde(default)]
    pub parameters: Vec<ClinicalParameter>,
    #[serde(default)]
    pub overall: OverallSeverity,
    #[serde(default)]
    pub corrected_landmarks: Vec<[f64; 2]>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PlanReport {
    fn empty(case: CaseConfig) -> Self {
        Self {
            norms_version: NORMS.version.to_string(),
            age_bucket: AgeBucket::from_age(case.age).label().to_string(),
            case,
            measurements: None,
            targets: None,
            parameters: Vec::new(),
            overall: OverallSeverity::None,
            corrected_landmarks: Vec::new(),
            error: None,
        }
    }

    pub fn from_result(case: CaseConfig, result: &PlanResult) -> Self {
        Self {
            measurements: Some(result.measurements),
            targets: Some(result.targets.clone()),
            parameters: result.parameters.clone(),
            overall: result.overall,
            corrected_landmarks: to_pairs(&result.corrected),
            ..Self::empty(case)
        }
    }

    /// Report for a case that could not be planned.
    pub fn failed(case: CaseConfig, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(case)
        }
    }

    /// Load a JSON report from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PlanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PlanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = r#"{
        "region": "cervical",
        "age": 58,
        "landmarks": [[200, 100], [250, 95], [230, 120]],
        "overrides": {"csva": 15.0},
        "calibration": {"p1": [0, 0], "p2": [0, 200], "known_mm": 50}
    }"#;

    #[test]
    fn case_json_builds_session() {
        let case: CaseConfig = serde_json::from_str(CASE).unwrap();
        let session = case.build_session().unwrap();
        assert_eq!(session.region(), Region::Cervical);
        assert_eq!(session.age(), 58.0);
        assert_eq!(session.landmarks().len(), 3);
        assert_eq!(session.overrides().get(OverrideKey::Csva), Some(15.0));
        assert_eq!(session.calibration().unwrap().mm_per_px(), 0.25);
        assert_eq!(case.output_path(), PathBuf::from("spine_align_plan.json"));
        assert_eq!(case.simulation_params(), SimulationParams::default());
    }

    #[test]
    fn session_round_trips_through_case_json() {
        let case: CaseConfig = serde_json::from_str(CASE).unwrap();
        let session = case.build_session().unwrap();

        let json = serde_json::to_string(&CaseConfig::from_session(&session)).unwrap();
        let back: CaseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.build_session().unwrap(), session);
    }

    #[test]
    fn invalid_cases_are_rejected() {
        let mut case: CaseConfig = serde_json::from_str(CASE).unwrap();
        case.landmarks = vec![[0.0, 0.0]; 11];
        assert!(matches!(
            case.build_session(),
            Err(CaseConfigError::Landmarks(LandmarkSetError::TooMany { .. }))
        ));

        let mut case: CaseConfig = serde_json::from_str(CASE).unwrap();
        case.calibration = Some(CalibrationSpec::Scale { mm_per_px: 0.0 });
        assert!(matches!(
            case.build_session(),
            Err(CaseConfigError::Calibration(_))
        ));

        let mut case: CaseConfig = serde_json::from_str(CASE).unwrap();
        case.overrides = OverrideMap::new().with(OverrideKey::Sva, 30.0);
        assert_eq!(
            case.build_session(),
            Err(CaseConfigError::OverrideRegion {
                key: OverrideKey::Sva,
                region: Region::Cervical
            })
        );
    }

    #[test]
    fn failed_report_keeps_case_echo() {
        let case: CaseConfig = serde_json::from_str(CASE).unwrap();
        let report = PlanReport::failed(case.clone(), "boom");
        assert_eq!(report.error.as_deref(), Some("boom"));
        assert_eq!(report.age_bucket, "55-64");
        assert_eq!(report.norms_version, NORMS.version);

        let json = serde_json::to_string(&report).unwrap();
        let back: PlanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.case, case);
        assert!(back.measurements.is_none());
    }
}
