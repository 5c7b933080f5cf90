//! Session → measurements → targets → corrected layout.

use serde::{Deserialize, Serialize};
use spine_align_core::{catalog, LandmarkId, LandmarkSet, Region};
use spine_align_measure::Measurements;
use spine_align_sim::{simulate, SimulationParams};
use spine_align_targets::{compute_targets, ClinicalParameter, OverallSeverity, TargetPlan};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::session::AnnotationSession;

/// Full output of one planning pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanResult {
    pub measurements: Measurements,
    pub targets: TargetPlan,
    /// Graded parameters in output order, copied from `targets`.
    pub parameters: Vec<ClinicalParameter>,
    pub overall: OverallSeverity,
    /// Illustrative corrected layout, same region and cardinality as the
    /// session's landmarks.
    pub corrected: LandmarkSet,
}

/// Run the whole pipeline on a session snapshot.
///
/// Never fails: missing landmarks only make the affected values pending.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip_all,
        fields(region = %session.region(), placed = session.landmarks().len(), age = session.age())
    )
)]
pub fn plan(session: &AnnotationSession, params: &SimulationParams) -> PlanResult {
    let measurements = session.measurements();
    let targets = compute_targets(&measurements, session.age());
    let corrected = simulate(
        session.landmarks(),
        &measurements,
        &targets,
        params,
        session.calibration(),
    );
    let parameters = targets.parameters().to_vec();
    let overall = targets.overall();

    log::info!(
        "{} plan: {}/{} landmarks, overall severity {}",
        session.region(),
        session.landmarks().len(),
        session.landmarks().capacity(),
        overall
    );

    PlanResult {
        measurements,
        targets,
        parameters,
        overall,
        corrected,
    }
}

/// One row of the landmark catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub index: usize,
    pub id: LandmarkId,
    pub label: String,
    pub short_label: String,
}

/// Landmark catalog of `region` in placement order.
pub fn catalog_report(region: Region) -> Vec<CatalogRow> {
    catalog(region)
        .iter()
        .enumerate()
        .map(|(index, def)| CatalogRow {
            index,
            id: def.id,
            label: def.label.to_string(),
            short_label: def.short_label.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_rows_follow_wire_ids() {
        let rows = catalog_report(Region::Cervical);
        assert_eq!(rows.len(), 10);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["id"], "c2_sup_ant");
        assert_eq!(json["index"], 0);

        let lumbar = catalog_report(Region::Lumbar);
        assert_eq!(lumbar.len(), 8);
        assert_eq!(lumbar[7].id, LandmarkId::FhRight);
    }

    #[test]
    fn empty_session_plans_as_pending() {
        let session = AnnotationSession::new(Region::Lumbar, 50.0);
        let result = plan(&session, &SimulationParams::default());
        assert!(result.measurements.is_fully_pending());
        assert_eq!(result.overall, OverallSeverity::None);
        assert_eq!(result.parameters.len(), 4);
        assert!(result.corrected.is_empty());
    }
}
