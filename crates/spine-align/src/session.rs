//! Annotation state as an immutable value.

use nalgebra::Point2;
use serde::Serialize;
use spine_align_core::{
    Calibration, LandmarkDefinition, LandmarkSet, LandmarkSetError, Region, DEFAULT_HIT_RADIUS_PX,
};
use spine_align_measure::{extract, Measurements, OverrideKey, OverrideMap};

/// Everything the pipeline needs to know about one case.
///
/// Every edit returns a new session; the previous one stays valid, which is
/// what an undo stack or a renderer diffing two states wants.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationSession {
    region: Region,
    age: f64,
    landmarks: LandmarkSet,
    overrides: OverrideMap,
    calibration: Option<Calibration>,
}

impl AnnotationSession {
    pub fn new(region: Region, age: f64) -> Self {
        Self {
            region,
            age,
            landmarks: LandmarkSet::new(region),
            overrides: OverrideMap::new(),
            calibration: None,
        }
    }

    /// Session over already placed landmarks.
    pub fn from_landmarks(landmarks: LandmarkSet, age: f64) -> Self {
        Self {
            region: landmarks.region(),
            age,
            landmarks,
            overrides: OverrideMap::new(),
            calibration: None,
        }
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn age(&self) -> f64 {
        self.age
    }

    #[inline]
    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    #[inline]
    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    #[inline]
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Definition the next click will fill, `None` once complete.
    pub fn next_landmark(&self) -> Option<&'static LandmarkDefinition> {
        self.landmarks.next_definition()
    }

    pub fn is_complete(&self) -> bool {
        self.landmarks.is_complete()
    }

    /// Enough landmarks for the first angle of the region (CL or LL).
    pub fn has_minimum_data(&self) -> bool {
        let needed = match self.region {
            Region::Cervical => 5,
            Region::Lumbar => 4,
        };
        self.landmarks.len() >= needed
    }

    /// Place the next landmark.
    pub fn with_landmark(&self, p: Point2<f64>) -> Result<Self, LandmarkSetError> {
        let mut next = self.clone();
        next.landmarks.push(p)?;
        Ok(next)
    }

    /// Drag an already placed landmark.
    pub fn with_moved_landmark(
        &self,
        index: usize,
        p: Point2<f64>,
    ) -> Result<Self, LandmarkSetError> {
        let mut next = self.clone();
        next.landmarks.move_landmark(index, p)?;
        Ok(next)
    }

    /// Index of the landmark under the cursor, most recent first.
    pub fn hit_test(&self, p: Point2<f64>) -> Option<usize> {
        self.landmarks.find_near(p, DEFAULT_HIT_RADIUS_PX)
    }

    /// Drop the most recent landmark; unchanged when empty.
    pub fn undo(&self) -> Self {
        let mut next = self.clone();
        next.landmarks.pop();
        next
    }

    /// Remove every landmark. Overrides and calibration are kept.
    pub fn cleared(&self) -> Self {
        let mut next = self.clone();
        next.landmarks.clear();
        next
    }

    fn edit_override(&self, key: OverrideKey, edit: impl FnOnce(&mut OverrideMap)) -> Self {
        let mut next = self.clone();
        if key.region() != self.region {
            log::debug!("ignoring {key} override for a {} session", self.region);
            return next;
        }
        edit(&mut next.overrides);
        next
    }

    /// Set or clear an override (non-positive values clear it).
    pub fn with_override(&self, key: OverrideKey, value_mm: f64) -> Self {
        self.edit_override(key, |o| {
            o.set(key, value_mm);
        })
    }

    /// Override from user text, parsed by [`OverrideMap::set_raw`]; invalid
    /// input clears the override.
    pub fn with_override_raw(&self, key: OverrideKey, raw: &str) -> Self {
        self.edit_override(key, |o| {
            o.set_raw(key, raw);
        })
    }

    pub fn with_overrides(&self, overrides: OverrideMap) -> Self {
        overrides
            .iter()
            .fold(self.clone(), |s, (key, value)| s.with_override(key, value))
    }

    pub fn with_age(&self, age: f64) -> Self {
        Self {
            age,
            ..self.clone()
        }
    }

    pub fn with_calibration(&self, calibration: Option<Calibration>) -> Self {
        Self {
            calibration,
            ..self.clone()
        }
    }

    /// Current measurements of the session.
    pub fn measurements(&self) -> Measurements {
        extract(&self.landmarks, &self.overrides, self.calibration.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn edits_leave_previous_session_intact() {
        let s0 = AnnotationSession::new(Region::Lumbar, 60.0);
        let s1 = s0.with_landmark(p(10.0, 10.0)).unwrap();
        let s2 = s1.with_landmark(p(50.0, 12.0)).unwrap();

        assert!(s0.landmarks().is_empty());
        assert_eq!(s1.landmarks().len(), 1);
        assert_eq!(s2.landmarks().len(), 2);
        assert_eq!(s2.undo(), s1);
        assert!(s2.cleared().landmarks().is_empty());
        assert_eq!(s0.undo(), s0);
    }

    #[test]
    fn drag_and_hit_test() {
        let s = AnnotationSession::new(Region::Cervical, 40.0)
            .with_landmark(p(100.0, 100.0))
            .unwrap()
            .with_landmark(p(105.0, 100.0))
            .unwrap();
        assert_eq!(s.hit_test(p(103.0, 101.0)), Some(1));
        assert_eq!(s.hit_test(p(200.0, 200.0)), None);

        let moved = s.with_moved_landmark(0, p(300.0, 300.0)).unwrap();
        assert_eq!(moved.landmarks().point(0), Some(p(300.0, 300.0)));
        assert!(s.with_moved_landmark(5, p(0.0, 0.0)).is_err());
    }

    #[test]
    fn overrides_are_region_scoped_and_survive_clear() {
        let s = AnnotationSession::new(Region::Cervical, 40.0)
            .with_override(OverrideKey::Csva, 15.0)
            .with_override(OverrideKey::Sva, 40.0);
        assert_eq!(s.overrides().get(OverrideKey::Csva), Some(15.0));
        assert_eq!(s.overrides().get(OverrideKey::Sva), None);

        let cleared = s.cleared();
        assert_eq!(cleared.overrides().get(OverrideKey::Csva), Some(15.0));
        assert_eq!(
            cleared.with_override_raw(OverrideKey::Csva, "abc").overrides().get(OverrideKey::Csva),
            None
        );
    }

    #[test]
    fn raw_override_text_follows_override_map() {
        let base =
            AnnotationSession::new(Region::Lumbar, 50.0).with_override(OverrideKey::Sva, 30.0);
        for raw in [" 42.5 ", "42", "0", "-3", "abc", "", "inf", "NaN", "1e2"] {
            let mut expected = base.overrides().clone();
            expected.set_raw(OverrideKey::Sva, raw);
            let session = base.with_override_raw(OverrideKey::Sva, raw);
            assert_eq!(session.overrides(), &expected, "input {raw:?}");
        }
        let ignored = base.with_override_raw(OverrideKey::Csva, "12");
        assert_eq!(ignored.overrides(), base.overrides());
    }

    #[test]
    fn minimum_data_per_region() {
        let mut s = AnnotationSession::new(Region::Lumbar, 50.0);
        for i in 0..4 {
            assert!(!s.has_minimum_data());
            s = s.with_landmark(p(i as f64 * 10.0, 0.0)).unwrap();
        }
        assert!(s.has_minimum_data());
        assert_eq!(s.next_landmark().map(|d| d.key), Some("s1_post_sup"));
    }
}
