//! Landmark catalogs and the ordered landmark set placed on a radiograph.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Default hit-test radius used when picking a placed landmark, in pixels.
pub const DEFAULT_HIT_RADIUS_PX: f64 = 12.0;

/// Spine region being annotated. Selects catalog, formulas and norms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Cervical,
    Lumbar,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Cervical => "cervical",
            Region::Lumbar => "lumbar",
        }
    }

    /// Ordered landmark catalog for this region.
    #[inline]
    pub fn catalog(self) -> &'static [LandmarkDefinition] {
        catalog(self)
    }

    /// Number of landmarks a complete set holds.
    #[inline]
    pub fn landmark_count(self) -> usize {
        self.catalog().len()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown region `{0}` (expected `cervical` or `lumbar`)")]
pub struct ParseRegionError(pub String);

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cervical" => Ok(Region::Cervical),
            "lumbar" => Ok(Region::Lumbar),
            _ => Err(ParseRegionError(s.to_string())),
        }
    }
}

/// Typed landmark identity. Wire keys match the downstream rendering/export
/// consumers verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkId {
    #[serde(rename = "c2_sup_ant")]
    C2SupAnt,
    #[serde(rename = "c2_sup_post")]
    C2SupPost,
    #[serde(rename = "c2_centroid")]
    C2Centroid,
    #[serde(rename = "c7_inf_ant")]
    C7InfAnt,
    #[serde(rename = "c7_inf_post")]
    C7InfPost,
    #[serde(rename = "c7_sup_post")]
    C7SupPost,
    #[serde(rename = "t1_sup_ant")]
    T1SupAnt,
    #[serde(rename = "t1_sup_post")]
    T1SupPost,
    #[serde(rename = "chin")]
    Chin,
    #[serde(rename = "brow")]
    Brow,
    #[serde(rename = "l1_sup_ant")]
    L1SupAnt,
    #[serde(rename = "l1_sup_post")]
    L1SupPost,
    #[serde(rename = "s1_sup_ant")]
    S1SupAnt,
    #[serde(rename = "s1_sup_post")]
    S1SupPost,
    #[serde(rename = "s1_post_sup")]
    S1PostSup,
    #[serde(rename = "c7_centroid")]
    C7Centroid,
    #[serde(rename = "fh_left")]
    FhLeft,
    #[serde(rename = "fh_right")]
    FhRight,
}

impl LandmarkId {
    pub fn region(self) -> Region {
        use LandmarkId::*;
        match self {
            C2SupAnt | C2SupPost | C2Centroid | C7InfAnt | C7InfPost | C7SupPost | T1SupAnt
            | T1SupPost | Chin | Brow => Region::Cervical,
            L1SupAnt | L1SupPost | S1SupAnt | S1SupPost | S1PostSup | C7Centroid | FhLeft
            | FhRight => Region::Lumbar,
        }
    }

    /// Position of this landmark in its region's catalog (placement order).
    pub fn index(self) -> usize {
        use LandmarkId::*;
        match self {
            C2SupAnt | L1SupAnt => 0,
            C2SupPost | L1SupPost => 1,
            C2Centroid | S1SupAnt => 2,
            C7InfAnt | S1SupPost => 3,
            C7InfPost | S1PostSup => 4,
            C7SupPost | C7Centroid => 5,
            T1SupAnt | FhLeft => 6,
            T1SupPost | FhRight => 7,
            Chin => 8,
            Brow => 9,
        }
    }

    #[inline]
    pub fn definition(self) -> &'static LandmarkDefinition {
        &catalog(self.region())[self.index()]
    }

    #[inline]
    pub fn key(self) -> &'static str {
        self.definition().key
    }
}

/// Static description of one landmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LandmarkDefinition {
    pub id: LandmarkId,
    pub key: &'static str,
    pub label: &'static str,
    pub short_label: &'static str,
}

const fn def(
    id: LandmarkId,
    key: &'static str,
    label: &'static str,
    short_label: &'static str,
) -> LandmarkDefinition {
    LandmarkDefinition {
        id,
        key,
        label,
        short_label,
    }
}

pub const CERVICAL_LANDMARKS: [LandmarkDefinition; 10] = [
    def(
        LandmarkId::C2SupAnt,
        "c2_sup_ant",
        "C2 Superior Endplate (Anterior)",
        "C2 Sup Ant",
    ),
    def(
        LandmarkId::C2SupPost,
        "c2_sup_post",
        "C2 Superior Endplate (Posterior)",
        "C2 Sup Post",
    ),
    def(LandmarkId::C2Centroid, "c2_centroid", "C2 Centroid", "C2 Center"),
    def(
        LandmarkId::C7InfAnt,
        "c7_inf_ant",
        "C7 Inferior Endplate (Anterior)",
        "C7 Inf Ant",
    ),
    def(
        LandmarkId::C7InfPost,
        "c7_inf_post",
        "C7 Inferior Endplate (Posterior)",
        "C7 Inf Post",
    ),
    def(
        LandmarkId::C7SupPost,
        "c7_sup_post",
        "C7 Posterior-Superior Corner",
        "C7 Post-Sup",
    ),
    def(
        LandmarkId::T1SupAnt,
        "t1_sup_ant",
        "T1 Superior Endplate (Anterior)",
        "T1 Sup Ant",
    ),
    def(
        LandmarkId::T1SupPost,
        "t1_sup_post",
        "T1 Superior Endplate (Posterior)",
        "T1 Sup Post",
    ),
    def(LandmarkId::Chin, "chin", "Chin Point", "Chin"),
    def(LandmarkId::Brow, "brow", "Brow Point", "Brow"),
];

pub const LUMBAR_LANDMARKS: [LandmarkDefinition; 8] = [
    def(
        LandmarkId::L1SupAnt,
        "l1_sup_ant",
        "L1 Superior Endplate (Anterior)",
        "L1 Sup Ant",
    ),
    def(
        LandmarkId::L1SupPost,
        "l1_sup_post",
        "L1 Superior Endplate (Posterior)",
        "L1 Sup Post",
    ),
    def(
        LandmarkId::S1SupAnt,
        "s1_sup_ant",
        "S1 Superior Endplate (Anterior)",
        "S1 Sup Ant",
    ),
    def(
        LandmarkId::S1SupPost,
        "s1_sup_post",
        "S1 Superior Endplate (Posterior)",
        "S1 Sup Post",
    ),
    def(
        LandmarkId::S1PostSup,
        "s1_post_sup",
        "S1 Posterior-Superior Corner",
        "S1 Post-Sup",
    ),
    def(
        LandmarkId::C7Centroid,
        "c7_centroid",
        "C7 Centroid (on full-spine film)",
        "C7 Center",
    ),
    def(
        LandmarkId::FhLeft,
        "fh_left",
        "Left Femoral Head Center",
        "FH Left",
    ),
    def(
        LandmarkId::FhRight,
        "fh_right",
        "Right Femoral Head Center",
        "FH Right",
    ),
];

/// Ordered landmark catalog for `region`.
pub fn catalog(region: Region) -> &'static [LandmarkDefinition] {
    match region {
        Region::Cervical => &CERVICAL_LANDMARKS,
        Region::Lumbar => &LUMBAR_LANDMARKS,
    }
}

/// Landmark set mutation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LandmarkSetError {
    #[error("{region} landmark set is already complete ({capacity} landmarks)")]
    Full { region: Region, capacity: usize },
    #[error("landmark index {index} is not placed (placed: {placed})")]
    NotPlaced { index: usize, placed: usize },
    #[error("{region} catalog holds {capacity} landmarks, got {got}")]
    TooMany {
        region: Region,
        capacity: usize,
        got: usize,
    },
    #[error("landmark coordinates must be finite, got ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

/// Ordered landmark placements for one region.
///
/// Element `i` is the landmark `catalog(region)[i]`: the index is the
/// identity. Points are appended in catalog order, may be moved, and only
/// leave the set through [`LandmarkSet::pop`] or [`LandmarkSet::clear`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LandmarkSet {
    region: Region,
    points: Vec<Point2<f64>>,
}

impl LandmarkSet {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            points: Vec::with_capacity(region.landmark_count()),
        }
    }

    /// Build a set from already placed points, in catalog order.
    pub fn from_points(
        region: Region,
        points: impl IntoIterator<Item = Point2<f64>>,
    ) -> Result<Self, LandmarkSetError> {
        let mut set = Self::new(region);
        for p in points {
            if set.is_complete() {
                let got = set.len() + 1;
                return Err(LandmarkSetError::TooMany {
                    region,
                    capacity: region.landmark_count(),
                    got,
                });
            }
            set.push(p)?;
        }
        Ok(set)
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.landmark_count()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.len() >= self.capacity()
    }

    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2<f64>> {
        self.points
    }

    #[inline]
    pub fn point(&self, index: usize) -> Option<Point2<f64>> {
        self.points.get(index).copied()
    }

    /// Typed lookup. `None` when the landmark is not placed yet or belongs to
    /// the other region.
    #[inline]
    pub fn get(&self, id: LandmarkId) -> Option<Point2<f64>> {
        if id.region() != self.region {
            return None;
        }
        self.point(id.index())
    }

    /// Whether every id in `ids` is placed.
    pub fn has_all(&self, ids: &[LandmarkId]) -> bool {
        ids.iter().all(|&id| self.get(id).is_some())
    }

    /// Definition the next placement will fill, if any.
    pub fn next_definition(&self) -> Option<&'static LandmarkDefinition> {
        catalog(self.region).get(self.len())
    }

    /// Place the next landmark.
    pub fn push(&mut self, p: Point2<f64>) -> Result<(), LandmarkSetError> {
        check_finite(p)?;
        if self.is_complete() {
            return Err(LandmarkSetError::Full {
                region: self.region,
                capacity: self.capacity(),
            });
        }
        self.points.push(p);
        Ok(())
    }

    /// Remove the most recently placed landmark (undo).
    pub fn pop(&mut self) -> Option<Point2<f64>> {
        self.points.pop()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Move an already placed landmark (drag).
    pub fn move_landmark(&mut self, index: usize, p: Point2<f64>) -> Result<(), LandmarkSetError> {
        check_finite(p)?;
        let placed = self.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(LandmarkSetError::NotPlaced { index, placed })?;
        *slot = p;
        Ok(())
    }

    /// Typed variant of [`LandmarkSet::move_landmark`]; a no-op returning
    /// `false` when `id` is not placed in this set.
    pub fn set(&mut self, id: LandmarkId, p: Point2<f64>) -> bool {
        if id.region() != self.region || !p.x.is_finite() || !p.y.is_finite() {
            return false;
        }
        match self.points.get_mut(id.index()) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }

    /// Index of the most recently placed landmark closer than `threshold_px`
    /// to `p`.
    pub fn find_near(&self, p: Point2<f64>, threshold_px: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .rev()
            .find(|(_, q)| geometry::distance(p, **q) < threshold_px)
            .map(|(i, _)| i)
    }

    /// Placed landmarks paired with their definitions.
    pub fn iter(&self) -> impl Iterator<Item = (&'static LandmarkDefinition, Point2<f64>)> + '_ {
        catalog(self.region).iter().zip(self.points.iter().copied())
    }
}

fn check_finite(p: Point2<f64>) -> Result<(), LandmarkSetError> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(())
    } else {
        Err(LandmarkSetError::NonFinite { x: p.x, y: p.y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_match_wire_ids() {
        let cervical: Vec<&str> = CERVICAL_LANDMARKS.iter().map(|d| d.key).collect();
        assert_eq!(
            cervical,
            [
                "c2_sup_ant",
                "c2_sup_post",
                "c2_centroid",
                "c7_inf_ant",
                "c7_inf_post",
                "c7_sup_post",
                "t1_sup_ant",
                "t1_sup_post",
                "chin",
                "brow"
            ]
        );
        let lumbar: Vec<&str> = LUMBAR_LANDMARKS.iter().map(|d| d.key).collect();
        assert_eq!(
            lumbar,
            [
                "l1_sup_ant",
                "l1_sup_post",
                "s1_sup_ant",
                "s1_sup_post",
                "s1_post_sup",
                "c7_centroid",
                "fh_left",
                "fh_right"
            ]
        );
    }

    #[test]
    fn ids_index_their_own_catalog_slot() {
        for region in [Region::Cervical, Region::Lumbar] {
            for (i, d) in catalog(region).iter().enumerate() {
                assert_eq!(d.id.index(), i);
                assert_eq!(d.id.region(), region);
                assert_eq!(d.id.key(), d.key);
                let json = serde_json::to_string(&d.id).unwrap();
                assert_eq!(json, format!("\"{}\"", d.key));
            }
        }
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut set = LandmarkSet::new(Region::Lumbar);
        for i in 0..8 {
            set.push(Point2::new(i as f64, 0.0)).unwrap();
        }
        assert!(set.is_complete());
        assert!(set.next_definition().is_none());
        assert_eq!(
            set.push(Point2::new(0.0, 0.0)),
            Err(LandmarkSetError::Full {
                region: Region::Lumbar,
                capacity: 8
            })
        );
    }

    #[test]
    fn from_points_rejects_overflow() {
        let pts = (0..11).map(|i| Point2::new(i as f64, 1.0));
        let err = LandmarkSet::from_points(Region::Cervical, pts).unwrap_err();
        assert!(matches!(err, LandmarkSetError::TooMany { got: 11, .. }));
    }

    #[test]
    fn typed_lookup_respects_region_and_placement() {
        let set = LandmarkSet::from_points(
            Region::Lumbar,
            [Point2::new(1.0, 2.0), Point2::new(3.0, 4.0)],
        )
        .unwrap();
        assert_eq!(set.get(LandmarkId::L1SupPost), Some(Point2::new(3.0, 4.0)));
        assert_eq!(set.get(LandmarkId::S1SupAnt), None);
        assert_eq!(set.get(LandmarkId::C2SupPost), None);
        assert_eq!(set.next_definition().map(|d| d.id), Some(LandmarkId::S1SupAnt));
    }

    #[test]
    fn undo_move_and_clear() {
        let mut set = LandmarkSet::new(Region::Cervical);
        set.push(Point2::new(0.0, 0.0)).unwrap();
        set.push(Point2::new(10.0, 0.0)).unwrap();
        set.move_landmark(0, Point2::new(5.0, 5.0)).unwrap();
        assert_eq!(set.point(0), Some(Point2::new(5.0, 5.0)));
        assert_eq!(
            set.move_landmark(4, Point2::new(0.0, 0.0)),
            Err(LandmarkSetError::NotPlaced {
                index: 4,
                placed: 2
            })
        );
        assert_eq!(set.pop(), Some(Point2::new(10.0, 0.0)));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn hit_test_prefers_latest_landmark() {
        let set = LandmarkSet::from_points(
            Region::Cervical,
            [
                Point2::new(100.0, 100.0),
                Point2::new(105.0, 100.0),
                Point2::new(300.0, 300.0),
            ],
        )
        .unwrap();
        let near = Point2::new(102.0, 101.0);
        assert_eq!(set.find_near(near, DEFAULT_HIT_RADIUS_PX), Some(1));
        assert_eq!(set.find_near(Point2::new(312.0, 300.0), 12.0), None);
        assert_eq!(set.find_near(Point2::new(311.0, 300.0), 12.0), Some(2));
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let mut set = LandmarkSet::new(Region::Cervical);
        assert!(matches!(
            set.push(Point2::new(f64::NAN, 0.0)),
            Err(LandmarkSetError::NonFinite { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn region_parses_case_insensitively() {
        assert_eq!("Lumbar".parse::<Region>(), Ok(Region::Lumbar));
        assert!("thoracic".parse::<Region>().is_err());
    }
}
