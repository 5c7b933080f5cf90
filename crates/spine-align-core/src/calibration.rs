//! Pixel-to-millimeter calibration of a radiograph.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Calibration validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("mm_per_px must be finite and > 0, got {0}")]
    InvalidScale(f64),
    #[error("reference length must be finite and > 0 mm, got {0}")]
    InvalidReferenceLength(f64),
    #[error("reference points are coincident")]
    DegenerateReference,
}

/// Known film scale, in millimeters per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    mm_per_px: f64,
}

impl Calibration {
    pub fn from_mm_per_px(mm_per_px: f64) -> Result<Self, CalibrationError> {
        if !mm_per_px.is_finite() || mm_per_px <= 0.0 {
            return Err(CalibrationError::InvalidScale(mm_per_px));
        }
        Ok(Self { mm_per_px })
    }

    /// Calibrate from a ruler or marker of known length seen on the film.
    pub fn from_reference(
        p1: Point2<f64>,
        p2: Point2<f64>,
        known_mm: f64,
    ) -> Result<Self, CalibrationError> {
        if !known_mm.is_finite() || known_mm <= 0.0 {
            return Err(CalibrationError::InvalidReferenceLength(known_mm));
        }
        if geometry::is_degenerate_segment(p1, p2) {
            return Err(CalibrationError::DegenerateReference);
        }
        Self::from_mm_per_px(known_mm / geometry::distance(p1, p2))
    }

    #[inline]
    pub fn mm_per_px(&self) -> f64 {
        self.mm_per_px
    }

    #[inline]
    pub fn px_per_mm(&self) -> f64 {
        1.0 / self.mm_per_px
    }

    #[inline]
    pub fn px_to_mm(&self, px: f64) -> f64 {
        px * self.mm_per_px
    }

    #[inline]
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm / self.mm_per_px
    }
}
