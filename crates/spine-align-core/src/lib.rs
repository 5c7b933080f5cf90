//! Core types and geometry for sagittal spine landmark analysis.
//!
//! This crate is intentionally small and purely geometric. It knows about
//! landmark identities, regions and image-space angles, but nothing about
//! clinical norms or how a corrected layout is projected.
//!
//! ## Quickstart
//!
//! ```
//! use nalgebra::Point2;
//! use spine_align_core::{geometry, LandmarkId, LandmarkSet, Region};
//!
//! let mut set = LandmarkSet::new(Region::Lumbar);
//! set.push(Point2::new(100.0, 100.0)).unwrap();
//! set.push(Point2::new(140.0, 110.0)).unwrap();
//!
//! let l1_ant = set.get(LandmarkId::L1SupAnt).unwrap();
//! let l1_post = set.get(LandmarkId::L1SupPost).unwrap();
//! println!("L1 slope: {:.1}°", geometry::line_angle(l1_ant, l1_post));
//! ```

mod calibration;
pub mod geometry;
mod landmarks;
mod logger;
pub mod serde_nan;

pub use calibration::{Calibration, CalibrationError};
pub use landmarks::{
    catalog, LandmarkDefinition, LandmarkId, LandmarkSet, LandmarkSetError, ParseRegionError,
    Region, CERVICAL_LANDMARKS, DEFAULT_HIT_RADIUS_PX, LUMBAR_LANDMARKS,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, parse_level_filter, LOG_ENV};

/// Image-space point, pixels, `y` growing downward.
pub type Point = nalgebra::Point2<f64>;
