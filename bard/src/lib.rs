//! # BARD
//!
//! The per-frame core of the BARD augmented reality overlay for image guided surgery.
//!
//! A tracker reports, for every video frame, the pose of each rigid body it follows (tags on
//! the anatomy reference and, optionally, on a pointer tool) along with a quality score. The
//! [`TrackingUpdater`] merges confident observations into the [`TransformGraph`] and ignores
//! the rest, so a marker that drops out of view leaves the overlay where it was. The
//! [`OverlayPoseResolver`] then reads back the camera pose and the pointer pose relative to
//! the model reference, which is what the renderer needs to draw the models in place.
//!
//! [`OverlayApp`] owns the graph and runs that loop against any [`Tracker`] and [`Renderer`].
//! Marker detection, calibration and rendering all live behind those two traits.

mod config;
mod error;
mod overlay;
mod pointer;
mod resolver;
mod tracking;

pub use bard_core::{self, nalgebra, EdgeName, Frame, TransformError, TransformGraph};
pub use config::*;
pub use error::*;
pub use overlay::*;
pub use pointer::*;
pub use resolver::*;
pub use tracking::*;
