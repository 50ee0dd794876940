//! # BARD Core
//!
//! Coordinate frames and the transform graph behind the BARD augmented reality overlay.
//!
//! The overlay follows a few rigid bodies through the camera: a set of tags fixed to the
//! anatomy (the model reference) and, optionally, a set of tags on a pointer tool. Each of
//! these is a [`Frame`], and the current rigid transform between two frames is an edge named
//! `source2target`, which maps coordinates in the source frame into the target frame.
//!
//! The [`TransformGraph`] stores the latest value of each edge and answers queries between
//! any two connected frames, inverting and composing the stored edges as needed. It has no
//! notion of time; smoothing, if any, belongs to the tracker that feeds it.
//!
//! ```text
//!                  modelreference2camera
//!   modelreference ---------------------> camera <--------------------- pointerref
//!         ^                                        pointerref2camera
//!         | model2modelreference
//!       model
//! ```
//!
//! With only the edges above stored, `pointerref2modelreference` is resolved as
//! `inverse(modelreference2camera) * pointerref2camera`.

mod error;
mod frame;
mod graph;
mod rigid;

pub use error::*;
pub use frame::*;
pub use graph::*;
pub use nalgebra;
pub use rigid::*;
