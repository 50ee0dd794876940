use crate::{Result, TransformError};
use core::fmt;
use core::str::FromStr;
use derive_more::{AsRef, Display, Into};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The separator between the source and target frame in an edge name.
pub const SEPARATOR: char = '2';

/// The frame attached to the optical center of the camera.
pub const CAMERA: &str = "camera";
/// The frame of the rigid body (tag set) fixed to the anatomy.
pub const MODEL_REFERENCE: &str = "modelreference";
/// The frame of the rigid body (tag set) fixed to the pointer tool.
pub const POINTER_REFERENCE: &str = "pointerref";
/// The frame the anatomical models are defined in.
pub const MODEL: &str = "model";
/// The frame at the tip of the pointer.
pub const POINTER_TIP: &str = "pointertip";

/// A named coordinate system.
///
/// Frames are plain identifiers. They only exist through the edges that
/// reference them. A frame name is non-empty and never contains the
/// [`SEPARATOR`], since that would make edge names ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, AsRef, Display, Into)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Frame(String);

impl Frame {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(TransformError::InvalidFrame(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn camera() -> Self {
        Self(CAMERA.to_owned())
    }

    pub fn model_reference() -> Self {
        Self(MODEL_REFERENCE.to_owned())
    }

    pub fn pointer_reference() -> Self {
        Self(POINTER_REFERENCE.to_owned())
    }

    pub fn model() -> Self {
        Self(MODEL.to_owned())
    }

    pub fn pointer_tip() -> Self {
        Self(POINTER_TIP.to_owned())
    }
}

impl TryFrom<String> for Frame {
    type Error = TransformError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl FromStr for Frame {
    type Err = TransformError;

    fn from_str(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

/// A directed relation between two frames, written `source2target`.
///
/// The transform stored under an edge takes coordinates expressed in the
/// source frame and expresses them in the target frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct EdgeName {
    source: Frame,
    target: Frame,
}

impl EdgeName {
    /// Creates the edge from `source` to `target`, which must differ.
    pub fn new(source: Frame, target: Frame) -> Result<Self> {
        if source == target {
            return Err(TransformError::InvalidEdgeName(format!(
                "{}{}{}",
                source, SEPARATOR, target
            )));
        }
        Ok(Self { source, target })
    }

    /// Only called with frames already known to differ.
    pub(crate) fn between(source: &Frame, target: &Frame) -> Self {
        Self {
            source: source.clone(),
            target: target.clone(),
        }
    }

    /// `modelreference2camera`, the pose of the anatomy reference seen by the camera.
    pub fn modelreference_to_camera() -> Self {
        Self::between(&Frame::model_reference(), &Frame::camera())
    }

    /// `pointerref2camera`, the pose of the pointer seen by the camera.
    pub fn pointerref_to_camera() -> Self {
        Self::between(&Frame::pointer_reference(), &Frame::camera())
    }

    /// `camera2modelreference`, the camera pose used to place the virtual camera.
    pub fn camera_to_modelreference() -> Self {
        Self::between(&Frame::camera(), &Frame::model_reference())
    }

    /// `pointerref2modelreference`, the pose the pointer models are drawn with.
    pub fn pointerref_to_modelreference() -> Self {
        Self::between(&Frame::pointer_reference(), &Frame::model_reference())
    }

    /// `model2modelreference`, where the models sit relative to the reference.
    pub fn model_to_modelreference() -> Self {
        Self::between(&Frame::model(), &Frame::model_reference())
    }

    pub fn source(&self) -> &Frame {
        &self.source
    }

    pub fn target(&self) -> &Frame {
        &self.target
    }

    /// The same relation in the opposite direction (`B2A` for `A2B`).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

impl fmt::Display for EdgeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source, SEPARATOR, self.target)
    }
}

impl FromStr for EdgeName {
    type Err = TransformError;

    fn from_str(name: &str) -> Result<Self> {
        let invalid = || TransformError::InvalidEdgeName(name.to_owned());
        let mut parts = name.split(SEPARATOR);
        let (source, target) = match (parts.next(), parts.next(), parts.next()) {
            (Some(source), Some(target), None) => (source, target),
            _ => return Err(invalid()),
        };
        let source = Frame::new(source).map_err(|_| invalid())?;
        let target = Frame::new(target).map_err(|_| invalid())?;
        Self::new(source, target)
    }
}

impl TryFrom<String> for EdgeName {
    type Error = TransformError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<EdgeName> for String {
    fn from(edge: EdgeName) -> Self {
        edge.to_string()
    }
}
