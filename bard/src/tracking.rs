use bard_core::nalgebra::Matrix4;
use bard_core::{matrix_from_nested, EdgeName, TransformError, TransformGraph};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Observations at or below this quality are ignored by default.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.2;

/// The port handle of the rigid body fixed to the anatomy.
pub const REFERENCE: &str = "reference";
/// The port handle of the pointer rigid body.
pub const POINTER: &str = "pointer";

/// One frame of tracker output.
///
/// The lists are aligned: entry `i` of `poses` and `qualities` belongs to
/// `port_handles[i]`. A quality of NaN means the rigid body was not seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingObservation {
    pub port_handles: Vec<String>,
    pub timestamps: Vec<f64>,
    pub frame_numbers: Vec<u64>,
    pub poses: Vec<Matrix4<f64>>,
    pub qualities: Vec<f64>,
}

impl TrackingObservation {
    pub fn new(
        port_handles: Vec<String>,
        poses: Vec<Matrix4<f64>>,
        qualities: Vec<f64>,
    ) -> Self {
        Self {
            port_handles,
            poses,
            qualities,
            ..Self::default()
        }
    }

    /// Adds a rigid body to the observation.
    #[must_use]
    pub fn with(mut self, port_handle: &str, pose: Matrix4<f64>, quality: f64) -> Self {
        self.port_handles.push(port_handle.to_owned());
        self.poses.push(pose);
        self.qualities.push(quality);
        self
    }

    pub fn index_of(&self, port_handle: &str) -> Option<usize> {
        self.port_handles.iter().position(|handle| handle == port_handle)
    }

    pub fn pose_of(&self, port_handle: &str) -> Option<&Matrix4<f64>> {
        self.index_of(port_handle).and_then(|ix| self.poses.get(ix))
    }

    pub fn quality_of(&self, port_handle: &str) -> Option<f64> {
        self.index_of(port_handle)
            .and_then(|ix| self.qualities.get(ix))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.port_handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.port_handles.is_empty()
    }
}

/// The on-disk form of a [`TrackingObservation`].
///
/// Poses are row-major and a missing (`null`) quality stands for NaN, which
/// JSON can't represent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedObservation {
    pub port_handles: Vec<String>,
    #[serde(default)]
    pub timestamps: Vec<f64>,
    #[serde(default)]
    pub frame_numbers: Vec<u64>,
    pub poses: Vec<Vec<Vec<f64>>>,
    pub qualities: Vec<Option<f64>>,
}

impl TryFrom<RecordedObservation> for TrackingObservation {
    type Error = TransformError;

    fn try_from(recorded: RecordedObservation) -> Result<Self, Self::Error> {
        let poses = recorded
            .poses
            .iter()
            .map(|rows| matrix_from_nested(rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            port_handles: recorded.port_handles,
            timestamps: recorded.timestamps,
            frame_numbers: recorded.frame_numbers,
            poses,
            qualities: recorded
                .qualities
                .into_iter()
                .map(|quality| quality.unwrap_or(f64::NAN))
                .collect(),
        })
    }
}

/// What happened to one rigid body during an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyStatus {
    /// The edge now holds the observed pose.
    Updated,
    /// The rigid body is not part of the observation.
    Missing,
    /// The tracker reported it but did not see it (NaN quality).
    Untracked,
    /// Seen, but not confidently enough.
    LowQuality(f64),
}

/// The outcome of one [`TrackingUpdater::update`], per configured rigid body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingUpdate {
    pub statuses: Vec<(String, BodyStatus)>,
}

impl TrackingUpdate {
    pub fn status(&self, port_handle: &str) -> Option<BodyStatus> {
        self.statuses
            .iter()
            .find(|(name, _)| name == port_handle)
            .map(|&(_, status)| status)
    }

    /// The number of edges written.
    pub fn updated(&self) -> usize {
        self.statuses
            .iter()
            .filter(|(_, status)| *status == BodyStatus::Updated)
            .count()
    }
}

/// Merges tracker output into the transform graph.
///
/// A rigid body only overwrites its edge when it is present in the
/// observation with a quality strictly above the threshold. Anything less
/// leaves the last good transform in place, so a marker dropping out of
/// view holds the overlay where it was instead of snapping it away.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingUpdater {
    quality_threshold: f64,
    rigid_bodies: Vec<(String, EdgeName)>,
}

impl Default for TrackingUpdater {
    fn default() -> Self {
        Self {
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            rigid_bodies: vec![
                (REFERENCE.to_owned(), EdgeName::modelreference_to_camera()),
                (POINTER.to_owned(), EdgeName::pointerref_to_camera()),
            ],
        }
    }
}

impl TrackingUpdater {
    pub fn new(
        quality_threshold: f64,
        rigid_bodies: impl IntoIterator<Item = (String, EdgeName)>,
    ) -> Self {
        Self {
            quality_threshold,
            rigid_bodies: rigid_bodies.into_iter().collect(),
        }
    }

    pub fn quality_threshold(&self) -> f64 {
        self.quality_threshold
    }

    /// Each port handle and the edge it updates.
    pub fn rigid_bodies(&self) -> impl Iterator<Item = (&String, &EdgeName)> + '_ {
        self.rigid_bodies.iter().map(|(name, edge)| (name, edge))
    }

    /// Applies one observation to the graph.
    ///
    /// Never fails: absent or poor observations are routine and only reported.
    pub fn update(
        &self,
        observation: &TrackingObservation,
        graph: &mut TransformGraph,
    ) -> TrackingUpdate {
        let statuses = self
            .rigid_bodies
            .iter()
            .map(|(name, edge)| {
                let status = self.update_body(observation, name, edge, graph);
                debug!("{}: {:?}", name, status);
                (name.clone(), status)
            })
            .collect();
        TrackingUpdate { statuses }
    }

    fn update_body(
        &self,
        observation: &TrackingObservation,
        name: &str,
        edge: &EdgeName,
        graph: &mut TransformGraph,
    ) -> BodyStatus {
        let ix = match observation.index_of(name) {
            Some(ix) => ix,
            None => return BodyStatus::Missing,
        };
        let (pose, quality) = match (observation.poses.get(ix), observation.qualities.get(ix)) {
            (Some(pose), Some(&quality)) => (pose, quality),
            _ => {
                warn!(
                    "observation lists {} port handles but only {} poses and {} qualities",
                    observation.port_handles.len(),
                    observation.poses.len(),
                    observation.qualities.len()
                );
                return BodyStatus::Missing;
            }
        };
        if quality.is_nan() {
            BodyStatus::Untracked
        } else if quality > self.quality_threshold {
            graph.add_edge(edge.clone(), *pose);
            BodyStatus::Updated
        } else {
            BodyStatus::LowQuality(quality)
        }
    }
}
