use crate::{
    BardConfig, BardError, OverlayPoseResolver, OverlayPoses, PointerWriter, RecordedObservation,
    Result, TrackingObservation, TrackingUpdate, TrackingUpdater,
};
use bard_core::nalgebra::{Matrix4, Point3};
use bard_core::{EdgeName, TransformGraph};
use log::{debug, info};
use std::collections::VecDeque;
use std::io::Read;

/// A source of tracker output, one observation per video frame.
///
/// This is where an ArUco (or any other) tracker plugs in. Returning
/// `Ok(None)` ends the session.
pub trait Tracker {
    fn get_frame(&mut self) -> Result<Option<TrackingObservation>>;
}

/// The scene the overlay is drawn into.
pub trait Renderer {
    /// Places the virtual camera, given `camera2modelreference`.
    fn set_camera_pose(&mut self, camera2modelreference: &Matrix4<f64>);

    /// Moves the pointer models, given `pointerref2modelreference`.
    fn set_pointer_pose(&mut self, pointerref2modelreference: &Matrix4<f64>);

    fn render(&mut self) {}
}

/// Replays previously recorded tracker output.
#[derive(Debug, Clone, Default)]
pub struct RecordedTracker {
    observations: VecDeque<TrackingObservation>,
}

impl RecordedTracker {
    pub fn new(observations: impl IntoIterator<Item = TrackingObservation>) -> Self {
        Self {
            observations: observations.into_iter().collect(),
        }
    }

    /// Reads a JSON array of [`RecordedObservation`].
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let recorded: Vec<RecordedObservation> = serde_json::from_reader(reader)?;
        let observations = recorded
            .into_iter()
            .map(TrackingObservation::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(observations))
    }

    pub fn remaining(&self) -> usize {
        self.observations.len()
    }
}

impl Tracker for RecordedTracker {
    fn get_frame(&mut self) -> Result<Option<TrackingObservation>> {
        Ok(self.observations.pop_front())
    }
}

/// Owns the transform graph for an overlay session and runs the frame loop.
///
/// Each tick pulls one observation from the tracker, merges it into the
/// graph, then resolves and hands the render poses to the renderer.
#[derive(Debug, Clone)]
pub struct OverlayApp {
    graph: TransformGraph,
    updater: TrackingUpdater,
    resolver: OverlayPoseResolver,
    pointer_writer: PointerWriter,
    last_update: TrackingUpdate,
    frames: usize,
}

impl OverlayApp {
    /// Sets up the graph with the camera at the model reference origin.
    pub fn new(config: &BardConfig) -> Result<Self> {
        config.validate()?;
        for rigid_body in config.rigid_bodies()? {
            info!(
                "tracking {} from {} ({}, tag width {:?})",
                rigid_body.name,
                rigid_body.filename.display(),
                rigid_body.dictionary,
                rigid_body.tag_width
            );
        }

        let mut graph = TransformGraph::new();
        graph.add_edge(
            EdgeName::model_to_modelreference(),
            config.reference_to_model()?,
        );
        if config.pointer_configured() {
            graph.add_edge(EdgeName::pointerref_to_camera(), Matrix4::identity());
        }
        graph.add_edge(EdgeName::camera_to_modelreference(), Matrix4::identity());

        Ok(Self {
            graph,
            updater: config.tracking_updater(),
            resolver: OverlayPoseResolver::new(config.pointer_configured()),
            pointer_writer: PointerWriter::new(config.outdir.clone(), config.pointer_tip()),
            last_update: TrackingUpdate::default(),
            frames: 0,
        })
    }

    pub fn graph(&self) -> &TransformGraph {
        &self.graph
    }

    pub fn resolver(&self) -> &OverlayPoseResolver {
        &self.resolver
    }

    /// What the most recent frame did to each rigid body.
    pub fn last_update(&self) -> &TrackingUpdate {
        &self.last_update
    }

    /// The number of frames processed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// The poses the renderer would get right now.
    pub fn poses(&self) -> Result<OverlayPoses> {
        Ok(self.resolver.resolve(&self.graph)?)
    }

    /// Runs one frame. Returns `None` once the tracker has nothing left.
    pub fn update(
        &mut self,
        tracker: &mut impl Tracker,
        renderer: &mut impl Renderer,
    ) -> Result<Option<OverlayPoses>> {
        let observation = match tracker.get_frame()? {
            Some(observation) => observation,
            None => return Ok(None),
        };
        self.last_update = self.updater.update(&observation, &mut self.graph);

        let poses = self.poses()?;
        renderer.set_camera_pose(&poses.camera);
        if let Some(pointer) = &poses.pointer {
            renderer.set_pointer_pose(pointer);
        }
        renderer.render();

        self.frames += 1;
        debug!(
            "frame {}: {} edges updated",
            self.frames,
            self.last_update.updated()
        );
        Ok(Some(poses))
    }

    /// Runs frames until the tracker is exhausted and returns how many ran.
    pub fn run(
        &mut self,
        tracker: &mut impl Tracker,
        renderer: &mut impl Renderer,
    ) -> Result<usize> {
        let start = self.frames;
        while self.update(tracker, renderer)?.is_some() {}
        info!("processed {} frames", self.frames - start);
        Ok(self.frames - start)
    }

    /// Records the current pointer tip position.
    pub fn record_pointer(&mut self) -> Result<Option<Point3<f64>>> {
        if !self.resolver.pointer_configured() {
            return Err(BardError::PointerUnavailable);
        }
        self.pointer_writer.record(&self.graph)
    }

    pub fn pointer_writer(&self) -> &PointerWriter {
        &self.pointer_writer
    }
}
