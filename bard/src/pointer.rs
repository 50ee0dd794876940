use crate::{BardError, Result};
use bard_core::nalgebra::Point3;
use bard_core::{transform_point, EdgeName, TransformGraph};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// The file recorded positions are written to, inside the output directory.
pub const POINTER_POSITIONS_FILE: &str = "pointer_positions.txt";

/// Records where the pointer tip is, in model reference coordinates.
#[derive(Debug, Clone)]
pub struct PointerWriter {
    outdir: PathBuf,
    tip: Option<Point3<f64>>,
    points: Vec<Point3<f64>>,
}

impl PointerWriter {
    /// `tip` is the pointer tip in pointer reference coordinates. Without it
    /// there is nothing to record.
    pub fn new(outdir: impl Into<PathBuf>, tip: Option<Point3<f64>>) -> Self {
        Self {
            outdir: outdir.into(),
            tip,
            points: vec![],
        }
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Records the current tip position and returns it.
    pub fn record(&mut self, graph: &TransformGraph) -> Result<Option<Point3<f64>>> {
        let tip = match self.tip {
            Some(tip) => tip,
            None => {
                warn!("no pointer tip configured, nothing recorded");
                return Ok(None);
            }
        };
        let pointerref2modelreference = graph.get_edge(&EdgeName::pointerref_to_modelreference())?;
        let point = transform_point(&pointerref2modelreference, &tip);
        match point {
            Some(point) => {
                info!("recorded pointer tip at {} {} {}", point.x, point.y, point.z);
                self.points.push(point);
            }
            None => warn!("pointer transform maps the tip to infinity, nothing recorded"),
        }
        Ok(point)
    }

    /// Writes every recorded point as an `x y z` line, creating the output
    /// directory if needed.
    pub fn write(&self) -> Result<PathBuf> {
        let io_error = |path: &Path| {
            let path = path.to_owned();
            move |source| BardError::Io { path, source }
        };
        std::fs::create_dir_all(&self.outdir).map_err(io_error(&self.outdir))?;

        let text: String = self
            .points
            .iter()
            .map(|point| format!("{} {} {}\n", point.x, point.y, point.z))
            .collect();
        let path = self.outdir.join(POINTER_POSITIONS_FILE);
        std::fs::write(&path, text).map_err(io_error(&path))?;
        info!("wrote {} pointer positions to {}", self.points.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bard_core::nalgebra::{Matrix4, Rotation3, Vector3};
    use bard_core::rigid_from_parts;

    fn tracked_graph() -> TransformGraph {
        let mut graph = TransformGraph::new();
        graph.add("camera2modelreference", Matrix4::identity()).unwrap();
        graph
            .add(
                "pointerref2camera",
                rigid_from_parts(Vector3::new(0.0, 0.0, 100.0), Rotation3::identity()),
            )
            .unwrap();
        graph
    }

    #[test]
    fn records_tip_in_model_reference() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PointerWriter::new(dir.path(), Some(Point3::new(-14.0, 0.0, 0.0)));
        let point = writer.record(&tracked_graph()).unwrap().unwrap();
        assert_relative_eq!(point, Point3::new(-14.0, 0.0, 100.0), epsilon = 1e-12);
        assert_eq!(writer.points().len(), 1);
    }

    #[test]
    fn nothing_recorded_without_tip() {
        let mut writer = PointerWriter::new("unused", None);
        assert_eq!(writer.record(&tracked_graph()).unwrap(), None);
        assert!(writer.points().is_empty());
    }

    #[test]
    fn untracked_pointer_is_an_error() {
        let mut graph = TransformGraph::new();
        graph.add("camera2modelreference", Matrix4::identity()).unwrap();
        let mut writer = PointerWriter::new("unused", Some(Point3::origin()));
        assert!(matches!(writer.record(&graph), Err(BardError::Transform(_))));
    }

    #[test]
    fn writes_one_line_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("nested");
        let mut writer = PointerWriter::new(&outdir, Some(Point3::new(1.0, 2.0, 3.0)));
        let graph = tracked_graph();
        writer.record(&graph).unwrap();
        writer.record(&graph).unwrap();
        let path = writer.write().unwrap();
        assert_eq!(path, outdir.join(POINTER_POSITIONS_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "1 2 103\n1 2 103\n");
    }
}
