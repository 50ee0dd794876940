use bard_core::nalgebra::Matrix4;
use bard_core::{EdgeName, Result, TransformGraph};

/// The poses the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPoses {
    /// `camera2modelreference`, placed on the virtual camera.
    pub camera: Matrix4<f64>,
    /// `pointerref2modelreference`, applied to the pointer models when a
    /// pointer is configured.
    pub pointer: Option<Matrix4<f64>>,
}

/// Reads the render poses out of the transform graph.
///
/// Nothing is cached, so every call sees the graph as it is right now.
#[derive(Debug, Clone)]
pub struct OverlayPoseResolver {
    camera: EdgeName,
    pointer: Option<EdgeName>,
}

impl OverlayPoseResolver {
    pub fn new(pointer_configured: bool) -> Self {
        Self {
            camera: EdgeName::camera_to_modelreference(),
            pointer: pointer_configured.then(EdgeName::pointerref_to_modelreference),
        }
    }

    pub fn pointer_configured(&self) -> bool {
        self.pointer.is_some()
    }

    /// The camera relative to the model reference.
    pub fn camera_pose(&self, graph: &TransformGraph) -> Result<Matrix4<f64>> {
        graph.get_edge(&self.camera)
    }

    /// The pointer relative to the model reference.
    ///
    /// `Ok(None)` when this session has no pointer, in which case the pointer
    /// models are simply left alone.
    pub fn pointer_pose(&self, graph: &TransformGraph) -> Result<Option<Matrix4<f64>>> {
        self.pointer
            .as_ref()
            .map(|edge| graph.get_edge(edge))
            .transpose()
    }

    pub fn resolve(&self, graph: &TransformGraph) -> Result<OverlayPoses> {
        Ok(OverlayPoses {
            camera: self.camera_pose(graph)?,
            pointer: self.pointer_pose(graph)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bard_core::nalgebra::{Rotation3, Vector3};
    use bard_core::{rigid_from_parts, TransformError};

    #[test]
    fn pointer_is_unavailable_without_configuration() {
        let mut graph = TransformGraph::new();
        graph.add("camera2modelreference", Matrix4::identity()).unwrap();
        let resolver = OverlayPoseResolver::new(false);
        assert_eq!(resolver.pointer_pose(&graph), Ok(None));
        assert_eq!(
            resolver.resolve(&graph).unwrap(),
            OverlayPoses {
                camera: Matrix4::identity(),
                pointer: None,
            }
        );
    }

    #[test]
    fn camera_pose_must_be_initialized() {
        let resolver = OverlayPoseResolver::new(true);
        assert!(matches!(
            resolver.camera_pose(&TransformGraph::new()),
            Err(TransformError::Unresolvable { .. })
        ));
    }

    #[test]
    fn follows_the_latest_graph_state() {
        let resolver = OverlayPoseResolver::new(true);
        let mut graph = TransformGraph::new();
        graph.add("camera2modelreference", Matrix4::identity()).unwrap();
        graph.add("pointerref2camera", Matrix4::identity()).unwrap();
        assert_eq!(resolver.pointer_pose(&graph), Ok(Some(Matrix4::identity())));

        let modelreference2camera = rigid_from_parts(
            Vector3::new(0.0, 10.0, 250.0),
            Rotation3::from_euler_angles(0.2, -0.1, 0.0),
        );
        graph.add("modelreference2camera", modelreference2camera).unwrap();
        let inverse = modelreference2camera.try_inverse().unwrap();
        assert_relative_eq!(resolver.camera_pose(&graph).unwrap(), inverse, epsilon = 1e-9);
        assert_relative_eq!(
            resolver.pointer_pose(&graph).unwrap().unwrap(),
            inverse,
            epsilon = 1e-9
        );
    }
}
