use approx::assert_relative_eq;
use bard::nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use bard::{
    bard_core::rigid_from_parts, BardConfig, BardError, BodyStatus, OverlayApp, RecordedTracker,
    Renderer, Tracker, TrackingObservation, POINTER, REFERENCE,
};

const EPSILON_APPROX: f64 = 1e-9;

/// Keeps every pose it is handed.
#[derive(Default)]
struct RecordingRenderer {
    camera_poses: Vec<Matrix4<f64>>,
    pointer_poses: Vec<Matrix4<f64>>,
    renders: usize,
}

impl Renderer for RecordingRenderer {
    fn set_camera_pose(&mut self, camera2modelreference: &Matrix4<f64>) {
        self.camera_poses.push(*camera2modelreference);
    }

    fn set_pointer_pose(&mut self, pointerref2modelreference: &Matrix4<f64>) {
        self.pointer_poses.push(*pointerref2modelreference);
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

struct BrokenTracker;

impl Tracker for BrokenTracker {
    fn get_frame(&mut self) -> bard::Result<Option<TrackingObservation>> {
        Err(BardError::Tracker("camera unplugged".to_owned()))
    }
}

fn reference_pose() -> Matrix4<f64> {
    rigid_from_parts(
        Vector3::new(12.0, -8.0, 350.0),
        Rotation3::from_euler_angles(0.3, -0.2, 0.1),
    )
}

fn pointer_pose() -> Matrix4<f64> {
    rigid_from_parts(
        Vector3::new(-30.0, 15.0, 300.0),
        Rotation3::from_euler_angles(-0.1, 0.4, 0.0),
    )
}

fn pointer_config() -> BardConfig {
    BardConfig::from_reader(
        r#"{
            "models": { "ref_file": "data/reference.txt" },
            "pointerData": {
                "pointer_tag_file": "data/pointer.txt",
                "pointer_tag_to_tip": [-14.0, 0.0, 0.0]
            }
        }"#
        .as_bytes(),
    )
    .unwrap()
}

#[test]
fn holds_the_last_good_camera_pose() {
    let mut app = OverlayApp::new(&BardConfig::default()).unwrap();
    assert_eq!(app.poses().unwrap().camera, Matrix4::identity());

    let mut tracker = RecordedTracker::new([
        TrackingObservation::default().with(REFERENCE, reference_pose(), 0.9),
        TrackingObservation::default(),
        TrackingObservation::default().with(REFERENCE, Matrix4::identity(), f64::NAN),
        TrackingObservation::default().with(REFERENCE, Matrix4::identity(), 0.1),
    ]);
    let mut renderer = RecordingRenderer::default();

    let first = app.update(&mut tracker, &mut renderer).unwrap().unwrap();
    let expected = reference_pose().try_inverse().unwrap();
    assert_relative_eq!(first.camera, expected, epsilon = EPSILON_APPROX);
    assert_eq!(first.pointer, None);

    assert_eq!(app.run(&mut tracker, &mut renderer).unwrap(), 3);
    assert_eq!(app.frames(), 4);
    assert_eq!(renderer.renders, 4);
    assert!(renderer.pointer_poses.is_empty());
    for camera in &renderer.camera_poses {
        assert_eq!(*camera, first.camera);
    }
    assert_eq!(
        app.last_update().status(REFERENCE),
        Some(BodyStatus::LowQuality(0.1))
    );
    assert_eq!(app.update(&mut tracker, &mut renderer).unwrap(), None);
}

#[test]
fn pointer_follows_the_reference() {
    let mut app = OverlayApp::new(&pointer_config()).unwrap();
    let mut renderer = RecordingRenderer::default();
    let mut tracker = RecordedTracker::new([
        TrackingObservation::default()
            .with(REFERENCE, reference_pose(), 0.8)
            .with(POINTER, pointer_pose(), 0.6),
        TrackingObservation::default().with(REFERENCE, reference_pose(), 0.8),
    ]);
    app.run(&mut tracker, &mut renderer).unwrap();

    let expected = reference_pose().try_inverse().unwrap() * pointer_pose();
    assert_eq!(renderer.pointer_poses.len(), 2);
    for pointer in &renderer.pointer_poses {
        assert_relative_eq!(*pointer, expected, epsilon = EPSILON_APPROX);
    }
    assert_eq!(app.last_update().status(POINTER), Some(BodyStatus::Missing));

    let tip = app.record_pointer().unwrap().unwrap();
    let expected_tip = expected.transform_point(&Point3::new(-14.0, 0.0, 0.0));
    assert_relative_eq!(tip, expected_tip, epsilon = EPSILON_APPROX);
    assert_eq!(app.pointer_writer().points().len(), 1);
}

#[test]
fn pointer_starts_at_the_camera() {
    let app = OverlayApp::new(&pointer_config()).unwrap();
    let poses = app.poses().unwrap();
    assert_eq!(poses.camera, Matrix4::identity());
    assert_eq!(poses.pointer, Some(Matrix4::identity()));
}

#[test]
fn models_are_placed_by_the_configured_transform() {
    let config = BardConfig::from_reader(
        r#"{
            "models": {
                "ref_file": "data/reference.txt",
                "reference_to_model": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 40], [0, 0, 0, 1]]
            }
        }"#
        .as_bytes(),
    )
    .unwrap();
    let app = OverlayApp::new(&config).unwrap();
    let model2camera = app.graph().get("model2camera").unwrap();
    assert_relative_eq!(model2camera[(2, 3)], 40.0, epsilon = EPSILON_APPROX);
}

#[test]
fn recording_without_a_pointer_is_refused() {
    let mut app = OverlayApp::new(&BardConfig::default()).unwrap();
    assert!(matches!(
        app.record_pointer(),
        Err(BardError::PointerUnavailable)
    ));
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = BardConfig::from_reader(r#"{ "pointerData": {} }"#.as_bytes()).unwrap();
    assert!(matches!(
        OverlayApp::new(&config),
        Err(BardError::Config(bard::ConfigError::MissingPointerTagFile))
    ));
}

#[test]
fn tracker_failures_propagate() {
    let mut app = OverlayApp::new(&BardConfig::default()).unwrap();
    let mut renderer = RecordingRenderer::default();
    assert!(matches!(
        app.update(&mut BrokenTracker, &mut renderer),
        Err(BardError::Tracker(_))
    ));
    assert_eq!(renderer.renders, 0);
}

#[test]
fn replays_recorded_json() {
    let json = r#"[
        {
            "port_handles": ["reference"],
            "timestamps": [0.0],
            "frame_numbers": [0],
            "poses": [[[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 200], [0, 0, 0, 1]]],
            "qualities": [1.0]
        },
        {
            "port_handles": ["reference"],
            "poses": [[[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]],
            "qualities": [null]
        }
    ]"#;
    let mut tracker = RecordedTracker::from_reader(json.as_bytes()).unwrap();
    assert_eq!(tracker.remaining(), 2);

    let mut app = OverlayApp::new(&BardConfig::default()).unwrap();
    let mut renderer = RecordingRenderer::default();
    assert_eq!(app.run(&mut tracker, &mut renderer).unwrap(), 2);
    assert_relative_eq!(
        renderer.camera_poses[1][(2, 3)],
        -200.0,
        epsilon = EPSILON_APPROX
    );

    assert!(matches!(
        RecordedTracker::from_reader(r#"[{"port_handles": []}]"#.as_bytes()),
        Err(BardError::Recording(_))
    ));
}
