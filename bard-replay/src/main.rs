use bard::bard_core::matrix_to_rows;
use bard::nalgebra::Matrix4;
use bard::{BardConfig, BardError, OverlayApp, RecordedTracker, Renderer, Tracker};
use log::*;
use serde::Serialize;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "bard-replay",
    about = "Replays recorded tracker output through the BARD overlay"
)]
struct Opt {
    /// The overlay configuration.
    ///
    /// This is in the format of `bard::BardConfig`. Defaults are used when missing.
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// A JSON array of recorded observations.
    ///
    /// Each entry holds `port_handles`, row-major 4x4 `poses` and `qualities`
    /// (`null` for an undetected rigid body).
    #[structopt(short, long)]
    observations: PathBuf,
    /// File to write one JSON line of poses per frame to, stdout otherwise.
    #[structopt(long)]
    output: Option<PathBuf>,
    /// Record the pointer tip every frame and write the positions out at the end.
    #[structopt(long)]
    record_pointer: bool,
}

#[derive(Serialize)]
struct FramePoses {
    frame: usize,
    camera_pose: [[f64; 4]; 4],
    pointer_pose: Option<[[f64; 4]; 4]>,
}

/// Writes every pose handed to it as JSON lines instead of drawing.
///
/// The first write error is kept in `error` and nothing more is written after it.
struct JsonLinesRenderer<W: Write> {
    out: W,
    frame: usize,
    camera_pose: Matrix4<f64>,
    pointer_pose: Option<Matrix4<f64>>,
    error: Option<std::io::Error>,
}

impl<W: Write> JsonLinesRenderer<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            frame: 0,
            camera_pose: Matrix4::identity(),
            pointer_pose: None,
            error: None,
        }
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn set_camera_pose(&mut self, camera2modelreference: &Matrix4<f64>) {
        self.camera_pose = *camera2modelreference;
    }

    fn set_pointer_pose(&mut self, pointerref2modelreference: &Matrix4<f64>) {
        self.pointer_pose = Some(*pointerref2modelreference);
    }

    fn render(&mut self) {
        let poses = FramePoses {
            frame: self.frame,
            camera_pose: matrix_to_rows(&self.camera_pose),
            pointer_pose: self.pointer_pose.take().as_ref().map(matrix_to_rows),
        };
        self.frame += 1;
        if self.error.is_some() {
            return;
        }
        let written = serde_json::to_writer(&mut self.out, &poses)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out));
        if let Err(e) = written {
            error!("unable to write poses for frame {}: {}", poses.frame, e);
            self.error = Some(e);
        }
    }
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    if let Err(e) = replay(&opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn replay(opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &opt.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            BardConfig::from_path(path)?
        }
        None => {
            info!("used default configuration");
            BardConfig::default()
        }
    };
    if opt.record_pointer && !config.pointer_configured() {
        return Err(BardError::PointerUnavailable.into());
    }

    let file = std::fs::File::open(&opt.observations)?;
    let mut tracker = RecordedTracker::from_reader(BufReader::new(file))?;
    info!("loaded {} observations", tracker.remaining());

    let mut app = OverlayApp::new(&config)?;
    let out: Box<dyn Write> = match &opt.output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut renderer = JsonLinesRenderer::new(out);

    let frames = play(&mut app, &mut tracker, &mut renderer, opt.record_pointer)?;
    info!("replayed {} frames", frames);

    if opt.record_pointer {
        let path = app.pointer_writer().write()?;
        info!("pointer positions saved to {}", path.display());
    }
    Ok(())
}

/// Runs every frame the tracker has, stopping at the first failure to write poses.
fn play<W: Write>(
    app: &mut OverlayApp,
    tracker: &mut impl Tracker,
    renderer: &mut JsonLinesRenderer<W>,
    record_pointer: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    while app.update(tracker, renderer)?.is_some() {
        if let Some(e) = renderer.error.take() {
            return Err(e.into());
        }
        if record_pointer {
            app.record_pointer()?;
        }
    }
    renderer.out.flush()?;
    Ok(app.frames())
}
