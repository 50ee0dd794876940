use crate::tracking::{TrackingUpdater, POINTER, REFERENCE};
use bard_core::nalgebra::{Matrix4, Point3};
use bard_core::{matrix_from_nested, matrix_from_rows, EdgeName, TransformError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The ArUco dictionary the tag files of both rigid bodies refer to.
pub const RIGID_BODY_DICTIONARY: &str = "DICT_ARUCO_ORIGINAL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("model configuration does not include ref_file")]
    MissingRefFile,
    #[error("pointer configuration does not include pointer_tag_file")]
    MissingPointerTagFile,
    #[error("quality threshold {0} is not within [0, 1]")]
    InvalidThreshold(f64),
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid number `{value}` in matrix file {path}")]
    MatrixValue { path: PathBuf, value: String },
    #[error("invalid matrix in {path}: {source}")]
    Matrix {
        path: PathBuf,
        source: TransformError,
    },
}

/// The configuration of an overlay session.
///
/// Every section is optional. Without `models` nothing follows the anatomy,
/// and without `pointerData` no pointer is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BardConfig {
    #[serde(default)]
    pub models: Option<ModelConfig>,
    #[serde(default, rename = "pointerData")]
    pub pointer_data: Option<PointerConfig>,
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// The directory recorded pointer positions are written to.
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The tag file describing the reference rigid body.
    #[serde(default)]
    pub ref_file: Option<PathBuf>,
    /// The transform from the reference to the models. Identity when missing.
    #[serde(default)]
    pub reference_to_model: Option<MatrixSource>,
    /// The printed width of the reference tags, in millimetres.
    #[serde(default)]
    pub tag_width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerConfig {
    /// The tag file describing the pointer rigid body.
    #[serde(default)]
    pub pointer_tag_file: Option<PathBuf>,
    /// The pointer tip in pointer reference coordinates.
    #[serde(default)]
    pub pointer_tag_to_tip: Option<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Observations must have a quality strictly above this to be used.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    /// Which edge each tracked rigid body updates.
    #[serde(default = "default_rigid_bodies")]
    pub rigid_bodies: BTreeMap<String, EdgeName>,
}

/// A matrix given inline (row-major) or as a path to a text file of four
/// whitespace separated rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixSource {
    Inline([[f64; 4]; 4]),
    File(PathBuf),
}

/// What an external tracker has to follow for this session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodySpec {
    pub name: String,
    pub filename: PathBuf,
    pub dictionary: String,
    /// Tag width in millimetres, or the tag file's own when `None`.
    pub tag_width: Option<f64>,
}

fn default_outdir() -> PathBuf {
    PathBuf::from("bard_output")
}

fn default_quality_threshold() -> f64 {
    crate::tracking::DEFAULT_QUALITY_THRESHOLD
}

fn default_rigid_bodies() -> BTreeMap<String, EdgeName> {
    TrackingUpdater::default()
        .rigid_bodies()
        .map(|(name, edge)| (name.clone(), edge.clone()))
        .collect()
}

impl Default for BardConfig {
    fn default() -> Self {
        Self {
            models: None,
            pointer_data: None,
            tracking: TrackingConfig::default(),
            outdir: default_outdir(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            rigid_bodies: default_rigid_bodies(),
        }
    }
}

impl BardConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Rejects configurations the tracker could not be set up from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.tracking.quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        self.rigid_bodies().map(|_| ())
    }

    /// The rigid bodies an ArUco tracker needs to be configured with.
    pub fn rigid_bodies(&self) -> Result<Vec<RigidBodySpec>, ConfigError> {
        let mut rigid_bodies = vec![];
        if let Some(models) = &self.models {
            let filename = models.ref_file.clone().ok_or(ConfigError::MissingRefFile)?;
            rigid_bodies.push(RigidBodySpec {
                name: REFERENCE.to_owned(),
                filename,
                dictionary: RIGID_BODY_DICTIONARY.to_owned(),
                tag_width: models.tag_width,
            });
        }
        if let Some(pointer) = &self.pointer_data {
            let filename = pointer
                .pointer_tag_file
                .clone()
                .ok_or(ConfigError::MissingPointerTagFile)?;
            rigid_bodies.push(RigidBodySpec {
                name: POINTER.to_owned(),
                filename,
                dictionary: RIGID_BODY_DICTIONARY.to_owned(),
                tag_width: None,
            });
        }
        Ok(rigid_bodies)
    }

    pub fn pointer_configured(&self) -> bool {
        self.pointer_data.is_some()
    }

    pub fn pointer_tip(&self) -> Option<Point3<f64>> {
        self.pointer_data
            .as_ref()
            .and_then(|pointer| pointer.pointer_tag_to_tip)
            .map(Point3::from)
    }

    /// The transform from the model reference to the models.
    pub fn reference_to_model(&self) -> Result<Matrix4<f64>, ConfigError> {
        match self
            .models
            .as_ref()
            .and_then(|models| models.reference_to_model.as_ref())
        {
            Some(source) => source.load(),
            None => Ok(Matrix4::identity()),
        }
    }

    pub fn tracking_updater(&self) -> TrackingUpdater {
        TrackingUpdater::new(
            self.tracking.quality_threshold,
            self.tracking
                .rigid_bodies
                .iter()
                .map(|(name, edge)| (name.clone(), edge.clone())),
        )
    }
}

impl MatrixSource {
    pub fn load(&self) -> Result<Matrix4<f64>, ConfigError> {
        match self {
            Self::Inline(rows) => Ok(matrix_from_rows(*rows)),
            Self::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let rows = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(|line| {
                        line.split_whitespace()
                            .map(|value| {
                                value.parse::<f64>().map_err(|_| ConfigError::MatrixValue {
                                    path: path.clone(),
                                    value: value.to_owned(),
                                })
                            })
                            .collect::<Result<Vec<f64>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                matrix_from_nested(&rows).map_err(|source| ConfigError::Matrix {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}
