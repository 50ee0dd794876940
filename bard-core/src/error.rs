use crate::{EdgeName, Frame};
use thiserror::Error;

/// Failures of the transform graph.
///
/// These are invariant violations, such as asking for a relation that was
/// never initialized. Sensing gaps (a marker out of view) never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("invalid edge name `{0}`, expected `source2target`")]
    InvalidEdgeName(String),
    #[error("invalid frame name `{0}`")]
    InvalidFrame(String),
    #[error("frame `{from}` is not resolvable to frame `{to}`: no chain of edges connects them")]
    Unresolvable { from: Frame, to: Frame },
    #[error("edge `{edge}` must be inverted to resolve the query but is singular")]
    Singular { edge: EdgeName },
    #[error("malformed matrix: expected 4x4 but got {rows}x{cols}")]
    MalformedMatrix { rows: usize, cols: usize },
}

pub type Result<T> = std::result::Result<T, TransformError>;
