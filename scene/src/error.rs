use thiserror::Error;

use crate::common::{TransformError, ViewId};
use crate::node::NodeId;

/// Errors that can occur while building, restructuring or editing a scene graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("View {0} not found")]
    ViewNotFound(ViewId),

    #[error("Nodes {0} and {1} do not share a common ancestor")]
    NoCommonAncestor(NodeId, NodeId),

    #[error("Making node {child} a child of node {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Camera {camera} belongs to a view and must stay under scene {scene}")]
    ViewCamera { camera: NodeId, scene: NodeId },

    #[error("Node {node} is not a {expected} node")]
    WrongKind { node: NodeId, expected: &'static str },

    #[error("{kind} nodes have no field '{field}'")]
    UnsupportedField { kind: &'static str, field: &'static str },

    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Rejects values outside `[min, max]`.
pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> SceneResult<f64> {
    if value.is_nan() || value < min || value > max {
        return Err(SceneError::Validation {
            field,
            reason: format!("{value} is outside [{min}, {max}]"),
        });
    }
    Ok(value)
}

/// Rejects negative (or NaN) values.
pub(crate) fn check_non_negative(field: &'static str, value: f64) -> SceneResult<f64> {
    check_range(field, value, 0.0, f64::INFINITY)
}
