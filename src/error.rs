use thiserror::Error;

use crate::map::NodeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("workspace map has no nodes")]
    EmptyGraph,

    #[error("viewport {width}x{height} cannot contain a map")]
    InvalidViewport { width: f32, height: f32 },

    #[error("node {0:?} has a non-finite position")]
    NonFinitePosition(NodeId),

    #[error("node {0:?} does not exist in this map")]
    UnknownNode(NodeId),
}
