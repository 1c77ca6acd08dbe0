//! Error types for the transport layer.

use crate::types::NodeId;
use thiserror::Error;

/// Errors that can occur while moving messages between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Target node id is outside `0..node_count`
    #[error("Node unreachable: {node} (network has {node_count} nodes)")]
    NodeUnreachable { node: NodeId, node_count: usize },

    /// The receiving end of a node's channel has been dropped
    #[error("Channel closed: node {0}")]
    ChannelClosed(NodeId),

    /// The read end of a node's channel was already handed out
    #[error("Endpoint already taken: node {0}")]
    EndpointTaken(NodeId),
}

impl EnvError {
    /// Creates an unreachable error.
    pub fn unreachable(node: NodeId, node_count: usize) -> Self {
        Self::NodeUnreachable { node, node_count }
    }
}
