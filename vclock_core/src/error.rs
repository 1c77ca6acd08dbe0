//! Error types for the causal execution engine.

use thiserror::Error;
use vclock_env::{EnvError, NodeId};

/// Errors raised while validating or executing node scripts.
///
/// None of these are retryable: every variant describes a structural defect
/// in the scripts or a broken simulation, never a transient fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A simulation needs at least one node
    #[error("Malformed script: node count must be at least 1")]
    EmptyNetwork,

    /// The number of scripts differs from the node count
    #[error("Malformed script: expected {expected} node scripts, got {actual}")]
    ScriptCountMismatch { expected: usize, actual: usize },

    /// A node's script references something that cannot exist
    #[error("Malformed script on node {node}: {reason}")]
    MalformedScript { node: NodeId, reason: String },

    /// Two clocks of different widths were merged
    #[error("Clock length mismatch: expected {expected} slots, got {actual}")]
    ClockLengthMismatch { expected: usize, actual: usize },

    /// A node's inbox lost every sender while the node was waiting on it
    #[error("Inbox closed while node {0} was waiting for a dependency")]
    InboxClosed(NodeId),

    /// A node actor task died without reporting
    #[error("Node actor failed: {0}")]
    ActorFailed(String),

    #[error(transparent)]
    Transport(#[from] EnvError),
}

impl CoreError {
    /// Creates a malformed script error.
    pub fn malformed(node: NodeId, reason: impl Into<String>) -> Self {
        Self::MalformedScript {
            node,
            reason: reason.into(),
        }
    }
}
