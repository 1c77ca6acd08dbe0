//! Network transport abstraction for simulated nodes.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::NodeId;

/// Abstraction for message I/O between simulated nodes.
///
/// Every node owns exactly one inbound channel. Any node may write to any
/// channel; only the owner reads from its own.
///
/// # Message Flow
///
/// ```text
/// Node A                  Channel[B]                  Node B
///   |                         |                          |
///   |-- send(B, msg) -------->| (unbounded, FIFO)        |
///   |   (never blocks)        |                          |
///   |                         |<------------ recv() -----|
///   |                         |-- msg ------------------>|
/// ```
///
/// # Implementations
///
/// - **Tokio**: `TokioTransport` - unbounded `tokio::sync::mpsc` channels
#[async_trait]
pub trait NetworkTransport<M>: Send + Sync + 'static
where
    M: Send + 'static,
{
    /// Enqueues a message on the target node's channel.
    ///
    /// # Returns
    /// * `Ok(())` - Message enqueued behind every message previously sent to `target`
    /// * `Err(EnvError::NodeUnreachable)` - `target` is not a node of this network
    /// * `Err(EnvError::ChannelClosed)` - the target's reader is gone
    ///
    /// # Blocking
    /// Never blocks: channels are unbounded.
    fn send(&self, target: NodeId, message: M) -> Result<(), EnvError>;

    /// Receives the next message from this node's own channel.
    ///
    /// # Returns
    /// * `Some(message)` - The oldest message not yet dequeued
    /// * `None` - Every sender is gone and the channel is drained
    ///
    /// # Blocking
    /// Suspends the calling task until a message arrives. This is the only
    /// suspension point of a node.
    async fn recv(&self) -> Option<M>;

    /// Returns this node's ID.
    fn local_id(&self) -> NodeId;

    /// Returns the number of nodes reachable through this transport.
    fn node_count(&self) -> usize;
}
