//! Tokio implementation of NetworkTransport using unbounded mpsc channels.

use crate::error::EnvError;
use crate::network::NetworkTransport;
use crate::types::NodeId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The set of N inbound channels, one per node.
///
/// The registry keeps every write end and hands each node its read end
/// exactly once, wrapped in a `TokioTransport`.
pub struct ChannelRegistry<M> {
    /// Write ends, indexed by node id
    senders: Arc<Vec<mpsc::UnboundedSender<M>>>,

    /// Read ends not yet claimed by a node
    receivers: Vec<Option<mpsc::UnboundedReceiver<M>>>,
}

impl<M: Send + 'static> ChannelRegistry<M> {
    /// Creates `node_count` empty channels.
    pub fn new(node_count: usize) -> Self {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..node_count)
            .map(|_| {
                let (tx, rx) = mpsc::unbounded_channel();
                (tx, Some(rx))
            })
            .unzip();

        Self {
            senders: Arc::new(senders),
            receivers,
        }
    }

    /// Returns the number of channels.
    pub fn node_count(&self) -> usize {
        self.senders.len()
    }

    /// Claims the transport for `id`: its own read end plus every write end.
    pub fn endpoint(&mut self, id: NodeId) -> Result<TokioTransport<M>, EnvError> {
        let node_count = self.node_count();
        let slot = self
            .receivers
            .get_mut(id.index())
            .ok_or_else(|| EnvError::unreachable(id, node_count))?;
        let rx = slot.take().ok_or(EnvError::EndpointTaken(id))?;

        Ok(TokioTransport {
            local_id: id,
            senders: Arc::clone(&self.senders),
            rx: tokio::sync::Mutex::new(rx),
        })
    }
}

/// A node's view of the network.
pub struct TokioTransport<M> {
    /// This node's ID
    local_id: NodeId,

    /// Write ends of every node's channel (including our own)
    senders: Arc<Vec<mpsc::UnboundedSender<M>>>,

    /// Read end of our own channel (behind tokio mutex for async)
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<M>>,
}

#[async_trait]
impl<M: Send + 'static> NetworkTransport<M> for TokioTransport<M> {
    fn send(&self, target: NodeId, message: M) -> Result<(), EnvError> {
        let tx = self
            .senders
            .get(target.index())
            .ok_or_else(|| EnvError::unreachable(target, self.senders.len()))?;

        tx.send(message).map_err(|_| EnvError::ChannelClosed(target))
    }

    async fn recv(&self) -> Option<M> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }

    fn local_id(&self) -> NodeId {
        self.local_id
    }

    fn node_count(&self) -> usize {
        self.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_across_senders() {
        let mut registry = ChannelRegistry::<u64>::new(3);
        let a = registry.endpoint(NodeId::new(0)).unwrap();
        let b = registry.endpoint(NodeId::new(1)).unwrap();
        let c = registry.endpoint(NodeId::new(2)).unwrap();

        a.send(NodeId::new(2), 1).unwrap();
        b.send(NodeId::new(2), 2).unwrap();
        a.send(NodeId::new(2), 3).unwrap();

        assert_eq!(c.recv().await, Some(1));
        assert_eq!(c.recv().await, Some(2));
        assert_eq!(c.recv().await, Some(3));
    }

    #[tokio::test]
    async fn test_self_send() {
        let mut registry = ChannelRegistry::<&'static str>::new(1);
        let a = registry.endpoint(NodeId::new(0)).unwrap();

        a.send(NodeId::new(0), "loopback").unwrap();
        assert_eq!(a.recv().await, Some("loopback"));
    }

    #[test]
    fn test_send_out_of_range() {
        let mut registry = ChannelRegistry::<u64>::new(2);
        let a = registry.endpoint(NodeId::new(0)).unwrap();

        let err = a.send(NodeId::new(5), 1).unwrap_err();
        assert_eq!(err, EnvError::unreachable(NodeId::new(5), 2));
    }

    #[test]
    fn test_endpoint_taken_once() {
        let mut registry = ChannelRegistry::<u64>::new(2);
        assert!(registry.endpoint(NodeId::new(1)).is_ok());
        assert_eq!(
            registry.endpoint(NodeId::new(1)).err(),
            Some(EnvError::EndpointTaken(NodeId::new(1)))
        );
        assert!(matches!(
            registry.endpoint(NodeId::new(2)),
            Err(EnvError::NodeUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_recv_suspends_until_message() {
        let mut registry = ChannelRegistry::<u64>::new(2);
        let a = registry.endpoint(NodeId::new(0)).unwrap();
        let b = registry.endpoint(NodeId::new(1)).unwrap();

        // Empty inbox: recv stays pending
        let pending = tokio::time::timeout(Duration::from_millis(20), b.recv()).await;
        assert!(pending.is_err());

        a.send(NodeId::new(1), 11).unwrap();
        assert_eq!(b.recv().await, Some(11));
    }

    #[test]
    fn test_transport_metadata() {
        let mut registry = ChannelRegistry::<u64>::new(4);
        let t = registry.endpoint(NodeId::new(3)).unwrap();
        assert_eq!(t.local_id(), NodeId::new(3));
        assert_eq!(t.node_count(), 4);
    }
}
