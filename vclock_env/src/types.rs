//! Common identifier types for the simulator.

use serde::{Deserialize, Serialize};

/// Identifier of a simulated node.
///
/// Nodes are numbered densely from `0` to `N - 1`, so the id doubles as the
/// node's slot in every vector clock and as the index of its inbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Creates a NodeId from its index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot index of this node.
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a scripted event.
///
/// Event ids are chosen by the script author. Send events are matched to
/// receive events through this id, so a message carries the id of the send
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display_is_bare_index() {
        assert_eq!(NodeId::new(3).to_string(), "3");
        assert_eq!(NodeId::from(7).index(), 7);
    }

    #[test]
    fn test_event_id_ordering() {
        assert!(EventId::new(1) < EventId::new(2));
        assert_eq!(EventId::from(42).raw(), 42);
        assert_eq!(EventId::new(9).to_string(), "9");
    }
}
