//! Scripted events and script validation.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use vclock_env::{EventId, NodeId};

/// One step of a node's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Local work: log and tick, no communication
    Independent { id: EventId },

    /// Send a message stamped with this event's id to `receiver`
    Send { id: EventId, receiver: NodeId },

    /// Block until the message produced by send event `dependency` has arrived
    Receive { id: EventId, dependency: EventId },
}

impl Event {
    pub fn independent(id: u64) -> Self {
        Event::Independent { id: EventId::new(id) }
    }

    pub fn send(id: u64, receiver: usize) -> Self {
        Event::Send {
            id: EventId::new(id),
            receiver: NodeId::new(receiver),
        }
    }

    pub fn receive(id: u64, dependency: u64) -> Self {
        Event::Receive {
            id: EventId::new(id),
            dependency: EventId::new(dependency),
        }
    }

    /// Returns the event's own id.
    pub fn id(&self) -> EventId {
        match self {
            Event::Independent { id } | Event::Send { id, .. } | Event::Receive { id, .. } => *id,
        }
    }

    /// Returns the script tag of this event kind (`i`, `s` or `r`).
    pub fn tag(&self) -> char {
        match self {
            Event::Independent { .. } => 'i',
            Event::Send { .. } => 's',
            Event::Receive { .. } => 'r',
        }
    }

    pub fn is_receive(&self) -> bool {
        matches!(self, Event::Receive { .. })
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Independent { id } => write!(f, "i,{}", id),
            Event::Send { id, receiver } => write!(f, "s,{},{}", id, receiver),
            Event::Receive { id, dependency } => write!(f, "r,{},{}", id, dependency),
        }
    }
}

/// A node's ordered event list, consumed front to back exactly once.
pub type Script = Vec<Event>;

/// Checks that `scripts` can be executed by a network of `node_count` nodes.
///
/// Runs before any actor starts, so a malformed script aborts the whole
/// simulation before a single event executes. Dependencies are not checked:
/// a receive naming an id nobody sends is a deadlock, not a malformed script.
pub fn validate_scripts(node_count: usize, scripts: &[Script]) -> Result<(), CoreError> {
    if node_count == 0 {
        return Err(CoreError::EmptyNetwork);
    }
    if scripts.len() != node_count {
        return Err(CoreError::ScriptCountMismatch {
            expected: node_count,
            actual: scripts.len(),
        });
    }

    for (index, script) in scripts.iter().enumerate() {
        for event in script {
            if let Event::Send { id, receiver } = event {
                if receiver.index() >= node_count {
                    return Err(CoreError::malformed(
                        NodeId::new(index),
                        format!(
                            "send event {} targets node {} but only {} nodes exist",
                            id, receiver, node_count
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}
