//! Vector clock algebra.
//!
//! A `VectorClock` belongs to exactly one node and is only ever mutated by
//! that node's actor. Whenever clock state has to leave the node (a send
//! event, a trace record) a `ClockSnapshot` is forked off: a detached copy
//! with no owner and no mutating methods.
//!
//! ```text
//! node 1 clock   [0 0]
//! receive [1 0]  merge  -> [1 0] -> increment -> [1 1]
//! ```

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use vclock_env::NodeId;

/// A node's own, mutable vector clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorClock {
    /// The node allowed to mutate this clock; also the slot `increment` touches
    owner: NodeId,

    /// One counter per node, indexed by node id
    slots: Vec<u64>,
}

impl VectorClock {
    /// Creates an all-zero clock of `node_count` slots owned by `owner`.
    pub fn new(owner: NodeId, node_count: usize) -> Self {
        Self {
            owner,
            slots: vec![0; node_count],
        }
    }

    /// Returns the owning node.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the counter for `node`, or 0 if the node is out of range.
    pub fn get(&self, node: NodeId) -> u64 {
        self.slots.get(node.index()).copied().unwrap_or(0)
    }

    /// Returns the counters in node id order.
    pub fn as_slice(&self) -> &[u64] {
        &self.slots
    }

    /// Records a local event: adds 1 to the owner's slot.
    pub fn increment(&mut self) {
        if let Some(slot) = self.slots.get_mut(self.owner.index()) {
            *slot += 1;
        }
    }

    /// Absorbs `other` (slot-wise max), then records the receive as a local event.
    pub fn merge(&mut self, other: &ClockSnapshot) -> Result<(), CoreError> {
        if other.len() != self.len() {
            return Err(CoreError::ClockLengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }

        for (mine, theirs) in self.slots.iter_mut().zip(other.as_slice()) {
            *mine = (*mine).max(*theirs);
        }
        self.increment();
        Ok(())
    }

    /// Forks off a detached, immutable copy of the current values.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot(self.slots.clone())
    }
}

impl std::fmt::Display for VectorClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_slots(&self.slots, f)
    }
}

/// A detached copy of a vector clock.
///
/// Snapshots have no owner and cannot be mutated, so they can be handed to
/// other actors without synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockSnapshot(Vec<u64>);

impl ClockSnapshot {
    /// Creates a snapshot from raw counters.
    pub fn from_slots(slots: Vec<u64>) -> Self {
        Self(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the counter for `node`, or 0 if the node is out of range.
    pub fn get(&self, node: NodeId) -> u64 {
        self.0.get(node.index()).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Returns true if every slot of `self` is `>=` the same slot of `other`.
    ///
    /// Clocks of different widths never dominate each other.
    pub fn dominates(&self, other: &ClockSnapshot) -> bool {
        self.len() == other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a >= b)
    }

    /// Returns true if neither clock dominates the other.
    pub fn is_concurrent_with(&self, other: &ClockSnapshot) -> bool {
        self.partial_cmp(other).is_none()
    }
}

impl PartialOrd for ClockSnapshot {
    /// Happens-before partial order; `None` for concurrent clocks.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.dominates(other), other.dominates(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (false, false) => None,
        }
    }
}

impl std::fmt::Display for ClockSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_slots(&self.0, f)
    }
}

/// Space-separated counters in node id order.
fn fmt_slots(slots: &[u64], f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (i, value) in slots.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(slots: &[u64]) -> ClockSnapshot {
        ClockSnapshot::from_slots(slots.to_vec())
    }

    #[test]
    fn test_new_clock_is_zero() {
        let clock = VectorClock::new(NodeId::new(1), 3);
        assert_eq!(clock.as_slice(), &[0, 0, 0]);
        assert_eq!(clock.owner(), NodeId::new(1));
        assert_eq!(clock.to_string(), "0 0 0");
    }

    #[test]
    fn test_increment_touches_own_slot_only() {
        let mut clock = VectorClock::new(NodeId::new(2), 3);
        clock.increment();
        clock.increment();
        assert_eq!(clock.as_slice(), &[0, 0, 2]);
    }

    #[test]
    fn test_merge_takes_max_then_increments() {
        // Receive scenario from a 2-node handshake
        let mut clock = VectorClock::new(NodeId::new(1), 2);
        clock.merge(&snap(&[1, 0])).unwrap();
        assert_eq!(clock.as_slice(), &[1, 1]);

        let mut clock = VectorClock::new(NodeId::new(0), 3);
        clock.increment();
        clock.increment();
        clock.increment();
        clock.merge(&snap(&[1, 4, 0])).unwrap();
        assert_eq!(clock.as_slice(), &[4, 4, 0]);
    }

    #[test]
    fn test_merge_length_mismatch() {
        let mut clock = VectorClock::new(NodeId::new(0), 2);
        let err = clock.merge(&snap(&[1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            CoreError::ClockLengthMismatch {
                expected: 2,
                actual: 3
            }
        );
        // Failed merge leaves the clock untouched
        assert_eq!(clock.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut clock = VectorClock::new(NodeId::new(0), 2);
        clock.increment();
        let before = clock.snapshot();
        clock.increment();

        assert_eq!(before.as_slice(), &[1, 0]);
        assert_eq!(clock.as_slice(), &[2, 0]);
    }

    #[test]
    fn test_partial_order() {
        assert_eq!(snap(&[1, 2]).partial_cmp(&snap(&[1, 2])), Some(Ordering::Equal));
        assert!(snap(&[2, 2]) > snap(&[1, 2]));
        assert!(snap(&[0, 1]) < snap(&[1, 1]));
        assert!(snap(&[1, 0]).is_concurrent_with(&snap(&[0, 1])));
        assert!(!snap(&[1]).dominates(&snap(&[0, 0])));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(snap(&[3, 10, 0]).to_string(), "3 10 0");
        assert_eq!(snap(&[]).to_string(), "");
    }

    #[test]
    fn test_snapshot_serializes_as_array() {
        let json = serde_json::to_string(&snap(&[1, 2])).unwrap();
        assert_eq!(json, "[1,2]");
    }

    fn clocks(width: usize) -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..50, width)
    }

    proptest! {
        #[test]
        fn prop_merge_order_independent(a in clocks(4), b in clocks(4), c in clocks(4)) {
            let owner = NodeId::new(3);
            let mut abc = VectorClock::new(owner, 4);
            let mut cba = VectorClock::new(owner, 4);
            for s in [&a, &b, &c] {
                abc.merge(&snap(s)).unwrap();
            }
            for s in [&c, &b, &a] {
                cba.merge(&snap(s)).unwrap();
            }

            for i in 0..3 {
                let max = a[i].max(b[i]).max(c[i]);
                prop_assert_eq!(abc.as_slice()[i], max);
                prop_assert_eq!(cba.as_slice()[i], max);
            }
            // Own slot covers every sender's view of it plus at least one receive
            for own in [abc.as_slice()[3], cba.as_slice()[3]] {
                prop_assert!(own > a[3].max(b[3]).max(c[3]));
                prop_assert!(own >= 3);
            }
        }

        #[test]
        fn prop_merge_dominates_input(local in clocks(3), remote in clocks(3)) {
            let mut clock = VectorClock::new(NodeId::new(0), 3);
            clock.merge(&snap(&local)).unwrap();
            let before = clock.snapshot();
            clock.merge(&snap(&remote)).unwrap();

            let after = clock.snapshot();
            prop_assert!(after.dominates(&snap(&remote)));
            prop_assert!(after > before);
        }
    }
}
