//! Receive buffer for messages that arrived ahead of their receive event.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vclock_env::EventId;

/// What happens to a buffered id once a receive event matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Each buffered message satisfies at most one receive event.
    #[default]
    SingleUse,

    /// Buffered ids are never removed; any number of receive events naming
    /// the same id are satisfied by a single buffered message.
    Reusable,
}

impl std::fmt::Display for BufferPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferPolicy::SingleUse => write!(f, "single-use"),
            BufferPolicy::Reusable => write!(f, "reusable"),
        }
    }
}

/// Multiset of event ids dequeued while waiting for a different dependency.
///
/// Only the id is kept: the message's clock was already merged when it was
/// dequeued.
#[derive(Debug, Clone, Default)]
pub struct ReceiveBuffer {
    policy: BufferPolicy,

    /// Event id -> number of buffered messages carrying it
    entries: BTreeMap<EventId, usize>,
}

impl ReceiveBuffer {
    pub fn new(policy: BufferPolicy) -> Self {
        Self {
            policy,
            entries: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    /// Records one more message carrying `id`.
    pub fn insert(&mut self, id: EventId) {
        *self.entries.entry(id).or_insert(0) += 1;
    }

    /// Tries to satisfy a dependency on `id` from the buffer.
    ///
    /// Under `SingleUse` a successful take consumes one occurrence.
    pub fn take(&mut self, id: EventId) -> bool {
        match self.policy {
            BufferPolicy::Reusable => self.entries.contains_key(&id),
            BufferPolicy::SingleUse => match self.entries.get_mut(&id) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    true
                }
                Some(_) => {
                    self.entries.remove(&id);
                    true
                }
                None => false,
            },
        }
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Total number of buffered messages.
    pub fn len(&self) -> usize {
        self.entries.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buffered ids in ascending order, one entry per buffered message.
    pub fn ids(&self) -> Vec<EventId> {
        self.entries
            .iter()
            .flat_map(|(id, count)| std::iter::repeat(*id).take(*count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_use_consumes_once() {
        let mut buffer = ReceiveBuffer::new(BufferPolicy::SingleUse);
        buffer.insert(EventId::new(1));

        assert!(buffer.take(EventId::new(1)));
        assert!(!buffer.take(EventId::new(1)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_single_use_counts_duplicates() {
        let mut buffer = ReceiveBuffer::default();
        buffer.insert(EventId::new(4));
        buffer.insert(EventId::new(4));
        buffer.insert(EventId::new(2));
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.ids(), vec![EventId::new(2), EventId::new(4), EventId::new(4)]);

        assert!(buffer.take(EventId::new(4)));
        assert!(buffer.take(EventId::new(4)));
        assert!(!buffer.take(EventId::new(4)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_reusable_never_removes() {
        let mut buffer = ReceiveBuffer::new(BufferPolicy::Reusable);
        buffer.insert(EventId::new(9));

        assert!(buffer.take(EventId::new(9)));
        assert!(buffer.take(EventId::new(9)));
        assert!(buffer.contains(EventId::new(9)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_miss_leaves_buffer_untouched() {
        let mut buffer = ReceiveBuffer::default();
        buffer.insert(EventId::new(1));
        assert!(!buffer.take(EventId::new(2)));
        assert_eq!(buffer.ids(), vec![EventId::new(1)]);
    }

    #[test]
    fn test_default_policy_is_single_use() {
        assert_eq!(ReceiveBuffer::default().policy(), BufferPolicy::SingleUse);
        assert_eq!(BufferPolicy::Reusable.to_string(), "reusable");
    }
}
