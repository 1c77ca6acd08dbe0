//! Message envelope carried between nodes.

use crate::clock::ClockSnapshot;
use serde::{Deserialize, Serialize};
use vclock_env::EventId;

/// The envelope a send event puts on the receiver's channel.
///
/// Owned by the sender until enqueued, then by whichever receive operation
/// dequeues it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Id of the send event that produced this message
    pub event_id: EventId,

    /// Sender's clock at the moment of the send
    pub clock: ClockSnapshot,
}

impl Message {
    pub fn new(event_id: EventId, clock: ClockSnapshot) -> Self {
        Self { event_id, clock }
    }
}
