//! Trace records: the observable output of a simulation.
//!
//! Every executed event produces one `TraceRecord`, pushed to a shared
//! unbounded channel the moment the event completes. The consuming side
//! (`TraceStream`) therefore sees records lazily and in real time.

use crate::clock::ClockSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vclock_env::{EventId, NodeId};

/// One executed event with the node's clock at the time it was logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub node: NodeId,
    pub event: EventId,
    pub clock: ClockSnapshot,
}

impl std::fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node: {}\t\tEvent: {}\tClock: {}", self.node, self.event, self.clock)
    }
}

/// Creates a connected sink/stream pair.
pub fn trace_channel() -> (TraceSink, TraceStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TraceSink { tx }, TraceStream { rx })
}

/// Write side, cloned into every node actor.
#[derive(Debug, Clone)]
pub struct TraceSink {
    tx: mpsc::UnboundedSender<TraceRecord>,
}

impl TraceSink {
    /// Appends a record. Records are dropped silently once nobody listens.
    pub fn record(&self, record: TraceRecord) {
        let _ = self.tx.send(record);
    }
}

/// Read side of the trace.
#[derive(Debug)]
pub struct TraceStream {
    rx: mpsc::UnboundedReceiver<TraceRecord>,
}

impl TraceStream {
    /// Waits for the next record; `None` once every actor has finished.
    pub async fn next(&mut self) -> Option<TraceRecord> {
        self.rx.recv().await
    }

    /// Returns a record if one is already available.
    pub fn try_next(&mut self) -> Option<TraceRecord> {
        self.rx.try_recv().ok()
    }

    /// Drains the whole trace.
    ///
    /// Only returns once every actor has finished, so it never returns while
    /// a node is blocked on a dependency that is never sent.
    pub async fn collect(mut self) -> Vec<TraceRecord> {
        let mut records = Vec::new();
        while let Some(record) = self.rx.recv().await {
            records.push(record);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let record = TraceRecord {
            node: NodeId::new(1),
            event: EventId::new(2),
            clock: ClockSnapshot::from_slots(vec![1, 1]),
        };
        assert_eq!(record.to_string(), "Node: 1\t\tEvent: 2\tClock: 1 1");
    }

    #[tokio::test]
    async fn test_stream_ends_when_sinks_drop() {
        let (sink, stream) = trace_channel();
        let other = sink.clone();
        sink.record(TraceRecord {
            node: NodeId::new(0),
            event: EventId::new(1),
            clock: ClockSnapshot::from_slots(vec![0]),
        });
        drop(sink);
        drop(other);

        let records = stream.collect().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, EventId::new(1));
    }
}
