//! Node actor - executes one node's script against its own clock.
//!
//! # Event Handling
//!
//! ```text
//! Independent  log(clock) -> increment
//! Send         enqueue Message(id, snapshot) on receiver's channel -> log(clock) -> increment
//! Receive(D)   wait for D (buffer first, then own channel) -> log(clock) -> increment
//! ```
//!
//! Waiting for `D` merges every dequeued message into the clock in receipt
//! order, whether or not it is the awaited one. Messages that are not `D`
//! leave their event id in the receive buffer for a later receive event.

use crate::buffer::{BufferPolicy, ReceiveBuffer};
use crate::clock::{ClockSnapshot, VectorClock};
use crate::error::CoreError;
use crate::event::{Event, Script};
use crate::message::Message;
use crate::trace::{TraceRecord, TraceSink};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vclock_env::{EventId, NetworkTransport, NodeId};

/// What a node reports once its script is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub node: NodeId,

    /// Number of script events executed
    pub events_executed: usize,

    /// Number of messages dequeued and merged into the clock
    pub messages_merged: usize,

    /// Event ids left in the receive buffer
    pub buffered_remaining: Vec<EventId>,

    /// Clock after the last event's increment
    pub final_clock: ClockSnapshot,
}

/// A simulated node.
///
/// Generic over the transport so the same actor runs on any channel
/// implementation.
pub struct NodeActor<Net>
where
    Net: NetworkTransport<Message>,
{
    id: NodeId,

    /// Exclusively owned; mutated only here
    clock: VectorClock,

    /// Remaining events, executed in order
    script: Script,

    /// Read end of our channel, write end of everyone's
    transport: Net,

    trace: TraceSink,

    buffer: ReceiveBuffer,

    events_executed: usize,
    messages_merged: usize,
}

impl<Net> NodeActor<Net>
where
    Net: NetworkTransport<Message>,
{
    /// Creates a node actor.
    ///
    /// # Arguments
    /// * `clock` - This node's clock; its owner must be `transport.local_id()`
    /// * `script` - Events to execute, front to back
    /// * `transport` - This node's network endpoint
    /// * `trace` - Where executed events are logged
    /// * `policy` - How the receive buffer treats matched ids
    pub fn new(
        clock: VectorClock,
        script: Script,
        transport: Net,
        trace: TraceSink,
        policy: BufferPolicy,
    ) -> Self {
        Self {
            id: transport.local_id(),
            clock,
            script,
            transport,
            trace,
            buffer: ReceiveBuffer::new(policy),
            events_executed: 0,
            messages_merged: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn buffer(&self) -> &ReceiveBuffer {
        &self.buffer
    }

    /// Runs the whole script and reports the final state.
    ///
    /// Never returns if a receive event waits for a message nobody sends.
    pub async fn run(mut self) -> Result<NodeSummary, CoreError> {
        let script = std::mem::take(&mut self.script);
        debug!(node = %self.id, events = script.len(), "node started");

        for event in script {
            self.execute(event).await?;
        }

        debug!(node = %self.id, clock = %self.clock, "node finished");
        Ok(self.summary())
    }

    /// Executes a single event.
    pub async fn execute(&mut self, event: Event) -> Result<(), CoreError> {
        match event {
            Event::Independent { id } => {
                self.log(id);
            }
            Event::Send { id, receiver } => {
                let message = Message::new(id, self.clock.snapshot());
                self.transport.send(receiver, message)?;
                trace!(node = %self.id, event = %id, to = %receiver, "message sent");
                self.log(id);
            }
            Event::Receive { id, dependency } => {
                self.wait_on_dependency(dependency).await?;
                self.log(id);
            }
        }

        self.clock.increment();
        self.events_executed += 1;
        Ok(())
    }

    /// Blocks until the message produced by send event `dependency` has been observed.
    async fn wait_on_dependency(&mut self, dependency: EventId) -> Result<(), CoreError> {
        if self.buffer.take(dependency) {
            trace!(node = %self.id, dependency = %dependency, "dependency already buffered");
            return Ok(());
        }

        loop {
            let message = self
                .transport
                .recv()
                .await
                .ok_or(CoreError::InboxClosed(self.id))?;

            self.clock.merge(&message.clock)?;
            self.messages_merged += 1;

            if message.event_id == dependency {
                trace!(node = %self.id, dependency = %dependency, clock = %self.clock, "dependency received");
                return Ok(());
            }

            trace!(
                node = %self.id,
                waiting_for = %dependency,
                got = %message.event_id,
                "buffering out-of-order message"
            );
            self.buffer.insert(message.event_id);
        }
    }

    fn log(&self, event: EventId) {
        self.trace.record(TraceRecord {
            node: self.id,
            event,
            clock: self.clock.snapshot(),
        });
    }

    fn summary(&self) -> NodeSummary {
        NodeSummary {
            node: self.id,
            events_executed: self.events_executed,
            messages_merged: self.messages_merged,
            buffered_remaining: self.buffer.ids(),
            final_clock: self.clock.snapshot(),
        }
    }
}
