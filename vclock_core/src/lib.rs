//! Vector Clock Simulator Core
//!
//! Causal event execution for a fixed set of logical nodes. Each node runs
//! its own script of independent, send and receive events; receive events
//! block until one specific message has arrived, buffering any others.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    driver::launch                         │
//! │  ┌───────────┐      ┌───────────┐      ┌───────────┐     │
//! │  │ NodeActor │      │ NodeActor │      │ NodeActor │ ... │
//! │  │  clock    │      │  clock    │      │  clock    │     │
//! │  │  buffer   │      │  buffer   │      │  buffer   │     │
//! │  └─────┬─────┘      └─────┬─────┘      └─────┬─────┘     │
//! │        │   Message{id, ClockSnapshot}        │           │
//! │  ┌─────▼────────────────────▼──────────────────▼─────┐   │
//! │  │      ChannelRegistry (one FIFO inbox per node)    │   │
//! │  └───────────────────────────────────────────────────┘   │
//! │        │                                                 │
//! │        └──► TraceStream (node, event, clock) records     │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod clock;
pub mod driver;
pub mod error;
pub mod event;
pub mod message;
pub mod node;
pub mod trace;

// Re-export key types for convenience
pub use buffer::{BufferPolicy, ReceiveBuffer};
pub use clock::{ClockSnapshot, VectorClock};
pub use driver::{launch, ActorSet, Simulation};
pub use error::CoreError;
pub use event::{validate_scripts, Event, Script};
pub use message::Message;
pub use node::{NodeActor, NodeSummary};
pub use trace::{trace_channel, TraceRecord, TraceSink, TraceStream};

pub use vclock_env::{EventId, NodeId};
