//! Vector Clock Simulator Environment Layer
//!
//! This crate provides the identifiers and the message transport shared by
//! every simulated node. Nodes never touch each other's state: the only
//! shared resource is the per-node inbound channel.
//!
//! # Core Concept: One Inbox Per Node
//!
//! - Any node may enqueue onto any inbox (`send()`, never blocks)
//! - Only the owner dequeues from its inbox (`recv()`, suspends when empty)
//! - Each inbox is FIFO across all of its writers
//!
//! # Example
//!
//! ```ignore
//! use vclock_env::{ChannelRegistry, NetworkTransport, NodeId};
//!
//! let mut registry = ChannelRegistry::<u64>::new(2);
//! let a = registry.endpoint(NodeId::new(0))?;
//! let b = registry.endpoint(NodeId::new(1))?;
//!
//! a.send(NodeId::new(1), 7)?;
//! assert_eq!(b.recv().await, Some(7));
//! ```

mod network;
mod types;
mod error;
mod tokio_impl;

pub use network::NetworkTransport;
pub use types::{EventId, NodeId};
pub use error::EnvError;
pub use tokio_impl::{ChannelRegistry, TokioTransport};
