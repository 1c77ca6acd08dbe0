//! Vector Clock Simulation Harness
//!
//! Loads node scripts, runs them on the causal execution engine and checks
//! the resulting trace.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                          │
//! │  ┌────────────────┐  ┌─────────────────────────────────┐    │
//! │  │ ScenarioScript │─►│ SimWorld (vclock_core::launch)  │    │
//! │  │ (file/builtin) │  │  N actors + N inbox channels    │    │
//! │  └────────────────┘  └──────────────┬──────────────────┘    │
//! │                                     │ TraceRecords          │
//! │                      ┌──────────────▼──────────────────┐    │
//! │                      │            Oracle               │    │
//! │                      │ (order, monotonicity, dominance)│    │
//! │                      └─────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vclock_sim::{ScenarioRunner, SimConfig};
//! use vclock_sim::scenarios::ScenarioId;
//!
//! let runner = ScenarioRunner::new(SimConfig::default());
//! let result = runner.run(ScenarioId::OutOfOrder).await?;
//! assert!(result.passed);
//! ```

mod error;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;
pub mod script;
mod world;

pub use error::SimError;
pub use exporter::SimExport;
pub use oracle::{Oracle, Violation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use script::{ScenarioScript, ScriptError};
pub use world::{SimConfig, SimWorld};
