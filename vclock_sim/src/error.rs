//! Error types for the simulation harness.

use crate::script::ScriptError;
use thiserror::Error;
use vclock_core::CoreError;

/// Fatal harness errors. A run that merely fails its checks is not an
/// error; it is reported through `ScenarioResult`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Json(#[from] serde_json::Error),
}
