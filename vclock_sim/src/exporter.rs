//! JSON exporter for simulation traces.
//!
//! Writes the full trace of one or more runs, with the checks' verdicts,
//! so runs can be diffed or inspected offline.

use crate::runner::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use vclock_core::BufferPolicy;

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Buffer policy the runs used
    pub buffer_policy: BufferPolicy,

    /// Number of runs that passed
    pub passed: usize,

    /// Number of runs that failed
    pub failed: usize,

    /// All runs
    pub runs: Vec<ScenarioResult>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(buffer_policy: BufferPolicy) -> Self {
        Self {
            buffer_policy,
            passed: 0,
            failed: 0,
            runs: Vec::new(),
        }
    }

    /// Adds a run.
    pub fn add_run(&mut self, result: ScenarioResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.runs.push(result);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScenarioRunner;
    use crate::scenarios::ScenarioId;

    #[tokio::test]
    async fn test_export_shape() {
        let result = ScenarioRunner::default().run(ScenarioId::Handshake).await.unwrap();
        let mut export = SimExport::new(BufferPolicy::SingleUse);
        export.add_run(result);
        assert!(export.all_passed());

        let json: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(json["buffer_policy"], "single_use");
        assert_eq!(json["passed"], 1);
        assert_eq!(json["runs"][0]["name"], "handshake");
        let receive = json["runs"][0]["records"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["event"] == 2)
            .unwrap();
        assert_eq!(receive["node"], 1);
        assert_eq!(receive["clock"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join(format!("vclock_export_{}.json", std::process::id()));
        let path = path.to_str().unwrap().to_string();

        SimExport::new(BufferPolicy::Reusable).write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"reusable\""));
        std::fs::remove_file(&path).unwrap();
    }
}
