//! Scenario runner - executes a script and judges the resulting trace.

use crate::error::SimError;
use crate::oracle::{Oracle, Violation};
use crate::scenarios::ScenarioId;
use crate::script::ScenarioScript;
use crate::world::{SimConfig, SimWorld};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vclock_core::{NodeSummary, TraceRecord};
use vclock_env::NodeId;

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario or script name
    pub name: String,

    /// Whether the trace passed every check and blocking matched expectations
    pub passed: bool,

    /// Every trace record, in the order they were produced
    pub records: Vec<TraceRecord>,

    /// Reports of the nodes that finished their scripts
    pub summaries: Vec<NodeSummary>,

    /// Nodes still waiting on a dependency when the run went quiet
    pub blocked_nodes: Vec<NodeId>,

    /// Causal checks that failed
    pub violations: Vec<Violation>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Trace records produced
    pub events_logged: usize,

    /// Messages dequeued and merged, over finished nodes
    pub messages_merged: usize,

    /// Buffered ids never claimed by a receive, over finished nodes
    pub unclaimed_buffered: usize,
}

/// Runs scripts to quiescence.
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs a built-in scenario.
    pub async fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} - {}", scenario.name(), scenario.description());
        let script = scenario.script()?;
        self.run_script(scenario.name(), script, &scenario.expected_blocked(), |_| {})
            .await
    }

    /// Runs `script` until every node finishes or no node makes progress for
    /// the stall timeout. `on_record` sees each trace record as it arrives.
    ///
    /// Nodes still blocked at that point are reported, not cancelled: they
    /// stay suspended on the runtime.
    pub async fn run_script<F>(
        &self,
        name: &str,
        script: ScenarioScript,
        expected_blocked: &[NodeId],
        mut on_record: F,
    ) -> Result<ScenarioResult, SimError>
    where
        F: FnMut(&TraceRecord),
    {
        let world = SimWorld::new(script, self.config.clone());
        let (mut trace, mut actors) = world.launch()?.into_parts();

        let mut records = Vec::new();
        let mut summaries = Vec::new();

        while !actors.is_empty() {
            tokio::select! {
                Some(record) = trace.next() => {
                    on_record(&record);
                    records.push(record);
                }
                Some(joined) = actors.join_next() => match joined {
                    Ok(summary) => summaries.push(summary),
                    Err(err) => {
                        actors.abort_all();
                        return Err(err.into());
                    }
                },
                _ = tokio::time::sleep(self.config.stall_timeout) => {
                    debug!(remaining = actors.len(), "no progress within stall timeout");
                    break;
                }
            }
        }

        let finished = actors.is_empty();
        if finished {
            // Every sink is gone; drain what is left
            while let Some(record) = trace.next().await {
                on_record(&record);
                records.push(record);
            }
        } else {
            while let Some(record) = trace.try_next() {
                on_record(&record);
                records.push(record);
            }
            actors.detach_all();
        }

        summaries.sort_by_key(|s| s.node);
        let blocked_nodes: Vec<NodeId> = (0..world.node_count())
            .map(NodeId::new)
            .filter(|id| !summaries.iter().any(|s| s.node == *id))
            .collect();
        if !blocked_nodes.is_empty() {
            warn!(?blocked_nodes, "nodes blocked on dependencies that never arrived");
        }

        let violations = Oracle::new(&world.script, self.config.buffer_policy).check(&records);

        let mut expected: Vec<NodeId> = expected_blocked.to_vec();
        expected.sort();
        let failure_reason = if let Some(first) = violations.first() {
            Some(format!("{} causal violation(s), first: {}", violations.len(), first))
        } else if blocked_nodes != expected {
            Some(format!(
                "blocked nodes {:?}, expected {:?}",
                blocked_nodes.iter().map(NodeId::index).collect::<Vec<_>>(),
                expected.iter().map(NodeId::index).collect::<Vec<_>>()
            ))
        } else {
            None
        };

        let metrics = ScenarioMetrics {
            events_logged: records.len(),
            messages_merged: summaries.iter().map(|s| s.messages_merged).sum(),
            unclaimed_buffered: summaries.iter().map(|s| s.buffered_remaining.len()).sum(),
        };

        Ok(ScenarioResult {
            name: name.to_string(),
            passed: failure_reason.is_none(),
            records,
            summaries,
            blocked_nodes,
            violations,
            failure_reason,
            metrics,
        })
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
