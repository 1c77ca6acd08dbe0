//! SimWorld - configuration and launch of one simulation run.

use crate::error::SimError;
use crate::script::ScenarioScript;

use std::time::Duration;
use tracing::debug;
use vclock_core::{launch, BufferPolicy, Simulation};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// How receive buffers treat ids that already matched a receive event
    pub buffer_policy: BufferPolicy,

    /// How long the run may go without any node making progress before the
    /// unfinished nodes are reported as blocked
    pub stall_timeout: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            buffer_policy: BufferPolicy::SingleUse,
            stall_timeout: Duration::from_millis(500),
        }
    }
}

impl SimConfig {
    /// Sets the buffer policy.
    pub fn with_buffer_policy(mut self, policy: BufferPolicy) -> Self {
        self.buffer_policy = policy;
        self
    }

    /// Sets the stall timeout.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }
}

/// The SimWorld - a script plus the configuration to run it with.
pub struct SimWorld {
    pub config: SimConfig,
    pub script: ScenarioScript,
}

impl SimWorld {
    pub fn new(script: ScenarioScript, config: SimConfig) -> Self {
        Self { config, script }
    }

    pub fn node_count(&self) -> usize {
        self.script.node_count()
    }

    /// Starts one actor per node. Must be called inside a tokio runtime.
    pub fn launch(&self) -> Result<Simulation, SimError> {
        debug!(
            nodes = self.node_count(),
            events = self.script.event_count(),
            "launching world"
        );
        Ok(launch(self.script.scripts().to_vec(), self.config.buffer_policy)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = SimConfig::default()
            .with_buffer_policy(BufferPolicy::Reusable)
            .with_stall_timeout(Duration::from_millis(20));
        assert_eq!(config.buffer_policy, BufferPolicy::Reusable);
        assert_eq!(config.stall_timeout, Duration::from_millis(20));
        assert_eq!(SimConfig::default().buffer_policy, BufferPolicy::SingleUse);
    }

    #[tokio::test]
    async fn test_world_launch() {
        let script = ScenarioScript::parse("n,2\n#,0\ns,1,1\n#,1\nr,2,1\n").unwrap();
        let world = SimWorld::new(script, SimConfig::default());
        let sim = world.launch().unwrap();
        assert_eq!(sim.node_count(), 2);

        let (summaries, records) = sim.run_to_completion().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(records.len(), 2);
    }
}
