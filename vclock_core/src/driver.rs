//! Simulation driver - wires N clocks, channels and scripts into running actors.

use crate::buffer::BufferPolicy;
use crate::clock::VectorClock;
use crate::error::CoreError;
use crate::event::{validate_scripts, Script};
use crate::node::{NodeActor, NodeSummary};
use crate::trace::{trace_channel, TraceRecord, TraceStream};

use tokio::task::JoinSet;
use tracing::{debug, info};
use vclock_env::{ChannelRegistry, NodeId};

/// Validates `scripts` and starts one actor task per node.
///
/// Must be called from within a tokio runtime. A malformed script is
/// reported before any task is spawned.
pub fn launch(scripts: Vec<Script>, policy: BufferPolicy) -> Result<Simulation, CoreError> {
    let node_count = scripts.len();
    validate_scripts(node_count, &scripts)?;

    let mut registry = ChannelRegistry::new(node_count);
    let (sink, trace) = trace_channel();
    let mut actors = JoinSet::new();

    for (index, script) in scripts.into_iter().enumerate() {
        let id = NodeId::new(index);
        let transport = registry.endpoint(id)?;
        let actor = NodeActor::new(
            VectorClock::new(id, node_count),
            script,
            transport,
            sink.clone(),
            policy,
        );
        debug!(node = %actor.id(), "spawning node actor");
        actors.spawn(actor.run());
    }

    info!(nodes = node_count, policy = %policy, "simulation launched");

    Ok(Simulation {
        node_count,
        trace,
        actors: ActorSet { tasks: actors },
    })
}

/// A running simulation.
pub struct Simulation {
    node_count: usize,
    trace: TraceStream,
    actors: ActorSet,
}

impl Simulation {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Splits into the trace stream and the actor set so both can be
    /// polled at the same time.
    pub fn into_parts(self) -> (TraceStream, ActorSet) {
        (self.trace, self.actors)
    }

    /// Waits for every actor and collects the full trace.
    ///
    /// Never returns while a node is blocked on a dependency nobody sends.
    pub async fn run_to_completion(self) -> Result<(Vec<NodeSummary>, Vec<TraceRecord>), CoreError> {
        let (trace, actors) = self.into_parts();
        let summaries = actors.join().await?;
        let records = trace.collect().await;
        Ok((summaries, records))
    }
}

/// The spawned node actors.
///
/// Dropping the set aborts every actor that is still running.
pub struct ActorSet {
    tasks: JoinSet<Result<NodeSummary, CoreError>>,
}

impl ActorSet {
    /// Number of actors that have not been joined yet.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for the next actor to finish; `None` once all were joined.
    pub async fn join_next(&mut self) -> Option<Result<NodeSummary, CoreError>> {
        let joined = self.tasks.join_next().await?;
        Some(match joined {
            Ok(result) => result,
            Err(err) => Err(CoreError::ActorFailed(err.to_string())),
        })
    }

    /// Waits for every actor. The first failure aborts all remaining actors.
    pub async fn join(mut self) -> Result<Vec<NodeSummary>, CoreError> {
        let mut summaries = Vec::with_capacity(self.len());

        while let Some(result) = self.join_next().await {
            match result {
                Ok(summary) => {
                    debug!(node = %summary.node, "actor joined");
                    summaries.push(summary);
                }
                Err(err) => {
                    self.abort_all();
                    return Err(err);
                }
            }
        }

        summaries.sort_by_key(|s| s.node);
        Ok(summaries)
    }

    /// Cancels every actor still running.
    pub fn abort_all(&mut self) {
        self.tasks.abort_all();
    }

    /// Lets every remaining actor keep running (or stay suspended) on the
    /// runtime without being tracked by this set.
    pub fn detach_all(mut self) {
        self.tasks.detach_all();
    }
}
