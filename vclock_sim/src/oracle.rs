//! Causality oracle for finished simulation runs.
//!
//! The Oracle knows every node's script and checks the recorded trace
//! against it:
//! - Each node's records follow its script order (a prefix if it blocked)
//! - A node's own clock slot strictly increases from one record to the next,
//!   by exactly 1 unless the later event is a receive (which adds one per
//!   merged message)
//! - Every receive's clock dominates the clock its dependency was sent with
//! - Under single-use buffering no send satisfies more than one receive

use crate::script::ScenarioScript;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vclock_core::{BufferPolicy, ClockSnapshot, Event, TraceRecord};
use vclock_env::{EventId, NodeId};

/// A broken causal guarantee found in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A node logged an event out of script order
    ScriptOrder {
        node: NodeId,
        position: usize,
        expected: Option<EventId>,
        found: EventId,
    },

    /// A node's own slot did not advance as required
    Monotonicity {
        node: NodeId,
        event: EventId,
        previous: u64,
        current: u64,
    },

    /// A receive did not observe everything its dependency carried
    CausalDominance {
        node: NodeId,
        event: EventId,
        dependency: EventId,
        receiver_clock: ClockSnapshot,
        sender_clock: ClockSnapshot,
    },

    /// A receive completed but its dependency's send never logged
    MissingSend {
        node: NodeId,
        event: EventId,
        dependency: EventId,
    },

    /// More receives matched an id than there were sends of it
    BufferReuse {
        dependency: EventId,
        sends: usize,
        receives: usize,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::ScriptOrder { node, position, expected, found } => match expected {
                Some(expected) => write!(
                    f,
                    "node {} logged event {} at position {}, script has {}",
                    node, found, position, expected
                ),
                None => write!(
                    f,
                    "node {} logged event {} past the end of its script",
                    node, found
                ),
            },
            Violation::Monotonicity { node, event, previous, current } => write!(
                f,
                "node {} own slot went {} -> {} at event {}",
                node, previous, current, event
            ),
            Violation::CausalDominance { node, event, dependency, receiver_clock, sender_clock } => write!(
                f,
                "node {} event {} clock [{}] does not dominate send {} clock [{}]",
                node, event, receiver_clock, dependency, sender_clock
            ),
            Violation::MissingSend { node, event, dependency } => write!(
                f,
                "node {} event {} completed but send {} was never logged",
                node, event, dependency
            ),
            Violation::BufferReuse { dependency, sends, receives } => write!(
                f,
                "send {} was sent {} time(s) but satisfied {} receive(s)",
                dependency, sends, receives
            ),
        }
    }
}

/// The Oracle - checks traces against the scripts that produced them.
pub struct Oracle<'a> {
    script: &'a ScenarioScript,
    policy: BufferPolicy,
}

impl<'a> Oracle<'a> {
    pub fn new(script: &'a ScenarioScript, policy: BufferPolicy) -> Self {
        Self { script, policy }
    }

    /// Runs every check and returns all violations found.
    pub fn check(&self, records: &[TraceRecord]) -> Vec<Violation> {
        let mut per_node: Vec<Vec<&TraceRecord>> = vec![Vec::new(); self.script.node_count()];
        for record in records {
            if let Some(list) = per_node.get_mut(record.node.index()) {
                list.push(record);
            }
        }

        let mut violations = Vec::new();
        for (index, node_records) in per_node.iter().enumerate() {
            self.check_node(NodeId::new(index), node_records, &mut violations);
        }
        self.check_dominance(&per_node, &mut violations);
        if self.policy == BufferPolicy::SingleUse {
            self.check_single_use(&per_node, &mut violations);
        }
        violations
    }

    /// Script order and own-slot monotonicity.
    fn check_node(&self, node: NodeId, records: &[&TraceRecord], out: &mut Vec<Violation>) {
        let script = &self.script.scripts()[node.index()];
        let mut previous: Option<u64> = None;

        for (position, record) in records.iter().enumerate() {
            let expected = script.get(position);
            if expected.map(Event::id) != Some(record.event) {
                out.push(Violation::ScriptOrder {
                    node,
                    position,
                    expected: expected.map(Event::id),
                    found: record.event,
                });
                // Positions no longer line up; later checks would only repeat this
                return;
            }

            let is_receive = expected.is_some_and(Event::is_receive);
            let current = record.clock.get(node);
            let ok = match previous {
                None if is_receive => current >= 1,
                None => current == 0,
                Some(prev) if is_receive => current > prev,
                Some(prev) => current == prev + 1,
            };
            if !ok {
                out.push(Violation::Monotonicity {
                    node,
                    event: record.event,
                    previous: previous.unwrap_or(0),
                    current,
                });
            }
            previous = Some(current);
        }
    }

    /// Every completed receive dominates the snapshot sent with its dependency.
    fn check_dominance(&self, per_node: &[Vec<&TraceRecord>], out: &mut Vec<Violation>) {
        let sends = self.send_clocks(per_node);

        for (index, records) in per_node.iter().enumerate() {
            let node = NodeId::new(index);
            let script = &self.script.scripts()[index];

            for (record, event) in records.iter().zip(script) {
                let Event::Receive { id, dependency } = *event else {
                    continue;
                };
                match sends.get(&dependency) {
                    None => out.push(Violation::MissingSend { node, event: id, dependency }),
                    Some(clocks) => {
                        if !clocks.iter().any(|c| record.clock.dominates(c)) {
                            out.push(Violation::CausalDominance {
                                node,
                                event: id,
                                dependency,
                                receiver_clock: record.clock.clone(),
                                sender_clock: clocks[0].clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// No send id satisfies more receives than it was sent.
    fn check_single_use(&self, per_node: &[Vec<&TraceRecord>], out: &mut Vec<Violation>) {
        let sends = self.send_clocks(per_node);
        let mut receives: HashMap<EventId, usize> = HashMap::new();

        for (records, script) in per_node.iter().zip(self.script.scripts()) {
            for (_, event) in records.iter().zip(script) {
                if let Event::Receive { dependency, .. } = event {
                    *receives.entry(*dependency).or_insert(0) += 1;
                }
            }
        }

        let mut reused: Vec<(EventId, usize, usize)> = receives
            .into_iter()
            .filter_map(|(dependency, count)| {
                let sent = sends.get(&dependency).map_or(0, Vec::len);
                (sent > 0 && count > sent).then_some((dependency, sent, count))
            })
            .collect();
        reused.sort();

        out.extend(reused.into_iter().map(|(dependency, sends, receives)| {
            Violation::BufferReuse {
                dependency,
                sends,
                receives,
            }
        }));
    }

    /// Logged clocks of every executed send, keyed by event id.
    ///
    /// A send logs the same clock it puts in its message.
    fn send_clocks(&self, per_node: &[Vec<&TraceRecord>]) -> HashMap<EventId, Vec<ClockSnapshot>> {
        let mut sends: HashMap<EventId, Vec<ClockSnapshot>> = HashMap::new();
        for (records, script) in per_node.iter().zip(self.script.scripts()) {
            for (record, event) in records.iter().zip(script) {
                if let Event::Send { id, .. } = event {
                    sends.entry(*id).or_default().push(record.clock.clone());
                }
            }
        }
        sends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(node: usize, event: u64, clock: &[u64]) -> TraceRecord {
        TraceRecord {
            node: NodeId::new(node),
            event: EventId::new(event),
            clock: ClockSnapshot::from_slots(clock.to_vec()),
        }
    }

    fn handshake() -> ScenarioScript {
        ScenarioScript::new(vec![vec![Event::send(1, 1)], vec![Event::receive(2, 1)]]).unwrap()
    }

    #[test]
    fn test_valid_trace_passes() {
        let script = handshake();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        let records = vec![record(0, 1, &[0, 0]), record(1, 2, &[0, 1])];
        assert!(oracle.check(&records).is_empty());
    }

    #[test]
    fn test_dominance_violation() {
        let script = ScenarioScript::new(vec![
            vec![Event::independent(5), Event::send(1, 1)],
            vec![Event::receive(2, 1)],
        ])
        .unwrap();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        // Receiver claims it never saw node 0's first event
        let records = vec![
            record(0, 5, &[0, 0]),
            record(0, 1, &[1, 0]),
            record(1, 2, &[0, 1]),
        ];
        let violations = oracle.check(&records);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Violation::CausalDominance { .. }));
    }

    #[test]
    fn test_order_violation() {
        let script = ScenarioScript::new(vec![vec![Event::independent(1), Event::independent(2)]]).unwrap();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        let violations = oracle.check(&[record(0, 2, &[0])]);
        assert_eq!(
            violations,
            vec![Violation::ScriptOrder {
                node: NodeId::new(0),
                position: 0,
                expected: Some(EventId::new(1)),
                found: EventId::new(2),
            }]
        );
    }

    #[test]
    fn test_monotonicity_violation() {
        let script = ScenarioScript::new(vec![vec![Event::independent(1), Event::independent(2)]]).unwrap();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        let violations = oracle.check(&[record(0, 1, &[0]), record(0, 2, &[2])]);
        assert!(matches!(
            violations[..],
            [Violation::Monotonicity { previous: 0, current: 2, .. }]
        ));
    }

    #[test]
    fn test_receive_may_jump_by_merges() {
        let script = ScenarioScript::new(vec![
            vec![Event::send(1, 1), Event::send(3, 1)],
            vec![Event::independent(9), Event::receive(2, 3)],
        ])
        .unwrap();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        let records = vec![
            record(0, 1, &[0, 0]),
            record(0, 3, &[1, 0]),
            record(1, 9, &[0, 0]),
            record(1, 2, &[1, 3]),
        ];
        assert!(oracle.check(&records).is_empty());
    }

    #[test]
    fn test_buffer_reuse_detected_only_for_single_use() {
        let script = ScenarioScript::new(vec![
            vec![Event::send(1, 1)],
            vec![Event::receive(2, 1), Event::receive(3, 1)],
        ])
        .unwrap();
        let records = vec![
            record(0, 1, &[0, 0]),
            record(1, 2, &[0, 1]),
            record(1, 3, &[0, 2]),
        ];

        let strict = Oracle::new(&script, BufferPolicy::SingleUse).check(&records);
        assert_eq!(
            strict,
            vec![Violation::BufferReuse {
                dependency: EventId::new(1),
                sends: 1,
                receives: 2,
            }]
        );
        assert!(Oracle::new(&script, BufferPolicy::Reusable).check(&records).is_empty());
    }

    #[test]
    fn test_missing_send() {
        let script = handshake();
        let oracle = Oracle::new(&script, BufferPolicy::SingleUse);
        let violations = oracle.check(&[record(1, 2, &[0, 1])]);
        assert!(matches!(violations[..], [Violation::MissingSend { .. }]));
        assert!(violations[0].to_string().contains("never logged"));
    }
}
