//! Built-in causal ordering scenarios.

use crate::script::ScenarioScript;
use vclock_core::{CoreError, Event};
use vclock_env::NodeId;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// One send, one receive
    Handshake,

    /// Two sends arrive before the receive that wants the second one
    OutOfOrder,

    /// A token passed around four nodes and back
    Ring,

    /// Three senders, one receiver consuming in reverse arrival order
    FanIn,

    /// Cross traffic between three nodes with buffered matches
    Buffered,

    /// A receive waits for a send that never happens
    Deadlock,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Handshake,
            ScenarioId::OutOfOrder,
            ScenarioId::Ring,
            ScenarioId::FanIn,
            ScenarioId::Buffered,
            ScenarioId::Deadlock,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Handshake => "handshake",
            ScenarioId::OutOfOrder => "out_of_order",
            ScenarioId::Ring => "ring",
            ScenarioId::FanIn => "fan_in",
            ScenarioId::Buffered => "buffered",
            ScenarioId::Deadlock => "deadlock",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Handshake => "node 0 sends e1 to node 1, which receives it",
            ScenarioId::OutOfOrder => "node 1 waits for e3 while e1 arrives first and is buffered",
            ScenarioId::Ring => "4 nodes pass a token 0 -> 1 -> 2 -> 3 -> 0 with local work in between",
            ScenarioId::FanIn => "3 senders feed node 3, which receives in reverse order",
            ScenarioId::Buffered => "3 nodes exchange messages out of order; buffered ids are matched later",
            ScenarioId::Deadlock => "node 1 waits forever for e99, which nobody sends",
        }
    }

    /// Nodes expected to still be blocked when the run goes quiet.
    pub fn expected_blocked(&self) -> Vec<NodeId> {
        match self {
            ScenarioId::Deadlock => vec![NodeId::new(1)],
            _ => Vec::new(),
        }
    }

    /// Builds the scenario's scripts.
    pub fn script(&self) -> Result<ScenarioScript, CoreError> {
        use Event as E;

        let scripts = match self {
            ScenarioId::Handshake => vec![vec![E::send(1, 1)], vec![E::receive(2, 1)]],
            ScenarioId::OutOfOrder => vec![
                vec![E::send(1, 1), E::send(3, 1)],
                vec![E::receive(2, 3), E::receive(4, 1)],
            ],
            ScenarioId::Ring => vec![
                vec![E::independent(1), E::send(2, 1), E::receive(11, 10)],
                vec![E::receive(3, 2), E::independent(4), E::send(5, 2)],
                vec![E::receive(6, 5), E::send(7, 3)],
                vec![E::independent(8), E::receive(9, 7), E::send(10, 0)],
            ],
            ScenarioId::FanIn => vec![
                vec![E::independent(1), E::send(2, 3)],
                vec![E::send(3, 3)],
                vec![E::independent(4), E::independent(5), E::send(6, 3)],
                vec![
                    E::receive(7, 6),
                    E::receive(8, 3),
                    E::receive(9, 2),
                    E::independent(10),
                ],
            ],
            ScenarioId::Buffered => vec![
                vec![E::send(1, 1), E::send(2, 2), E::receive(3, 5)],
                vec![E::receive(4, 1), E::send(5, 0), E::send(6, 2)],
                vec![E::receive(7, 6), E::receive(8, 2), E::independent(9)],
            ],
            ScenarioId::Deadlock => vec![
                vec![E::independent(1), E::send(2, 1)],
                vec![E::receive(3, 2), E::receive(4, 99), E::independent(5)],
            ],
        };

        ScenarioScript::new(scripts)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "handshake" => Ok(ScenarioId::Handshake),
            "out_of_order" | "outoforder" => Ok(ScenarioId::OutOfOrder),
            "ring" => Ok(ScenarioId::Ring),
            "fan_in" | "fanin" => Ok(ScenarioId::FanIn),
            "buffered" => Ok(ScenarioId::Buffered),
            "deadlock" => Ok(ScenarioId::Deadlock),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_build() {
        for scenario in ScenarioId::all() {
            let script = scenario.script().unwrap();
            assert!(script.event_count() > 0, "{} is empty", scenario);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_only_deadlock_expects_blocking() {
        let blocking: Vec<_> = ScenarioId::all()
            .into_iter()
            .filter(|s| !s.expected_blocked().is_empty())
            .collect();
        assert_eq!(blocking, vec![ScenarioId::Deadlock]);
    }
}
