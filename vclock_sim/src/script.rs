//! Script file loader.
//!
//! Scripts are plain text, one comma-separated record per line:
//!
//! ```text
//! n,X     first line: X nodes take part in the simulation
//! #,X     start of node X's event list (nodes numbered from 0)
//! i,X     independent event X
//! s,X,Y   send event X, delivered to node Y
//! r,X,Y   receive event X, which waits for the message of send event Y
//! ```
//!
//! Blank lines are ignored and fields may be padded with whitespace. A node
//! without a `#` section gets an empty script. At most [`MAX_NODES`] nodes
//! are accepted.

use std::path::Path;
use thiserror::Error;
use vclock_core::{validate_scripts, CoreError, Event, Script};

/// Largest node count a script may declare.
///
/// A run allocates N channels and N clocks of N slots each.
pub const MAX_NODES: usize = 4096;

/// Errors raised while loading a script file. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input: script is empty, expected \"n,X\" where X is the number of nodes")]
    MissingHeader,

    #[error("Malformed input at line {line}: first line should read \"n,X\" where X is the number of nodes")]
    InvalidHeader { line: usize },

    #[error("Malformed input at line {line}: '{tag}' needs {expected} fields, found {found}")]
    TooFewFields {
        line: usize,
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("Malformed input at line {line}: '{value}' is not a non-negative integer")]
    InvalidNumber { line: usize, value: String },

    #[error("Malformed input at line {line}: unknown event type '{tag}'")]
    UnknownEventTag { line: usize, tag: String },

    #[error("Malformed input at line {line}: event listed before any \"#,X\" node section")]
    EventOutsideSection { line: usize },

    #[error("Malformed input at line {line}: node count {node_count} exceeds the limit of {max}", max = MAX_NODES)]
    TooManyNodes { line: usize, node_count: u64 },

    #[error("Malformed input at line {line}: node {node} does not exist ({node_count} nodes)")]
    NodeOutOfRange {
        line: usize,
        node: u64,
        node_count: usize,
    },

    #[error("Malformed input at line {line}: node {node} has more than one section")]
    DuplicateSection { line: usize, node: usize },

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// A loaded, validated simulation script: one event list per node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioScript {
    scripts: Vec<Script>,
}

impl ScenarioScript {
    /// Wraps per-node scripts after validating them.
    pub fn new(scripts: Vec<Script>) -> Result<Self, CoreError> {
        validate_scripts(scripts.len(), &scripts)?;
        Ok(Self { scripts })
    }

    /// Reads and parses a script file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses script text.
    pub fn parse(input: &str) -> Result<Self, ScriptError> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines.next().ok_or(ScriptError::MissingHeader)?;
        let header = fields(header);
        if header.first() != Some(&"n") || header.len() < 2 {
            return Err(ScriptError::InvalidHeader { line: header_line });
        }
        let declared = number(header_line, header[1])?;
        let node_count = usize::try_from(declared)
            .ok()
            .filter(|n| *n <= MAX_NODES)
            .ok_or(ScriptError::TooManyNodes {
                line: header_line,
                node_count: declared,
            })?;
        if node_count == 0 {
            return Err(CoreError::EmptyNetwork.into());
        }

        let mut scripts: Vec<Option<Script>> = vec![None; node_count];
        let mut current: Option<usize> = None;

        for (line, text) in lines {
            let record = fields(text);
            let tag = record[0];

            if tag == "#" {
                require(line, &record, 2)?;
                let node = node_index(line, record[1], node_count)?;
                let slot = &mut scripts[node];
                if slot.is_some() {
                    return Err(ScriptError::DuplicateSection { line, node });
                }
                *slot = Some(Vec::new());
                current = Some(node);
                continue;
            }

            let event = match tag {
                "i" => {
                    require(line, &record, 2)?;
                    Event::independent(number(line, record[1])?)
                }
                "s" => {
                    require(line, &record, 3)?;
                    let receiver = node_index(line, record[2], node_count)?;
                    Event::send(number(line, record[1])?, receiver)
                }
                "r" => {
                    require(line, &record, 3)?;
                    Event::receive(number(line, record[1])?, number(line, record[2])?)
                }
                other => {
                    return Err(ScriptError::UnknownEventTag {
                        line,
                        tag: other.to_string(),
                    })
                }
            };

            let node = current.ok_or(ScriptError::EventOutsideSection { line })?;
            if let Some(script) = scripts[node].as_mut() {
                script.push(event);
            }
        }

        let scripts = scripts.into_iter().map(Option::unwrap_or_default).collect();
        Ok(Self::new(scripts)?)
    }

    pub fn node_count(&self) -> usize {
        self.scripts.len()
    }

    /// Per-node scripts, indexed by node id.
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// Total number of events across all nodes.
    pub fn event_count(&self) -> usize {
        self.scripts.iter().map(Vec::len).sum()
    }

    /// Renders the script back into the file format.
    pub fn to_text(&self) -> String {
        let mut out = format!("n,{}\n", self.node_count());
        for (node, script) in self.scripts.iter().enumerate() {
            out.push_str(&format!("#,{}\n", node));
            for event in script {
                out.push_str(&format!("{}\n", event));
            }
        }
        out
    }
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn require(line: usize, record: &[&str], expected: usize) -> Result<(), ScriptError> {
    if record.len() < expected {
        return Err(ScriptError::TooFewFields {
            line,
            tag: record[0].to_string(),
            expected,
            found: record.len(),
        });
    }
    Ok(())
}

fn number(line: usize, value: &str) -> Result<u64, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

/// Parses a node number and checks it names one of `node_count` nodes.
fn node_index(line: usize, value: &str, node_count: usize) -> Result<usize, ScriptError> {
    let node = number(line, value)?;
    usize::try_from(node)
        .ok()
        .filter(|index| *index < node_count)
        .ok_or(ScriptError::NodeOutOfRange {
            line,
            node,
            node_count,
        })
}
