//! Taint analysis types and data structures.
//!
//! This module contains the core types used for taint analysis:
//! - Trigger vocabulary entries and match results
//! - Sanitiser bindings
//! - Vulnerability records and the vulnerability log

use serde::{Deserialize, Serialize};

use crate::cfg::{CfgGraph, NodeId};

/// A vocabulary entry: a trigger word matched lexically against node labels,
/// plus its ordered qualifier list. For sinks the qualifiers name the
/// sanitisers that neutralize the sink; sources typically have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerWord {
    /// The word matched against node labels
    pub word: String,
    /// Ordered qualifier list (sanitiser names for sinks)
    pub qualifiers: Vec<String>,
}

impl TriggerWord {
    /// Create an entry with qualifiers
    pub fn new(word: &str, qualifiers: Vec<String>) -> Self {
        Self {
            word: word.to_string(),
            qualifiers,
        }
    }

    /// Create an entry with no qualifiers
    pub fn bare(word: &str) -> Self {
        Self::new(word, Vec::new())
    }
}

/// A match result: a vocabulary entry paired with the node where it was
/// found. One node may carry several trigger nodes, one per matched entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerNode {
    /// The vocabulary entry that matched
    pub trigger: TriggerWord,
    /// The node it matched on
    pub node: NodeId,
}

/// A named neutralizing operation bound to the node where it occurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitiser {
    /// Sanitiser name (a sink qualifier)
    pub name: String,
    /// Node implementing the sanitiser
    pub node: NodeId,
}

impl Sanitiser {
    pub fn new(name: &str, node: NodeId) -> Self {
        Self {
            name: name.to_string(),
            node,
        }
    }
}

/// An unguarded source-to-sink flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Trigger word that identified the source
    pub source_word: String,
    /// Label of the source node
    pub source_label: String,
    /// Line number of the source, if known
    pub source_line: Option<usize>,
    /// Trigger word that identified the sink
    pub sink_word: String,
    /// Label of the sink node
    pub sink_label: String,
    /// Line number of the sink, if known
    pub sink_line: Option<usize>,
    /// Sanitisers that were checked for this sink and found absent
    pub missing_sanitisers: Vec<String>,
}

impl Vulnerability {
    /// Build a record from a matched source and sink pair
    pub fn new(graph: &CfgGraph, source: &TriggerNode, sink: &TriggerNode) -> Self {
        let source_node = graph.node(source.node);
        let sink_node = graph.node(sink.node);
        Self {
            source_word: source.trigger.word.clone(),
            source_label: source_node.label.clone(),
            source_line: source_node.line,
            sink_word: sink.trigger.word.clone(),
            sink_label: sink_node.label.clone(),
            sink_line: sink_node.line,
            missing_sanitisers: sink.trigger.qualifiers.clone(),
        }
    }
}

/// Append-only collection of findings, produced fresh per analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityLog {
    /// Findings in discovery order
    pub vulnerabilities: Vec<Vulnerability>,
}

impl VulnerabilityLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding
    pub fn append(&mut self, vulnerability: Vulnerability) {
        self.vulnerabilities.push(vulnerability);
    }

    /// Number of findings
    pub fn len(&self) -> usize {
        self.vulnerabilities.len()
    }

    /// True if no findings were recorded
    pub fn is_empty(&self) -> bool {
        self.vulnerabilities.is_empty()
    }

    /// Format the log as markdown
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Taint Analysis Report\n\n");

        if self.vulnerabilities.is_empty() {
            md.push_str("No vulnerabilities found.\n");
            return md;
        }

        md.push_str(&format!(
            "**Vulnerabilities**: {}\n\n",
            self.vulnerabilities.len()
        ));

        for (i, vuln) in self.vulnerabilities.iter().enumerate() {
            md.push_str(&format!("## Vulnerability {}\n\n", i + 1));

            md.push_str(&format!(
                "- **Source**: `{}` (trigger `{}`{})\n",
                vuln.source_label,
                vuln.source_word,
                format_line(vuln.source_line)
            ));
            md.push_str(&format!(
                "- **Sink**: `{}` (trigger `{}`{})\n",
                vuln.sink_label,
                vuln.sink_word,
                format_line(vuln.sink_line)
            ));

            if vuln.missing_sanitisers.is_empty() {
                md.push_str("- **Sanitisers**: none configured for this sink\n");
            } else {
                md.push_str(&format!(
                    "- **Sanitisers checked and absent**: {}\n",
                    vuln.missing_sanitisers.join(", ")
                ));
            }
            md.push('\n');
        }

        md
    }
}

fn format_line(line: Option<usize>) -> String {
    match line {
        Some(line) => format!(", line {}", line),
        None => String::new(),
    }
}
