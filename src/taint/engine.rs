//! Taint engine implementation.
//!
//! This module combines the trigger matcher with the reaching-definitions
//! results to decide, per sink, whether untrusted data reaches it and
//! whether a recognized sanitiser neutralizes it. The engine never mutates
//! the graph; it reads the constraint sets the solver froze, so repeated
//! runs over a solved session yield identical logs.

use std::collections::HashMap;
use tracing::debug;

use super::types::{Sanitiser, TriggerNode, TriggerWord, Vulnerability, VulnerabilityLog};
use super::vocabulary::{self, Vocabulary};
use crate::cfg::{CfgGraph, CfgId, NodeId};

/// Mapping from sanitiser name to the ordered nodes implementing it
pub type SanitiserNodeDict = HashMap<String, Vec<NodeId>>;

/// The taint analysis engine for one solved session
pub struct TaintEngine<'a> {
    graph: &'a CfgGraph,
    vocabulary: &'a Vocabulary,
}

impl<'a> TaintEngine<'a> {
    /// Create an engine over a session whose constraint sets have already
    /// been populated by [`crate::dataflow::analyse`]
    pub fn new(graph: &'a CfgGraph, vocabulary: &'a Vocabulary) -> Self {
        Self { graph, vocabulary }
    }

    /// Scan every node label of one CFG for vocabulary matches, in program
    /// order
    pub fn find_triggers(&self, cfg: CfgId, trigger_words: &[TriggerWord]) -> Vec<TriggerNode> {
        self.graph
            .cfg_nodes(cfg)
            .flat_map(|node| vocabulary::label_contains(node, trigger_words))
            .collect()
    }

    /// For every sanitiser name a sink lists, collect the nodes of this CFG
    /// whose labels match it. Sinks with no configured sanitisers contribute
    /// no entries.
    pub fn build_sanitiser_node_dict(
        &self,
        cfg: CfgId,
        sinks: &[TriggerNode],
    ) -> SanitiserNodeDict {
        let mut sanitisers_in_cfg: Vec<Sanitiser> = Vec::new();
        for sink in sinks {
            for name in &sink.trigger.qualifiers {
                let pattern = name.to_lowercase();
                for node in self.graph.cfg_nodes(cfg) {
                    if node.label.to_lowercase().contains(&pattern) {
                        sanitisers_in_cfg.push(Sanitiser::new(name, node.id));
                    }
                }
            }
        }

        let mut dict = SanitiserNodeDict::new();
        for sink in sinks {
            for name in &sink.trigger.qualifiers {
                dict.entry(name.clone())
                    .or_insert_with(|| vocabulary::find_sanitiser_nodes(name, &sanitisers_in_cfg));
            }
        }
        dict
    }

    /// A sink is sanitized when one of its configured sanitisers is a
    /// reaching definition at the sink, i.e. the sanitiser executed on some
    /// path before the sink and was not subsequently killed. A sink with no
    /// configured sanitisers can never be sanitized.
    pub fn is_sanitized(&self, sink: &TriggerNode, sanitiser_dict: &SanitiserNodeDict) -> bool {
        let constraints = &self.graph.node(sink.node).constraints;
        sink.trigger.qualifiers.iter().any(|name| {
            sanitiser_dict
                .get(name)
                .is_some_and(|nodes| nodes.iter().any(|node| constraints.contains(node)))
        })
    }

    /// Find every unguarded source-to-sink flow in the session.
    ///
    /// Sources are collected across all CFGs so that taint crossing a
    /// function boundary still pairs with its originating source; sinks and
    /// their sanitiser candidates are examined per CFG. A sink is tainted by
    /// a source when the source's node is a reaching definition at the sink.
    pub fn find_vulnerabilities(&self) -> VulnerabilityLog {
        let mut log = VulnerabilityLog::new();

        let sources: Vec<TriggerNode> = (0..self.graph.cfgs().len())
            .flat_map(|cfg| self.find_triggers(cfg, self.vocabulary.sources()))
            .collect();

        for cfg in 0..self.graph.cfgs().len() {
            let sinks = self.find_triggers(cfg, self.vocabulary.sinks());
            if sinks.is_empty() {
                continue;
            }
            let sanitiser_dict = self.build_sanitiser_node_dict(cfg, &sinks);

            for sink in &sinks {
                let constraints = &self.graph.node(sink.node).constraints;
                for source in &sources {
                    if !constraints.contains(&source.node) {
                        continue;
                    }
                    if self.is_sanitized(sink, &sanitiser_dict) {
                        continue;
                    }
                    debug!(
                        "unsanitized flow: `{}` -> `{}`",
                        source.trigger.word, sink.trigger.word
                    );
                    log.append(Vulnerability::new(self.graph, source, sink));
                }
            }
        }

        log
    }
}
