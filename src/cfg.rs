//! Control flow graph model for taint analysis.
//!
//! This module provides the graph representation the analysis operates on:
//! nodes with labels and line numbers, predecessor/successor edges, and a
//! per-node constraint set populated by the reaching-definitions solver.
//!
//! # Features
//! - Arena-based node storage (cycles need no special handling)
//! - Multiple CFGs per session (one per module/function)
//! - Function-name lookup for interprocedural analysis
//! - Per-node constraint set slot for dataflow results

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Unique identifier for a CFG node within an analysis session
pub type NodeId = usize;

/// Unique identifier for a CFG within an analysis session
pub type CfgId = usize;

/// A single program point in a control flow graph.
///
/// Edges and constraint-set entries are arena indices, never owning
/// references, so cyclic graphs (loops) are represented directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfgNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Textual rendering of the underlying statement/expression
    pub label: String,
    /// Source line number, if known
    pub line: Option<usize>,
    /// Nodes with an edge into this node
    pub predecessors: Vec<NodeId>,
    /// Nodes this node has an edge to
    pub successors: Vec<NodeId>,
    /// Definitions/operations whose effect may still be live here.
    /// Written by the fixed-point solver, read-only afterwards.
    pub constraints: BTreeSet<NodeId>,
    /// Name of the function this node calls into, if any.
    /// Set by the CFG-construction collaborator; call resolution never
    /// lives in label text.
    pub call_target: Option<String>,
}

/// One control flow graph: an ordered sequence of nodes in the session arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cfg {
    /// Module or function name
    pub name: String,
    /// Node ids in program order. The first node is the entry, the last
    /// is the exit.
    pub nodes: Vec<NodeId>,
}

impl Cfg {
    /// Entry node of this CFG
    pub fn entry(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Exit node of this CFG
    pub fn exit(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// An analysis session: the node arena plus every CFG under analysis
/// (module-level and per-function), cross-linked by function name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfgGraph {
    nodes: Vec<CfgNode>,
    cfgs: Vec<Cfg>,
    functions: HashMap<String, CfgId>,
}

impl CfgGraph {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new CFG for the given module/function name
    pub fn add_cfg(&mut self, name: &str) -> CfgId {
        let id = self.cfgs.len();
        self.cfgs.push(Cfg {
            name: name.to_string(),
            nodes: Vec::new(),
        });
        self.functions.insert(name.to_string(), id);
        id
    }

    /// Add a node to a CFG
    pub fn add_node(&mut self, cfg: CfgId, label: &str, line: Option<usize>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(CfgNode {
            id,
            label: label.to_string(),
            line,
            predecessors: Vec::new(),
            successors: Vec::new(),
            constraints: BTreeSet::new(),
            call_target: None,
        });
        self.cfgs[cfg].nodes.push(id);
        id
    }

    /// Add a node that represents a call into another function's CFG
    pub fn add_call_node(
        &mut self,
        cfg: CfgId,
        label: &str,
        line: Option<usize>,
        target: &str,
    ) -> NodeId {
        let id = self.add_node(cfg, label, line);
        self.nodes[id].call_target = Some(target.to_string());
        id
    }

    /// Add a directed edge. Both endpoint lists are kept in sync.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from].successors.push(to);
        self.nodes[to].predecessors.push(from);
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &CfgNode {
        &self.nodes[id]
    }

    /// Get a node by id, mutably
    pub fn node_mut(&mut self, id: NodeId) -> &mut CfgNode {
        &mut self.nodes[id]
    }

    /// All nodes in the session arena
    pub fn nodes(&self) -> &[CfgNode] {
        &self.nodes
    }

    /// Number of nodes across all CFGs
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All CFGs in session order
    pub fn cfgs(&self) -> &[Cfg] {
        &self.cfgs
    }

    /// Look up a function's CFG by name
    pub fn cfg_by_name(&self, name: &str) -> Option<CfgId> {
        self.functions.get(name).copied()
    }

    /// Iterate the nodes of one CFG in program order
    pub fn cfg_nodes(&self, cfg: CfgId) -> impl Iterator<Item = &CfgNode> {
        self.cfgs[cfg].nodes.iter().map(move |&id| &self.nodes[id])
    }
}
