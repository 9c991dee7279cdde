//! taintflow - static taint analysis over control flow graphs.
//!
//! Given per-module and per-function CFGs supplied by a host, this crate
//! determines whether untrusted data can reach dangerous operations without
//! passing through a recognized sanitiser, and reports each unguarded flow.
//!
//! The pipeline has three pieces:
//!
//! 1. [`cfg`] - the graph model hosts populate (nodes, edges, function table)
//! 2. [`dataflow`] - fixed-point reaching-definitions analysis filling each
//!    node's constraint set
//! 3. [`taint`] - trigger vocabulary matching plus the sanitization decision
//!    procedure, producing a [`taint::VulnerabilityLog`]
//!
//! CFG construction from source text, report rendering beyond the log's
//! markdown formatter, and CLI plumbing are the host's responsibility.

pub mod cfg;
pub mod dataflow;
pub mod taint;

pub use cfg::{Cfg, CfgGraph, CfgId, CfgNode, NodeId};
pub use dataflow::analyse;
pub use taint::{TaintEngine, Vocabulary, VulnerabilityLog};
