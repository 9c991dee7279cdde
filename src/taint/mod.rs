//! Taint analysis for security vulnerability detection.
//!
//! This module decides whether untrusted data (sources) can reach dangerous
//! operations (sinks) without passing through a recognized neutralizing
//! operation (sanitiser), and reports each unguarded flow.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (trigger words, sanitisers, vulnerabilities)
//! - [`vocabulary`] - Trigger-definition parsing and lexical matching
//! - [`engine`] - The taint decision procedure
//!
//! # Usage
//!
//! Build a [`crate::cfg::CfgGraph`], run [`crate::dataflow::analyse`] over
//! it, then ask the engine for the vulnerability log:
//!
//! ```
//! use taintflow::cfg::CfgGraph;
//! use taintflow::dataflow::analyse;
//! use taintflow::taint::{TaintEngine, Vocabulary};
//!
//! let mut graph = CfgGraph::new();
//! let cfg = graph.add_cfg("handler");
//! let source = graph.add_node(cfg, "q = request.get('q')", Some(1));
//! let sink = graph.add_node(cfg, "cursor.execute(q)", Some(2));
//! graph.add_edge(source, sink);
//!
//! analyse(&mut graph).unwrap();
//!
//! let vocabulary = Vocabulary::parse("sources:\nrequest.get\n\nsinks:\nexecute -> escape\n");
//! let log = TaintEngine::new(&graph, &vocabulary).find_vulnerabilities();
//! assert_eq!(log.len(), 1);
//! ```

pub mod engine;
pub mod types;
pub mod vocabulary;

pub use engine::{SanitiserNodeDict, TaintEngine};
pub use types::{Sanitiser, TriggerNode, TriggerWord, Vulnerability, VulnerabilityLog};
pub use vocabulary::{find_sanitiser_nodes, label_contains, parse_section, Vocabulary};
