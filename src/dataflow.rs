//! Fixed-point reaching-definitions analysis.
//!
//! For every CFG node this computes the set of prior definitions whose
//! effect may still be live at that point:
//!
//! ```text
//! constraints(n) = GEN(n) ∪ (⋃ constraints(p) for p in preds(n)) \ KILL(n)
//! ```
//!
//! GEN and KILL are derived from node labels: a node whose label assigns to
//! a target generates itself and kills every other definition of the same
//! target. The solver runs full passes over all CFGs in session order until
//! no constraint set changes. Constraint sets are drawn from the finite set
//! of nodes and each pass is monotone, so a finite CFG always converges; a
//! pass cap guards against malformed inputs and exceeding it is a hard
//! error, never a silent partial result.
//!
//! Calls into functions with their own CFGs are linked through the session's
//! function table: the call site's incoming set is merged into the callee's
//! entry and the callee's exit set flows back through the call site, so
//! taint crossing a function boundary is preserved. Calls to names absent
//! from the table have no callee-side effect.

use anyhow::{bail, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::cfg::{CfgGraph, NodeId};

/// Run reaching-definitions analysis to a fixed point, populating every
/// node's constraint set. Previous results are discarded.
pub fn analyse(graph: &mut CfgGraph) -> Result<()> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(());
    }

    // GEN targets: which variable, if any, each node defines
    let targets: Vec<Option<String>> = graph
        .nodes()
        .iter()
        .map(|n| assignment_target(&n.label))
        .collect();

    // KILL lookup: every node defining a given target
    let mut defs_by_target: HashMap<&str, Vec<NodeId>> = HashMap::new();
    for (id, target) in targets.iter().enumerate() {
        if let Some(target) = target {
            defs_by_target.entry(target.as_str()).or_default().push(id);
        }
    }

    // Resolve call links once. Unresolvable names are a diagnostic, not an
    // error: the CFG-construction collaborator decides which calls matter.
    let calls: Vec<Option<(NodeId, NodeId)>> = graph
        .nodes()
        .iter()
        .map(|n| {
            let name = n.call_target.as_deref()?;
            match graph.cfg_by_name(name) {
                Some(cfg) => {
                    let cfg = &graph.cfgs()[cfg];
                    Some((cfg.entry()?, cfg.exit()?))
                }
                None => {
                    debug!(
                        "call to unknown function `{}` at node {}; skipping propagation",
                        name, n.id
                    );
                    None
                }
            }
        })
        .collect();

    // Fixed traversal order: CFGs in session order, nodes in program order
    let order: Vec<NodeId> = graph
        .cfgs()
        .iter()
        .flat_map(|cfg| cfg.nodes.iter().copied())
        .collect();

    let mut sets: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); node_count];
    // Caller facts pushed into callee entries; grows monotonically so the
    // convergence argument is unaffected by interprocedural links
    let mut entry_facts: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); node_count];

    let max_passes = 2 * node_count + 2;
    let mut converged = false;

    for _ in 0..max_passes {
        let mut changed = false;

        for &id in &order {
            let mut incoming = entry_facts[id].clone();
            for &pred in &graph.node(id).predecessors {
                incoming.extend(sets[pred].iter().copied());
            }

            if let Some((entry, exit)) = calls[id] {
                let before = entry_facts[entry].len();
                entry_facts[entry].extend(incoming.iter().copied());
                if entry_facts[entry].len() != before {
                    changed = true;
                }
                incoming.extend(sets[exit].iter().copied());
            }

            let mut out = incoming;
            if let Some(target) = &targets[id] {
                if let Some(defs) = defs_by_target.get(target.as_str()) {
                    for def in defs {
                        out.remove(def);
                    }
                }
                out.insert(id);
            }

            if out != sets[id] {
                sets[id] = out;
                changed = true;
            }
        }

        if !changed {
            converged = true;
            break;
        }
    }

    if !converged {
        bail!(
            "reaching-definitions analysis did not converge within {} passes \
             over {} nodes; GEN/KILL invariant violated upstream",
            max_passes,
            node_count
        );
    }

    // Freeze the results into the graph
    for (id, set) in sets.into_iter().enumerate() {
        graph.node_mut(id).constraints = set;
    }

    Ok(())
}

/// Extract the assignment target from a node label, if the label is an
/// assignment. Comparison and augmented operators do not define anything.
fn assignment_target(label: &str) -> Option<String> {
    let bytes = label.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                i += 2;
                continue;
            }
            if i > 0 && matches!(bytes[i - 1], b'=' | b'!' | b'<' | b'>') {
                i += 1;
                continue;
            }
            let target = label[..i].trim();
            if !target.is_empty()
                && target
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
            {
                return Some(target.to_string());
            }
            return None;
        }
        i += 1;
    }
    None
}
