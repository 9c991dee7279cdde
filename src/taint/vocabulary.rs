//! Trigger vocabulary loading and lexical matching.
//!
//! The vocabulary is a line-oriented text format organized into named
//! sections (at minimum `sources` and `sinks`):
//!
//! ```text
//! sources:
//! request.args.get
//! form
//!
//! sinks:
//! execute -> escape, quote
//! send_response -> escape
//! ```
//!
//! A bare line introduces a trigger word with no qualifiers; `word -> a, b`
//! introduces a trigger word with an ordered qualifier list. Qualifiers are
//! split on commas only and trimmed of surrounding whitespace, so a
//! qualifier may contain embedded whitespace. For sinks the qualifiers name
//! the sanitisers that neutralize the sink.
//!
//! Matching is a case-insensitive substring search of trigger words against
//! node labels, centralized here so new match strategies can be added
//! without touching the taint engine.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::types::{Sanitiser, TriggerNode, TriggerWord};
use crate::cfg::{CfgNode, NodeId};

/// A parsed trigger vocabulary: named sections of trigger words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    sections: HashMap<String, Vec<TriggerWord>>,
}

impl Vocabulary {
    /// Parse a vocabulary from trigger-definition text.
    ///
    /// A line ending in `:` opens a named section; blank lines are
    /// structural. Lines before the first header are ignored. Malformed
    /// lines degrade to entries with empty qualifier lists rather than
    /// aborting the load.
    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, Vec<TriggerWord>> = HashMap::new();
        let mut current: Option<String> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_suffix(':') {
                if let Some(section) = current.take() {
                    sections.insert(section, parse_section(body.drain(..)));
                }
                current = Some(name.trim().to_string());
            } else if current.is_some() {
                body.push(line);
            }
        }
        if let Some(section) = current {
            sections.insert(section, parse_section(body.into_iter()));
        }

        Self { sections }
    }

    /// Load a vocabulary from a trigger-definition file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read trigger definitions from {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Entries of a named section, in file order. Missing sections are empty.
    pub fn section(&self, name: &str) -> &[TriggerWord] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The `sources` section
    pub fn sources(&self) -> &[TriggerWord] {
        self.section("sources")
    }

    /// The `sinks` section
    pub fn sinks(&self) -> &[TriggerWord] {
        self.section("sinks")
    }
}

/// Parse the data lines of one section into vocabulary entries, preserving
/// file order and duplicates.
pub fn parse_section<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<TriggerWord> {
    let mut entries = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once("->") {
            Some((word, qualifiers)) => {
                // Only the commas delimit qualifiers; embedded whitespace
                // is part of the qualifier
                let qualifiers = qualifiers
                    .split(',')
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .map(String::from)
                    .collect();
                entries.push(TriggerWord::new(word.trim(), qualifiers));
            }
            None => entries.push(TriggerWord::bare(line)),
        }
    }

    entries
}

/// Match a node label against a list of vocabulary entries, producing one
/// trigger node per entry whose word occurs as a substring of the label.
/// Matching is case-insensitive; duplicates in the vocabulary each produce
/// their own match.
pub fn label_contains(node: &CfgNode, trigger_words: &[TriggerWord]) -> Vec<TriggerNode> {
    let label = node.label.to_lowercase();
    trigger_words
        .iter()
        .filter(|trigger| label.contains(&trigger.word.to_lowercase()))
        .map(|trigger| TriggerNode {
            trigger: trigger.clone(),
            node: node.id,
        })
        .collect()
}

/// Every node bound to the queried sanitiser name
pub fn find_sanitiser_nodes(name: &str, sanitisers: &[Sanitiser]) -> Vec<NodeId> {
    sanitisers
        .iter()
        .filter(|sanitiser| sanitiser.name == name)
        .map(|sanitiser| sanitiser.node)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::CfgGraph;
    use std::io::Write;

    #[test]
    fn test_parse_section_bare_word() {
        let entries = parse_section(["get"].into_iter());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "get");
        assert!(entries[0].qualifiers.is_empty());
    }

    #[test]
    fn test_parse_section_qualifiers_preserve_embedded_whitespace() {
        let entries = parse_section(["get", "get -> a, b, c d s aq     a"].into_iter());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "get");
        assert_eq!(entries[1].word, "get");
        assert_eq!(entries[1].qualifiers, vec!["a", "b", "c d s aq     a"]);
        assert_eq!(entries[1].qualifiers.len(), 3);
    }

    #[test]
    fn test_parse_section_dangling_arrow_recovers() {
        let entries = parse_section(["escape ->"].into_iter());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "escape");
        assert!(entries[0].qualifiers.is_empty());
    }

    #[test]
    fn test_parse_section_skips_blank_lines() {
        let entries = parse_section(["", "get", "   "].into_iter());
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_vocabulary_sections() {
        let text = "sources:\nrequest.get\nform\n\nsinks:\nexecute -> escape, quote\n";
        let vocabulary = Vocabulary::parse(text);

        assert_eq!(vocabulary.sources().len(), 2);
        assert_eq!(vocabulary.sources()[0].word, "request.get");
        assert_eq!(vocabulary.sinks().len(), 1);
        assert_eq!(vocabulary.sinks()[0].qualifiers, vec!["escape", "quote"]);
    }

    #[test]
    fn test_parse_vocabulary_empty_section() {
        let vocabulary = Vocabulary::parse("sources:\n\nsinks:\nexecute\n");
        assert!(vocabulary.sources().is_empty());
        assert_eq!(vocabulary.sinks().len(), 1);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let vocabulary = Vocabulary::parse("sources:\nget\n");
        assert!(vocabulary.sinks().is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sources:\nget\n\nsinks:\nsend_response -> escape").unwrap();

        let vocabulary = Vocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocabulary.sources().len(), 1);
        assert_eq!(vocabulary.sinks().len(), 1);
        assert_eq!(vocabulary.sinks()[0].qualifiers, vec!["escape"]);
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        assert!(Vocabulary::from_file("/nonexistent/triggers.txt").is_err());
    }

    #[test]
    fn test_label_contains_no_match() {
        let mut graph = CfgGraph::new();
        let cfg = graph.add_cfg("f");
        let node = graph.add_node(cfg, "label", None);

        let matches = label_contains(graph.node(node), &[TriggerWord::bare("get")]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_label_contains_multiple_hits_in_vocabulary_order() {
        let mut graph = CfgGraph::new();
        let cfg = graph.add_cfg("f");
        let node = graph.add_node(cfg, "request.get(\"stefan\")", None);

        let words = [TriggerWord::bare("get"), TriggerWord::bare("request")];
        let matches = label_contains(graph.node(node), &words);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].trigger.word, "get");
        assert_eq!(matches[0].node, node);
        assert_eq!(matches[1].trigger.word, "request");
        assert_eq!(matches[1].node, node);
    }

    #[test]
    fn test_label_contains_duplicate_entries_produce_duplicate_matches() {
        let mut graph = CfgGraph::new();
        let cfg = graph.add_cfg("f");
        let node = graph.add_node(cfg, "request.get(\"stefan\")", None);

        let words = [TriggerWord::bare("get"), TriggerWord::bare("get")];
        let matches = label_contains(graph.node(node), &words);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_label_contains_is_case_insensitive() {
        let mut graph = CfgGraph::new();
        let cfg = graph.add_cfg("f");
        let node = graph.add_node(cfg, "Request.GET('q')", None);

        let matches = label_contains(graph.node(node), &[TriggerWord::bare("get")]);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_find_sanitiser_nodes() {
        let mut graph = CfgGraph::new();
        let cfg = graph.add_cfg("f");
        let node = graph.add_node(cfg, "html = escape(param)", None);

        let sanitisers = [Sanitiser::new("escape", node)];
        assert_eq!(find_sanitiser_nodes("escape", &sanitisers), vec![node]);
        assert!(find_sanitiser_nodes("quote", &sanitisers).is_empty());
    }
}
