// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Name and tag matching over a set of nodes.
//!
//! # Name resolution
//!
//! A name containing a `.` is treated as fully qualified and only matches
//! exactly. A short name matches a node with exactly that name, or any
//! node whose name is that short name followed by a domain: `host1`
//! matches `host1` and `host1.cluster.local`, never `host10.cluster.local`.
//! Comparison is ASCII case-insensitive.
//!
//! # Nodespecs
//!
//! A nodespec is a comma-separated list of tokens; whitespace around a
//! token is ignored. `*` matches any run of characters and `?` exactly
//! one; every other character is literal. A token without a `.`, wildcard
//! or not, also matches the same pattern followed by any domain suffix,
//! so `h?st` matches `host.lab`. A node matched by several tokens is
//! returned once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::model::Node;
use crate::errors::{EngineError, EngineResult, ResourceKind};

/// Return the single node `name` refers to.
pub fn resolve_name<'a>(nodes: &'a [Node], name: &str) -> EngineResult<&'a Node> {
    let mut matches = nodes.iter().filter(|node| name_matches(&node.name, name));

    let found = matches
        .next()
        .ok_or_else(|| EngineError::not_found(ResourceKind::Node, name))?;

    if matches.next().is_some() {
        return Err(EngineError::InvalidRequest(format!(
            "Node name [{}] matches more than one node",
            name
        )));
    }

    Ok(found)
}

fn name_matches(candidate: &str, name: &str) -> bool {
    if candidate.eq_ignore_ascii_case(name) {
        return true;
    }
    if name.contains('.') {
        return false;
    }
    // "host1" also matches "host1.<domain>"
    candidate.len() > name.len()
        && candidate.as_bytes()[name.len()] == b'.'
        && candidate.is_char_boundary(name.len())
        && candidate[..name.len()].eq_ignore_ascii_case(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AnyRun,
    AnyChar,
}

/// A compiled node-name pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    fn compile(segments: &[Segment]) -> EngineResult<Self> {
        let mut source = String::new();
        let mut expr = String::from("(?i)^");
        for segment in segments {
            match segment {
                Segment::Literal(text) => {
                    source.push_str(text);
                    expr.push_str(&regex::escape(text));
                }
                Segment::AnyRun => {
                    source.push('*');
                    expr.push_str(".*");
                }
                Segment::AnyChar => {
                    source.push('?');
                    expr.push('.');
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| {
            EngineError::InvalidRequest(format!("Invalid nodespec pattern '{}': {}", source, e))
        })?;
        Ok(Self { source, regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate a nodespec into the set of name patterns it stands for.
pub fn build_node_filterspec(nodespec: &str) -> EngineResult<Vec<NamePattern>> {
    let mut patterns = Vec::new();

    for token in nodespec
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        let mut segments = tokenize(token);
        patterns.push(NamePattern::compile(&segments)?);

        if !token.contains('.') {
            segments.push(Segment::Literal(".".to_string()));
            segments.push(Segment::AnyRun);
            patterns.push(NamePattern::compile(&segments)?);
        }
    }

    Ok(patterns)
}

fn tokenize(token: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();

    for c in token.chars() {
        let wildcard = match c {
            '*' => Segment::AnyRun,
            '?' => Segment::AnyChar,
            _ => {
                literal.push(c);
                continue;
            }
        };
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(wildcard);
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Nodes matched by any token of `nodespec`, in input order, each once.
pub fn expand_nodespec<'a>(nodes: &'a [Node], nodespec: &str) -> EngineResult<Vec<&'a Node>> {
    let patterns = build_node_filterspec(nodespec)?;
    let mut seen = HashSet::new();

    Ok(nodes
        .iter()
        .filter(|node| patterns.iter().any(|pattern| pattern.matches(&node.name)))
        .filter(|node| seen.insert(node.id))
        .collect())
}

/// One tag condition: key must exist; if a value is given it must exist too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagQuery {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl TagQuery {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn key_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Key and value are checked independently: a node tagged
    /// `{rack: a, role: b}` matches `rack=b`. Existing callers rely on
    /// this looser match, so it is kept as is.
    pub fn matches(&self, node: &Node) -> bool {
        let has_key = node.tags.iter().any(|tag| tag.key == self.key);
        let has_value = match &self.value {
            None => true,
            Some(value) => node
                .tags
                .iter()
                .any(|tag| tag.value.as_deref() == Some(value.as_str())),
        };
        has_key && has_value
    }
}

/// Nodes matching any of `queries`. An empty query list matches every node.
pub fn filter_by_tags<'a>(nodes: &'a [Node], queries: &[TagQuery]) -> Vec<&'a Node> {
    nodes
        .iter()
        .filter(|node| queries.is_empty() || queries.iter().any(|query| query.matches(node)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{NodeId, NodeState, Tag};

    fn fleet(names: &[&str]) -> Vec<Node> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Node::new(NodeId(i as u64 + 1), *name, NodeState::Installed))
            .collect()
    }

    #[test]
    fn test_resolve_name() {
        struct TestCase {
            name: &'static str,
            expected: Result<&'static str, &'static str>,
        }

        let nodes = fleet(&[
            "host1.domain.com",
            "host10.domain.com",
            "a.b.c",
            "Compute-01",
            "dup.one.net",
            "dup.two.net",
        ]);

        let test_cases = vec![
            TestCase { name: "host1", expected: Ok("host1.domain.com") },
            TestCase { name: "HOST1", expected: Ok("host1.domain.com") },
            TestCase { name: "host1.domain.com", expected: Ok("host1.domain.com") },
            TestCase { name: "host1.domain", expected: Err("not found") },
            TestCase { name: "a.b.c", expected: Ok("a.b.c") },
            TestCase { name: "a.b", expected: Err("not found") },
            TestCase { name: "a", expected: Ok("a.b.c") },
            TestCase { name: "compute-01", expected: Ok("Compute-01") },
            TestCase { name: "host", expected: Err("not found") },
            TestCase { name: "dup", expected: Err("more than one") },
        ];

        for case in test_cases {
            let result = resolve_name(&nodes, case.name);
            match case.expected {
                Ok(expected) => assert_eq!(
                    result.map(|n| n.name.as_str()).ok(),
                    Some(expected),
                    "name: {}",
                    case.name
                ),
                Err(fragment) => {
                    let err = result.expect_err(case.name).to_string();
                    assert!(err.contains(fragment), "name: {} error: {}", case.name, err);
                }
            }
        }
    }

    #[test]
    fn test_short_name_without_match_reports_node_not_found() {
        let nodes = fleet(&["host10.domain.com"]);
        let err = resolve_name(&nodes, "host1").unwrap_err();
        assert_eq!(err.to_string(), "Node [host1] not found");
    }

    #[test]
    fn test_build_node_filterspec() {
        struct TestCase {
            nodespec: &'static str,
            expected: Vec<&'static str>,
        }

        let test_cases = vec![
            TestCase { nodespec: "host1", expected: vec!["host1", "host1.*"] },
            TestCase { nodespec: "host1.domain.com", expected: vec!["host1.domain.com"] },
            TestCase { nodespec: "host2*", expected: vec!["host2*", "host2*.*"] },
            TestCase { nodespec: "h?st", expected: vec!["h?st", "h?st.*"] },
            TestCase { nodespec: "rack?.lab", expected: vec!["rack?.lab"] },
            TestCase {
                nodespec: "host1,  host2* , rack?.lab",
                expected: vec!["host1", "host1.*", "host2*", "host2*.*", "rack?.lab"],
            },
            // spaces do not separate tokens
            TestCase { nodespec: "host1 host2", expected: vec!["host1 host2", "host1 host2.*"] },
            TestCase { nodespec: " , ", expected: vec![] },
        ];

        for case in test_cases {
            let patterns = build_node_filterspec(case.nodespec).unwrap();
            let sources: Vec<&str> = patterns.iter().map(NamePattern::as_str).collect();
            assert_eq!(sources, case.expected, "nodespec: {:?}", case.nodespec);
        }
    }

    #[test]
    fn test_expand_nodespec() {
        let nodes = fleet(&[
            "host1",
            "host1.domain.com",
            "host1.x",
            "host10.domain.com",
            "host2a",
            "host2a.y",
            "host2b.lab",
            "host3",
            "host.lab",
            "node_1",
            "nodeX1",
        ]);

        let names = |spec: &str| -> Vec<String> {
            expand_nodespec(&nodes, spec)
                .unwrap()
                .into_iter()
                .map(|n| n.name.clone())
                .collect()
        };

        assert_eq!(names("host1"), vec!["host1", "host1.domain.com", "host1.x"]);
        assert_eq!(names("host2*"), vec!["host2a", "host2a.y", "host2b.lab"]);
        assert_eq!(
            names("host1,host2*"),
            vec!["host1", "host1.domain.com", "host1.x", "host2a", "host2a.y", "host2b.lab"]
        );
        assert!(!names("host1,host2*").contains(&"host3".to_string()));
        assert_eq!(names("host1,host1.domain.com"), vec!["host1", "host1.domain.com", "host1.x"]);
        assert_eq!(names("HOST?0*"), vec!["host10.domain.com"]);
        // wildcard tokens without a domain also reach fully qualified names
        assert_eq!(names("h?st"), vec!["host.lab"]);
        assert_eq!(names("host2?"), vec!["host2a", "host2a.y", "host2b.lab"]);
        // only translated wildcards are wildcards
        assert_eq!(names("node_1"), vec!["node_1"]);
        assert!(names("missing*").is_empty());
    }

    #[test]
    fn test_tag_filter_checks_key_and_value_independently() {
        let mut nodes = fleet(&["a", "b", "c"]);
        nodes[0].tags = vec![Tag::new("rack", "r1"), Tag::new("role", "gpu")];
        nodes[1].tags = vec![Tag::new("rack", "gpu")];
        nodes[2].tags = vec![Tag::label("maintenance")];

        let names = |queries: &[TagQuery]| -> Vec<String> {
            filter_by_tags(&nodes, queries)
                .into_iter()
                .map(|n| n.name.clone())
                .collect()
        };

        assert_eq!(names(&[TagQuery::key_value("rack", "r1")]), vec!["a"]);
        assert_eq!(names(&[TagQuery::key_value("rack", "gpu")]), vec!["a", "b"]);
        assert_eq!(names(&[TagQuery::key("maintenance")]), vec!["c"]);
        assert_eq!(
            names(&[TagQuery::key("maintenance"), TagQuery::key_value("role", "gpu")]),
            vec!["a", "c"]
        );
        assert_eq!(names(&[]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tag_filter_env_and_team() {
        struct TestCase {
            name: &'static str,
            queries: Vec<TagQuery>,
            expected: Vec<&'static str>,
        }

        let mut nodes = fleet(&["prod-1", "dev-1"]);
        nodes[0].tags = vec![Tag::new("env", "prod")];
        nodes[1].tags = vec![Tag::new("env", "dev"), Tag::new("team", "x")];

        let test_cases = vec![
            TestCase {
                name: "key and value",
                queries: vec![TagQuery::key_value("env", "prod")],
                expected: vec!["prod-1"],
            },
            TestCase {
                name: "key only",
                queries: vec![TagQuery::key("team")],
                expected: vec!["dev-1"],
            },
            TestCase {
                name: "no match",
                queries: vec![TagQuery::key_value("env", "staging")],
                expected: vec![],
            },
        ];

        for case in test_cases {
            let matched: Vec<&str> = filter_by_tags(&nodes, &case.queries)
                .into_iter()
                .map(|n| n.name.as_str())
                .collect();
            assert_eq!(matched, case.expected, "case: {}", case.name);
        }
    }
}
