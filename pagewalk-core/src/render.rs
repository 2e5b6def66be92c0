use crate::analysis::Finding;
use crate::config::CrawlConfig;
use crate::error::Result;
use crate::graph::{LinkGraph, Node};
use crate::traverse::{CrawlOutcome, CrawlSummary};
use serde::Serialize;
use std::collections::HashSet;

const MARKER: &str = "|-- ";
const INDENT: &str = "  ";

/// Depth-first listing of the graph below `root`, one line per edge.
///
/// A node's children are listed under its first appearance only, so
/// references back up the tree print as leaves instead of looping.
pub fn render(graph: &LinkGraph, root: &Node) -> Vec<String> {
    let mut lines = Vec::new();
    let mut expanded = HashSet::new();
    expanded.insert(root.clone());
    render_children(graph, root, 0, &mut expanded, &mut lines);
    lines
}

fn render_children(
    graph: &LinkGraph,
    node: &Node,
    level: usize,
    expanded: &mut HashSet<Node>,
    lines: &mut Vec<String>,
) {
    for edge in graph.children(node) {
        lines.push(format!("{}{}{}", INDENT.repeat(level), MARKER, edge));

        let child = Node::Page(edge.target.clone());
        if expanded.insert(child.clone()) {
            render_children(graph, &child, level + 1, expanded, lines);
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    max_depth: usize,
    scope: &'a str,
    summary: &'a CrawlSummary,
    graph: &'a LinkGraph,
    findings: &'a [Finding],
}

/// Pretty JSON of the run settings, counters, graph and findings.
pub fn render_json(outcome: &CrawlOutcome, config: &CrawlConfig) -> Result<String> {
    let report = JsonReport {
        max_depth: config.max_depth,
        scope: config.scope(),
        summary: &outcome.summary,
        graph: &outcome.graph,
        findings: &outcome.findings,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
