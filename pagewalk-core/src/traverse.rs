use crate::analysis::{Analyzer, Finding, PageContext};
use crate::config::CrawlConfig;
use crate::graph::{Edge, LinkGraph, Node};
use pagewalk_scanner::{Address, Extractor, Fetcher};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called with `(depth, address)` before each fetch.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Called with each analyzer finding as soon as it is produced.
pub type FindingCallback = Arc<dyn Fn(Finding) + Send + Sync>;

/// One pending unit of work.
#[derive(Debug, Clone)]
struct Frame {
    address: Address,
    parent: Node,
    depth: usize,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub contact_links: usize,
    pub frames_discarded: usize,
    pub findings: usize,
    pub analyzer_failures: usize,
}

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub graph: LinkGraph,
    pub summary: CrawlSummary,
    /// Every analyzer finding, in the order it was produced.
    pub findings: Vec<Finding>,
}

/// State owned by a single `traverse` call.
struct RunState {
    stack: Vec<Frame>,
    visited: HashSet<Address>,
    failed: HashSet<Address>,
    graph: LinkGraph,
    summary: CrawlSummary,
    findings: Vec<Finding>,
}

/// Depth-bounded, scope-gated link discovery.
///
/// Frames are processed one at a time from a LIFO stack: fetch, analyze,
/// extract, push children. Fetch failures become broken edges and never
/// abort the run.
pub struct Traversal<F, X> {
    fetcher: F,
    extractor: X,
    config: CrawlConfig,
    analyzers: Vec<Box<dyn Analyzer>>,
    progress_callback: Option<ProgressCallback>,
    finding_callback: Option<FindingCallback>,
}

impl<F: Fetcher, X: Extractor> Traversal<F, X> {
    pub fn new(fetcher: F, extractor: X, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            analyzers: Vec::new(),
            progress_callback: None,
            finding_callback: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_finding_callback(mut self, callback: FindingCallback) -> Self {
        self.finding_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub async fn traverse(&self, seeds: &[Address]) -> CrawlOutcome {
        info!(
            "Starting traversal of {} seed(s), max depth {}, scope '{}'",
            seeds.len(),
            self.config.max_depth,
            self.config.scope()
        );

        let mut state = RunState {
            // Reversed so the first seed is popped first.
            stack: seeds
                .iter()
                .rev()
                .map(|seed| Frame {
                    address: seed.clone(),
                    parent: Node::Root,
                    depth: 0,
                })
                .collect(),
            visited: HashSet::new(),
            failed: HashSet::new(),
            graph: LinkGraph::new(seeds),
            summary: CrawlSummary::default(),
            findings: Vec::new(),
        };

        while let Some(frame) = state.stack.pop() {
            self.process(frame, &mut state).await;
        }

        info!(
            "Traversal complete. Fetched {} page(s), {} failure(s)",
            state.summary.pages_fetched, state.summary.fetch_failures
        );

        CrawlOutcome {
            graph: state.graph,
            summary: state.summary,
            findings: state.findings,
        }
    }

    async fn process(&self, frame: Frame, state: &mut RunState) {
        let Frame {
            address,
            parent,
            depth,
        } = frame;

        if state.visited.contains(&address) || depth > self.config.max_depth {
            debug!("Discarding {} at depth {}", address, depth);
            state.summary.frames_discarded += 1;
            return;
        }

        // Marked before the fetch so a failed address is never retried.
        state.visited.insert(address.clone());

        if address.is_contact() {
            debug!("Not fetching contact reference {}", address);
            state.summary.contact_links += 1;
            return;
        }

        if let Some(ref callback) = self.progress_callback {
            callback(depth, address.to_string());
        }
        debug!(
            "Crawling {}, depth {} of {}",
            address, depth, self.config.max_depth
        );

        let content = match self.fetcher.fetch(&address).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Error downloading {}: {}", address, e);
                state.summary.fetch_failures += 1;
                state.failed.insert(address.clone());
                if self.config.capabilities.broken_links {
                    state.graph.mark_broken(&address);
                }
                return;
            }
        };
        state.summary.pages_fetched += 1;

        let page = PageContext {
            parent: parent.as_address(),
            address: &address,
            content: &content,
        };
        self.run_analyzers(&page, state);

        let expand = match &parent {
            Node::Root => true,
            Node::Page(parent_address) => self.config.in_scope(parent_address),
        };
        if !expand {
            debug!("Not expanding {}: parent {} is out of scope", address, parent);
            return;
        }
        if depth >= self.config.max_depth {
            return;
        }

        let children = self.extractor.extract(&content, &address);
        let from = Node::Page(address.clone());
        let mut pending = Vec::with_capacity(children.len());

        for child in children {
            let broken = self.config.capabilities.broken_links
                && !child.is_contact()
                && state.failed.contains(&child);
            let edge = if broken {
                Edge::broken(child.clone())
            } else {
                Edge::new(child.clone())
            };
            state.graph.add_edge(from.clone(), edge);

            if child.is_contact() {
                state.summary.contact_links += 1;
                continue;
            }
            pending.push(Frame {
                address: child,
                parent: from.clone(),
                depth: depth + 1,
            });
        }

        // Reversed so siblings are popped in document order.
        state.stack.extend(pending.into_iter().rev());
    }

    fn run_analyzers(&self, page: &PageContext<'_>, state: &mut RunState) {
        let in_scope = self.config.in_scope(page.address);

        for analyzer in &self.analyzers {
            if !analyzer.gate().admits(in_scope) {
                continue;
            }

            match analyzer.analyze(page) {
                Ok(findings) => {
                    state.summary.findings += findings.len();
                    for finding in findings {
                        if let Some(ref callback) = self.finding_callback {
                            callback(finding.clone());
                        }
                        state.findings.push(finding);
                    }
                }
                Err(e) => {
                    warn!("{} analysis failed for {}: {}", analyzer.name(), page.address, e);
                    state.summary.analyzer_failures += 1;
                }
            }
        }
    }
}
