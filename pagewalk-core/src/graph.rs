use pagewalk_scanner::Address;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Suffix appended to the address of an edge whose target could not be fetched.
pub const BROKEN_SUFFIX: &str = "-BROKEN";

/// A key in the link graph: either the synthetic root or a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Root,
    Page(Address),
}

impl Node {
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Node::Root => None,
            Node::Page(address) => Some(address),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Root => f.write_str("<root>"),
            Node::Page(address) => address.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Edge {
    pub target: Address,
    pub broken: bool,
}

impl Edge {
    pub fn new(target: Address) -> Self {
        Self {
            target,
            broken: false,
        }
    }

    pub fn broken(target: Address) -> Self {
        Self {
            target,
            broken: true,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.broken {
            write!(f, "{}{}", self.target, BROKEN_SUFFIX)
        } else {
            self.target.fmt(f)
        }
    }
}

/// Directed multigraph of parent to child discoveries.
///
/// Each parent appears once as a key. Its children keep the order they were
/// recorded in, and parents iterate in the order they were first recorded.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    order: Vec<Node>,
    adjacency: HashMap<Node, Vec<Edge>>,
    incoming: HashMap<Address, Vec<(Node, usize)>>,
}

impl LinkGraph {
    /// A graph with the root mapped to `seeds` in input order.
    pub fn new(seeds: &[Address]) -> Self {
        let mut graph = Self::default();
        graph.order.push(Node::Root);
        graph.adjacency.insert(Node::Root, Vec::new());
        for seed in seeds {
            graph.add_edge(Node::Root, Edge::new(seed.clone()));
        }
        graph
    }

    pub fn add_edge(&mut self, parent: Node, edge: Edge) {
        let target = edge.target.clone();
        if !self.adjacency.contains_key(&parent) {
            self.order.push(parent.clone());
        }
        let children = self.adjacency.entry(parent.clone()).or_default();
        children.push(edge);
        let index = children.len() - 1;
        self.incoming.entry(target).or_default().push((parent, index));
    }

    /// Tags every recorded edge pointing at `target` as broken.
    pub fn mark_broken(&mut self, target: &Address) {
        let Some(sources) = self.incoming.get(target) else {
            return;
        };
        for (parent, index) in sources {
            if let Some(edge) = self
                .adjacency
                .get_mut(parent)
                .and_then(|children| children.get_mut(*index))
            {
                edge.broken = true;
            }
        }
    }

    pub fn children(&self, node: &Node) -> &[Edge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn seeds(&self) -> &[Edge] {
        self.children(&Node::Root)
    }

    /// Parents in first-recorded order, root first.
    pub fn parents(&self) -> impl Iterator<Item = &Node> {
        self.order.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn broken_count(&self) -> usize {
        self.adjacency
            .values()
            .flatten()
            .filter(|edge| edge.broken)
            .count()
    }
}

#[derive(serde::Serialize)]
struct LinkEntry<'a> {
    parent: &'a Address,
    children: &'a [Edge],
}

impl Serialize for LinkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let links: Vec<LinkEntry<'_>> = self
            .order
            .iter()
            .filter_map(|node| {
                node.as_address().map(|parent| LinkEntry {
                    parent,
                    children: self.children(node),
                })
            })
            .collect();

        let mut state = serializer.serialize_struct("LinkGraph", 2)?;
        state.serialize_field("seeds", self.seeds())?;
        state.serialize_field("links", &links)?;
        state.end()
    }
}
