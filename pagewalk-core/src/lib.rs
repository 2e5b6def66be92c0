pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod render;
pub mod traverse;

pub use config::{Capabilities, CrawlConfig, Gate};
pub use error::CoreError;
pub use graph::{BROKEN_SUFFIX, Edge, LinkGraph, Node};
pub use render::{render, render_json};
pub use traverse::{CrawlOutcome, CrawlSummary, Traversal};

pub use pagewalk_scanner::Address;
