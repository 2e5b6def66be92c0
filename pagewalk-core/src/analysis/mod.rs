//! Per-page content analyzers.
//!
//! The traversal engine hands every successfully fetched page to each
//! registered [`Analyzer`] whose [`Gate`] admits it. Analyzer errors are
//! logged and counted by the engine; they never stop a crawl.

pub mod archive;
pub mod grammar;
pub mod spelling;

use crate::config::Gate;
use crate::error::Result;
use pagewalk_scanner::Address;
use scraper::Html;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub use archive::ArchiveAnalyzer;
pub use grammar::GrammarAnalyzer;
pub use spelling::SpellingAnalyzer;

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// The page an analyzer is asked to look at.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// `None` for seed pages.
    pub parent: Option<&'a Address>,
    pub address: &'a Address,
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    Misspelling {
        word: String,
        suggestions: Vec<String>,
    },
    Grammar {
        rule: String,
        excerpt: String,
    },
    Archived {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub address: Address,
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl Finding {
    pub fn new(address: &Address, kind: FindingKind) -> Self {
        Self {
            address: address.clone(),
            kind,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Misspelling { word, suggestions } if suggestions.is_empty() => {
                write!(f, "misspelled '{}'", word)
            }
            FindingKind::Misspelling { word, suggestions } => {
                write!(
                    f,
                    "misspelled '{}' (suggestions: {})",
                    word,
                    suggestions.join(", ")
                )
            }
            FindingKind::Grammar { rule, excerpt } => write!(f, "{}: \"{}\"", rule, excerpt),
            FindingKind::Archived { path } => write!(f, "archived to {}", path.display()),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.kind)
    }
}

pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn gate(&self) -> Gate;

    fn analyze(&self, page: &PageContext<'_>) -> Result<Vec<Finding>>;
}

/// Text nodes a reader would see, trimmed, in document order.
pub fn visible_text(content: &str) -> Vec<String> {
    let document = Html::parse_document(content);

    document
        .tree
        .nodes()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name().to_string()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name.as_str()));
            if hidden {
                return None;
            }

            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}
