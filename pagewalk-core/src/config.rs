use crate::error::{CoreError, Result};
use pagewalk_scanner::Address;
use serde::{Deserialize, Serialize};

/// Which checks a run performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub broken_links: bool,
    pub spelling: bool,
    pub grammar: bool,
    pub archive: bool,
}

impl Capabilities {
    pub fn any(&self) -> bool {
        self.broken_links || self.spelling || self.grammar || self.archive
    }
}

/// Whether an analyzer only runs on pages matching the scope substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    Scoped,
    Always,
}

impl Gate {
    pub fn admits(self, in_scope: bool) -> bool {
        match self {
            Gate::Scoped => in_scope,
            Gate::Always => true,
        }
    }
}

/// Parameters fixed for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlConfig {
    pub max_depth: usize,
    scope: String,
    pub capabilities: Capabilities,
}

impl CrawlConfig {
    pub fn new(max_depth: usize, scope: impl Into<String>) -> Self {
        Self {
            max_depth,
            scope: scope.into().to_lowercase(),
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The lowercased scope substring.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn in_scope(&self, address: &Address) -> bool {
        address.contains_ci(&self.scope)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.capabilities.any() {
            return Err(CoreError::NoCapabilities);
        }
        Ok(())
    }
}

pub fn validate_seeds(seeds: &[Address]) -> Result<()> {
    if seeds.is_empty() {
        return Err(CoreError::NoSeeds);
    }
    Ok(())
}
