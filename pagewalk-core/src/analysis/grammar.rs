use super::{Analyzer, Finding, FindingKind, PageContext, visible_text};
use crate::config::Gate;
use crate::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

struct Rule {
    name: &'static str,
    pattern: &'static str,
}

const RULES: [Rule; 4] = [
    Rule {
        name: "space before punctuation",
        pattern: r"\b\w+\s+[,.;:!?](?:\s|$)",
    },
    Rule {
        name: "missing space after punctuation",
        pattern: r"\b[A-Za-z]+[,;!?][A-Za-z]+\b",
    },
    Rule {
        name: "repeated punctuation",
        pattern: r"\S*(?:,{2,}|;{2,}|!{2,}|\?{2,})\S*",
    },
    Rule {
        name: "lowercase sentence start",
        pattern: r"\b[A-Za-z]{3,}[.!?]\s+[a-z]\w*",
    },
];

static COMPILED_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| (rule.name, Regex::new(rule.pattern).expect("valid regex")))
        .collect()
});

/// Rule-based punctuation and grammar checks over each block of visible text.
pub struct GrammarAnalyzer {
    gate: Gate,
}

impl GrammarAnalyzer {
    pub fn new() -> Self {
        Self { gate: Gate::Always }
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// `(rule, excerpt)` pairs for one block of text.
    pub fn check_text(text: &str) -> Vec<(&'static str, String)> {
        let mut issues = Vec::new();

        if let Some(pair) = repeated_word(text) {
            issues.push(("repeated word", pair));
        }

        for (name, regex) in COMPILED_RULES.iter() {
            for found in regex.find_iter(text) {
                issues.push((*name, found.as_str().trim().to_string()));
            }
        }

        issues
    }
}

impl Default for GrammarAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for GrammarAnalyzer {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn gate(&self) -> Gate {
        self.gate
    }

    fn analyze(&self, page: &PageContext<'_>) -> Result<Vec<Finding>> {
        let mut seen = HashSet::new();
        let mut findings = Vec::new();

        for block in visible_text(page.content) {
            for (rule, excerpt) in Self::check_text(&block) {
                if seen.insert((rule, excerpt.clone())) {
                    findings.push(Finding::new(
                        page.address,
                        FindingKind::Grammar {
                            rule: rule.to_string(),
                            excerpt,
                        },
                    ));
                }
            }
        }

        Ok(findings)
    }
}

/// First pair of identical adjacent words, ignoring case and edge punctuation.
fn repeated_word(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words.windows(2).find_map(|pair| {
        let first = pair[0].trim_matches(|c: char| !c.is_alphanumeric());
        let second = pair[1].trim_matches(|c: char| !c.is_alphanumeric());
        let ends_clause = pair[0].ends_with(|c: char| ",.;:!?".contains(c));

        (!first.is_empty()
            && !ends_clause
            && first.chars().all(char::is_alphabetic)
            && first.eq_ignore_ascii_case(second))
        .then(|| format!("{} {}", pair[0], pair[1]))
    })
}
