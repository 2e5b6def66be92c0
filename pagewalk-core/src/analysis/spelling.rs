use super::{Analyzer, Finding, FindingKind, PageContext, visible_text};
use crate::config::Gate;
use crate::error::{CoreError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Words shorter than this are never checked.
const MIN_WORD_LEN: usize = 5;
const MAX_SUGGESTIONS: usize = 5;
const MAX_EDIT_DISTANCE: usize = 2;

/// Punctuation removed before splitting. `-`, `'`, `/`, `_` and `.` survive
/// so that hyphenated words, web addresses and code identifiers can be
/// recognised and skipped.
const SENTENCE_PUNCTUATION: &str = "!\"#$%&()*+,:;<=>?@[\\]^`{|}~";

/// camelCase or PascalCase tails such as `JavaScript` or `iPhone`.
static MASHED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*[a-z][A-Z][a-z]+$").expect("valid regex"));
static ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*[A-Z][A-Z].*$").expect("valid regex"));

/// Parses a newline separated word list. Blank lines and `#` comments are skipped.
pub fn parse_word_list(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_word_list(path: &Path) -> Result<HashSet<String>> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::WordList {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_word_list(&contents))
}

/// Flags words that are neither in the dictionary nor in the exception list.
pub struct SpellingAnalyzer {
    dictionary: HashSet<String>,
    exceptions: HashSet<String>,
    gate: Gate,
}

impl SpellingAnalyzer {
    pub fn new(dictionary: HashSet<String>, exceptions: HashSet<String>) -> Self {
        Self {
            dictionary,
            exceptions: exceptions.into_iter().map(|w| w.to_lowercase()).collect(),
            gate: Gate::Scoped,
        }
    }

    pub fn from_dictionary_file(path: &Path, exceptions: HashSet<String>) -> Result<Self> {
        let dictionary = load_word_list(path)?;
        if dictionary.is_empty() {
            return Err(CoreError::EmptyWordList(path.display().to_string()));
        }
        debug!("Loaded {} dictionary words from {}", dictionary.len(), path.display());
        Ok(Self::new(dictionary, exceptions))
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Splits visible text into the words worth checking, first occurrence only.
    pub fn candidate_words(text: &str) -> Vec<String> {
        let cleaned: String = text
            .chars()
            .filter_map(|c| {
                if c.is_control() {
                    Some(' ')
                } else if SENTENCE_PUNCTUATION.contains(c) {
                    None
                } else {
                    Some(c)
                }
            })
            .collect();

        let mut seen = HashSet::new();
        cleaned
            .split_whitespace()
            .map(|token| token.trim_end_matches('.'))
            .filter(|token| !token.contains(['.', '/', '_']))
            .map(|token| token.trim_matches('\''))
            .filter(|word| word.chars().count() >= MIN_WORD_LEN)
            .filter(|word| word.chars().all(char::is_alphabetic))
            .filter(|word| !MASHED_WORD.is_match(word) && !ACRONYM.is_match(word))
            .filter(|word| seen.insert(word.to_string()))
            .map(str::to_string)
            .collect()
    }

    pub fn is_known(&self, word: &str) -> bool {
        if self.exceptions.contains(&word.to_lowercase()) {
            return true;
        }
        self.dictionary.contains(word)
            || self.dictionary.contains(&word.to_lowercase())
            || self.dictionary.contains(&capitalize(word))
    }

    /// Closest dictionary words by edit distance, nearest first.
    pub fn suggest(&self, word: &str) -> Vec<String> {
        let lowered = word.to_lowercase();
        let len = lowered.chars().count();

        let mut candidates: Vec<(usize, &String)> = self
            .dictionary
            .iter()
            .filter(|entry| entry.chars().count().abs_diff(len) <= MAX_EDIT_DISTANCE)
            .filter_map(|entry| {
                let distance = edit_distance(&lowered, &entry.to_lowercase());
                (distance <= MAX_EDIT_DISTANCE).then_some((distance, entry))
            })
            .collect();

        candidates.sort();
        candidates.dedup_by(|a, b| a.1.eq_ignore_ascii_case(b.1));
        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl Analyzer for SpellingAnalyzer {
    fn name(&self) -> &'static str {
        "spelling"
    }

    fn gate(&self) -> Gate {
        self.gate
    }

    fn analyze(&self, page: &PageContext<'_>) -> Result<Vec<Finding>> {
        let text = visible_text(page.content).join(" ");
        let candidates = Self::candidate_words(&text);
        debug!("Page text for {}: {}", page.address, text);
        debug!("Spelling candidates for {}: {}", page.address, candidates.join(" "));

        let findings = candidates
            .into_iter()
            .filter(|word| !self.is_known(word))
            .map(|word| {
                let suggestions = self.suggest(&word);
                Finding::new(page.address, FindingKind::Misspelling { word, suggestions })
            })
            .collect();

        Ok(findings)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
