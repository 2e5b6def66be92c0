use super::{Analyzer, Finding, FindingKind, PageContext};
use crate::config::Gate;
use crate::error::{CoreError, Result};
use pagewalk_scanner::Address;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

const MAX_FILE_STEM: usize = 200;

/// Writes each admitted page to its own file under a directory.
pub struct ArchiveAnalyzer {
    directory: PathBuf,
    gate: Gate,
}

impl ArchiveAnalyzer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            gate: Gate::Scoped,
        }
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Path the page found at `address` through `parent` is written to.
    pub fn archive_path(&self, parent: Option<&Address>, address: &Address) -> PathBuf {
        self.directory
            .join(format!("{}.html", archive_file_stem(parent, address)))
    }
}

impl Analyzer for ArchiveAnalyzer {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn gate(&self) -> Gate {
        self.gate
    }

    fn analyze(&self, page: &PageContext<'_>) -> Result<Vec<Finding>> {
        let path = self.archive_path(page.parent, page.address);
        let archive_error = |source| CoreError::Archive {
            address: page.address.to_string(),
            source,
        };

        fs::create_dir_all(&self.directory).map_err(archive_error)?;
        fs::write(&path, page.content).map_err(archive_error)?;
        debug!("Archived {} to {}", page.address, path.display());

        Ok(vec![Finding::new(
            page.address,
            FindingKind::Archived { path },
        )])
    }
}

/// Sanitized `parent__address`; seeds use `root` as their parent.
///
/// Stems longer than the limit keep their head and end in a hash of the
/// whole stem, so long siblings sharing a prefix stay distinct.
pub fn archive_file_stem(parent: Option<&Address>, address: &Address) -> String {
    let parent = parent.map(Address::as_str).unwrap_or("root");
    let mut stem: String = format!("{}__{}", parent, address)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.len() > MAX_FILE_STEM {
        let suffix = format!("-{:016x}", xxh3_64(stem.as_bytes()));
        stem.truncate(MAX_FILE_STEM - suffix.len());
        stem.push_str(&suffix);
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_stem_is_sanitized() {
        let stem = archive_file_stem(
            Some(&Address::from("http://a.test/")),
            &Address::from("http://a.test/docs?page=2"),
        );
        assert_eq!(stem, "http___a.test___http___a.test_docs_page_2");
    }

    #[test]
    fn test_seed_stem_uses_root() {
        let stem = archive_file_stem(None, &Address::from("https://a.test/"));
        assert_eq!(stem, "root__https___a.test_");
    }

    #[test]
    fn test_file_stem_is_truncated() {
        let long = Address::new(format!("http://a.test/{}", "x".repeat(500)));
        assert_eq!(archive_file_stem(None, &long).len(), MAX_FILE_STEM);
    }

    #[test]
    fn test_long_siblings_get_distinct_stems() {
        let parent = Address::new(format!("https://docs.a.test/{}/", "guides".repeat(12)));
        let section = "installation/configuring-the-package-repository".repeat(3);
        let one = Address::new(format!("https://docs.a.test/{}/page-one", section));
        let two = Address::new(format!("https://docs.a.test/{}/page-two", section));

        let stem_one = archive_file_stem(Some(&parent), &one);
        let stem_two = archive_file_stem(Some(&parent), &two);

        assert_ne!(stem_one, stem_two);
        assert_eq!(stem_one.len(), MAX_FILE_STEM);
        assert_eq!(stem_two.len(), MAX_FILE_STEM);
        assert_eq!(stem_one, archive_file_stem(Some(&parent), &one));
    }

    #[test]
    fn test_long_siblings_are_archived_separately() {
        let dir = TempDir::new().unwrap();
        let analyzer = ArchiveAnalyzer::new(dir.path());
        let parent = Address::new(format!("http://a.test/{}/", "x".repeat(250)));
        let one = Address::new(format!("{}one", parent));
        let two = Address::new(format!("{}two", parent));

        for (address, content) in [(&one, "first"), (&two, "second")] {
            let page = PageContext {
                parent: Some(&parent),
                address,
                content,
            };
            analyzer.analyze(&page).unwrap();
        }

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(
            fs::read_to_string(analyzer.archive_path(Some(&parent), &one)).unwrap(),
            "first"
        );
        assert_eq!(
            fs::read_to_string(analyzer.archive_path(Some(&parent), &two)).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_analyze_writes_page() {
        let dir = TempDir::new().unwrap();
        let analyzer = ArchiveAnalyzer::new(dir.path().join("pages"));
        let parent = Address::from("http://a.test/");
        let address = Address::from("http://a.test/about");
        let page = PageContext {
            parent: Some(&parent),
            address: &address,
            content: "<html>about</html>",
        };

        let findings = analyzer.analyze(&page).unwrap();
        let expected = analyzer.archive_path(Some(&parent), &address);

        assert_eq!(
            findings,
            vec![Finding::new(
                &address,
                FindingKind::Archived {
                    path: expected.clone()
                }
            )]
        );
        assert_eq!(fs::read_to_string(expected).unwrap(), "<html>about</html>");
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let analyzer = ArchiveAnalyzer::new(&blocker);
        let address = Address::from("http://a.test/");
        let page = PageContext {
            parent: None,
            address: &address,
            content: "x",
        };

        assert!(matches!(
            analyzer.analyze(&page),
            Err(CoreError::Archive { .. })
        ));
    }
}
