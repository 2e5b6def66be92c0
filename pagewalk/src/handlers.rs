use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pagewalk_core::analysis::spelling::{load_word_list, parse_word_list};
use pagewalk_core::analysis::{
    Analyzer, ArchiveAnalyzer, Finding, FindingKind, GrammarAnalyzer, SpellingAnalyzer,
};
use pagewalk_core::config::validate_seeds;
use pagewalk_core::{
    Address, Capabilities, CrawlConfig, CrawlOutcome, Gate, Node, Traversal, render, render_json,
};
use pagewalk_scanner::{HtmlExtractor, HttpFetcher};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_EXCEPTIONS: &str = include_str!("../wordlists/exceptions.txt");

/// Report layouts selectable with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_arg(value: &str) -> Self {
        match value {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Text,
        }
    }
}

// Seed loading

/// Parse a single seed, adding http:// when no scheme is given.
///
/// Returns the normalized form so seeds compare equal to discovered links.
pub fn parse_seed(line: &str) -> Option<Address> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(Address::new(url.to_string()));
    }

    if !line.contains("://")
        && let Ok(url) = Url::parse(&format!("http://{}", line))
    {
        return Some(Address::new(url.to_string()));
    }

    eprintln!("{} Skipping invalid seed '{}'", "⚠".yellow().bold(), line);
    None
}

/// Load and parse seeds from a newline-delimited file.
pub fn load_seeds_from_file(path: &Path) -> Result<Vec<Address>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let seeds: Vec<Address> = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(parse_seed)
        .collect();

    if seeds.is_empty() {
        bail!("No valid seeds found in {}", path.display());
    }

    Ok(seeds)
}

/// Positional seeds first, then any from `--hosts-file`.
pub fn load_seeds(
    positional: Option<Vec<&String>>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<Address>> {
    let mut seeds: Vec<Address> = positional
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| parse_seed(raw))
        .collect();

    if let Some(path) = hosts_file {
        seeds.extend(load_seeds_from_file(path)?);
    }

    validate_seeds(&seeds)?;
    Ok(seeds)
}

/// The bundled exception list, or the one at `path` (tilde-expanded).
pub fn load_exceptions(path: Option<&String>) -> Result<HashSet<String>> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            Ok(load_word_list(Path::new(expanded.as_ref()))?)
        }
        None => Ok(parse_word_list(DEFAULT_EXCEPTIONS)),
    }
}

// Wiring

pub fn capabilities_from_args(args: &ArgMatches) -> Capabilities {
    Capabilities {
        broken_links: args.get_flag("broken-links"),
        spelling: args.get_flag("spelling"),
        grammar: args.get_flag("grammar"),
        archive: args.contains_id("archive"),
    }
}

pub fn build_config(args: &ArgMatches) -> Result<CrawlConfig> {
    let depth = *args
        .get_one::<usize>("depth")
        .context("--depth is required")?;
    let scope = args
        .get_one::<String>("scope")
        .context("--scope is required")?;

    let config =
        CrawlConfig::new(depth, scope.as_str()).with_capabilities(capabilities_from_args(args));
    config.validate()?;
    Ok(config)
}

pub fn build_analyzers(args: &ArgMatches) -> Result<Vec<Box<dyn Analyzer>>> {
    let capabilities = capabilities_from_args(args);
    let mut analyzers: Vec<Box<dyn Analyzer>> = Vec::new();

    if capabilities.spelling {
        let dictionary = args
            .get_one::<String>("dictionary")
            .context("--dictionary has a default")?;
        let dictionary = shellexpand::tilde(dictionary);
        let exceptions = load_exceptions(args.get_one::<String>("exceptions"))?;
        analyzers.push(Box::new(SpellingAnalyzer::from_dictionary_file(
            Path::new(dictionary.as_ref()),
            exceptions,
        )?));
    }

    if capabilities.grammar {
        let mut grammar = GrammarAnalyzer::new();
        if args.get_flag("scope-all-analyzers") {
            grammar = grammar.with_gate(Gate::Scoped);
        }
        analyzers.push(Box::new(grammar));
    }

    if let Some(directory) = args.get_one::<String>("archive") {
        let directory = shellexpand::tilde(directory);
        analyzers.push(Box::new(ArchiveAnalyzer::new(directory.into_owned())));
    }

    Ok(analyzers)
}

// Output

/// One finding line: colored label, then the address it pertains to.
pub fn format_finding(finding: &Finding) -> String {
    let label = match &finding.kind {
        FindingKind::Misspelling { .. } => "SPELLING".yellow().bold(),
        FindingKind::Grammar { .. } => "GRAMMAR".magenta().bold(),
        FindingKind::Archived { .. } => "ARCHIVE".blue().bold(),
    };
    format!("{} {}", label, finding)
}

pub fn generate_report(
    outcome: &CrawlOutcome,
    config: &CrawlConfig,
    seeds: &[Address],
    format: ReportFormat,
    quiet: bool,
) -> Result<String> {
    match format {
        ReportFormat::Json => Ok(render_json(outcome, config)?),
        ReportFormat::Text => {
            let mut report = String::new();
            if !quiet {
                let names: Vec<&str> = seeds.iter().map(Address::as_str).collect();
                report.push_str(&format!("\nLink Tree for {}:\n\n", names.join(", ")));
            }
            for line in render(&outcome.graph, &Node::Root) {
                report.push_str(&line);
                report.push('\n');
            }
            Ok(report)
        }
    }
}

fn crawl_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Destination for one line of live output.
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs a walk and returns the finished report.
///
/// Live lines (verbose progress and findings) go to `stdout` in text mode.
/// In JSON mode they go to `stderr` so standard output carries only the report.
pub async fn run_walk(args: &ArgMatches, stdout: LineSink, stderr: LineSink) -> Result<String> {
    let verbose = args.get_flag("verbose");
    let quiet = args.get_flag("quiet");
    let format = ReportFormat::from_arg(
        args.get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text"),
    );

    let seeds = load_seeds(
        args.get_many::<String>("SEED").map(|values| values.collect()),
        args.get_one::<PathBuf>("hosts-file"),
    )?;
    let config = build_config(args)?;
    let analyzers = build_analyzers(args)?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;

    let live = match format {
        ReportFormat::Json => stderr.clone(),
        ReportFormat::Text => stdout,
    };

    let spinner = if quiet || verbose {
        ProgressBar::hidden()
    } else {
        crawl_spinner()
    };

    let max_depth = config.max_depth;
    let progress_spinner = spinner.clone();
    let progress_sink = live.clone();
    let progress_callback = Arc::new(move |depth: usize, url: String| {
        if verbose {
            progress_sink(&format!("Crawling {}, Depth: {} of {}", url, depth, max_depth));
        } else {
            progress_spinner.set_message(format!("[depth {}] {}", depth, url));
        }
    });

    let finding_spinner = spinner.clone();
    let finding_callback = Arc::new(move |finding: Finding| {
        finding_spinner.suspend(|| live(&format_finding(&finding)));
    });

    let mut traversal = Traversal::new(fetcher, HtmlExtractor::new(), config)
        .with_progress_callback(progress_callback)
        .with_finding_callback(finding_callback);
    for analyzer in analyzers {
        traversal = traversal.with_analyzer(analyzer);
    }

    let outcome = traversal.traverse(&seeds).await;
    spinner.finish_and_clear();

    if !quiet {
        stderr(&format!(
            "{} Walk complete: {} page(s) fetched, {} link(s), {} broken, {} finding(s)",
            "✓".green().bold(),
            outcome.summary.pages_fetched,
            outcome.graph.edge_count(),
            outcome.graph.broken_count(),
            outcome.summary.findings
        ));
    }

    generate_report(&outcome, traversal.config(), &seeds, format, quiet)
}

pub async fn handle_walk(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let stdout: LineSink = Arc::new(|line: &str| println!("{}", line));
    let stderr: LineSink = Arc::new(|line: &str| eprintln!("{}", line));

    let report = run_walk(args, stdout, stderr).await?;

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}
