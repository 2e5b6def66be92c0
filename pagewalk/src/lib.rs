pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    LineSink, ReportFormat, build_analyzers, build_config, capabilities_from_args, format_finding,
    generate_report, handle_walk, load_exceptions, load_seeds, load_seeds_from_file, parse_seed,
    run_walk,
};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
