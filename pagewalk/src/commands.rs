use crate::CLAP_STYLING;
use clap::{ArgGroup, arg};
use std::path::PathBuf;

pub const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("pagewalk")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pagewalk")
        .about("Walks the links of one or more web pages to a fixed depth and checks what it finds")
        .styles(CLAP_STYLING)
        .arg(
            arg!([SEED] ...)
                .help("Address(es) to start from; a missing scheme defaults to http://")
                .required_unless_present("hosts-file"),
        )
        .arg(
            arg!(-H --"hosts-file" <PATH>)
                .required(false)
                .help("Path to a newline-delimited file of seed addresses")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-a --"scope" <SCOPE>)
                .required(true)
                .help("Only pages whose address contains this text (case-insensitive) are expanded"),
        )
        .arg(
            arg!(-d --"depth" <DEPTH>)
                .required(true)
                .help("Maximum number of hops from a seed")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(-b --"broken-links")
                .help("Tag links that could not be fetched with -BROKEN")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-s --"spelling")
                .help("Report misspelled words on in-scope pages")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-g --"grammar")
                .help("Report punctuation and grammar issues")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-A --"archive" <DIR>)
                .required(false)
                .help("Save every in-scope page under this directory")
                .value_parser(clap::value_parser!(String)),
        )
        .group(
            ArgGroup::new("analysis")
                .args(["broken-links", "spelling", "grammar", "archive"])
                .required(true)
                .multiple(true),
        )
        .arg(
            arg!(--"exceptions" <PATH>)
                .required(false)
                .help("Newline-delimited words never reported as misspelled (default: bundled list)")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(--"dictionary" <PATH>)
                .required(false)
                .help("Word list used by the spelling check")
                .default_value(DEFAULT_DICTIONARY),
        )
        .arg(
            arg!(--"scope-all-analyzers")
                .help("Run the grammar check on in-scope pages only, like the others")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save the report to a file (default: display to screen)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(arg!(-v --"verbose" "Debug logging and one line per crawled page"))
        .arg(arg!(-q --"quiet" "Suppress the spinner and headers"))
}
