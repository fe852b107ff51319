// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is exactly one argument: the page to scan. It is optional so that
// running the tool bare prints usage and exits successfully instead of
// failing with a clap error.
//
// Tuning (timeouts, concurrency, ...) lives in environment variables,
// see config.rs.
// =============================================================================

use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "link-scan",
    version,
    about = "Test all hyperlinks on the given url",
    long_about = "link-scan loads a web page, lists every unique link on it (ignoring \
                  fragments and query strings), then checks each link and lists the bad ones."
)]
pub struct Cli {
    /// Page to scan (e.g., https://example.com)
    pub url: Option<String>,
}

/// Prints the usage text shown when no URL is given.
pub fn print_usage() {
    let mut command = Cli::command();
    println!("{}", command.render_usage());
    println!();
    println!("Test all hyperlinks on the given url.");
}
