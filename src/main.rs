// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse the command line (just the page URL)
// 2. Fetch the page and collect every <a> href
// 3. Normalize and deduplicate them into a LinkSet, print it
// 4. Probe every link concurrently, print the bad ones
// 5. Exit with proper code (0 = all good, 1 = bad links, 2 = error,
//    130 = interrupted)
//
// Ctrl-C during the scan drops everything in flight and exits without
// printing any further results.
// =============================================================================

mod checker;
mod cli;
mod config;
mod logging;
mod page;

use std::future::Future;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use checker::{Checker, Classification, LinkSet, ValidationResult};
use cli::Cli;
use config::CheckerConfig;
use page::{HtmlPage, PageSource};

const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no bad links (or usage was printed)
//   Ok(1) = bad links found
//   Ok(130) = interrupted
//   Err = fatal error
async fn run() -> Result<i32> {
    let args = Cli::parse();

    let Some(page_url) = args.url else {
        cli::print_usage();
        return Ok(0);
    };

    logging::init_logging();
    let config = CheckerConfig::from_env()?;

    run_until_shutdown(scan_page(&page_url, config), tokio::signal::ctrl_c()).await
}

// Races the scan against a shutdown signal
//
// When the signal fires first, the scan future is dropped along with every
// request still in flight, and nothing more is printed. If the signal can't
// be listened for, the scan simply runs to completion.
async fn run_until_shutdown<F, S>(scan: F, shutdown: S) -> Result<i32>
where
    F: Future<Output = Result<i32>>,
    S: Future<Output = io::Result<()>>,
{
    tokio::pin!(scan);

    tokio::select! {
        result = &mut scan => result,
        signal = shutdown => match signal {
            Ok(()) => {
                tracing::warn!("interrupted, cancelling in-flight requests");
                Ok(EXIT_INTERRUPTED)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for Ctrl-C, continuing without it");
                scan.await
            }
        },
    }
}

async fn scan_page(page_url: &str, config: CheckerConfig) -> Result<i32> {
    tracing::info!(%page_url, "scanning page");

    // The page handle only lives until the links are collected
    let page = HtmlPage::new(&config)?;
    let links = collect_links(&page, page_url).await?;
    drop(page);

    {
        let mut stdout = io::stdout().lock();
        print_links(&mut stdout, &links)?;
        stdout.flush()?;
    }

    tracing::info!(count = links.len(), "checking links");
    let checker = Checker::new(config)?;
    let results = checker.check(&links).await;

    print_bad_links(&mut io::stdout().lock(), &results)?;

    let bad_count = results.iter().filter(|r| !r.is_valid()).count();
    tracing::info!(total = results.len(), bad = bad_count, "scan finished");

    Ok(if bad_count > 0 { 1 } else { 0 })
}

// Asks the page source for raw hrefs and builds the deduplicated set
async fn collect_links<S: PageSource>(source: &S, page_url: &str) -> Result<LinkSet> {
    let raw = source
        .raw_links(page_url)
        .await
        .context("Could not read links from the page")?;
    let found = raw.len();

    let links = LinkSet::from_raw(raw);
    tracing::info!(found, unique = links.len(), "collected links");

    Ok(links)
}

fn print_links(out: &mut impl Write, links: &LinkSet) -> io::Result<()> {
    for url in links {
        writeln!(out, "{}", url)?;
    }
    Ok(())
}

// Invalid links are always listed. Unknown links only exist when the
// network error policy asks for them, and get their own section.
fn print_bad_links(out: &mut impl Write, results: &[ValidationResult]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Bad Links:")?;
    for result in results
        .iter()
        .filter(|r| r.classification == Classification::Invalid)
    {
        writeln!(out, "{}", result.url)?;
        tracing::debug!(url = %result.url, message = ?result.message, "bad link");
    }

    let unknown: Vec<_> = results
        .iter()
        .filter(|r| r.classification == Classification::Unknown)
        .collect();
    if !unknown.is_empty() {
        writeln!(out)?;
        writeln!(out, "Unreachable Links:")?;
        for result in unknown {
            writeln!(out, "{}", result.url)?;
        }
    }

    Ok(())
}
