// src/page/mod.rs
// =============================================================================
// This module gets the raw links out of the target page.
//
// The rest of the program only needs "one raw href per <a> element", so that
// is all the PageSource trait promises. HtmlPage is the implementation we
// ship: it downloads the page and parses its HTML. Page JavaScript is not run.
// =============================================================================

mod html;

pub use html::HtmlPage;

use anyhow::Result;

use crate::checker::RawLink;

/// Something that can list the links found on a page.
///
/// A failure here is fatal for the scan: without the page there is nothing
/// to check.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn raw_links(&self, page_url: &str) -> Result<Vec<RawLink>>;
}
