//! Seams between the capture steps and the browser.
//!
//! The steps only talk to [`PageDriver`]; the eoka-backed implementation lives
//! in [`super::session`].

use crate::Result;
use serde::Deserialize;

/// Element box in CSS pixels, relative to the document origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Page operations the capture pipeline needs.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Register a script that runs on every new document before its own scripts.
    async fn add_init_script(&self, js: &str) -> Result<()>;

    /// Start navigating to `url`. Resolves once the navigation commits, not
    /// when the document is ready; poll [`PageDriver::ready_state`] for that.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until no requests have been in flight for `idle_ms`.
    async fn wait_for_network_idle(&self, idle_ms: u64, timeout_ms: u64) -> Result<()>;

    /// Current `document.readyState`.
    async fn ready_state(&self) -> Result<String>;

    /// Selector of the first clickable element whose text contains `text`.
    async fn find_by_text(&self, text: &str) -> Result<Option<String>>;

    /// Click if present. Returns whether anything was clicked.
    async fn try_click(&self, selector: &str) -> Result<bool>;

    /// Box of the first match, if it is rendered with a non-zero size.
    async fn locate(&self, selector: &str) -> Result<Option<Region>>;

    /// PNG of `region`, including parts outside the viewport.
    async fn screenshot_region(&self, region: &Region) -> Result<Vec<u8>>;

    /// PNG of the whole document.
    async fn screenshot_full_page(&self) -> Result<Vec<u8>>;

    /// Sleep for `ms` milliseconds.
    async fn wait(&self, ms: u64);
}

/// An exclusively owned browser with a single page.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    type Page: PageDriver;

    fn page(&self) -> &Self::Page;

    /// Tear down the browser.
    async fn close(self) -> Result<()>;
}
