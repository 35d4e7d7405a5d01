//! In-memory page for exercising the capture steps without a browser.

use super::driver::{BrowserSession, PageDriver, Region};
use crate::config::NavigationPolicy;
use crate::{Error, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Policy with no backoff and short bounds.
pub fn fast_policy() -> NavigationPolicy {
    NavigationPolicy {
        attempts: 3,
        dom_timeout_ms: 1_000,
        idle_ms: 0,
        idle_timeout_ms: 100,
        backoff_base_ms: 0,
        backoff_step_ms: 0,
        fallback_timeout_ms: 1_000,
    }
}

fn region() -> Region {
    Region {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
    }
}

#[derive(Default)]
pub struct FakePage {
    calls: RefCell<Vec<&'static str>>,
    clicked: RefCell<Vec<String>>,
    goto_failures: Cell<u32>,
    goto_hangs: Cell<u32>,
    not_ready: Cell<u32>,
    idle_fails: bool,
    init_script_fails: bool,
    texts: HashMap<String, String>,
    clickable: HashSet<String>,
    hanging_clicks: HashSet<String>,
    regions: HashMap<String, Region>,
    failing_region_shots: HashSet<String>,
    last_region_selector: RefCell<Option<String>>,
    full_page_fails: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` gotos.
    pub fn failing_gotos(self, n: u32) -> Self {
        self.goto_failures.set(n);
        self
    }

    /// Hang the next `n` gotos forever.
    pub fn hanging_gotos(self, n: u32) -> Self {
        self.goto_hangs.set(n);
        self
    }

    /// Report "loading" until the `n`th readyState check.
    pub fn ready_after(self, n: u32) -> Self {
        self.not_ready.set(n.saturating_sub(1));
        self
    }

    pub fn failing_network_idle(mut self) -> Self {
        self.idle_fails = true;
        self
    }

    pub fn failing_init_script(mut self) -> Self {
        self.init_script_fails = true;
        self
    }

    pub fn with_text(mut self, text: &str, selector: &str) -> Self {
        self.texts.insert(text.into(), selector.into());
        self
    }

    pub fn clickable(mut self, selector: &str) -> Self {
        self.clickable.insert(selector.into());
        self
    }

    pub fn hanging_click(mut self, selector: &str) -> Self {
        self.hanging_clicks.insert(selector.into());
        self
    }

    pub fn with_region(mut self, selector: &str) -> Self {
        self.regions.insert(selector.into(), region());
        self
    }

    pub fn failing_region_shot(mut self, selector: &str) -> Self {
        self.failing_region_shots.insert(selector.into());
        self
    }

    pub fn failing_full_page(mut self) -> Self {
        self.full_page_fails = true;
        self
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn clicked(&self) -> Vec<String> {
        self.clicked.borrow().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    /// Decrement `counter` if positive; true when it was.
    fn take(counter: &Cell<u32>) -> bool {
        let n = counter.get();
        if n > 0 {
            counter.set(n - 1);
            true
        } else {
            false
        }
    }
}

impl PageDriver for FakePage {
    async fn add_init_script(&self, _js: &str) -> Result<()> {
        self.record("add_init_script");
        if self.init_script_fails {
            return Err(Error::Capture("script rejected".into()));
        }
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.record("goto");
        if Self::take(&self.goto_hangs) {
            std::future::pending::<()>().await;
        }
        if Self::take(&self.goto_failures) {
            return Err(Error::Navigation(format!("net::ERR_CONNECTION_RESET at {}", url)));
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, _idle_ms: u64, _timeout_ms: u64) -> Result<()> {
        self.record("wait_for_network_idle");
        if self.idle_fails {
            return Err(Error::Timeout("network idle".into()));
        }
        Ok(())
    }

    async fn ready_state(&self) -> Result<String> {
        self.record("ready_state");
        if Self::take(&self.not_ready) {
            return Ok("loading".into());
        }
        Ok("complete".into())
    }

    async fn find_by_text(&self, text: &str) -> Result<Option<String>> {
        self.record("find_by_text");
        Ok(self.texts.get(text).cloned())
    }

    async fn try_click(&self, selector: &str) -> Result<bool> {
        self.record("try_click");
        if self.hanging_clicks.contains(selector) {
            std::future::pending::<()>().await;
        }
        if self.clickable.contains(selector) {
            self.clicked.borrow_mut().push(selector.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    async fn locate(&self, selector: &str) -> Result<Option<Region>> {
        self.record("locate");
        let found = self.regions.get(selector).copied();
        if found.is_some() {
            *self.last_region_selector.borrow_mut() = Some(selector.to_string());
        }
        Ok(found)
    }

    async fn screenshot_region(&self, _region: &Region) -> Result<Vec<u8>> {
        self.record("screenshot_region");
        let selector = self.last_region_selector.borrow().clone().unwrap_or_default();
        if self.failing_region_shots.contains(&selector) {
            return Err(Error::Capture(format!("element '{}' detached", selector)));
        }
        Ok(format!("element:{}", selector).into_bytes())
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        self.record("screenshot_full_page");
        if self.full_page_fails {
            return Err(Error::Capture("target crashed".into()));
        }
        Ok(b"full-page".to_vec())
    }

    async fn wait(&self, _ms: u64) {
        self.record("wait");
    }
}

/// Session whose close is observable after it has been consumed.
pub struct FakeSession {
    page: FakePage,
    closed: Rc<Cell<bool>>,
}

impl FakeSession {
    pub fn new(page: FakePage) -> (Self, Rc<Cell<bool>>) {
        let closed = Rc::new(Cell::new(false));
        (
            Self {
                page,
                closed: closed.clone(),
            },
            closed,
        )
    }
}

impl BrowserSession for FakeSession {
    type Page = FakePage;

    fn page(&self) -> &FakePage {
        &self.page
    }

    async fn close(self) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }
}
