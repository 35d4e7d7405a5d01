//! eoka-backed browser session.

use super::driver::{BrowserSession, PageDriver, Region};
use super::stealth;
use crate::config::BrowserConfig;
use crate::Result;
use base64::Engine;
use eoka::{Browser, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Chrome refuses captures taller than its maximum texture size.
const MAX_CAPTURE_PX: f64 = 16_384.0;

/// Find a clickable element by text - returns CSS selector.
const FIND_BY_TEXT_JS: &str = r#"(() => {
    const text = arguments[0].toLowerCase();
    const candidates = document.querySelectorAll(
        'button, [role="button"], a, input[type="button"], input[type="submit"]'
    );
    for (const el of candidates) {
        const label = (el.textContent || el.value || '').trim().toLowerCase();
        if (!label.includes(text)) continue;
        const rect = el.getBoundingClientRect();
        if (rect.width === 0 || rect.height === 0) continue;
        if (el.id) return '#' + CSS.escape(el.id);
        const path = [];
        let node = el;
        while (node && node !== document.body) {
            let selector = node.tagName.toLowerCase();
            if (node.id) {
                path.unshift('#' + CSS.escape(node.id));
                break;
            }
            const siblings = Array.from(node.parentNode?.children || []);
            const index = siblings.indexOf(node) + 1;
            if (siblings.length > 1) selector += ':nth-child(' + index + ')';
            path.unshift(selector);
            node = node.parentNode;
        }
        return path.join(' > ');
    }
    return null;
})()"#;

/// Box of the first match in document coordinates, or null if not rendered.
const LOCATE_JS: &str = r#"(() => {
    let el;
    try { el = document.querySelector(arguments[0]); } catch (e) { return null; }
    if (!el) return null;
    const r = el.getBoundingClientRect();
    if (r.width < 1 || r.height < 1) return null;
    return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };
})()"#;

const DOCUMENT_SIZE_JS: &str = r#"(() => {
    const d = document.documentElement, b = document.body;
    return {
        width: Math.max(d ? d.scrollWidth : 0, b ? b.scrollWidth : 0, window.innerWidth),
        height: Math.max(d ? d.scrollHeight : 0, b ? b.scrollHeight : 0, window.innerHeight)
    };
})()"#;

#[derive(Debug, Deserialize)]
struct DocumentSize {
    width: f64,
    height: f64,
}

/// `Page.captureScreenshot` with a document-space clip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptureScreenshot {
    format: &'static str,
    clip: Clip,
    capture_beyond_viewport: bool,
}

#[derive(Debug, Serialize)]
struct Clip {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    scale: f64,
}

#[derive(Debug, Deserialize)]
struct CaptureScreenshotResult {
    data: String,
}

fn with_arg(js: &str, arg: &str) -> String {
    // serde_json string encoding is a valid JS string literal
    let literal = serde_json::to_string(arg).unwrap_or_else(|_| "\"\"".into());
    js.replace("arguments[0]", &literal)
}

fn clip_for(region: &Region) -> Clip {
    Clip {
        x: region.x.max(0.0),
        y: region.y.max(0.0),
        width: region.width,
        height: region.height.min(MAX_CAPTURE_PX),
        scale: 1.0,
    }
}

/// A single eoka page.
pub struct EokaPage {
    page: Page,
}

impl EokaPage {
    /// PNG of `region`, including any part outside the viewport.
    async fn capture(&self, region: &Region) -> Result<Vec<u8>> {
        let params = CaptureScreenshot {
            format: "png",
            clip: clip_for(region),
            capture_beyond_viewport: true,
        };
        let result: CaptureScreenshotResult = self
            .page
            .session()
            .send("Page.captureScreenshot", &params)
            .await?;
        Ok(base64::engine::general_purpose::STANDARD.decode(result.data)?)
    }
}

impl PageDriver for EokaPage {
    async fn add_init_script(&self, js: &str) -> Result<()> {
        let id = self
            .page
            .session()
            .add_script_to_evaluate_on_new_document(js)
            .await?;
        debug!("init script registered ({})", id);
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, idle_ms: u64, timeout_ms: u64) -> Result<()> {
        self.page.wait_for_network_idle(idle_ms, timeout_ms).await?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String> {
        Ok(self.page.evaluate("document.readyState").await?)
    }

    async fn find_by_text(&self, text: &str) -> Result<Option<String>> {
        Ok(self.page.evaluate(&with_arg(FIND_BY_TEXT_JS, text)).await?)
    }

    async fn try_click(&self, selector: &str) -> Result<bool> {
        Ok(self.page.try_click(selector).await?)
    }

    async fn locate(&self, selector: &str) -> Result<Option<Region>> {
        Ok(self.page.evaluate(&with_arg(LOCATE_JS, selector)).await?)
    }

    async fn screenshot_region(&self, region: &Region) -> Result<Vec<u8>> {
        self.capture(region).await
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        let size: DocumentSize = self.page.evaluate(DOCUMENT_SIZE_JS).await?;
        if size.height > MAX_CAPTURE_PX {
            warn!(
                "document is {}px tall, capturing the first {}px",
                size.height, MAX_CAPTURE_PX
            );
        }
        self.capture(&Region {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        })
        .await
    }

    async fn wait(&self, ms: u64) {
        self.page.wait(ms).await;
    }
}

/// Stealth Chrome with one page.
pub struct EokaSession {
    browser: Browser,
    page: EokaPage,
}

impl EokaSession {
    /// Launch with the configured identity, viewport and proxy.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth::stealth_config(config)).await?;
        let opened = browser.new_page("about:blank").await;
        let page = match opened {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Browser close failed: {}", close_err);
                }
                return Err(e.into());
            }
        };
        Ok(Self {
            browser,
            page: EokaPage { page },
        })
    }
}

impl BrowserSession for EokaSession {
    type Page = EokaPage;

    fn page(&self) -> &EokaPage {
        &self.page
    }

    async fn close(self) -> Result<()> {
        drop(self.page);
        self.browser.close().await?;
        Ok(())
    }
}
