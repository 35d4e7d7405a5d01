//! Anti-automation shaping.
//!
//! The launcher applies eoka's stealth patches; on top of that every document
//! gets [`OVERRIDES_JS`], which pins the fingerprint values the target site
//! is known to check.

use super::driver::PageDriver;
use crate::config::BrowserConfig;
use crate::BestEffort;
use eoka::StealthConfig;
use tracing::{debug, warn};

/// Masks `navigator.webdriver`, fakes plugins/languages, adds `chrome.runtime`.
pub const OVERRIDES_JS: &str = r#"(() => {
    const define = (obj, key, get) => {
        try { Object.defineProperty(obj, key, { get, configurable: true }); } catch (e) {}
    };
    define(navigator, 'webdriver', () => undefined);
    define(navigator, 'plugins', () => [1, 2, 3, 4, 5]);
    define(navigator, 'languages', () => ['en-US', 'en']);
    window.chrome = window.chrome || {};
    window.chrome.runtime = window.chrome.runtime || {};
})()"#;

/// Launch settings for the stealth browser.
pub fn stealth_config(config: &BrowserConfig) -> StealthConfig {
    StealthConfig {
        headless: config.headless,
        patch_binary: config.patch_binary,
        proxy: config.proxy.clone(),
        user_agent: Some(config.user_agent.clone()),
        viewport_width: config.viewport.width,
        viewport_height: config.viewport.height,
        ..Default::default()
    }
}

/// Install the overrides before the first navigation.
pub async fn install<P: PageDriver>(page: &P) -> BestEffort<()> {
    let outcome = BestEffort::from_result("stealth_overrides", page.add_init_script(OVERRIDES_JS).await);
    match &outcome {
        BestEffort::Done(()) => debug!("Stealth overrides installed"),
        BestEffort::Ignored(i) => warn!("{}", i),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::FakePage;

    #[test]
    fn test_stealth_config_from_browser_config() {
        let browser = BrowserConfig {
            proxy: Some("http://proxy:3128".into()),
            ..Default::default()
        };
        let stealth = stealth_config(&browser);
        assert!(stealth.headless);
        assert_eq!(stealth.viewport_width, 1600);
        assert_eq!(stealth.viewport_height, 1200);
        assert_eq!(stealth.proxy, Some("http://proxy:3128".into()));
        assert!(stealth
            .user_agent
            .as_deref()
            .unwrap_or_default()
            .contains("Chrome/124"));
    }

    #[test]
    fn test_overrides_cover_detection_vectors() {
        for needle in ["'webdriver'", "'plugins'", "'languages'", "chrome.runtime"] {
            assert!(OVERRIDES_JS.contains(needle), "missing {}", needle);
        }
    }

    #[tokio::test]
    async fn test_install_failure_is_ignored() {
        let page = FakePage::new().failing_init_script();
        let outcome = install(&page).await;
        assert!(!outcome.is_done());
    }

    #[tokio::test]
    async fn test_install_records_script() {
        let page = FakePage::new();
        assert!(install(&page).await.is_done());
        assert_eq!(page.calls_to("add_init_script"), 1);
    }
}
