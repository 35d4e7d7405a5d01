//! Cookie/consent banner dismissal. Never fails the capture.

use super::driver::PageDriver;
use crate::config::InterstitialConfig;
use crate::{BestEffort, Error, Result};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// One way of finding the banner's accept control.
#[derive(Debug, Clone, Copy)]
enum Pattern<'a> {
    Text(&'a str),
    Selector(&'a str),
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Text(t) => write!(f, "text '{}'", t),
            Pattern::Selector(s) => write!(f, "selector '{}'", s),
        }
    }
}

/// Click the first matching accept control. Texts are tried before selectors.
///
/// Returns the pattern that worked, or an ignored outcome when nothing did.
pub async fn dismiss<P: PageDriver>(page: &P, config: &InterstitialConfig) -> BestEffort<String> {
    let limit = Duration::from_millis(config.click_timeout_ms);
    let patterns = config
        .texts
        .iter()
        .map(|t| Pattern::Text(t))
        .chain(config.selectors.iter().map(|s| Pattern::Selector(s)));

    for pattern in patterns {
        match try_pattern(page, pattern, limit).await {
            Ok(true) => {
                page.wait(config.settle_ms).await;
                info!("Dismissed interstitial via {}", pattern);
                return BestEffort::Done(pattern.to_string());
            }
            Ok(false) => debug!("interstitial: no match for {}", pattern),
            Err(e) => debug!("interstitial: {} failed: {}", pattern, e),
        }
    }

    debug!("interstitial: no consent banner matched");
    BestEffort::ignored("interstitial", "no consent banner matched")
}

async fn try_pattern<P: PageDriver>(page: &P, pattern: Pattern<'_>, limit: Duration) -> Result<bool> {
    let click = async {
        let selector = match pattern {
            Pattern::Text(text) => match page.find_by_text(text).await? {
                Some(sel) => sel,
                None => return Ok(false),
            },
            Pattern::Selector(sel) => sel.to_string(),
        };
        page.try_click(&selector).await
    };
    timeout(limit, click)
        .await
        .map_err(|_| Error::Timeout(format!("click on {} after {}ms", pattern, limit.as_millis())))?
}
