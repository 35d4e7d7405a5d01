//! Reaching the target page despite transient failures.

use super::driver::PageDriver;
use crate::config::NavigationPolicy;
use crate::{BestEffort, Error, Result};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Poll interval while waiting on `document.readyState`.
const READY_POLL_MS: u64 = 50;

/// How the page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPath {
    /// One of the guarded attempts succeeded.
    Direct,
    /// All guarded attempts failed; the final load attempt succeeded.
    LoadFallback,
}

/// Guarded navigation with backoff. Never returns an error.
///
/// Each attempt navigates and waits until `document.readyState` is
/// `interactive` or `complete`, then waits for network idle. Only the first
/// wait can fail an attempt.
pub async fn goto_with_retries<P: PageDriver>(
    page: &P,
    url: &str,
    policy: &NavigationPolicy,
) -> bool {
    for attempt in 1..=policy.attempts {
        info!("goto attempt {}/{}: {}", attempt, policy.attempts, url);
        match dom_ready(page, url, policy).await {
            Ok(()) => {
                settle_network(page, policy).await;
                return true;
            }
            Err(e) if attempt == policy.attempts => {
                warn!("goto failed after {} attempts: {}", attempt, e);
            }
            Err(e) => {
                let delay = policy.backoff(attempt);
                warn!(
                    "goto attempt {} failed: {} (retrying in {}ms)",
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    false
}

/// `document.readyState` values that count as "DOM ready".
const DOM_READY: &[&str] = &["interactive", "complete"];

/// `document.readyState` values that count as "load event fired".
const LOADED: &[&str] = &["complete"];

/// Navigate, then wait for the DOM, all within `dom_timeout_ms`.
async fn dom_ready<P: PageDriver>(page: &P, url: &str, policy: &NavigationPolicy) -> Result<()> {
    let ready = async {
        page.goto(url).await?;
        wait_for_ready_state(page, DOM_READY).await
    };
    timeout(Duration::from_millis(policy.dom_timeout_ms), ready)
        .await
        .map_err(|_| {
            Error::Timeout(format!(
                "DOM not ready after {}ms",
                policy.dom_timeout_ms
            ))
        })?
}

/// Poll `document.readyState` until it is one of `states`. Unbounded; callers
/// wrap it in a timeout.
async fn wait_for_ready_state<P: PageDriver>(page: &P, states: &[&str]) -> Result<()> {
    loop {
        let state = page.ready_state().await?;
        if states.contains(&state.as_str()) {
            return Ok(());
        }
        debug!("readyState: {}", state);
        tokio::time::sleep(Duration::from_millis(READY_POLL_MS)).await;
    }
}

/// Wait for network idle; expiry is good enough to proceed.
pub async fn settle_network<P: PageDriver>(page: &P, policy: &NavigationPolicy) -> BestEffort<()> {
    let wait = timeout(
        Duration::from_millis(policy.idle_timeout_ms),
        page.wait_for_network_idle(policy.idle_ms, policy.idle_timeout_ms),
    )
    .await;
    let outcome = match wait {
        Ok(result) => BestEffort::from_result("network_idle", result),
        Err(_) => BestEffort::ignored(
            "network_idle",
            format!("not idle after {}ms", policy.idle_timeout_ms),
        ),
    };
    match &outcome {
        BestEffort::Done(()) => debug!("Network idle"),
        BestEffort::Ignored(i) => info!("{}, continuing", i),
    }
    outcome
}

/// Final unguarded attempt: longer bound, waits for the full load event.
pub async fn load_fallback<P: PageDriver>(
    page: &P,
    url: &str,
    policy: &NavigationPolicy,
) -> Result<()> {
    info!("goto fallback (load, {}ms): {}", policy.fallback_timeout_ms, url);
    let load = async {
        page.goto(url).await?;
        wait_for_ready_state(page, LOADED).await
    };
    match timeout(Duration::from_millis(policy.fallback_timeout_ms), load).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::Navigation(format!(
            "final load attempt for {} failed: {}",
            url, e
        ))),
        Err(_) => Err(Error::Navigation(format!(
            "final load attempt for {} timed out after {}ms",
            url, policy.fallback_timeout_ms
        ))),
    }
}

/// Guarded attempts, then the load fallback if they all fail.
pub async fn navigate<P: PageDriver>(
    page: &P,
    url: &str,
    policy: &NavigationPolicy,
) -> Result<NavigationPath> {
    if goto_with_retries(page, url, policy).await {
        return Ok(NavigationPath::Direct);
    }
    load_fallback(page, url, policy).await?;
    Ok(NavigationPath::LoadFallback)
}
