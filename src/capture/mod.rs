//! Heatmap capture: stealth session, guarded navigation, banner dismissal,
//! element fallback chain, and artifact persistence.
//!
//! Steps run strictly in that order on one page. The browser is closed on
//! every exit path, after which the error (if any) is returned.

pub mod driver;
pub mod interstitial;
pub mod locate;
pub mod navigate;
pub mod persist;
pub mod session;
pub mod stealth;

#[cfg(test)]
pub(crate) mod fake;

pub use driver::{BrowserSession, PageDriver, Region};
pub use locate::ShotKind;
pub use navigate::NavigationPath;
pub use persist::{ArtifactPaths, Artifacts};
pub use session::EokaSession;

use crate::config::{BrowserConfig, CaptureConfig};
use crate::{BestEffort, Result};
use std::future::Future;
use tracing::{debug, error, info, warn};

/// Lifecycle of one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Uninitialized,
    SessionOpen,
    Navigated,
    NavigationFailed,
    ElementLocated,
    FullPageFallback,
    Captured,
    Closed,
}

/// Outcome of a successful capture.
#[derive(Debug)]
pub struct CaptureReport {
    /// How the image was framed.
    pub kind: ShotKind,
    /// Whether the guarded attempts or the load fallback reached the page.
    pub navigation: NavigationPath,
    /// Pattern that dismissed a consent banner, if any.
    pub interstitial: BestEffort<String>,
    /// Written images.
    pub artifacts: Artifacts,
    /// Stages passed through, from `Uninitialized` to `Closed`.
    pub stages: Vec<CaptureStage>,
}

/// Launch a stealth browser and capture the configured page.
pub async fn capture_heatmap(config: &CaptureConfig, paths: &ArtifactPaths) -> Result<CaptureReport> {
    capture_with(config, paths, |browser| async move { EokaSession::launch(&browser).await }).await
}

/// Open a session with `launch`, drive it through the capture, then close it
/// whatever happened.
pub async fn capture_with<S, L, Fut>(
    config: &CaptureConfig,
    paths: &ArtifactPaths,
    launch: L,
) -> Result<CaptureReport>
where
    S: BrowserSession,
    L: FnOnce(BrowserConfig) -> Fut,
    Fut: Future<Output = Result<S>>,
{
    let mut stages = vec![CaptureStage::Uninitialized];

    let session = match launch(config.browser.clone()).await {
        Ok(session) => session,
        Err(e) => {
            error!("Capture failed after {:?}: {}", stages, e);
            return Err(e);
        }
    };
    stages.push(CaptureStage::SessionOpen);

    let result = drive(session.page(), config, paths, &mut stages).await;

    match session.close().await {
        Ok(()) => debug!("Browser closed"),
        Err(e) => warn!("Browser close failed: {}", e),
    }
    stages.push(CaptureStage::Closed);

    match result {
        Ok(mut report) => {
            report.stages = stages;
            Ok(report)
        }
        Err(e) => {
            error!("Capture failed after {:?}: {}", stages, e);
            Err(e)
        }
    }
}

async fn drive<P: PageDriver>(
    page: &P,
    config: &CaptureConfig,
    paths: &ArtifactPaths,
    stages: &mut Vec<CaptureStage>,
) -> Result<CaptureReport> {
    stealth::install(page).await;

    let navigation = navigate::navigate(page, &config.url, &config.navigation).await;
    stages.push(match navigation {
        Ok(NavigationPath::Direct) => CaptureStage::Navigated,
        _ => CaptureStage::NavigationFailed,
    });
    let navigation = navigation?;

    let interstitial = interstitial::dismiss(page, &config.interstitial).await;

    let shot = locate::capture_target(page, &config.targets).await?;
    stages.push(match shot.kind {
        ShotKind::Element(_) => CaptureStage::ElementLocated,
        ShotKind::FullPage => CaptureStage::FullPageFallback,
    });

    let artifacts = persist::persist(&shot.png, paths)?;
    stages.push(CaptureStage::Captured);
    info!("Heatmap captured ({})", shot.kind);

    Ok(CaptureReport {
        kind: shot.kind,
        navigation,
        interstitial,
        artifacts,
        stages: Vec::new(),
    })
}
