//! Target element fallback chain.

use super::driver::PageDriver;
use crate::{Error, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// What ended up in the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotKind {
    /// Cropped to the element matched by this selector.
    Element(String),
    /// No candidate matched; the whole document.
    FullPage,
}

impl fmt::Display for ShotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotKind::Element(sel) => write!(f, "element '{}'", sel),
            ShotKind::FullPage => f.write_str("full page"),
        }
    }
}

/// A captured PNG and how it was framed.
#[derive(Debug)]
pub struct Shot {
    pub kind: ShotKind,
    pub png: Vec<u8>,
}

/// Screenshot the first selector that yields a visible element, in order,
/// falling back to the full page.
///
/// Probe failures move on to the next selector. Only a failing full-page
/// screenshot is an error.
pub async fn capture_target<P: PageDriver>(page: &P, selectors: &[String]) -> Result<Shot> {
    for selector in selectors {
        match probe(page, selector).await {
            Ok(Some(png)) => {
                info!("Captured element '{}'", selector);
                return Ok(Shot {
                    kind: ShotKind::Element(selector.clone()),
                    png,
                });
            }
            Ok(None) => debug!("No visible match for '{}'", selector),
            Err(e) => warn!("Probe '{}' failed: {}", selector, e),
        }
    }

    info!("No target element found, taking full-page screenshot");
    let png = page
        .screenshot_full_page()
        .await
        .map_err(|e| Error::Capture(format!("full-page screenshot failed: {}", e)))?;
    Ok(Shot {
        kind: ShotKind::FullPage,
        png,
    })
}

async fn probe<P: PageDriver>(page: &P, selector: &str) -> Result<Option<Vec<u8>>> {
    let Some(region) = page.locate(selector).await? else {
        return Ok(None);
    };
    debug!("'{}' at {:?}", selector, region);
    page.screenshot_region(&region).await.map(Some)
}
