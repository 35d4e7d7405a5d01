//! # market-snapshot
//!
//! Daily market summary: reads one row of market figures from a shared
//! spreadsheet, formats it as a chat message, and captures a screenshot of
//! the S&P 500 heatmap with a stealth browser.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use market_snapshot::{runner, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> market_snapshot::Result<()> {
//! let config = Config::load("snapshot.yaml")?;
//! let report = runner::run(&config, None).await?;
//! println!("{}", report.message);
//! # Ok(())
//! # }
//! ```

pub mod capture;
mod config;
pub mod outcome;
pub mod output;
pub mod runner;
pub mod snapshot;

pub use capture::{CaptureReport, CaptureStage, ShotKind};
pub use config::{
    BrowserConfig, CaptureConfig, Config, InterstitialConfig, NavigationPolicy, OutputConfig,
    Params, SheetConfig, Viewport,
};
pub use outcome::BestEffort;
pub use snapshot::MarketSnapshot;

/// Result type for market-snapshot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading config or running the pipelines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("malformed row: expected {expected} columns, got {got}: {row:?}")]
    MalformedRow {
        expected: usize,
        got: usize,
        row: Vec<String>,
    },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("timeout: {0}")]
    Timeout(String),
}
