pub mod params;
pub mod schema;

pub use params::Params;
pub use schema::{
    BrowserConfig, CaptureConfig, Config, InterstitialConfig, NavigationPolicy, OutputConfig,
    SheetConfig, Viewport,
};
