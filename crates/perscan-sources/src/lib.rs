//! Review fetchers for each supported platform and the scan orchestration that
//! runs them concurrently.
//!
//! Every fetcher implements [`ReviewSource`] and turns its failures into an
//! error `SourceResult`, so a scan always yields one result per request.

pub mod app_store;
pub mod error;
pub mod google_play;
pub mod product_hunt;
pub mod reddit;
pub mod registry;
pub mod scan;
pub mod source;
pub mod youtube;

mod http;

pub use app_store::AppStoreSource;
pub use error::SourceError;
pub use google_play::GooglePlaySource;
pub use product_hunt::ProductHuntSource;
pub use reddit::RedditSource;
pub use registry::SourceRegistry;
pub use scan::{
    PlatformError, PlatformScan, ScanReport, Scanner, SourceRequest, COMBINED_KEYWORD_LIMIT,
    PLATFORM_KEYWORD_LIMIT,
};
pub use source::ReviewSource;
pub use youtube::YouTubeSource;
