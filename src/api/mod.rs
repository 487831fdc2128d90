//! Upstream character listing: wire types and page sources

mod client;
mod types;

pub use client::{demo_characters, HttpPageSource, MemoryPageSource, PageSource};
pub use types::{Character, PageBatch};

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::gallery::GalleryResult;

/// Page width of the built-in offline dataset, matching the live API
pub const OFFLINE_PAGE_WIDTH: usize = 20;

/// Build the page source selected by the configuration
pub fn source_from_config(config: &Config) -> GalleryResult<Arc<dyn PageSource<Character>>> {
    if config.offline {
        info!("Using the built-in offline dataset");
        return Ok(Arc::new(MemoryPageSource::new(demo_characters(), OFFLINE_PAGE_WIDTH)));
    }

    info!("Using {}", config.base_url);
    Ok(Arc::new(HttpPageSource::new(config)?))
}
