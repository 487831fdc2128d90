//! Gallery core: collection buffer, filter state and the pagination controller.
//!
//! The buffer owns everything fetched so far and the upstream cursor; the
//! controller derives pages from the filtered view of the buffer and
//! decides when the buffer has to grow.

pub mod buffer;
pub mod controller;
pub mod episodes;
pub mod error;
pub mod filter;
pub mod pagination;

pub use buffer::{execute_plan, FetchOutcome, FetchPlan};
pub use controller::{GalleryView, LoadState, PaginationController};
pub use episodes::{episode_label, format_episode_ranges};
pub use error::{GalleryError, GalleryResult};
pub use filter::{status_label, FilterState, Filterable, GenderFilter, StatusFilter};
pub use pagination::{compute_visible_pages, PageMarker};

/// Base trait for items held in a [`CollectionBuffer`]
pub trait GalleryItem {
    /// Stable unique identifier
    fn id(&self) -> u64;
}

