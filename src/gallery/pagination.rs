//! Pure page arithmetic: page counts, slice bounds and the marker bar.
//!
//! Everything here is a function of its arguments so callers can derive the
//! view after each state change instead of patching it inside handlers.

use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// One entry of the page-number bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageMarker {
    /// A selectable 1-based page number
    Page(usize),
    /// A gap of one or more hidden pages
    Ellipsis,
}

impl PageMarker {
    pub fn page(&self) -> Option<usize> {
        match self {
            Self::Page(page) => Some(*page),
            Self::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{}", page),
            Self::Ellipsis => f.write_str("…"),
        }
    }
}

impl Serialize for PageMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(page) => serializer.serialize_u64(*page as u64),
            Self::Ellipsis => serializer.serialize_str("…"),
        }
    }
}

/// `ceil(filtered_count / page_size)`; zero for an empty set
pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    filtered_count.div_ceil(page_size)
}

/// Clamp a requested page into `[1, max(total, 1)]`
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Slice indices of `page` (1-based) within a list of `len` items
pub fn page_bounds(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Page markers for the bar under the gallery.
///
/// Up to page 3 the bar shows the first pages up to `current + 1` (at most
/// three) followed by the last three pages. Past page 3 it shows `1 2 …`,
/// then `current` and the last three pages, or only the last three when
/// `current` is already among them. Numbers outside `1..=total` are dropped,
/// repeats keep their first position, and an ellipsis only survives where
/// it actually hides pages.
pub fn compute_visible_pages(current: usize, total: usize) -> Vec<PageMarker> {
    if total == 0 {
        return Vec::new();
    }
    let current = clamp_page(current, total);
    let last_three = total.saturating_sub(2)..=total;

    let mut raw = Vec::new();
    if current > 3 {
        raw.extend([PageMarker::Page(1), PageMarker::Page(2), PageMarker::Ellipsis]);
    } else {
        raw.extend((1..=(current + 1).min(3)).map(PageMarker::Page));
    }

    if current > 3 && current + 2 < total {
        raw.push(PageMarker::Page(current));
    }
    raw.extend(last_three.map(PageMarker::Page));

    let mut seen = HashSet::new();
    let numbered: Vec<PageMarker> = raw
        .into_iter()
        .filter(|marker| match marker {
            PageMarker::Page(page) => (1..=total).contains(page) && seen.insert(*page),
            PageMarker::Ellipsis => true,
        })
        .collect();

    drop_empty_gaps(numbered)
}

fn drop_empty_gaps(markers: Vec<PageMarker>) -> Vec<PageMarker> {
    let mut out: Vec<PageMarker> = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        if *marker == PageMarker::Ellipsis {
            let before = out.last().and_then(PageMarker::page);
            let after = markers[i + 1..].iter().find_map(PageMarker::page);
            match (before, after) {
                (Some(before), Some(after)) if after > before + 1 => {}
                _ => continue,
            }
        }
        out.push(*marker);
    }
    out
}
