//! Collection buffer: every item fetched so far plus the upstream cursor.
//!
//! Fetching is split into a plan ([`FetchPlan`]), its execution against a
//! [`PageSource`] ([`execute_plan`]) and the commit of the result
//! ([`CollectionBuffer::finish`]). That lets the interactive front end run
//! the network part on a background task while the buffer itself is only
//! ever mutated by the owner that receives the completion. The inline
//! `load_*` helpers chain the three steps for callers that can simply await.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use super::{GalleryError, GalleryItem, GalleryResult};
use crate::api::{PageBatch, PageSource};

/// What a single load will fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchPlan {
    /// Pages `1..=pages`, stopping early if upstream runs out
    Initial { pages: u32 },
    /// Exactly the page at the cursor
    Next { page: u32 },
    /// Every page from `from` until upstream signals exhaustion
    Remaining { from: u32 },
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial { pages } => write!(f, "initial load of {} pages", pages),
            Self::Next { page } => write!(f, "page {}", page),
            Self::Remaining { from } => write!(f, "full scan from page {}", from),
        }
    }
}

/// Result of executing a plan; nothing is committed until it is applied
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub plan: FetchPlan,
    pub batches: Vec<PageBatch<T>>,
}

impl<T> FetchOutcome<T> {
    fn last_batch(&self) -> Option<&PageBatch<T>> {
        self.batches.last()
    }
}

/// Summary of one committed load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppendReport {
    pub appended: usize,
    pub duplicates_skipped: usize,
    pub next_cursor: Option<u32>,
}

/// Fetch everything `plan` asks for.
///
/// Pages are fetched strictly one after another. The first failure aborts
/// the whole plan and the batches fetched so far are dropped, so a caller
/// that applies only successful outcomes never sees a partial load.
pub async fn execute_plan<T, S>(source: &S, plan: FetchPlan) -> GalleryResult<FetchOutcome<T>>
where
    S: PageSource<T> + ?Sized,
{
    let mut batches = Vec::new();

    match plan {
        FetchPlan::Initial { pages } => {
            for page in 1..=pages {
                let batch = source.fetch_page(page).await?;
                debug!("{}: page {} -> {} items", source.name(), page, batch.items.len());
                let has_more = batch.has_more;
                batches.push(batch);
                if !has_more {
                    break;
                }
            }
        }
        FetchPlan::Next { page } => {
            let batch = source.fetch_page(page).await?;
            debug!("{}: page {} -> {} items", source.name(), page, batch.items.len());
            batches.push(batch);
        }
        FetchPlan::Remaining { from } => {
            let mut page = from;
            loop {
                let batch = source.fetch_page(page).await?;
                debug!("{}: page {} -> {} items", source.name(), page, batch.items.len());
                let has_more = batch.has_more;
                batches.push(batch);
                if !has_more {
                    break;
                }
                page += 1;
            }
        }
    }

    Ok(FetchOutcome { plan, batches })
}

/// Append-only, id-unique item store with the cursor for the next upstream page
#[derive(Debug)]
pub struct CollectionBuffer<T: GalleryItem> {
    items: Vec<T>,
    ids: HashSet<u64>,
    /// `None` only once upstream has signalled exhaustion
    next_cursor: Option<u32>,
    /// Highest upstream page committed so far
    highest_page: u32,
    in_flight: Option<FetchPlan>,
}

impl<T: GalleryItem> CollectionBuffer<T> {
    /// Create an empty buffer whose cursor points at page 1
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
            next_cursor: Some(1),
            highest_page: 0,
            in_flight: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// At least one upstream page has been committed
    pub fn has_committed(&self) -> bool {
        self.highest_page > 0
    }

    pub fn next_cursor(&self) -> Option<u32> {
        self.next_cursor
    }

    /// Upstream has no more pages
    pub fn is_exhausted(&self) -> bool {
        self.next_cursor.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<FetchPlan> {
        self.in_flight
    }

    /// Plan for the page at the cursor, or `None` when exhausted
    pub fn plan_next(&self) -> Option<FetchPlan> {
        self.next_cursor.map(|page| FetchPlan::Next { page })
    }

    /// Plan for every page not yet buffered, or `None` when exhausted
    pub fn plan_remaining(&self) -> Option<FetchPlan> {
        self.next_cursor.map(|from| FetchPlan::Remaining { from })
    }

    /// Mark `plan` as in flight. Only one load may be in flight at a time.
    pub fn begin(&mut self, plan: FetchPlan) -> GalleryResult<()> {
        if let Some(current) = self.in_flight {
            debug!("ignoring {} while {} is in flight", plan, current);
            return Err(GalleryError::Busy);
        }
        debug!("starting {}", plan);
        self.in_flight = Some(plan);
        Ok(())
    }

    /// Clear the in-flight marker and commit a successful outcome.
    ///
    /// On failure the items and the cursor are left exactly as they were.
    pub fn finish(
        &mut self,
        result: GalleryResult<FetchOutcome<T>>,
    ) -> GalleryResult<AppendReport> {
        let plan = self.in_flight.take();
        match result {
            Ok(outcome) => Ok(self.apply(outcome)),
            Err(e) => {
                match plan {
                    Some(plan) => warn!("{} failed: {}", plan, e),
                    None => warn!("load failed: {}", e),
                }
                Err(e)
            }
        }
    }

    /// Append every batch of `outcome`, skipping ids already present
    pub fn apply(&mut self, outcome: FetchOutcome<T>) -> AppendReport {
        let mut report = AppendReport::default();

        let last = outcome.last_batch().map(|batch| (batch.page, batch.has_more));
        if let Some((page, has_more)) = last {
            // An outcome older than what is already committed must not move the cursor back.
            if page >= self.highest_page {
                self.highest_page = page;
                self.next_cursor = if has_more { Some(page + 1) } else { None };
            }
        }

        for batch in outcome.batches {
            for item in batch.items {
                if self.ids.insert(item.id()) {
                    self.items.push(item);
                    report.appended += 1;
                } else {
                    report.duplicates_skipped += 1;
                }
            }
        }

        report.next_cursor = self.next_cursor;
        info!(
            "{}: appended {} items ({} duplicates skipped), {} buffered, next cursor {:?}",
            outcome.plan,
            report.appended,
            report.duplicates_skipped,
            self.items.len(),
            self.next_cursor
        );
        report
    }

    /// Fetch pages `1..=pages` and commit them together.
    ///
    /// This and the other `load_*` helpers are for owners that can simply
    /// await the fetch. The controller splits the same steps so its callers
    /// can run the fetch elsewhere.
    pub async fn load_initial<S>(&mut self, source: &S, pages: u32) -> GalleryResult<AppendReport>
    where
        S: PageSource<T> + ?Sized,
    {
        self.run(source, FetchPlan::Initial { pages }).await
    }

    /// Fetch the page at the cursor. `Ok(None)` when exhausted or already loading.
    pub async fn load_next<S>(&mut self, source: &S) -> GalleryResult<Option<AppendReport>>
    where
        S: PageSource<T> + ?Sized,
    {
        match self.plan_next() {
            Some(plan) if !self.is_loading() => self.run(source, plan).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Fetch every remaining page. `Ok(None)` when exhausted or already loading.
    pub async fn load_all<S>(&mut self, source: &S) -> GalleryResult<Option<AppendReport>>
    where
        S: PageSource<T> + ?Sized,
    {
        match self.plan_remaining() {
            Some(plan) if !self.is_loading() => self.run(source, plan).await.map(Some),
            _ => Ok(None),
        }
    }

    async fn run<S>(&mut self, source: &S, plan: FetchPlan) -> GalleryResult<AppendReport>
    where
        S: PageSource<T> + ?Sized,
    {
        self.begin(plan)?;
        let result = execute_plan(source, plan).await;
        self.finish(result)
    }
}

impl<T: GalleryItem> Default for CollectionBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Character, MemoryPageSource};

    fn characters(count: u64) -> Vec<Character> {
        (1..=count)
            .map(|id| Character::new(id, &format!("Character {}", id), "Alive", "Male"))
            .collect()
    }

    fn assert_unique_ids(buffer: &CollectionBuffer<Character>) {
        let ids: HashSet<u64> = buffer.items().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), buffer.len());
    }

    #[tokio::test]
    async fn test_load_initial_sets_cursor() {
        let source = MemoryPageSource::new(characters(100), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();

        let report = buffer.load_initial(&source, 3).await.unwrap();
        assert_eq!(report.appended, 60);
        assert_eq!(buffer.len(), 60);
        assert_eq!(buffer.next_cursor(), Some(4));
        assert!(!buffer.is_loading());
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_load_initial_stops_at_exhaustion() {
        let source = MemoryPageSource::new(characters(30), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();

        buffer.load_initial(&source, 3).await.unwrap();
        assert_eq!(buffer.len(), 30);
        assert!(buffer.is_exhausted());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_load_initial_failure_leaves_buffer_untouched() {
        let source = MemoryPageSource::new(characters(100), 20);
        source.fail_page(2);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();

        let err = buffer.load_initial(&source, 3).await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(buffer.is_empty());
        assert_eq!(buffer.next_cursor(), Some(1));
        assert!(!buffer.is_loading());
    }

    #[tokio::test]
    async fn test_load_next_advances_and_exhausts() {
        let source = MemoryPageSource::new(characters(50), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        buffer.load_initial(&source, 1).await.unwrap();

        let report = buffer.load_next(&source).await.unwrap().unwrap();
        assert_eq!(report.appended, 20);
        assert_eq!(report.next_cursor, Some(3));

        let report = buffer.load_next(&source).await.unwrap().unwrap();
        assert_eq!(report.appended, 10);
        assert_eq!(report.next_cursor, None);

        // Exhausted: no-op, no fetch
        let fetches = source.fetch_count();
        assert!(buffer.load_next(&source).await.unwrap().is_none());
        assert_eq!(source.fetch_count(), fetches);
        assert_unique_ids(&buffer);
    }

    #[tokio::test]
    async fn test_load_next_failure_keeps_cursor() {
        let source = MemoryPageSource::new(characters(60), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        buffer.load_initial(&source, 1).await.unwrap();

        source.fail_page(2);
        assert!(buffer.load_next(&source).await.is_err());
        assert_eq!(buffer.len(), 20);
        assert_eq!(buffer.next_cursor(), Some(2));

        source.heal();
        buffer.load_next(&source).await.unwrap();
        assert_eq!(buffer.len(), 40);
    }

    #[tokio::test]
    async fn test_load_all_fetches_only_missing_pages() {
        let source = MemoryPageSource::new(characters(95), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        buffer.load_initial(&source, 2).await.unwrap();

        let report = buffer.load_all(&source).await.unwrap().unwrap();
        assert_eq!(report.appended, 55);
        assert!(buffer.is_exhausted());
        assert_eq!(buffer.len(), 95);
        assert_eq!(source.fetch_count(), 5);
        assert_unique_ids(&buffer);

        assert!(buffer.load_all(&source).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reentrant_load_is_ignored() {
        let source = MemoryPageSource::new(characters(60), 20);
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        buffer.begin(FetchPlan::Next { page: 1 }).unwrap();

        assert!(matches!(buffer.begin(FetchPlan::Next { page: 1 }), Err(GalleryError::Busy)));
        assert!(buffer.load_next(&source).await.unwrap().is_none());
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn test_overlapping_batches_never_duplicate() {
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        let all = characters(6);

        buffer.apply(FetchOutcome {
            plan: FetchPlan::Next { page: 1 },
            batches: vec![PageBatch { page: 1, items: all[..4].to_vec(), has_more: true }],
        });
        let report = buffer.apply(FetchOutcome {
            plan: FetchPlan::Next { page: 2 },
            batches: vec![PageBatch { page: 2, items: all[2..].to_vec(), has_more: false }],
        });

        assert_eq!(report.appended, 2);
        assert_eq!(report.duplicates_skipped, 2);
        assert_eq!(buffer.items().iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert!(buffer.is_exhausted());
    }

    #[test]
    fn test_stale_outcome_does_not_rewind_cursor() {
        let mut buffer: CollectionBuffer<Character> = CollectionBuffer::new();
        let all = characters(4);

        buffer.apply(FetchOutcome {
            plan: FetchPlan::Remaining { from: 1 },
            batches: vec![
                PageBatch { page: 1, items: all[..2].to_vec(), has_more: true },
                PageBatch { page: 2, items: all[2..].to_vec(), has_more: false },
            ],
        });
        buffer.apply(FetchOutcome {
            plan: FetchPlan::Next { page: 1 },
            batches: vec![PageBatch { page: 1, items: all[..2].to_vec(), has_more: true }],
        });

        assert!(buffer.is_exhausted());
        assert_eq!(buffer.len(), 4);
    }
}
