//! Pagination controller: page state, filter state and the load state machine.
//!
//! Commands never perform I/O. A command that decides more data is needed
//! moves the controller from [`LoadState::Idle`] to [`LoadState::Loading`]
//! and returns the [`FetchPlan`] the caller has to execute; the result goes
//! back in through [`PaginationController::complete`]. The transition is
//! evaluated after every command and every successful completion:
//!
//! - a buffer that has not committed any page yet repeats the initial
//!   load (`Initial`);
//! - a non-default filter over a buffer that is not exhausted needs the
//!   remaining upstream pages (`Remaining`);
//! - otherwise, sitting on the last known page with more upstream data
//!   available loads the next page (`Next`).
//!
//! While loading, further triggers are suppressed. Failed loads are not
//! retried until the next command re-evaluates the transition.

use serde::Serialize;
use tracing::{debug, info};

use super::buffer::{execute_plan, AppendReport, CollectionBuffer, FetchOutcome, FetchPlan};
use super::filter::{FilterState, Filterable, GenderFilter, StatusFilter};
use super::pagination::{clamp_page, compute_visible_pages, page_bounds, total_pages, PageMarker};
use super::{GalleryItem, GalleryResult};
use crate::api::PageSource;

/// Whether a buffer load is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { plan: FetchPlan },
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct GalleryView<T> {
    pub visible_items: Vec<T>,
    pub visible_page_markers: Vec<PageMarker>,
    pub current_page: usize,
    pub total_pages: usize,
    pub is_loading: bool,
    pub filtered_count: usize,
    pub buffered_count: usize,
    pub exhausted: bool,
    pub filter: FilterState,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct PaginationController<T: GalleryItem> {
    buffer: CollectionBuffer<T>,
    filter: FilterState,
    /// Buffer indices passing `filter`, kept in step with appends
    matching: Vec<usize>,
    current_page: usize,
    page_size: usize,
    initial_pages: u32,
    last_error: Option<String>,
}

impl<T: GalleryItem + Filterable> PaginationController<T> {
    /// Create a new controller over an empty buffer
    pub fn new(page_size: usize, initial_pages: u32) -> Self {
        Self {
            buffer: CollectionBuffer::new(),
            filter: FilterState::default(),
            matching: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
            initial_pages: initial_pages.max(1),
            last_error: None,
        }
    }

    pub fn buffer(&self) -> &CollectionBuffer<T> {
        &self.buffer
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filtered_count(&self) -> usize {
        self.matching.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.matching.len(), self.page_size)
    }

    pub fn load_state(&self) -> LoadState {
        match self.buffer.in_flight() {
            Some(plan) => LoadState::Loading { plan },
            None => LoadState::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.buffer.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn visible_pages(&self) -> Vec<PageMarker> {
        compute_visible_pages(self.current_page, self.total_pages())
    }

    /// Items on the current page, in buffer order
    pub fn visible_items(&self) -> impl Iterator<Item = &T> + '_ {
        let bounds = page_bounds(self.current_page, self.page_size, self.matching.len());
        let items = self.buffer.items();
        self.matching[bounds].iter().map(move |&index| &items[index])
    }

    /// Kick off the initial multi-page load
    pub fn start(&mut self) -> Option<FetchPlan> {
        self.begin(FetchPlan::Initial { pages: self.initial_pages })
    }

    /// Go to `page`, clamped into range
    pub fn select_page(&mut self, page: usize) -> Option<FetchPlan> {
        let target = clamp_page(page, self.total_pages());
        if target != self.current_page {
            debug!("page {} -> {}", self.current_page, target);
            self.current_page = target;
        }
        self.evaluate()
    }

    pub fn next_page(&mut self) -> Option<FetchPlan> {
        self.select_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Option<FetchPlan> {
        self.select_page(self.current_page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Option<FetchPlan> {
        self.select_page(1)
    }

    /// Last page currently known; landing there asks for the next upstream page
    pub fn last_page(&mut self) -> Option<FetchPlan> {
        self.select_page(self.total_pages())
    }

    pub fn search(&mut self, term: impl Into<String>) -> Option<FetchPlan> {
        let term = term.into();
        if term == self.filter.search {
            return self.evaluate();
        }
        self.filter.search = term;
        self.filter_changed()
    }

    pub fn set_status(&mut self, status: StatusFilter) -> Option<FetchPlan> {
        if status == self.filter.status {
            return self.evaluate();
        }
        self.filter.status = status;
        self.filter_changed()
    }

    pub fn set_gender(&mut self, gender: GenderFilter) -> Option<FetchPlan> {
        if gender == self.filter.gender {
            return self.evaluate();
        }
        self.filter.gender = gender;
        self.filter_changed()
    }

    /// Replace the whole filter at once
    pub fn set_filter(&mut self, filter: FilterState) -> Option<FetchPlan> {
        if filter == self.filter {
            return self.evaluate();
        }
        self.filter = filter;
        self.filter_changed()
    }

    pub fn clear_filters(&mut self) -> Option<FetchPlan> {
        self.set_filter(FilterState::default())
    }

    /// Commit (or reject) the result of the plan that was in flight.
    ///
    /// A failure is returned to the caller and remembered for display; the
    /// buffer is unchanged and nothing is retried. A success re-evaluates
    /// the load transition and may hand back the next plan.
    pub fn complete(
        &mut self,
        result: GalleryResult<FetchOutcome<T>>,
    ) -> GalleryResult<Option<FetchPlan>> {
        let appended_from = self.buffer.len();
        match self.buffer.finish(result) {
            Ok(report) => {
                self.last_error = None;
                self.extend_matches(appended_from);
                self.log_growth(&report);
                self.current_page = clamp_page(self.current_page, self.total_pages());
                Ok(self.evaluate())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Execute plans against `source` until the controller settles
    pub async fn drive<S>(&mut self, source: &S, mut plan: Option<FetchPlan>) -> GalleryResult<()>
    where
        S: PageSource<T> + ?Sized,
    {
        while let Some(current) = plan {
            let result = execute_plan(source, current).await;
            plan = self.complete(result)?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> GalleryView<T>
    where
        T: Clone,
    {
        GalleryView {
            visible_items: self.visible_items().cloned().collect(),
            visible_page_markers: self.visible_pages(),
            current_page: self.current_page,
            total_pages: self.total_pages(),
            is_loading: self.is_loading(),
            filtered_count: self.filtered_count(),
            buffered_count: self.buffer.len(),
            exhausted: self.buffer.is_exhausted(),
            filter: self.filter.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn filter_changed(&mut self) -> Option<FetchPlan> {
        info!(
            "filter changed: search={:?} status={} gender={}",
            self.filter.search, self.filter.status, self.filter.gender
        );
        self.current_page = 1;
        self.matching.clear();
        self.extend_matches(0);
        self.evaluate()
    }

    /// The Idle -> Loading transition, evaluated after every state update
    fn evaluate(&mut self) -> Option<FetchPlan> {
        if self.buffer.is_loading() {
            return None;
        }

        // Nothing committed yet, e.g. the initial load failed: paging retries it
        let plan = if !self.buffer.has_committed() {
            Some(FetchPlan::Initial { pages: self.initial_pages })
        } else if !self.filter.is_default() {
            self.buffer.plan_remaining()
        } else if self.current_page == self.total_pages() {
            self.buffer.plan_next()
        } else {
            None
        };

        self.begin(plan?)
    }

    fn begin(&mut self, plan: FetchPlan) -> Option<FetchPlan> {
        self.buffer.begin(plan).ok().map(|_| plan)
    }

    fn extend_matches(&mut self, from: usize) {
        let filter = &self.filter;
        let matching = self
            .buffer
            .items()
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(_, item)| filter.matches(*item))
            .map(|(index, _)| index);
        self.matching.extend(matching);
    }

    fn log_growth(&self, report: &AppendReport) {
        debug!(
            "buffer grew by {}: {} matching, {} pages, cursor {:?}",
            report.appended,
            self.matching.len(),
            self.total_pages(),
            report.next_cursor
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Character, MemoryPageSource, PageBatch};
    use crate::gallery::GalleryError;

    const PAGE_SIZE: usize = 15;

    fn roster(count: u64) -> Vec<Character> {
        (1..=count)
            .map(|id| {
                let status = if id % 2 == 0 { "Dead" } else { "Alive" };
                let name = if id % 10 == 0 {
                    format!("Rick #{}", id)
                } else {
                    format!("Morty #{}", id)
                };
                Character::new(id, &name, status, "Male")
            })
            .collect()
    }

    type Controller = PaginationController<Character>;

    async fn started(source: &MemoryPageSource<Character>, initial_pages: u32) -> Controller {
        let mut controller = Controller::new(PAGE_SIZE, initial_pages);
        let plan = controller.start();
        controller.drive(source, plan).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_initial_load() {
        let source = MemoryPageSource::new(roster(200), 20);
        let controller = started(&source, 3).await;

        assert_eq!(controller.buffer().len(), 60);
        assert_eq!(controller.total_pages(), 4);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.load_state(), LoadState::Idle);
        assert_eq!(controller.visible_items().count(), PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_reaching_last_page_loads_exactly_once() {
        // 45 buffered items at 15 per page: three pages
        let source = MemoryPageSource::new(roster(90), 15);
        let mut controller = started(&source, 3).await;
        assert_eq!(controller.total_pages(), 3);
        assert_eq!(source.fetch_count(), 3);

        let plan = controller.select_page(3);
        assert_eq!(plan, Some(FetchPlan::Next { page: 4 }));
        assert_eq!(
            controller.load_state(),
            LoadState::Loading { plan: FetchPlan::Next { page: 4 } }
        );

        // Re-entrant triggers while loading are suppressed
        assert_eq!(controller.select_page(3), None);
        assert_eq!(controller.last_page(), None);

        controller.drive(&source, plan).await.unwrap();
        assert_eq!(source.fetch_count(), 4);
        assert_eq!(controller.total_pages(), 4);
        assert_eq!(controller.current_page(), 3);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_goto_current_page_is_noop_unless_last() {
        let source = MemoryPageSource::new(roster(90), 15);
        let mut controller = started(&source, 3).await;

        assert_eq!(controller.select_page(1), None);
        assert_eq!(controller.select_page(2), None);
        assert_eq!(controller.select_page(2), None);
        assert_eq!(source.fetch_count(), 3);

        assert!(controller.select_page(3).is_some());
    }

    #[tokio::test]
    async fn test_out_of_range_pages_are_clamped() {
        let source = MemoryPageSource::new(roster(45), 15);
        let mut controller = started(&source, 3).await;
        assert!(controller.buffer().is_exhausted());

        assert_eq!(controller.select_page(99), None);
        assert_eq!(controller.current_page(), 3);
        assert_eq!(controller.select_page(0), None);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.previous_page(), None);
        assert_eq!(controller.current_page(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_buffer_never_fetches_at_last_page() {
        let source = MemoryPageSource::new(roster(45), 15);
        let mut controller = started(&source, 3).await;

        assert_eq!(controller.last_page(), None);
        assert_eq!(controller.current_page(), 3);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_search_scans_full_upstream() {
        let source = MemoryPageSource::new(roster(200), 20);
        let mut controller = started(&source, 3).await;
        assert!(!controller.buffer().is_exhausted());

        let plan = controller.search("rick");
        assert_eq!(plan, Some(FetchPlan::Remaining { from: 4 }));
        controller.drive(&source, plan).await.unwrap();

        assert!(controller.buffer().is_exhausted());
        assert_eq!(controller.buffer().len(), 200);
        // Every tenth character is a Rick
        assert_eq!(controller.filtered_count(), 20);
        assert_eq!(controller.total_pages(), 2);
        assert_eq!(controller.current_page(), 1);
        assert!(controller.visible_items().all(|c| c.name.starts_with("Rick")));
    }

    #[tokio::test]
    async fn test_filter_change_resets_page() {
        let source = MemoryPageSource::new(roster(60), 15);
        let mut controller = started(&source, 4).await;
        controller.select_page(3);
        assert_eq!(controller.current_page(), 3);

        assert_eq!(controller.set_status(StatusFilter::Dead), None);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.filtered_count(), 30);
        assert!(controller.visible_items().all(|c| c.status == "Dead"));

        controller.select_page(2);
        assert_eq!(controller.clear_filters(), None);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.filtered_count(), 60);
    }

    #[tokio::test]
    async fn test_empty_result_has_zero_pages() {
        let source = MemoryPageSource::new(roster(30), 15);
        let mut controller = started(&source, 2).await;

        controller.search("nobody by this name");
        assert_eq!(controller.total_pages(), 0);
        assert_eq!(controller.current_page(), 1);
        assert!(controller.visible_pages().is_empty());
        assert_eq!(controller.select_page(5), None);
        assert_eq!(controller.current_page(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_and_not_retried() {
        let source = MemoryPageSource::new(roster(90), 15);
        let mut controller = started(&source, 3).await;

        source.fail_page(4);
        let plan = controller.select_page(3);
        let err = controller.drive(&source, plan).await.unwrap_err();
        assert!(matches!(err, GalleryError::FetchFailed { page: 4, .. }));
        assert_eq!(controller.load_state(), LoadState::Idle);
        assert!(controller.last_error().is_some());
        assert_eq!(controller.buffer().len(), 45);
        assert_eq!(source.fetch_count(), 4);

        // The user paginating again is the retry
        source.heal();
        let plan = controller.select_page(3);
        assert_eq!(plan, Some(FetchPlan::Next { page: 4 }));
        controller.drive(&source, plan).await.unwrap();
        assert!(controller.last_error().is_none());
        assert_eq!(controller.buffer().len(), 60);
    }

    #[tokio::test]
    async fn test_failed_initial_load_is_retried_by_paging() {
        let source = MemoryPageSource::new(roster(90), 15);
        source.fail_page(1);
        let mut controller = Controller::new(PAGE_SIZE, 3);

        let plan = controller.start();
        let err = controller.drive(&source, plan).await.unwrap_err();
        assert!(matches!(err, GalleryError::FetchFailed { page: 1, .. }));
        assert!(controller.buffer().is_empty());
        assert_eq!(controller.total_pages(), 0);
        assert!(controller.last_error().is_some());

        source.heal();
        let plan = controller.next_page();
        assert_eq!(plan, Some(FetchPlan::Initial { pages: 3 }));
        // Suppressed while the retry is in flight
        assert_eq!(controller.previous_page(), None);

        controller.drive(&source, plan).await.unwrap();
        assert_eq!(controller.buffer().len(), 45);
        assert_eq!(controller.total_pages(), 3);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_filter_during_load_scans_after_completion() {
        let source = MemoryPageSource::new(roster(100), 15);
        let mut controller = started(&source, 3).await;

        let next = controller.select_page(3).unwrap();
        // Filtering while the page load is in flight cannot start a second load
        assert_eq!(controller.set_status(StatusFilter::Alive), None);

        let outcome = execute_plan(&source, next).await;
        let follow_up = controller.complete(outcome).unwrap();
        assert_eq!(follow_up, Some(FetchPlan::Remaining { from: 5 }));

        controller.drive(&source, follow_up).await.unwrap();
        assert!(controller.buffer().is_exhausted());
        assert_eq!(controller.filtered_count(), 50);
    }

    #[tokio::test]
    async fn test_single_known_page_requests_next() {
        let mut controller = Controller::new(PAGE_SIZE, 1);
        controller.start();
        let outcome = FetchOutcome {
            plan: FetchPlan::Initial { pages: 1 },
            batches: vec![PageBatch { page: 1, items: roster(15), has_more: true }],
        };
        // One page of 15 items: page 1 is also the last page, so the next page is requested
        let plan = controller.complete(Ok(outcome)).unwrap();
        assert_eq!(plan, Some(FetchPlan::Next { page: 2 }));
    }

    #[tokio::test]
    async fn test_snapshot() {
        let source = MemoryPageSource::new(roster(200), 20);
        let mut controller = started(&source, 3).await;
        controller.select_page(2);

        let view = controller.snapshot();
        assert_eq!(view.current_page, 2);
        assert_eq!(view.total_pages, 4);
        assert_eq!(view.visible_items.first().map(|c| c.id), Some(16));
        assert_eq!(view.visible_page_markers, compute_visible_pages(2, 4));
        assert!(!view.is_loading);
        assert_eq!(view.buffered_count, 60);
        assert!(!view.exhausted);
    }
}
