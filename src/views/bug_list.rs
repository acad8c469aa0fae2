//! Paginated bug list
//!
//! Pagination is server-side: every page or page-size change issues a new
//! fetch. Status/priority filters and the bug id sort are client-side and
//! only ever look at the page currently loaded.

use super::fetch::{Applied, FetchResult, FetchTicket, FetchTracker};
use crate::api::models::total_pages;
use crate::api::{ApiError, Bug, BugPriority, BugStatus, Page, PageRequest};

pub type BugPageTicket = FetchTicket<PageRequest>;
pub type BugPageResult = FetchResult<PageRequest, Page<Bug>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct BugListState {
    page: u32,
    page_size: u32,
    total_count: u64,
    rows: Vec<Bug>,
    error: Option<String>,
    status_filter: Option<BugStatus>,
    priority_filter: Option<BugPriority>,
    sort: Option<SortOrder>,
    selected: usize,
    tracker: FetchTracker<PageRequest>,
}

impl BugListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
            rows: Vec::new(),
            error: None,
            status_filter: None,
            priority_filter: None,
            sort: None,
            selected: 0,
            tracker: FetchTracker::default(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fetch triggers
    // ─────────────────────────────────────────────────────────────────────

    /// First load: page 1 at the configured page size
    pub fn mount(&mut self) -> BugPageTicket {
        self.request(1, self.page_size)
    }

    /// Reload the current page
    pub fn refresh(&mut self) -> BugPageTicket {
        self.request(self.page, self.page_size)
    }

    /// Jump to `page`; `None` when already there or out of range
    pub fn go_to_page(&mut self, page: u32) -> Option<BugPageTicket> {
        if page == 0 || page == self.page || page > self.total_pages() {
            return None;
        }
        Some(self.request(page, self.page_size))
    }

    pub fn next_page(&mut self) -> Option<BugPageTicket> {
        self.go_to_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> Option<BugPageTicket> {
        self.go_to_page(self.page.saturating_sub(1))
    }

    /// Change the page size, restarting at page 1
    pub fn set_page_size(&mut self, page_size: u32) -> Option<BugPageTicket> {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return None;
        }
        Some(self.request(1, page_size))
    }

    fn request(&mut self, page: u32, page_size: u32) -> BugPageTicket {
        let params = PageRequest::new(page, page_size);
        self.page = params.page;
        self.page_size = params.page_size;
        self.error = None;
        self.tracker.issue(params)
    }

    /// Commit a settled fetch if it is the latest one
    pub fn apply(&mut self, settled: BugPageResult) -> Applied {
        if !self.tracker.accept(&settled.ticket) {
            return Applied::Stale;
        }

        match settled.result {
            Ok(page) => {
                self.page = page.page;
                self.page_size = page.page_size;
                self.total_count = page.count;
                self.rows = page.results;
                self.clamp_selection();
                Applied::Committed
            }
            Err(ApiError::Unauthorized) => {
                self.rows.clear();
                Applied::Unauthorized
            }
            Err(e) => {
                self.rows.clear();
                self.error = Some(e.user_message());
                Applied::Committed
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Client-side filter and sort
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_status_filter(&mut self, status: Option<BugStatus>) {
        self.status_filter = status;
        self.clamp_selection();
    }

    pub fn set_priority_filter(&mut self, priority: Option<BugPriority>) {
        self.priority_filter = priority;
        self.clamp_selection();
    }

    /// All → open → in progress → resolved → closed → all
    pub fn cycle_status_filter(&mut self) {
        let next = cycle(BugStatus::all(), self.status_filter);
        self.set_status_filter(next);
    }

    /// All → low → medium → high → all
    pub fn cycle_priority_filter(&mut self) {
        let next = cycle(BugPriority::all(), self.priority_filter);
        self.set_priority_filter(next);
    }

    /// Unsorted → ascending → descending → unsorted
    pub fn toggle_sort(&mut self) {
        self.sort = match self.sort {
            None => Some(SortOrder::Ascending),
            Some(SortOrder::Ascending) => Some(SortOrder::Descending),
            Some(SortOrder::Descending) => None,
        };
    }

    pub fn clear_filters(&mut self) {
        self.status_filter = None;
        self.priority_filter = None;
        self.sort = None;
        self.clamp_selection();
    }

    /// Rows of the loaded page after filtering and sorting
    pub fn visible_rows(&self) -> Vec<&Bug> {
        let mut rows: Vec<&Bug> = self
            .rows
            .iter()
            .filter(|bug| self.status_filter.map_or(true, |s| bug.status == s))
            .filter(|bug| self.priority_filter.map_or(true, |p| bug.priority == p))
            .collect();

        if let Some(order) = self.sort {
            rows.sort_by(|a, b| {
                let ord = a.bug_id.cmp(&b.bug_id);
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }
        rows
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        let len = self.visible_rows().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_bug(&self) -> Option<&Bug> {
        self.visible_rows().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.tracker.in_flight()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status_filter(&self) -> Option<BugStatus> {
        self.status_filter
    }

    pub fn priority_filter(&self) -> Option<BugPriority> {
        self.priority_filter
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn bug(id: &str, status: BugStatus, priority: BugPriority) -> Bug {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        Bug {
            bug_id: id.to_string(),
            subject: format!("Subject of {id}"),
            description: String::new(),
            status,
            priority,
            created_at: at,
            updated_at: at,
            modified_count: 0,
        }
    }

    /// Server-side pagination over `total` generated bugs
    fn serve(total: u64, request: PageRequest) -> Page<Bug> {
        let start = u64::from(request.page - 1) * u64::from(request.page_size);
        let end = (start + u64::from(request.page_size)).min(total);
        let results = (start..end.max(start))
            .map(|i| bug(&format!("BUG-{:03}", i + 1), BugStatus::Open, BugPriority::Low))
            .collect();
        Page {
            results,
            count: total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    fn settle(state: &mut BugListState, ticket: BugPageTicket, total: u64) -> Applied {
        let page = serve(total, ticket.params);
        state.apply(FetchResult::new(ticket, Ok(page)))
    }

    #[test]
    fn mount_requests_first_page_at_default_size() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        assert_eq!(ticket.params, PageRequest::new(1, 10));
        assert!(state.is_loading());
    }

    #[test]
    fn row_count_matches_page_window() {
        for total in [0u64, 1, 9, 10, 11, 23, 40] {
            for page_size in [1u32, 3, 10, 25] {
                let pages = total_pages(total, page_size);
                for page in 1..=pages {
                    let mut state = BugListState::new(page_size);
                    let ticket = state.mount();
                    settle(&mut state, ticket, total);
                    if page > 1 {
                        let ticket = state.go_to_page(page).unwrap();
                        settle(&mut state, ticket, total);
                    }

                    let remaining = total.saturating_sub(u64::from(page - 1) * u64::from(page_size));
                    let expected = remaining.min(u64::from(page_size)) as usize;
                    let rows = state.visible_rows().len();
                    assert_eq!(rows, expected, "total={total} size={page_size} page={page}");
                    assert!(rows <= page_size as usize);
                }
            }
        }
    }

    #[test]
    fn late_page_two_never_overwrites_page_one() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        settle(&mut state, ticket, 25);

        let page_two = state.go_to_page(2).unwrap();
        let page_one = state.go_to_page(1).unwrap();

        // Page 1 answers first, page 2 straggles in afterwards
        assert_eq!(settle(&mut state, page_one, 25), Applied::Committed);
        assert_eq!(settle(&mut state, page_two, 25), Applied::Stale);

        assert_eq!(state.page(), 1);
        assert_eq!(state.visible_rows()[0].bug_id, "BUG-001");
        assert!(!state.is_loading());
    }

    #[test]
    fn out_of_range_pages_are_ignored() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        settle(&mut state, ticket, 15);

        assert!(state.prev_page().is_none());
        assert!(state.go_to_page(3).is_none());
        assert!(state.next_page().is_some());
    }

    #[test]
    fn page_size_change_restarts_at_first_page() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        settle(&mut state, ticket, 50);
        let ticket = state.go_to_page(3).unwrap();
        settle(&mut state, ticket, 50);

        let ticket = state.set_page_size(20).unwrap();
        assert_eq!(ticket.params, PageRequest::new(1, 20));
        assert!(state.set_page_size(20).is_none());
    }

    #[test]
    fn filters_and_sort_stay_on_current_page() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        let page = Page {
            results: vec![
                bug("BUG-2", BugStatus::Open, BugPriority::High),
                bug("BUG-3", BugStatus::Closed, BugPriority::High),
                bug("BUG-1", BugStatus::Open, BugPriority::Low),
            ],
            count: 30,
            page: 1,
            page_size: 10,
        };
        state.apply(FetchResult::new(ticket, Ok(page)));

        state.set_status_filter(Some(BugStatus::Open));
        assert!(!state.is_loading());
        let ids: Vec<_> = state.visible_rows().iter().map(|b| b.bug_id.as_str()).collect();
        assert_eq!(ids, vec!["BUG-2", "BUG-1"]);

        state.toggle_sort();
        let ids: Vec<_> = state.visible_rows().iter().map(|b| b.bug_id.as_str()).collect();
        assert_eq!(ids, vec!["BUG-1", "BUG-2"]);

        state.toggle_sort();
        state.set_priority_filter(Some(BugPriority::High));
        let ids: Vec<_> = state.visible_rows().iter().map(|b| b.bug_id.as_str()).collect();
        assert_eq!(ids, vec!["BUG-2"]);

        state.clear_filters();
        assert_eq!(state.visible_rows().len(), 3);
    }

    #[test]
    fn filter_cycles_wrap_to_all() {
        let mut state = BugListState::new(10);
        for expected in BugStatus::all() {
            state.cycle_status_filter();
            assert_eq!(state.status_filter(), Some(*expected));
        }
        state.cycle_status_filter();
        assert_eq!(state.status_filter(), None);
    }

    #[test]
    fn selection_is_clamped_when_filter_shrinks_rows() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        settle(&mut state, ticket, 5);
        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.selected_index(), 4);

        state.set_status_filter(Some(BugStatus::Closed));
        assert_eq!(state.selected_index(), 0);
        assert!(state.selected_bug().is_none());
    }

    #[test]
    fn errors_are_surfaced_and_unauthorized_is_flagged() {
        let mut state = BugListState::new(10);
        let ticket = state.mount();
        let applied = state.apply(FetchResult::new(
            ticket,
            Err(ApiError::Http {
                status: 500,
                message: "boom".into(),
            }),
        ));
        assert_eq!(applied, Applied::Committed);
        assert!(state.error().unwrap().contains("500"));

        let ticket = state.refresh();
        assert!(state.error().is_none());
        let applied = state.apply(FetchResult::new(ticket, Err(ApiError::Unauthorized)));
        assert_eq!(applied, Applied::Unauthorized);
    }
}
