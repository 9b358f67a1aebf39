// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{
    AppError, Debouncer, Page, PageRequest, PaginatedRepository, PaginationState, QueryKind,
    ScreenKey,
};

/// Detached copy of a list screen, kept while the screen is off-stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot<T> {
    pub state: PaginationState<T>,
    pub search_query: String,
    pub unfiltered: Option<PaginationState<T>>,
    /// Generation at the time of parking; a restored controller continues
    /// past it so requests issued before parking stay stale.
    pub generation: u64,
}

/// Pagination and debounced search for one list screen.
///
/// Every fetch is split in two: a `begin_*` call updates the loading flags
/// and returns a [`PageRequest`]; the caller runs it (inline or on a worker)
/// and hands the outcome to [`ListController::complete`]. Each request
/// carries a generation and only the newest one may change state, so a
/// superseded response is dropped instead of merged.
#[derive(Debug, Clone)]
pub struct ListController<T> {
    screen: ScreenKey,
    state: PaginationState<T>,
    search_query: String,
    page_size: usize,
    debouncer: Debouncer<String>,
    generation: u64,
    last_request: Option<PageRequest>,
    unfiltered: Option<PaginationState<T>>,
    dedupe_key: Option<fn(&T) -> &str>,
}

impl<T: Clone> ListController<T> {
    pub fn new(screen: ScreenKey, page_size: usize, debounce: Duration) -> Self {
        Self {
            screen,
            state: PaginationState::default(),
            search_query: String::new(),
            page_size: page_size.max(1),
            debouncer: Debouncer::new(debounce),
            generation: 0,
            last_request: None,
            unfiltered: None,
            dedupe_key: None,
        }
    }

    /// Drop appended rows whose key is already listed.
    pub fn with_dedupe(mut self, key: fn(&T) -> &str) -> Self {
        self.dedupe_key = Some(key);
        self
    }

    pub const fn screen(&self) -> ScreenKey {
        self.screen
    }

    pub const fn state(&self) -> &PaginationState<T> {
        &self.state
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub const fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn time_until_search(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_until_due(now)
    }

    /// First load for a fresh screen. `None` once anything has been loaded
    /// or attempted.
    pub fn ensure_loaded(&mut self) -> Option<PageRequest> {
        let state = &self.state;
        if !state.items.is_empty()
            || state.is_busy()
            || state.error.is_some()
            || state.has_reached_end
        {
            return None;
        }
        Some(self.begin_load(true))
    }

    pub fn begin_load(&mut self, reset: bool) -> PageRequest {
        if reset {
            self.unfiltered = None;
            self.state.current_search_term.clear();
        }
        self.begin(QueryKind::Listing, reset)
    }

    pub fn begin_search(&mut self, term: impl Into<String>, reset: bool) -> PageRequest {
        let term = term.into().trim().to_owned();
        if reset && !self.state.is_filtered() && self.unfiltered.is_none() {
            self.stash_unfiltered();
        }
        self.state.current_search_term = term.clone();
        self.begin(QueryKind::Search { term }, reset)
    }

    fn begin(&mut self, kind: QueryKind, reset: bool) -> PageRequest {
        self.generation += 1;
        let has_items = !self.state.items.is_empty();
        let searching = matches!(kind, QueryKind::Search { .. });

        // A reset search keeps the current rows on screen under the
        // searching indicator.
        self.state.is_initial_loading = !searching && (reset || !has_items);
        self.state.is_loading_next_page = !reset && has_items;
        self.state.is_searching = reset && searching;
        self.state.error = None;
        self.state.show_retry_button = false;

        let request = PageRequest {
            generation: self.generation,
            kind,
            page_size: self.page_size,
            cursor: if reset {
                None
            } else {
                self.state.end_cursor.clone()
            },
            reset,
        };
        debug!(
            screen = self.screen.as_str(),
            generation = request.generation,
            reset,
            term = request.kind.term().unwrap_or_default(),
            cursor = request.cursor.as_ref().map(|c| c.as_str()).unwrap_or_default(),
            "page request issued"
        );
        self.last_request = Some(request.clone());
        request
    }

    /// Continue the active query from the stored cursor. `None` when there
    /// is nothing more to fetch or another fetch is still running.
    pub fn load_next_page(&mut self) -> Option<PageRequest> {
        if !self.state.can_load_more() || self.state.is_busy() {
            return None;
        }
        if self.state.is_filtered() {
            let term = self.state.current_search_term.clone();
            Some(self.begin_search(term, false))
        } else {
            Some(self.begin_load(false))
        }
    }

    /// Replay the last query after a failure.
    pub fn retry(&mut self) -> PageRequest {
        self.state.show_retry_button = false;
        let failed_reset = self.last_request.as_ref().is_some_and(|req| req.reset);
        // A failed reset clears the cursor, so this also holds after a restore.
        let reset =
            self.state.items.is_empty() || failed_reset || self.state.end_cursor.is_none();
        info!(screen = self.screen.as_str(), reset, "retrying page load");
        if self.state.is_filtered() {
            let term = self.state.current_search_term.clone();
            self.begin_search(term, reset)
        } else {
            self.begin_load(reset)
        }
    }

    /// Record new search input. A non-blank query (re)starts the debounce
    /// window; a blank one cancels it and returns to the unfiltered
    /// listing, which may need a fetch.
    pub fn search_with_debounce(
        &mut self,
        query: impl Into<String>,
        now: Instant,
    ) -> Option<PageRequest> {
        self.search_query = query.into();
        let term = self.search_query.trim();
        if term.is_empty() {
            if let Some(dropped) = self.debouncer.cancel() {
                debug!(screen = self.screen.as_str(), term = %dropped, "pending search cancelled");
            }
            return self.clear_search();
        }
        self.debouncer.schedule(term.to_owned(), now);
        None
    }

    /// Fire the pending search once its window has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<PageRequest> {
        let term = self.debouncer.poll(now)?;
        Some(self.begin_search(term, true))
    }

    fn clear_search(&mut self) -> Option<PageRequest> {
        if let Some(snapshot) = self.unfiltered.take() {
            self.generation += 1;
            self.state = snapshot;
            self.last_request = None;
            debug!(screen = self.screen.as_str(), "restored unfiltered listing");
            return None;
        }
        if !self.state.is_filtered() && !self.state.is_searching {
            return None;
        }
        Some(self.begin_load(true))
    }

    /// Forget the stashed unfiltered listing, so clearing the search
    /// reloads it from the backend.
    pub fn discard_unfiltered(&mut self) {
        self.unfiltered = None;
    }

    fn stash_unfiltered(&mut self) {
        if self.state.items.is_empty() {
            return;
        }
        let mut snapshot = self.state.clone();
        snapshot.is_initial_loading = false;
        snapshot.is_loading_next_page = false;
        snapshot.is_searching = false;
        self.unfiltered = Some(snapshot);
    }

    /// Merge the outcome of `request`. Returns `false` when the request was
    /// superseded and the result was dropped.
    pub fn complete(&mut self, request: &PageRequest, result: Result<Page<T>, AppError>) -> bool {
        if request.generation != self.generation {
            debug!(
                screen = self.screen.as_str(),
                generation = request.generation,
                current = self.generation,
                "dropping superseded page"
            );
            return false;
        }

        self.state.is_initial_loading = false;
        self.state.is_loading_next_page = false;
        self.state.is_searching = false;

        match result {
            Ok(page) => {
                debug!(
                    screen = self.screen.as_str(),
                    items = page.items.len(),
                    has_next_page = page.has_next_page,
                    "page merged"
                );
                self.merge(page.items, request.reset);
                self.state.has_next_page = page.has_next_page;
                self.state.has_reached_end = !page.has_next_page;
                self.state.end_cursor = page.end_cursor;
                self.state.error = None;
                self.state.show_retry_button = false;
                if let QueryKind::Search { term } = &request.kind {
                    self.state.current_search_term = term.clone();
                }
            }
            Err(error) => {
                warn!(screen = self.screen.as_str(), %error, "page fetch failed");
                self.state.error = Some(error.user_message());
                self.state.show_retry_button = true;
                if request.reset {
                    // The rows still belong to the previous query.
                    self.state.end_cursor = None;
                    self.state.has_next_page = false;
                    self.state.has_reached_end = false;
                }
            }
        }
        true
    }

    fn merge(&mut self, items: Vec<T>, reset: bool) {
        if reset {
            self.state.items.clear();
        }
        let Some(key) = self.dedupe_key else {
            self.state.items.extend(items);
            return;
        };
        let mut seen: HashSet<String> = self
            .state
            .items
            .iter()
            .map(|item| key(item).to_owned())
            .collect();
        let before = self.state.items.len();
        let incoming = items.len();
        self.state
            .items
            .extend(items.into_iter().filter(|item| seen.insert(key(item).to_owned())));
        let dropped = incoming - (self.state.items.len() - before);
        if dropped > 0 {
            debug!(screen = self.screen.as_str(), dropped, "skipped duplicate rows");
        }
    }

    /// Run `request` against `repo` on the calling thread.
    pub fn run<R>(&mut self, repo: &R, request: PageRequest) -> bool
    where
        R: PaginatedRepository<T> + ?Sized,
    {
        let result = repo.fetch(&request);
        self.complete(&request, result)
    }

    /// Detach the screen state for later [`ListController::restore`].
    /// Pending debounce input and in-flight requests are abandoned.
    /// The parked query text is the applied term, not unsubmitted input.
    pub fn snapshot(&mut self) -> ListSnapshot<T> {
        self.debouncer.cancel();
        self.generation += 1;
        let (mut state, unfiltered) = self.parked_state();
        state.is_initial_loading = false;
        state.is_loading_next_page = false;
        state.is_searching = false;
        ListSnapshot {
            search_query: state.current_search_term.clone(),
            state,
            unfiltered,
            generation: self.generation,
        }
    }

    /// When a reset is abandoned the rows on screen belong to the previous
    /// query, so they are never parked together with the new term. Falls
    /// back to the stashed listing, or to an empty state that
    /// [`ListController::ensure_loaded`] fetches again.
    fn parked_state(&self) -> (PaginationState<T>, Option<PaginationState<T>>) {
        let resetting =
            self.state.is_busy() && self.last_request.as_ref().is_some_and(|req| req.reset);
        if !resetting {
            return (self.state.clone(), self.unfiltered.clone());
        }
        debug!(screen = self.screen.as_str(), "parking abandons a running reset");
        match &self.unfiltered {
            Some(listing) => (listing.clone(), None),
            None => (PaginationState::default(), None),
        }
    }

    pub fn restore(&mut self, snapshot: ListSnapshot<T>) {
        self.generation = self.generation.max(snapshot.generation) + 1;
        self.debouncer.cancel();
        self.state = snapshot.state;
        self.search_query = snapshot.search_query;
        self.unfiltered = snapshot.unfiltered;
        self.last_request = None;
    }
}
