//! Image feed controller.
//!
//! Owns the feed state (results, page counter, effective query, end-of-list
//! flag) and turns user events into fetch requests. The controller never
//! performs I/O: [`FeedController::handle`] returns the request to run, and the
//! caller feeds the result back through [`FeedController::apply`].
//!
//! Every request carries a sequence number and the query generation it was
//! issued for. A response for an older generation, or one not newer than the
//! last applied response, is discarded, so a slow reply to a superseded query
//! never overwrites the current list.

use strum_macros::Display;

use crate::api::FetchError;
use crate::api::query::RequestParams;
use crate::internal::filters::Filters;
use crate::internal::models::{Category, FetchState, ImageHit};

/// Minimum search length that triggers a fetch when none is configured.
pub const DEFAULT_MIN_SEARCH_CHARS: usize = 3;

/// Scroll position reported by the results view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub content_height: f64,
    pub viewport_height: f64,
    pub offset: f64,
}

impl ScrollMetrics {
    /// Within one unit of the furthest reachable offset.
    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.content_height - self.viewport_height - 1.0
    }
}

/// User-facing events that may change what the feed shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Mounted,
    CategoryChanged(Option<Category>),
    SearchChanged(String),
    FiltersApplied(Filters),
    FiltersReset,
    FilterCleared(String),
    Scrolled(ScrollMetrics),
    Retry,
}

/// What caused a fetch, kept on failures so the UI can say what broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Trigger {
    Mount,
    Category,
    Search,
    Filters,
    #[strum(serialize = "Load more")]
    LoadMore,
    Retry,
}

/// Whether a batch replaces the list or continues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Replace,
    Append,
}

/// A fetch the caller should run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub seq: u64,
    pub generation: u64,
    pub params: RequestParams,
    pub mode: MergeMode,
    pub trigger: Trigger,
}

impl FetchRequest {
    pub fn complete(self, result: Result<Vec<ImageHit>, FetchError>) -> FetchOutcome {
        FetchOutcome {
            request: self,
            result,
        }
    }
}

/// A finished fetch, handed back to [`FeedController::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<Vec<ImageHit>, FetchError>,
}

/// A fetch that failed, with enough context to retry it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub error: FetchError,
    pub trigger: Trigger,
    pub request: FetchRequest,
}

/// What [`FeedController::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merged {
    Replaced(usize),
    Appended(usize),
    Failed,
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    items: Vec<ImageHit>,
    page: u32,
    search_text: String,
    active_category: Option<Category>,
    active_filters: Filters,
    end_reached: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            search_text: String::new(),
            active_category: None,
            active_filters: Filters::new(),
            end_reached: false,
        }
    }
}

impl FeedState {
    pub fn items(&self) -> &[ImageHit] {
        &self.items
    }

    /// Page number of the most recently requested batch.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_category(&self) -> Option<Category> {
        self.active_category
    }

    pub fn active_filters(&self) -> &Filters {
        &self.active_filters
    }

    pub fn end_reached(&self) -> bool {
        self.end_reached
    }
}

pub struct FeedController {
    state: FeedState,
    status: FetchState,
    min_search_chars: usize,
    next_seq: u64,
    generation: u64,
    last_applied: u64,
    exhausted: bool,
    /// Content height when the bottom was last flagged.
    flagged_height: f64,
}

impl FeedController {
    pub fn new(min_search_chars: usize) -> Self {
        Self {
            state: FeedState::default(),
            status: FetchState::Idle,
            min_search_chars,
            next_seq: 1,
            generation: 0,
            last_applied: 0,
            exhausted: false,
            flagged_height: 0.0,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn status(&self) -> &FetchState {
        &self.status
    }

    /// No further pages: the last load-more came back empty.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Parameters for the current effective query at the current page.
    pub fn params(&self) -> RequestParams {
        RequestParams {
            page: self.state.page,
            q: match self.state.search_text.is_empty() {
                true => None,
                false => Some(self.state.search_text.clone()),
            },
            category: self
                .state
                .active_category
                .map(|c| c.as_api_str().to_string()),
            filters: self.state.active_filters.clone(),
        }
    }

    /// Apply a user event. Returns the fetch to run, if the event needs one.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn handle(&mut self, event: FeedEvent) -> Option<FetchRequest> {
        match event {
            FeedEvent::Mounted => {
                self.state = FeedState::default();
                Some(self.restart(Trigger::Mount))
            }
            FeedEvent::CategoryChanged(category) => {
                self.state.active_category = category;
                self.state.search_text.clear();
                Some(self.restart(Trigger::Category))
            }
            FeedEvent::SearchChanged(text) => {
                let len = text.chars().count();
                match (text.is_empty(), len >= self.min_search_chars) {
                    (true, _) => {
                        self.state.search_text.clear();
                        self.state.active_category = None;
                        Some(self.restart(Trigger::Search))
                    }
                    (false, true) => {
                        self.state.search_text = text;
                        self.state.active_category = None;
                        Some(self.restart(Trigger::Search))
                    }
                    (false, false) => {
                        tracing::debug!(len, "search text too short, keeping current results");
                        None
                    }
                }
            }
            FeedEvent::FiltersApplied(filters) => match filters.is_empty() {
                true => None,
                false => {
                    self.state.active_filters = filters;
                    Some(self.restart(Trigger::Filters))
                }
            },
            FeedEvent::FiltersReset => match self.state.active_filters.is_empty() {
                true => None,
                false => {
                    self.state.active_filters.clear();
                    Some(self.restart(Trigger::Filters))
                }
            },
            FeedEvent::FilterCleared(key) => match self.state.active_filters.remove(&key) {
                Some(_) => Some(self.restart(Trigger::Filters)),
                None => None,
            },
            FeedEvent::Scrolled(metrics) => self.on_scroll(metrics),
            FeedEvent::Retry => self.retry(),
        }
    }

    /// Fold a finished fetch into the state.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Merged {
        let FetchOutcome { request, result } = outcome;

        if request.generation != self.generation || request.seq <= self.last_applied {
            tracing::debug!(
                seq = request.seq,
                generation = request.generation,
                current_generation = self.generation,
                last_applied = self.last_applied,
                "discarding stale response"
            );
            return Merged::Discarded;
        }
        self.last_applied = request.seq;

        match result {
            Ok(hits) => {
                let count = hits.len();
                self.status = FetchState::Loaded;
                match request.mode {
                    MergeMode::Replace => {
                        self.state.items = hits;
                        tracing::debug!(count, page = request.params.page, "replaced results");
                        Merged::Replaced(count)
                    }
                    MergeMode::Append => {
                        if count == 0 {
                            self.exhausted = true;
                        }
                        self.state.items.extend(hits);
                        tracing::debug!(count, page = request.params.page, "appended results");
                        Merged::Appended(count)
                    }
                }
            }
            Err(error) => {
                tracing::warn!(%error, trigger = %request.trigger, page = request.params.page, "fetch failed");
                if request.mode == MergeMode::Append {
                    // Keep the counter on the last page that actually arrived
                    self.state.page = request.params.page.saturating_sub(1).max(1);
                }
                self.status = FetchState::Failed(FetchFailure {
                    error,
                    trigger: request.trigger,
                    request,
                });
                Merged::Failed
            }
        }
    }

    /// A list shorter than the viewport sits at the bottom with nothing to
    /// scroll, so the flag also re-arms once new rows arrive below it. Short
    /// lists keep loading until they overflow the view or run out.
    fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<FetchRequest> {
        if self.state.end_reached && metrics.content_height > self.flagged_height {
            self.state.end_reached = false;
        }

        if !metrics.is_at_bottom() {
            if self.state.end_reached {
                self.state.end_reached = false;
            }
            return None;
        }

        if self.state.end_reached
            || self.status.is_fetching()
            || self.state.items.is_empty()
            || self.exhausted
        {
            return None;
        }

        self.state.end_reached = true;
        self.flagged_height = metrics.content_height;
        self.state.page += 1;
        tracing::debug!(page = self.state.page, "reached the bottom, loading more");
        Some(self.issue(MergeMode::Append, Trigger::LoadMore))
    }

    fn retry(&mut self) -> Option<FetchRequest> {
        let FetchState::Failed(failure) = &self.status else {
            return None;
        };
        let failed = failure.request.clone();

        self.state.page = failed.params.page;
        let request = FetchRequest {
            seq: self.take_seq(),
            generation: self.generation,
            params: failed.params,
            mode: failed.mode,
            trigger: Trigger::Retry,
        };
        self.status = FetchState::Fetching;
        tracing::info!(seq = request.seq, page = request.params.page, "retrying fetch");
        Some(request)
    }

    /// New effective query: back to page 1 with an empty list.
    fn restart(&mut self, trigger: Trigger) -> FetchRequest {
        self.generation += 1;
        self.state.page = 1;
        self.state.items.clear();
        self.state.end_reached = false;
        self.exhausted = false;
        self.issue(MergeMode::Replace, trigger)
    }

    fn issue(&mut self, mode: MergeMode, trigger: Trigger) -> FetchRequest {
        self.status = FetchState::Fetching;
        FetchRequest {
            seq: self.take_seq(),
            generation: self.generation,
            params: self.params(),
            mode,
            trigger,
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SEARCH_CHARS)
    }
}
