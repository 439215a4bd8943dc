use anyhow::Result;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use strum::IntoEnumIterator;

use crate::api::ApiService;
use crate::config::AppConfig;
use crate::internal::debounce::Debouncer;
use crate::internal::feed::{
    FeedController, FeedEvent, FetchOutcome, FetchRequest, Merged, ScrollMetrics,
};
use crate::internal::models::{Category, FetchState};
use crate::internal::notification::Notification;
use crate::internal::ui::filter_modal::FilterModal;

use ratatui::Frame;
use ratatui::widgets::ListState;

/// Input modes for the UI.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Search,
    Filters,
}

/// Messages sent through the app action channel.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    ScrollToTop,
    OpenSelected,
    Feed(FeedEvent),
    FetchCompleted(FetchOutcome),
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub config: AppConfig,
    pub api_service: Arc<ApiService>,
    pub feed: FeedController,
    pub input_mode: InputMode,
    pub search_input: String,
    pub search_debouncer: Debouncer<String>,
    pub list_state: ListState,
    /// Rows the results list had available on the last draw.
    pub viewport_rows: u16,
    pub last_scroll: Option<ScrollMetrics>,
    pub filter_modal: FilterModal,
    pub notification: Option<Notification>,
    pub spinner_state: usize,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl App {
    #[tracing::instrument(skip(config))]
    pub fn new(config: AppConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let api_service = Arc::new(ApiService::new(&config.api));
        let feed = FeedController::new(config.feed.min_search_chars);
        let search_debouncer = Debouncer::new(config.feed.debounce());

        tracing::info!(
            endpoint = %config.api.endpoint,
            per_page = config.api.per_page,
            debounce_ms = config.feed.debounce_ms,
            "App initialized"
        );

        let notification = match config.api.key.is_empty() {
            true => Some(Notification::warning(format!(
                "No API key set ({})",
                crate::config::API_KEY_ENV
            ))),
            false => None,
        };

        Self {
            running: true,
            config,
            api_service,
            feed,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_debouncer,
            list_state: ListState::default(),
            viewport_rows: 0,
            last_scroll: None,
            filter_modal: FilterModal::new(),
            notification,
            spinner_state: 0,
            action_tx,
            action_rx,
        }
    }

    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::info(message));
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::error(message));
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        let _ = self.action_tx.send(Action::Feed(FeedEvent::Mounted));

        let mut event_interval = tokio::time::interval(std::time::Duration::from_millis(16));
        let mut spinner_interval = tokio::time::interval(std::time::Duration::from_millis(100));

        loop {
            if let Some(notification) = &self.notification
                && notification.should_dismiss()
            {
                self.notification = None;
            }

            tui.draw(|f| self.ui(f))?;
            self.report_scroll();

            let search_deadline = self.search_debouncer.deadline();

            tokio::select! {
                _ = event_interval.tick() => {
                    if event::poll(std::time::Duration::from_millis(0))?
                        && let Event::Key(key) = event::read()?
                        && key.kind == KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                _ = spinner_interval.tick() => {
                    self.spinner_state = self.spinner_state.wrapping_add(1);
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }
                _ = tokio::time::sleep_until(search_deadline.unwrap_or_else(Instant::now)), if search_deadline.is_some() => {
                    self.flush_search(Instant::now());
                }
            }

            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match self.input_mode {
            InputMode::Search => self.handle_search_input(key),
            InputMode::Filters => self.handle_filter_input(key),
            InputMode::Normal => self.handle_normal_input(key),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                // Run a pending search right away instead of waiting out the debounce
                if let Some(text) = self.search_debouncer.cancel() {
                    self.handle_action(Action::Feed(FeedEvent::SearchChanged(text)));
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear_search();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.search_debouncer.push(self.search_input.clone(), now);
            }
            KeyCode::Backspace => {
                if self.search_input.pop().is_some() {
                    self.search_debouncer.push(self.search_input.clone(), now);
                }
            }
            _ => {}
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter_modal.dismiss();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char('f') => {
                self.filter_modal.close();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char('j') | KeyCode::Down => self.filter_modal.next_section(),
            KeyCode::Char('k') | KeyCode::Up => self.filter_modal.prev_section(),
            KeyCode::Char('l') | KeyCode::Right => self.filter_modal.next_option(),
            KeyCode::Char('h') | KeyCode::Left => self.filter_modal.prev_option(),
            KeyCode::Char(' ') => self.filter_modal.toggle_selected(),
            KeyCode::Enter => {
                let draft = self.filter_modal.take_draft();
                self.input_mode = InputMode::Normal;
                let event = match (
                    &draft == self.feed.state().active_filters(),
                    draft.is_empty(),
                ) {
                    (true, _) => None,
                    // Everything deselected
                    (false, true) => Some(FeedEvent::FiltersReset),
                    (false, false) => Some(FeedEvent::FiltersApplied(draft)),
                };
                if let Some(event) = event {
                    self.handle_action(Action::Feed(event));
                }
            }
            KeyCode::Char('R') => {
                self.filter_modal.dismiss();
                self.input_mode = InputMode::Normal;
                self.handle_action(Action::Feed(FeedEvent::FiltersReset));
            }
            _ => {}
        }
    }

    fn handle_normal_input(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NavigateDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::NavigateUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::ScrollToTop),
            KeyCode::Enter => Some(Action::OpenSelected),
            KeyCode::Char('r') => Some(Action::Feed(FeedEvent::Retry)),
            KeyCode::Tab => Some(Action::Feed(FeedEvent::CategoryChanged(
                self.adjacent_category(true),
            ))),
            KeyCode::BackTab => Some(Action::Feed(FeedEvent::CategoryChanged(
                self.adjacent_category(false),
            ))),
            KeyCode::Char('0') => Some(Action::Feed(FeedEvent::CategoryChanged(None))),
            KeyCode::Char('x') => self
                .feed
                .state()
                .active_filters()
                .keys()
                .next_back()
                .map(|key| Action::Feed(FeedEvent::FilterCleared(key.clone()))),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.search_input = self.feed.state().search_text().to_string();
                None
            }
            KeyCode::Char('f') => {
                self.filter_modal.present(self.feed.state().active_filters());
                self.input_mode = InputMode::Filters;
                None
            }
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    /// Category chip after (or before) the active one; `None` past either end.
    fn adjacent_category(&self, forward: bool) -> Option<Category> {
        let categories: Vec<Category> = Category::iter().collect();
        let current = self
            .feed
            .state()
            .active_category()
            .and_then(|c| categories.iter().position(|&other| other == c));

        match (current, forward) {
            (None, true) => categories.first().copied(),
            (None, false) => categories.last().copied(),
            (Some(i), true) => categories.get(i + 1).copied(),
            (Some(0), false) => None,
            (Some(i), false) => categories.get(i - 1).copied(),
        }
    }

    /// Clear the search box and reset the feed immediately.
    fn clear_search(&mut self) {
        self.search_input.clear();
        self.search_debouncer.cancel();
        self.handle_action(Action::Feed(FeedEvent::SearchChanged(String::new())));
    }

    /// Fire the debounced search if its quiet period is over.
    pub fn flush_search(&mut self, now: Instant) {
        if let Some(text) = self.search_debouncer.poll(now) {
            self.handle_action(Action::Feed(FeedEvent::SearchChanged(text)));
        }
    }

    /// Scroll position of the results list as of the last draw.
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            content_height: self.feed.state().items().len() as f64,
            viewport_height: self.viewport_rows as f64,
            offset: self.list_state.offset() as f64,
        }
    }

    /// Forward the scroll position to the feed when it changed since the last report.
    pub fn report_scroll(&mut self) {
        let metrics = self.scroll_metrics();
        if self.last_scroll != Some(metrics) {
            self.last_scroll = Some(metrics);
            self.handle_action(Action::Feed(FeedEvent::Scrolled(metrics)));
        }
    }

    #[tracing::instrument(skip(self, action))]
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NavigateUp => {
                let selected = self.list_state.selected().unwrap_or(0);
                self.list_state.select(Some(selected.saturating_sub(1)));
            }
            Action::NavigateDown => {
                let len = self.feed.state().items().len();
                if len > 0 {
                    let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                    self.list_state.select(Some(next));
                }
            }
            Action::ScrollToTop => {
                self.list_state = ListState::default();
                if !self.feed.state().items().is_empty() {
                    self.list_state.select(Some(0));
                }
            }
            Action::OpenSelected => {
                let url = self
                    .list_state
                    .selected()
                    .and_then(|i| self.feed.state().items().get(i))
                    .and_then(|hit| hit.page_url.clone());
                if let Some(url) = url
                    && let Err(e) = open::that(&url)
                {
                    tracing::error!(%e, url = %url, "Failed to open browser");
                    self.notify_error(format!("Could not open {}", url));
                }
            }
            Action::Feed(event) => {
                if matches!(event, FeedEvent::CategoryChanged(_)) {
                    // Picking a category clears the search box
                    self.search_input.clear();
                    self.search_debouncer.cancel();
                }
                if let Some(request) = self.feed.handle(event) {
                    if request.params.page == 1 {
                        self.list_state = ListState::default();
                    }
                    self.spawn_fetch(request);
                }
            }
            Action::FetchCompleted(outcome) => match self.feed.apply(outcome) {
                Merged::Replaced(count) => {
                    if count > 0 {
                        self.list_state.select(Some(0));
                    }
                }
                Merged::Appended(0) => self.notify_info("No more results"),
                Merged::Appended(_) | Merged::Discarded => {}
                Merged::Failed => {
                    if let FetchState::Failed(failure) = self.feed.status() {
                        self.notification = Some(Notification::fetch_failed(failure));
                    }
                }
            },
        }
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let api = self.api_service.clone();
        let tx = self.action_tx.clone();

        tracing::debug!(
            seq = request.seq,
            trigger = %request.trigger,
            url = %api.request_for(&request.params),
            "spawning fetch"
        );

        tokio::spawn(async move {
            let result = api.fetch_images(&request.params).await;
            let _ = tx.send(Action::FetchCompleted(request.complete(result)));
        });
    }

    pub fn get_spinner_char(&self) -> &'static str {
        const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
        SPINNER[self.spinner_state % SPINNER.len()]
    }

    pub fn ui(&mut self, f: &mut Frame) {
        super::view::draw(self, f);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
