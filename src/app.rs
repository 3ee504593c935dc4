//! Application state.
//!
//! `App` owns the two stores (breaking news and Lebanon headlines), the
//! filter criteria, page/selection/input state, and the transient toast.
//! It triggers fetches by minting a store token and enqueueing a request
//! for the fetch worker; outcomes come back through [`App::on_outcome`].
//! Rendering lives in [`crate::ui`], key handling in [`crate::input`].

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::fetch::{FetchRequest, Msg, Outcome, Page};
use crate::filter::{self, FilterCriteria};
use crate::source::item::NewsItem;
use crate::source::Newspapers;
use crate::store::{FetchOp, Store, StoreEvent};

/// How long a refresh toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Whether keystrokes edit the search term or drive navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub page: Page,
    pub breaking: Store<Vec<NewsItem>>,
    pub lebanon: Store<Newspapers>,
    pub criteria: FilterCriteria,
    pub input_mode: InputMode,
    /// List selection state for scrolling, reset on page switch.
    pub list_state: ListState,
    /// Which breaking item the banner currently shows.
    pub banner_index: usize,
    /// Transient notification and when it was raised.
    pub toast: Option<(String, Instant)>,
    pub quit: bool,
    req_tx: Sender<FetchRequest>,
}

impl App {
    pub fn new(req_tx: Sender<FetchRequest>) -> Self {
        Self {
            page: Page::Breaking,
            breaking: Store::new(),
            lebanon: Store::new(),
            criteria: FilterCriteria::default(),
            input_mode: InputMode::Normal,
            list_state: ListState::default(),
            banner_index: 0,
            toast: None,
            quit: false,
            req_tx,
        }
    }

    // -- fetch triggers ------------------------------------------------------

    /// Mint a token on the owning store and enqueue the request.
    pub fn trigger(&mut self, page: Page, op: FetchOp, manual: bool) {
        let token = match page {
            Page::Breaking => self.breaking.begin(op),
            Page::Lebanon => self.lebanon.begin(op),
        };
        // A closed channel means we are shutting down; nothing left to do.
        let _ = self.req_tx.send(FetchRequest {
            page,
            op,
            manual,
            token,
        });
    }

    /// The `r` key: retry as a full load after an error with nothing to
    /// show, otherwise a manual background refresh.
    pub fn refresh_current(&mut self) {
        let (has_error, empty) = match self.page {
            Page::Breaking => {
                let s = self.breaking.state();
                (s.error.is_some(), s.data.is_empty())
            }
            Page::Lebanon => {
                let s = self.lebanon.state();
                (s.error.is_some(), s.data.is_empty())
            }
        };
        if has_error && empty {
            self.trigger(self.page, FetchOp::Load, false);
        } else {
            self.trigger(self.page, FetchOp::Refresh, true);
        }
    }

    /// Dispatch one message from the worker / scheduler channel.
    pub fn on_msg(&mut self, msg: Msg) {
        match msg {
            Msg::Tick(page) => self.trigger(page, FetchOp::Refresh, false),
            Msg::Outcome(outcome) => self.on_outcome(outcome),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) {
        let event = match outcome {
            Outcome::Breaking { token, result } => {
                let event = self.breaking.apply(token, result);
                event.map(|StoreEvent::Refreshed { count }| {
                    format!("تم تحديث الأخبار: تم جلب {count} خبر")
                })
            }
            Outcome::Lebanon { token, result } => {
                let event = self.lebanon.apply(token, result);
                event.map(|StoreEvent::Refreshed { count }| {
                    format!("تم تحديث العناوين: تم جلب {count} عنوان")
                })
            }
        };
        if let Some(message) = event {
            self.toast = Some((message, Instant::now()));
        }
        self.clamp_selection();
    }

    // -- toast / banner ------------------------------------------------------

    pub fn expire_toast(&mut self, now: Instant) {
        if let Some((_, raised)) = &self.toast {
            if now.duration_since(*raised) >= TOAST_TTL {
                self.toast = None;
            }
        }
    }

    /// Items eligible for the rotating breaking banner.
    pub fn banner_items(&self) -> Vec<&NewsItem> {
        self.breaking
            .state()
            .data
            .iter()
            .filter(|item| item.is_breaking)
            .collect()
    }

    pub fn advance_banner(&mut self) {
        let len = self.banner_items().len();
        if len > 0 {
            self.banner_index = (self.banner_index + 1) % len;
        }
    }

    // -- filtering -----------------------------------------------------------

    /// The breaking list after search and category filtering.
    pub fn visible_items(&self) -> Vec<NewsItem> {
        filter::apply(&self.breaking.state().data, &self.criteria)
    }

    pub fn cycle_category(&mut self) {
        self.criteria.category = self.criteria.category.next();
        self.clamp_selection();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.criteria.search_term.push(c);
        self.clamp_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.criteria.search_term.pop();
        self.clamp_selection();
    }

    pub fn cancel_search(&mut self) {
        self.criteria.search_term.clear();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    // -- navigation ----------------------------------------------------------

    pub fn switch_page(&mut self) {
        self.page = match self.page {
            Page::Breaking => Page::Lebanon,
            Page::Lebanon => Page::Breaking,
        };
        self.list_state = ListState::default();
    }

    /// Number of rows the current page renders, for selection clamping.
    pub fn row_count(&self) -> usize {
        match self.page {
            Page::Breaking => self.visible_items().len(),
            // One header row per newspaper, then its headlines (or a single
            // placeholder row when it has none).
            Page::Lebanon => self
                .lebanon
                .state()
                .data
                .0
                .iter()
                .map(|(_, group)| 1 + group.headlines.len().max(1))
                .sum(),
        }
    }

    pub fn select_next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.list_state.select(Some(count - 1));
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        match self.list_state.selected() {
            Some(_) if count == 0 => self.list_state.select(None),
            Some(i) if i >= count => self.list_state.select(Some(count - 1)),
            _ => {}
        }
    }
}
