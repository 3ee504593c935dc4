//! Fetch-state bookkeeping for one news collection.
//!
//! [`Store`] is the single authoritative holder of a fetched collection and
//! its status flags.  It performs no IO itself: callers mint a token with
//! [`Store::begin`], hand it to the fetch worker, and feed the worker's
//! eventual outcome back through [`Store::apply`].
//!
//! Tokens fence overlapping fetches.  Every `begin` invalidates all earlier
//! tokens, so when a manual refresh fires while a scheduled one is still in
//! flight, whichever response belongs to the newest trigger wins and the
//! stale response is discarded instead of racing last-write-wins.

use chrono::{DateTime, Utc};

/// Identifies one fetch attempt.  Only the most recently issued token is
/// accepted by [`Store::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// How a fetch was triggered, which decides the visible status flag.
///
/// `Load` covers the initial load and the post-error retry (full loading
/// view); `Refresh` covers manual and scheduled refreshes (background, the
/// current data stays on screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOp {
    #[default]
    Load,
    Refresh,
}

/// The collection plus its fetch status, replaced wholesale on success and
/// kept as stale-but-usable data on failure.
#[derive(Debug, Clone, Default)]
pub struct FetchState<T> {
    pub data: T,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A successfully fetched collection, as produced by the fetch worker.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    /// Item count reported to the refresh toast.
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Side-effects the UI should surface after applying an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A background refresh landed a non-empty collection.
    Refreshed { count: usize },
}

#[derive(Debug, Default)]
pub struct Store<T: Default> {
    state: FetchState<T>,
    latest: u64,
    latest_op: FetchOp,
}

impl<T: Default> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Start a fetch attempt: clear any previous error, raise the status
    /// flag for `op`, and mint the token the response must carry.
    pub fn begin(&mut self, op: FetchOp) -> FetchToken {
        self.state.error = None;
        match op {
            FetchOp::Load => self.state.is_loading = true,
            FetchOp::Refresh => self.state.is_refreshing = true,
        }
        self.latest += 1;
        self.latest_op = op;
        FetchToken(self.latest)
    }

    /// Apply a fetch outcome.
    ///
    /// Outcomes carrying a superseded token are dropped without touching any
    /// state — the newer in-flight fetch owns the flags now.  For the latest
    /// token the flags always reset, success or failure: the worker sends
    /// exactly one outcome per request, making this the release point.
    pub fn apply(
        &mut self,
        token: FetchToken,
        outcome: Result<Fetched<T>, String>,
    ) -> Option<StoreEvent> {
        if token.0 != self.latest {
            return None;
        }
        let background = self.latest_op == FetchOp::Refresh;
        self.state.is_loading = false;
        self.state.is_refreshing = false;
        match outcome {
            Ok(fetched) => {
                self.state.data = fetched.data;
                self.state.last_updated = fetched.last_updated;
                self.state.error = None;
                if background && fetched.count > 0 {
                    Some(StoreEvent::Refreshed {
                        count: fetched.count,
                    })
                } else {
                    None
                }
            }
            Err(message) => {
                // Prior data stays on screen as stale-but-usable.
                self.state.error = Some(message);
                None
            }
        }
    }
}
