//! Backend abstraction layer.
//!
//! This module defines the [`NewsBackend`] trait and the wire types shared
//! by the fetch worker and the one-shot CLI modes.  The concrete HTTP client
//! lives in [`api`]; tests substitute stub implementations.
//!
//! ## Adding a new backend
//!
//! 1. Create a new file in this directory.
//! 2. Implement [`NewsBackend`] for your type — it must be [`Send`] because
//!    the fetch worker calls it from a background thread.
//! 3. Construct it in `main.rs` and hand it to `fetch::spawn`.

mod api;
pub mod item;

pub use api::{labeled, labels, ApiError, HttpNewsApi, ALL_CATEGORIES, GENERIC_TRANSPORT_ERROR};
pub use item::{BreakingResponse, HeadlinesResponse, NewsItem, Newspapers, SearchResponse};

/// Trait over the remote news source.
///
/// The refresh variants hit the POST endpoints, which trigger a server-side
/// re-fetch and answer with the same envelope as the corresponding GET.
pub trait NewsBackend: Send {
    fn breaking(&self) -> Result<BreakingResponse, ApiError>;

    fn refresh_breaking(&self) -> Result<BreakingResponse, ApiError>;

    fn headlines(&self) -> Result<HeadlinesResponse, ApiError>;

    fn refresh_headlines(&self) -> Result<HeadlinesResponse, ApiError>;

    fn search(&self, query: &str, category: Option<&str>) -> Result<SearchResponse, ApiError>;
}

impl NewsBackend for HttpNewsApi {
    fn breaking(&self) -> Result<BreakingResponse, ApiError> {
        HttpNewsApi::breaking(self)
    }

    fn refresh_breaking(&self) -> Result<BreakingResponse, ApiError> {
        HttpNewsApi::refresh_breaking(self)
    }

    fn headlines(&self) -> Result<HeadlinesResponse, ApiError> {
        HttpNewsApi::headlines(self)
    }

    fn refresh_headlines(&self) -> Result<HeadlinesResponse, ApiError> {
        HttpNewsApi::refresh_headlines(self)
    }

    fn search(&self, query: &str, category: Option<&str>) -> Result<SearchResponse, ApiError> {
        HttpNewsApi::search(self, query, category)
    }
}
