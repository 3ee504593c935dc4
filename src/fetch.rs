//! Background fetch worker.
//!
//! Bridges the UI thread and the blocking HTTP client: the UI enqueues
//! [`FetchRequest`]s, a dedicated thread performs the call, and exactly one
//! [`Msg::Outcome`] comes back per request — success or failure — carrying
//! the token the store uses to fence stale responses.  Errors never escape
//! the worker; they are labeled per operation and delivered as messages.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::source::item::NewsItem;
use crate::source::{labeled, labels, NewsBackend, Newspapers};
use crate::store::{FetchOp, FetchToken, Fetched};

/// Which view a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Breaking,
    Lebanon,
}

/// One unit of work for the fetch thread.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest {
    pub page: Page,
    pub op: FetchOp,
    /// Manual refreshes go through the POST refresh endpoints (which kick a
    /// server-side re-fetch); loads and scheduled refreshes plain GET.
    pub manual: bool,
    pub token: FetchToken,
}

/// A completed fetch, routed back to the owning store by page.
#[derive(Debug)]
pub enum Outcome {
    Breaking {
        token: FetchToken,
        result: Result<Fetched<Vec<NewsItem>>, String>,
    },
    Lebanon {
        token: FetchToken,
        result: Result<Fetched<Newspapers>, String>,
    },
}

/// Messages delivered to the UI loop, from the worker and the schedulers.
#[derive(Debug)]
pub enum Msg {
    /// A refresh interval elapsed for this page.
    Tick(Page),
    Outcome(Outcome),
}

/// Spawn the fetch thread.  It runs until the request sender is dropped, or
/// until the UI side hangs up and an outcome can no longer be delivered.
pub fn spawn(
    backend: Box<dyn NewsBackend>,
    req_rx: Receiver<FetchRequest>,
    msg_tx: Sender<Msg>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            debug!(?req.page, ?req.op, manual = req.manual, "fetch");
            let outcome = run(backend.as_ref(), &req);
            if msg_tx.send(Msg::Outcome(outcome)).is_err() {
                return;
            }
        }
    })
}

fn run(backend: &dyn NewsBackend, req: &FetchRequest) -> Outcome {
    match req.page {
        Page::Breaking => {
            let label = match req.op {
                FetchOp::Refresh => labels::REFRESH_BREAKING,
                FetchOp::Load => labels::BREAKING,
            };
            let call = if req.manual {
                backend.refresh_breaking()
            } else {
                backend.breaking()
            };
            let result = call
                .map(|resp| Fetched {
                    count: resp.breaking_news.len(),
                    data: resp.breaking_news,
                    last_updated: resp.last_updated,
                })
                .map_err(|e| {
                    warn!(error = %e, "breaking news fetch failed");
                    labeled(label, &e)
                });
            Outcome::Breaking {
                token: req.token,
                result,
            }
        }
        Page::Lebanon => {
            let label = match req.op {
                FetchOp::Refresh => labels::REFRESH_HEADLINES,
                FetchOp::Load => labels::HEADLINES,
            };
            let call = if req.manual {
                backend.refresh_headlines()
            } else {
                backend.headlines()
            };
            let result = call
                .map(|resp| {
                    let count = if resp.total_headlines > 0 {
                        resp.total_headlines
                    } else {
                        resp.newspapers.headline_count()
                    };
                    Fetched {
                        count,
                        data: resp.newspapers,
                        last_updated: resp.last_updated,
                    }
                })
                .map_err(|e| {
                    warn!(error = %e, "lebanon headlines fetch failed");
                    labeled(label, &e)
                });
            Outcome::Lebanon {
                token: req.token,
                result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        ApiError, BreakingResponse, HeadlinesResponse, SearchResponse,
    };
    use crate::store::Store;
    use std::sync::mpsc;

    /// Backend stub: breaking succeeds with canned items, lebanon fails.
    struct StubBackend;

    fn canned_item(title: &str) -> NewsItem {
        serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
    }

    impl NewsBackend for StubBackend {
        fn breaking(&self) -> Result<BreakingResponse, ApiError> {
            Ok(BreakingResponse {
                breaking_news: vec![canned_item("خبر أول"), canned_item("خبر ثان")],
                count: 2,
                last_updated: None,
            })
        }

        fn refresh_breaking(&self) -> Result<BreakingResponse, ApiError> {
            self.breaking()
        }

        fn headlines(&self) -> Result<HeadlinesResponse, ApiError> {
            Err(ApiError::Server {
                status: 500,
                detail: Some("خطأ في جلب عناوين الصحف اللبنانية".to_string()),
            })
        }

        fn refresh_headlines(&self) -> Result<HeadlinesResponse, ApiError> {
            self.headlines()
        }

        fn search(&self, _query: &str, _category: Option<&str>) -> Result<SearchResponse, ApiError> {
            Ok(SearchResponse::default())
        }
    }

    #[test]
    fn worker_delivers_one_outcome_per_request() {
        let (req_tx, req_rx) = mpsc::channel();
        let (msg_tx, msg_rx) = mpsc::channel();
        let worker = spawn(Box::new(StubBackend), req_rx, msg_tx);

        let mut store: Store<Vec<NewsItem>> = Store::new();
        let token = store.begin(FetchOp::Load);
        req_tx
            .send(FetchRequest {
                page: Page::Breaking,
                op: FetchOp::Load,
                manual: false,
                token,
            })
            .unwrap();

        match msg_rx.recv().unwrap() {
            Msg::Outcome(Outcome::Breaking { token: t, result }) => {
                store.apply(t, result);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(store.state().data.len(), 2);
        assert!(!store.state().is_loading);

        drop(req_tx);
        worker.join().unwrap();
    }

    #[test]
    fn failed_fetch_carries_labeled_message() {
        let (req_tx, req_rx) = mpsc::channel();
        let (msg_tx, msg_rx) = mpsc::channel();
        let worker = spawn(Box::new(StubBackend), req_rx, msg_tx);

        let mut store: Store<Newspapers> = Store::new();
        let token = store.begin(FetchOp::Refresh);
        req_tx
            .send(FetchRequest {
                page: Page::Lebanon,
                op: FetchOp::Refresh,
                manual: true,
                token,
            })
            .unwrap();

        match msg_rx.recv().unwrap() {
            Msg::Outcome(Outcome::Lebanon { token: t, result }) => {
                assert_eq!(
                    result.as_ref().err().map(String::as_str),
                    Some("فشل في تحديث العناوين: خطأ في جلب عناوين الصحف اللبنانية")
                );
                store.apply(t, result);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(store.state().error.is_some());
        assert!(store.state().data.is_empty());

        drop(req_tx);
        worker.join().unwrap();
    }

    #[test]
    fn worker_exits_when_request_channel_closes() {
        let (req_tx, req_rx) = mpsc::channel::<FetchRequest>();
        let (msg_tx, _msg_rx) = mpsc::channel();
        let worker = spawn(Box::new(StubBackend), req_rx, msg_tx);
        drop(req_tx);
        worker.join().unwrap();
    }
}
