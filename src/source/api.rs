//! Blocking HTTP client for the news backend.
//!
//! Wraps `reqwest::blocking` with the error taxonomy the UI needs: transport
//! failures collapse to a generic Arabic message, non-2xx responses surface
//! the backend's structured `detail` message, and sparse success payloads
//! deserialize through the defaults in [`super::item`].

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::item::{BreakingResponse, HeadlinesResponse, SearchResponse};

/// Shown whenever the backend cannot be reached at all.
pub const GENERIC_TRANSPORT_ERROR: &str = "تعذر الاتصال بالخادم";

/// Sentinel category meaning "no category restriction"; never sent on the
/// wire, matching the original client which drops it from the query string.
pub const ALL_CATEGORIES: &str = "الكل";

/// Operation labels prefixed onto error details, one per user-visible
/// operation, exactly as the original client words them.
pub mod labels {
    pub const BREAKING: &str = "فشل في جلب الأخبار العاجلة";
    pub const REFRESH_BREAKING: &str = "فشل في تحديث الأخبار";
    pub const SEARCH: &str = "فشل في البحث";
    pub const HEADLINES: &str = "فشل في جلب عناوين الصحف اللبنانية";
    pub const REFRESH_HEADLINES: &str = "فشل في تحديث العناوين";
}

/// Compose the user-facing message for a failed operation.
pub fn labeled(label: &str, err: &ApiError) -> String {
    format!("{label}: {err}")
}

/// What went wrong talking to the backend.
#[derive(Debug)]
pub enum ApiError {
    /// Unreachable host, timeout, or an unreadable body.
    Network(reqwest::Error),
    /// Non-2xx response, with the backend's `detail` message when present.
    Server { status: u16, detail: Option<String> },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(_) => f.write_str(GENERIC_TRANSPORT_ERROR),
            ApiError::Server { status, detail } => match detail {
                Some(detail) => f.write_str(detail),
                None => write!(f, "خطأ في الخادم ({status})"),
            },
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            ApiError::Server { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

/// Client for the breaking-news / Lebanon-headlines API.
pub struct HttpNewsApi {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpNewsApi {
    /// Build a client against `base` (e.g. `http://localhost:8000/api`),
    /// with the 30-second request timeout the original client used.
    pub fn new(base: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn breaking(&self) -> Result<BreakingResponse, ApiError> {
        self.get("/news/breaking", &[])
    }

    pub fn refresh_breaking(&self) -> Result<BreakingResponse, ApiError> {
        self.post("/news/refresh")
    }

    pub fn headlines(&self) -> Result<HeadlinesResponse, ApiError> {
        self.get("/lebanon/headlines", &[])
    }

    pub fn refresh_headlines(&self) -> Result<HeadlinesResponse, ApiError> {
        self.post("/lebanon/refresh")
    }

    pub fn search(&self, query: &str, category: Option<&str>) -> Result<SearchResponse, ApiError> {
        self.get("/news/search", &search_params(query, category))
    }

    fn get<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!(path, "GET");
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .query(params)
            .send()?;
        read_json(resp)
    }

    fn post<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let resp = self.client.post(format!("{}{path}", self.base)).send()?;
        read_json(resp)
    }
}

/// Query parameters for the search endpoint.  Empty queries and the
/// "الكل" sentinel are dropped, mirroring the original client.
fn search_params(query: &str, category: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !query.is_empty() {
        params.push(("q", query.to_string()));
    }
    if let Some(cat) = category {
        if !cat.is_empty() && cat != ALL_CATEGORIES {
            params.push(("category", cat.to_string()));
        }
    }
    params
}

fn read_json<T>(resp: reqwest::blocking::Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let status = resp.status();
    if !status.is_success() {
        // FastAPI wraps error messages as {"detail": "..."}
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<String>,
        }
        let detail = resp.json::<ErrorBody>().ok().and_then(|b| b.detail);
        return Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        });
    }
    resp.json::<T>().map_err(ApiError::Network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_skip_empty_query_and_all_sentinel() {
        assert!(search_params("", None).is_empty());
        assert!(search_params("", Some(ALL_CATEGORIES)).is_empty());
        assert!(search_params("", Some("")).is_empty());
    }

    #[test]
    fn search_params_include_query_and_category() {
        let params = search_params("اتفاقية", Some("اقتصاد"));
        assert_eq!(
            params,
            vec![("q", "اتفاقية".to_string()), ("category", "اقتصاد".to_string())]
        );
    }

    #[test]
    fn search_params_query_only() {
        let params = search_params("deal", Some(ALL_CATEGORIES));
        assert_eq!(params, vec![("q", "deal".to_string())]);
    }

    #[test]
    fn server_error_displays_detail_when_present() {
        let err = ApiError::Server {
            status: 500,
            detail: Some("خطأ في جلب الأخبار العاجلة".to_string()),
        };
        assert_eq!(err.to_string(), "خطأ في جلب الأخبار العاجلة");

        let bare = ApiError::Server {
            status: 502,
            detail: None,
        };
        assert_eq!(bare.to_string(), "خطأ في الخادم (502)");
    }

    #[test]
    fn labeled_prefixes_operation() {
        let err = ApiError::Server {
            status: 500,
            detail: Some("انتهت المهلة".to_string()),
        };
        assert_eq!(
            labeled(labels::BREAKING, &err),
            "فشل في جلب الأخبار العاجلة: انتهت المهلة"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = HttpNewsApi::new("http://localhost:8000/api/").unwrap();
        assert_eq!(api.base, "http://localhost:8000/api");
    }
}
