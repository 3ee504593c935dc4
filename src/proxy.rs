//! RSS-to-JSON proxy function.
//!
//! Transport-agnostic rendition of the deployed serverless function: the
//! host supplies the `url` query parameter and forwards the returned
//! status/headers/body verbatim.  `nashra proxy <url>` runs it once from
//! the command line.

use serde::Serialize;
use tracing::warn;

/// The feed is capped to its most recent entries.
pub const MAX_ITEMS: usize = 20;

const CORS_HEADER: (&str, &str) = ("Access-Control-Allow-Origin", "*");

/// One feed entry in the proxy's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyItem {
    pub title: String,
    pub link: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub image: Option<String>,
    pub description: String,
}

/// What the hosting transport should send back.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl ProxyResponse {
    fn ok(body: String) -> Self {
        ProxyResponse {
            status: 200,
            headers: vec![CORS_HEADER, ("Content-Type", "application/json")],
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        ProxyResponse {
            status,
            headers: vec![CORS_HEADER, ("Content-Type", "application/json")],
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }
}

/// Handle one proxy invocation: 400 when `url` is missing, 500 when the
/// feed cannot be fetched or parsed, otherwise 200 with a JSON array of at
/// most [`MAX_ITEMS`] entries.
pub fn handle(url_param: Option<&str>, client: &reqwest::blocking::Client) -> ProxyResponse {
    let Some(url) = url_param.filter(|u| !u.is_empty()) else {
        return ProxyResponse::error(400, "Missing RSS URL");
    };
    match fetch_items(url, client) {
        Ok(items) => match serde_json::to_string(&items) {
            Ok(body) => ProxyResponse::ok(body),
            Err(e) => ProxyResponse::error(500, &e.to_string()),
        },
        Err(e) => {
            warn!(url, error = %e, "rss proxy fetch failed");
            ProxyResponse::error(500, &e.to_string())
        }
    }
}

fn fetch_items(url: &str, client: &reqwest::blocking::Client) -> anyhow::Result<Vec<ProxyItem>> {
    let body = client.get(url).send()?.error_for_status()?.bytes()?;
    let channel = rss::Channel::read_from(&body[..])?;
    Ok(items_from_channel(&channel))
}

/// Map a parsed channel onto the proxy's output shape, newest-first as the
/// feed supplies them, capped at [`MAX_ITEMS`].
fn items_from_channel(channel: &rss::Channel) -> Vec<ProxyItem> {
    channel
        .items()
        .iter()
        .take(MAX_ITEMS)
        .map(|item| ProxyItem {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().map(String::from),
            pub_date: item.pub_date().map(String::from),
            image: item
                .enclosure()
                .map(|e| e.url().to_string())
                .or_else(|| media_content_url(item)),
            description: item
                .description()
                .or_else(|| item.content())
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

/// Fallback image source: the `media:content` extension's `url` attribute.
fn media_content_url(item: &rss::Item) -> Option<String> {
    item.extensions()
        .get("media")?
        .get("content")?
        .first()?
        .attrs()
        .get("url")
        .cloned()
}
