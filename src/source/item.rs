//! Wire types for the news backend.
//!
//! Everything in this file mirrors the JSON payloads served by the backend
//! API.  Missing collection fields deserialize to empty collections rather
//! than failing the whole response, so a sparse payload degrades to "no
//! items" instead of an error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Classification tag on a news item, used for filtering and badge styling.
///
/// The backend sends free-form Arabic strings; the known set maps onto
/// variants and anything else is carried through as [`Category::Other`] so
/// filtering by exact match still works.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Politics,
    Economy,
    Sports,
    Technology,
    Health,
    Science,
    Environment,
    General,
    Other(String),
}

impl Category {
    /// The Arabic label as displayed in the UI and sent on the wire.
    pub fn as_arabic(&self) -> &str {
        match self {
            Category::Politics => "سياسة",
            Category::Economy => "اقتصاد",
            Category::Sports => "رياضة",
            Category::Technology => "تكنولوجيا",
            Category::Health => "صحة",
            Category::Science => "علوم",
            Category::Environment => "بيئة",
            Category::General => "عام",
            Category::Other(s) => s,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.trim() {
            "سياسة" => Category::Politics,
            "اقتصاد" => Category::Economy,
            "رياضة" => Category::Sports,
            "تكنولوجيا" => Category::Technology,
            "صحة" => Category::Health,
            "علوم" => Category::Science,
            "بيئة" => Category::Environment,
            "عام" => Category::General,
            other => Category::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arabic())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::from(raw.as_str()))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_arabic())
    }
}

/// A single news item as served by the backend.
///
/// `id` is unique within one fetched collection only; a refresh may assign
/// new ids, so nothing here is patched in place — collections are replaced
/// wholesale.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NewsItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "flexible_time::deserialize")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// `GET /news/breaking` and `POST /news/refresh` envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BreakingResponse {
    #[serde(default)]
    pub breaking_news: Vec<NewsItem>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, deserialize_with = "flexible_time::deserialize")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// `GET /news/search` envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<NewsItem>,
    #[serde(default)]
    pub count: usize,
}

/// One newspaper's worth of headlines in the Lebanon view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewspaperGroup {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub website: Option<String>,
    /// Display order: the backend supplies headlines reverse-chronological
    /// and the order is preserved as-is.
    #[serde(default)]
    pub headlines: Vec<NewsItem>,
}

/// Ordered newspaper-name → group map.
///
/// JSON objects carry meaningful insertion order here (it is the display
/// order), which a `HashMap` would destroy, so this deserializes into a
/// `Vec` of pairs via a manual visitor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Newspapers(pub Vec<(String, NewspaperGroup)>);

impl Newspapers {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn headline_count(&self) -> usize {
        self.0.iter().map(|(_, g)| g.headlines.len()).sum()
    }
}

impl<'de> Deserialize<'de> for Newspapers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NewspapersVisitor;

        impl<'de> Visitor<'de> for NewspapersVisitor {
            type Value = Newspapers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of newspaper name to headline group")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(pair) = access.next_entry::<String, NewspaperGroup>()? {
                    pairs.push(pair);
                }
                Ok(Newspapers(pairs))
            }
        }

        deserializer.deserialize_map(NewspapersVisitor)
    }
}

impl Serialize for Newspapers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, group) in &self.0 {
            map.serialize_entry(name, group)?;
        }
        map.end()
    }
}

/// `GET /lebanon/headlines` and `POST /lebanon/refresh` envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub newspapers: Newspapers,
    #[serde(default)]
    pub total_headlines: usize,
    #[serde(default)]
    pub total_newspapers: usize,
    #[serde(default, deserialize_with = "flexible_time::deserialize")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Lenient timestamp parsing.
///
/// The backend emits `datetime.now()` without an offset, while stored items
/// carry full RFC 3339 stamps.  Accept both, treating naive timestamps as
/// UTC; unparseable stamps become `None` rather than failing the response.
pub(crate) mod flexible_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(crate) fn parse(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_round_trips_known_arabic_labels() {
        for label in ["سياسة", "اقتصاد", "رياضة", "تكنولوجيا", "صحة", "علوم", "بيئة", "عام"] {
            let cat = Category::from(label);
            assert!(!matches!(cat, Category::Other(_)), "{label} should be a known category");
            assert_eq!(cat.as_arabic(), label);
        }
    }

    #[test]
    fn unknown_category_is_carried_through() {
        let cat = Category::from("فن");
        assert_eq!(cat, Category::Other("فن".to_string()));
        assert_eq!(cat.as_arabic(), "فن");
    }

    #[test]
    fn news_item_deserializes_with_defaults() {
        let item: NewsItem = serde_json::from_str(r#"{"title": "خبر"}"#).unwrap();
        assert_eq!(item.title, "خبر");
        assert_eq!(item.category, Category::General);
        assert!(!item.is_breaking);
        assert!(item.published_at.is_none());
        assert!(item.url.is_none());
    }

    #[test]
    fn breaking_response_missing_fields_default_to_empty() {
        let resp: BreakingResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.breaking_news.is_empty());
        assert_eq!(resp.count, 0);
        assert!(resp.last_updated.is_none());
    }

    #[test]
    fn breaking_response_parses_full_payload() {
        let json = r#"{
            "breaking_news": [
                {"id": "a", "title": "عاجل: خبر", "description": "وصف", "source": "الجزيرة",
                 "category": "اقتصاد", "published_at": "2025-01-27T10:30:00Z", "is_breaking": true}
            ],
            "count": 1,
            "last_updated": "2025-01-27T11:00:00.123456"
        }"#;
        let resp: BreakingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.breaking_news.len(), 1);
        assert_eq!(resp.breaking_news[0].category, Category::Economy);
        assert!(resp.breaking_news[0].is_breaking);
        // naive backend timestamp is accepted as UTC
        assert_eq!(
            resp.last_updated.unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 27, 11, 0, 0).unwrap()
                + chrono::Duration::microseconds(123456)
        );
    }

    #[test]
    fn newspapers_preserve_json_object_order() {
        let json = r#"{
            "newspapers": {
                "النهار": {"count": 1, "website": "https://www.annahar.com",
                           "headlines": [{"title": "عنوان أول"}]},
                "الأخبار": {"count": 0, "headlines": []},
                "الديار": {"count": 0}
            },
            "total_headlines": 1,
            "total_newspapers": 3
        }"#;
        let resp: HeadlinesResponse = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = resp.newspapers.0.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["النهار", "الأخبار", "الديار"]);
        assert_eq!(resp.newspapers.headline_count(), 1);
        assert_eq!(resp.total_newspapers, 3);
    }

    #[test]
    fn flexible_time_parses_rfc3339_and_naive() {
        let rfc = flexible_time::parse("2025-01-27T10:30:00Z").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 1, 27, 10, 30, 0).unwrap());

        let naive = flexible_time::parse("2025-01-27T10:30:00").unwrap();
        assert_eq!(naive, rfc);

        assert!(flexible_time::parse("not a date").is_none());
    }
}
