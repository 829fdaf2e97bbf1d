use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Static identity of the generated feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedMetadata {
    pub title: String,
    pub description: String,
    /// Canonical feed id (Atom `<id>`).
    pub id: String,
    /// Link to the page the feed mirrors.
    pub link: String,
    pub language: String,
    pub generator: String,
    pub copyright: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    /// Public URL the feed itself will be served from.
    pub self_link: Option<String>,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        Self {
            title: "SwipeInsight - For You".to_string(),
            description: "Daily picks from the SwipeInsight For You page".to_string(),
            id: "https://web.swipeinsight.app/app/for-you".to_string(),
            link: "https://web.swipeinsight.app/app/for-you".to_string(),
            language: "zh-CN".to_string(),
            generator: concat!("pagefeed/", env!("CARGO_PKG_VERSION")).to_string(),
            copyright: Some("SwipeInsight".to_string()),
            image: Some(
                "https://web.swipeinsight.app/images/swipe-insight-og-image.webp".to_string(),
            ),
            favicon: Some("https://web.swipeinsight.app/favicon.ico".to_string()),
            self_link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    #[default]
    Rss2,
    Atom,
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rss2 => write!(f, "rss2"),
            Self::Atom => write!(f, "atom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    /// HTML fragment, image-prefixed when the item has one.
    pub content: String,
    pub image: Option<String>,
    pub published: DateTime<Utc>,
}

/// Feed metadata plus entries, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedDocument {
    pub metadata: FeedMetadata,
    pub entries: Vec<FeedEntry>,
    pub updated: DateTime<Utc>,
}

impl FeedDocument {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest of the entry content, ignoring every timestamp.
    ///
    /// Two runs over an unchanged page produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            for field in [&entry.id, &entry.title, &entry.link, &entry.content] {
                hasher.update(field.as_bytes());
                hasher.update([0u8]);
            }
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: &str, at: DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            id: id.into(),
            title: format!("Title {id}"),
            link: format!("https://x/{id}"),
            content: "body".into(),
            image: None,
            published: at,
        }
    }

    fn doc(ids: &[&str], at: DateTime<Utc>) -> FeedDocument {
        FeedDocument {
            metadata: FeedMetadata::default(),
            entries: ids.iter().map(|id| entry(id, at)).collect(),
            updated: at,
        }
    }

    #[test]
    fn test_fingerprint_ignores_timestamps() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(doc(&["a", "b"], t1).fingerprint(), doc(&["a", "b"], t2).fingerprint());
    }

    #[test]
    fn test_fingerprint_depends_on_order_and_content() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ab = doc(&["a", "b"], t).fingerprint();
        assert_ne!(ab, doc(&["b", "a"], t).fingerprint());
        assert_ne!(ab, doc(&["a"], t).fingerprint());
        assert_eq!(ab.len(), 64);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(FeedFormat::Rss2.to_string(), "rss2");
        assert_eq!(FeedFormat::Atom.to_string(), "atom");
        assert_eq!(FeedFormat::default(), FeedFormat::Rss2);
    }
}
