use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dom::collapse_whitespace;
use crate::domain::ExtractedItem;
use crate::pipeline::config::ExtractionConfig;
use crate::pipeline::extractor::RawItem;

/// How repeated items are handled.
///
/// `None` keeps every structurally valid item, including repeats the page
/// itself renders twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    #[default]
    None,
    Link,
    Id,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    default_description: String,
    dedupe: DedupPolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            default_description: config.default_description.clone(),
            dedupe: config.dedupe,
        }
    }

    /// Trim text, fill defaults and derive ids. Input order is kept.
    pub fn normalize(&self, raw: Vec<RawItem>) -> Vec<ExtractedItem> {
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(raw.len());

        for item in raw {
            let title = collapse_whitespace(&item.title);
            if title.is_empty() {
                warn!("Dropping candidate {}: blank title", item.position);
                continue;
            }

            let link = item.link.to_string();
            let description = item
                .description
                .map(|d| collapse_whitespace(&d))
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| self.default_description.clone());
            let id = item
                .explicit_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| link.clone());

            let key = match self.dedupe {
                DedupPolicy::None => None,
                DedupPolicy::Link => Some(link.clone()),
                DedupPolicy::Id => Some(id.clone()),
            };
            if let Some(key) = key {
                if !seen.insert(key) {
                    debug!("Dropping duplicate candidate {}", item.position);
                    continue;
                }
            }

            items.push(ExtractedItem {
                id,
                title,
                link,
                description,
                image: item.image.map(|url| url.to_string()),
            });
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn raw(position: usize, title: &str, link: &str) -> RawItem {
        RawItem {
            position,
            title: title.into(),
            link: Url::parse(link).unwrap(),
            description: None,
            image: None,
            explicit_id: None,
        }
    }

    #[test]
    fn test_defaults_applied() {
        let items = Normalizer::default().normalize(vec![raw(1, "  A  ", "https://x/a")]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].description, "No description");
        assert_eq!(items[0].id, "https://x/a");
        assert_eq!(items[0].image, None);
    }

    #[test]
    fn test_explicit_id_and_description_trimmed() {
        let mut item = raw(1, "A", "https://x/a");
        item.explicit_id = Some("  42 ".into());
        item.description = Some("\n  some\n text ".into());
        item.image = Some(Url::parse("https://x/a.png").unwrap());

        let items = Normalizer::default().normalize(vec![item]);
        assert_eq!(items[0].id, "42");
        assert_eq!(items[0].description, "some text");
        assert_eq!(items[0].image.as_deref(), Some("https://x/a.png"));
    }

    #[test]
    fn test_blank_explicit_id_falls_back_to_link() {
        let mut item = raw(1, "A", "https://x/a");
        item.explicit_id = Some("   ".into());
        let items = Normalizer::default().normalize(vec![item]);
        assert_eq!(items[0].id, "https://x/a");
    }

    #[test]
    fn test_blank_title_dropped() {
        let items = Normalizer::default().normalize(vec![
            raw(1, " \n ", "https://x/a"),
            raw(2, "B", "https://x/b"),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "B");
    }

    #[test]
    fn test_keep_all_by_default() {
        let items = Normalizer::default().normalize(vec![
            raw(1, "A", "https://x/a"),
            raw(2, "A again", "https://x/a"),
        ]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_dedupe_by_link_keeps_first() {
        let config = ExtractionConfig {
            dedupe: DedupPolicy::Link,
            ..Default::default()
        };
        let items = Normalizer::new(&config).normalize(vec![
            raw(1, "A", "https://x/a"),
            raw(2, "B", "https://x/b"),
            raw(3, "A again", "https://x/a"),
        ]);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn test_dedupe_by_id() {
        let config = ExtractionConfig {
            dedupe: DedupPolicy::Id,
            ..Default::default()
        };
        let mut first = raw(1, "A", "https://x/a");
        first.explicit_id = Some("7".into());
        let mut second = raw(2, "B", "https://x/b");
        second.explicit_id = Some("7".into());

        let items = Normalizer::new(&config).normalize(vec![first, second]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "A");
    }
}
