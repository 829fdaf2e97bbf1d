use serde::{Deserialize, Serialize};

use crate::pipeline::normalizer::DedupPolicy;

/// Selector cascade and per-field fallback chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Candidate article selectors, most specific first
    pub candidate_selectors: Vec<String>,

    /// Only the first `max_items` candidates are extracted (default: 50)
    pub max_items: usize,

    /// Title chain; the first match with non-empty text wins
    pub title_selectors: Vec<String>,

    /// Link chain, tried after the title element's own anchor
    pub link_selectors: Vec<String>,

    /// Description chain
    pub description_selectors: Vec<String>,

    /// Image chain
    pub image_selectors: Vec<String>,

    /// Attributes read from the matched image element, in order
    pub image_attributes: Vec<String>,

    /// Per-node identifier attributes, in order; the link is used otherwise
    pub id_attributes: Vec<String>,

    /// Text used when no description matches
    pub default_description: String,

    /// Duplicate handling (default: keep everything)
    pub dedupe: DedupPolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            candidate_selectors: vec![
                "div.article".to_string(),
                "article".to_string(),
                "[class*=\"article\"]".to_string(),
                "[class*=\"card\"]".to_string(),
            ],
            max_items: 50,
            title_selectors: vec![
                "h2 a".to_string(),
                "h1 a, h3 a, h4 a".to_string(),
                "h1, h2, h3, h4".to_string(),
                "a[class*=\"title\"]".to_string(),
            ],
            link_selectors: vec!["a[href]".to_string()],
            description_selectors: vec![
                "section p".to_string(),
                "p".to_string(),
                "[class*=\"description\"], [class*=\"content\"], [class*=\"summary\"]".to_string(),
            ],
            image_selectors: vec!["img".to_string()],
            image_attributes: vec!["src".to_string(), "data-src".to_string()],
            id_attributes: vec!["data-article-id".to_string(), "data-id".to_string()],
            default_description: "No description".to_string(),
            dedupe: DedupPolicy::None,
        }
    }
}

impl ExtractionConfig {
    /// Every selector this config evaluates, for validation.
    pub fn all_selectors(&self) -> impl Iterator<Item = &String> {
        self.candidate_selectors
            .iter()
            .chain(&self.title_selectors)
            .chain(&self.link_selectors)
            .chain(&self.description_selectors)
            .chain(&self.image_selectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ExtractionConfig::default();
        assert_eq!(config.candidate_selectors[0], "div.article");
        assert_eq!(config.max_items, 50);
        assert_eq!(config.title_selectors[0], "h2 a");
        assert_eq!(config.default_description, "No description");
        assert_eq!(config.dedupe, DedupPolicy::None);
    }

    #[test]
    fn test_all_selectors_covers_every_chain() {
        let config = ExtractionConfig::default();
        let all: Vec<_> = config.all_selectors().collect();
        assert!(all.contains(&&"div.article".to_string()));
        assert!(all.contains(&&"section p".to_string()));
        assert!(all.contains(&&"img".to_string()));
        assert_eq!(
            all.len(),
            config.candidate_selectors.len()
                + config.title_selectors.len()
                + config.link_selectors.len()
                + config.description_selectors.len()
                + config.image_selectors.len()
        );
    }
}
