use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::dom::{DomError, DomNode};
use crate::pipeline::config::ExtractionConfig;

/// Recoverable failure scoped to one candidate node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemExtractionError {
    #[error("candidate {position}: no title found")]
    MissingTitle { position: usize },

    #[error("candidate {position}: no resolvable link found")]
    MissingLink { position: usize },

    #[error("candidate {position}: {source}")]
    Dom { position: usize, source: DomError },
}

/// Fields pulled from one candidate before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// 1-based position among the processed candidates
    pub position: usize,
    pub title: String,
    pub link: Url,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub explicit_id: Option<String>,
}

/// Outcome of extracting a batch of candidates.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    pub items: Vec<RawItem>,
    pub failures: Vec<ItemExtractionError>,
    pub processed: usize,
}

/// Per-field fallback extraction over candidate nodes.
pub struct ItemExtractor {
    max_items: usize,
    title_selectors: Vec<String>,
    link_selectors: Vec<String>,
    description_selectors: Vec<String>,
    image_selectors: Vec<String>,
    image_attributes: Vec<String>,
    id_attributes: Vec<String>,
}

impl ItemExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            max_items: config.max_items,
            title_selectors: config.title_selectors.clone(),
            link_selectors: config.link_selectors.clone(),
            description_selectors: config.description_selectors.clone(),
            image_selectors: config.image_selectors.clone(),
            image_attributes: config.image_attributes.clone(),
            id_attributes: config.id_attributes.clone(),
        }
    }

    /// Extract the first `max_items` candidates, in order.
    ///
    /// A failing candidate is logged and skipped; it never stops the batch.
    pub fn extract_all<N: DomNode>(&self, nodes: &[N]) -> ExtractionBatch {
        let mut batch = ExtractionBatch::default();

        if nodes.len() > self.max_items {
            debug!(
                "capping {} candidates at {} items",
                nodes.len(),
                self.max_items
            );
        }

        for (index, node) in nodes.iter().take(self.max_items).enumerate() {
            batch.processed += 1;
            match self.extract_one(index + 1, node) {
                Ok(item) => batch.items.push(item),
                Err(e) => {
                    warn!("Skipping item: {}", e);
                    batch.failures.push(e);
                }
            }
        }

        batch
    }

    /// Extract one candidate. Fields are read in order: title, link,
    /// description, image, id.
    pub fn extract_one<N: DomNode>(
        &self,
        position: usize,
        node: &N,
    ) -> Result<RawItem, ItemExtractionError> {
        let dom = move |source| ItemExtractionError::Dom { position, source };

        let (title, title_node) = self
            .title(node)
            .map_err(dom)?
            .ok_or(ItemExtractionError::MissingTitle { position })?;

        let link = self
            .link(node, &title_node)
            .map_err(dom)?
            .ok_or(ItemExtractionError::MissingLink { position })?;

        let description = self.description(node).map_err(dom)?;
        let image = self.image(node).map_err(dom)?;
        let explicit_id = self.explicit_id(node).map_err(dom)?;

        Ok(RawItem {
            position,
            title,
            link,
            description,
            image,
            explicit_id,
        })
    }

    fn title<N: DomNode>(&self, node: &N) -> Result<Option<(String, N)>, DomError> {
        first_in_chain(node, &self.title_selectors, |found| {
            let text = found.text()?;
            Ok((!text.is_empty()).then_some((text, found)))
        })
    }

    fn link<N: DomNode>(&self, node: &N, title_node: &N) -> Result<Option<Url>, DomError> {
        if title_node.tag_name() == "a" {
            if let Some(url) = title_node.resolve_url("href")? {
                return Ok(Some(url));
            }
        } else if let Some(anchor) = title_node.select_first("a[href]")? {
            if let Some(url) = anchor.resolve_url("href")? {
                return Ok(Some(url));
            }
        }

        first_in_chain(node, &self.link_selectors, |found| found.resolve_url("href"))
    }

    fn description<N: DomNode>(&self, node: &N) -> Result<Option<String>, DomError> {
        first_in_chain(node, &self.description_selectors, |found| {
            let text = found.text()?;
            Ok((!text.is_empty()).then_some(text))
        })
    }

    fn image<N: DomNode>(&self, node: &N) -> Result<Option<Url>, DomError> {
        first_in_chain(node, &self.image_selectors, |found| {
            for attr in &self.image_attributes {
                if let Some(url) = found.resolve_url(attr)? {
                    return Ok(Some(url));
                }
            }
            Ok(None)
        })
    }

    fn explicit_id<N: DomNode>(&self, node: &N) -> Result<Option<String>, DomError> {
        for attr in &self.id_attributes {
            if let Some(value) = node.attr(attr)? {
                let value = value.trim();
                if !value.is_empty() {
                    return Ok(Some(value.to_string()));
                }
            }
        }
        Ok(None)
    }
}

/// Try each selector in order against `node`, probing its matches in
/// document order. Stops at the first probe that yields a value.
fn first_in_chain<N, T, F>(node: &N, chain: &[String], mut probe: F) -> Result<Option<T>, DomError>
where
    N: DomNode,
    F: FnMut(N) -> Result<Option<T>, DomError>,
{
    for selector in chain {
        for found in node.select_all(selector)? {
            if let Some(value) = probe(found)? {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}
