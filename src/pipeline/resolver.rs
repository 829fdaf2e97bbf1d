use tracing::{debug, warn};

use crate::dom::RenderedDocument;

/// The selector that won the cascade and the nodes it matched.
pub struct Resolution<N> {
    pub selector: String,
    pub nodes: Vec<N>,
}

/// Ordered list of candidate selectors, most trusted first.
///
/// The first selector matching at least one node wins; later selectors are
/// never evaluated once a match is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCascade {
    selectors: Vec<String>,
}

impl SelectorCascade {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Returns `None` when every selector matched zero nodes.
    ///
    /// A selector that fails to evaluate counts as a miss.
    pub fn resolve<'d, D: RenderedDocument>(
        &self,
        document: &'d D,
    ) -> Option<Resolution<D::Node<'d>>> {
        for selector in &self.selectors {
            match document.select_all(selector) {
                Ok(nodes) if !nodes.is_empty() => {
                    debug!(selector = %selector, count = nodes.len(), "selector matched");
                    return Some(Resolution {
                        selector: selector.clone(),
                        nodes,
                    });
                }
                Ok(_) => debug!(selector = %selector, "selector matched nothing"),
                Err(e) => warn!(selector = %selector, "skipping selector: {}", e),
            }
        }
        None
    }
}
