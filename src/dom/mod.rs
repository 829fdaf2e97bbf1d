//! Queryable view of a rendered page.
//!
//! The pipeline never talks to the browser directly. It sees the page through
//! [`RenderedDocument`] and [`DomNode`], which the [`HtmlDocument`] snapshot
//! implements on top of `scraper`. Every node accessor is fallible so a single
//! misbehaving node can be isolated by the extractor.

mod html;

pub use html::{HtmlDocument, HtmlNode};

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("malformed URL in `{attr}` attribute: {value}")]
    MalformedUrl { attr: String, value: String },

    #[error("node access failed: {0}")]
    Access(String),
}

/// A handle to one element of the rendered document.
pub trait DomNode: Sized {
    /// All descendants matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Result<Vec<Self>, DomError>;

    /// The first descendant matching `selector`.
    fn select_first(&self, selector: &str) -> Result<Option<Self>, DomError> {
        Ok(self.select_all(selector)?.into_iter().next())
    }

    /// Lowercase element name, e.g. `a` or `h2`.
    fn tag_name(&self) -> String;

    /// Rendered text with whitespace runs collapsed and ends trimmed.
    fn text(&self) -> Result<String, DomError>;

    fn attr(&self, name: &str) -> Result<Option<String>, DomError>;

    /// Resolve a URL-valued attribute against the document base.
    ///
    /// Returns `Ok(None)` when the attribute is absent or does not point at a
    /// fetchable http(s) resource (fragments, `javascript:` and friends).
    fn resolve_url(&self, attr: &str) -> Result<Option<Url>, DomError>;
}

/// A loaded, settled document that can be queried from the root.
pub trait RenderedDocument {
    type Node<'a>: DomNode
    where
        Self: 'a;

    /// Final URL of the page.
    fn url(&self) -> &Url;

    fn select_all(&self, selector: &str) -> Result<Vec<Self::Node<'_>>, DomError>;
}

/// Collapse whitespace runs into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join `raw` onto `base`, keeping only http(s) targets.
pub(crate) fn resolve_against(base: &Url, attr: &str, raw: &str) -> Result<Option<Url>, DomError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return Ok(None);
    }

    let lowered = raw.to_ascii_lowercase();
    if ["javascript:", "mailto:", "data:", "tel:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return Ok(None);
    }

    let url = base.join(raw).map_err(|_| DomError::MalformedUrl {
        attr: attr.to_string(),
        value: raw.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(Some(url)),
        _ => Ok(None),
    }
}
