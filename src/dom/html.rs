use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::{collapse_whitespace, resolve_against, DomError, DomNode, RenderedDocument};

/// Snapshot of a rendered page parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
    url: Url,
    base: Url,
}

impl HtmlDocument {
    /// Parse rendered markup fetched from `url`.
    ///
    /// A `<base href>` element, when present and valid, overrides `url` for
    /// relative reference resolution.
    pub fn parse(markup: &str, url: Url) -> Self {
        let html = Html::parse_document(markup);
        let base = Self::base_href(&html, &url).unwrap_or_else(|| url.clone());
        Self { html, url, base }
    }

    fn base_href(html: &Html, url: &Url) -> Option<Url> {
        let selector = Selector::parse("base[href]").ok()?;
        let href = html.select(&selector).next()?.value().attr("href")?;
        url.join(href.trim()).ok()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl RenderedDocument for HtmlDocument {
    type Node<'a>
        = HtmlNode<'a>
    where
        Self: 'a;

    fn url(&self) -> &Url {
        &self.url
    }

    fn select_all(&self, selector: &str) -> Result<Vec<HtmlNode<'_>>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .html
            .select(&selector)
            .map(|element| HtmlNode {
                element,
                base: &self.base,
            })
            .collect())
    }
}

/// Elements whose text never shows up in the rendered page.
const NON_RENDERED: [&str; 4] = ["script", "style", "noscript", "template"];

/// Borrowed element handle into an [`HtmlDocument`].
#[derive(Clone, Copy)]
pub struct HtmlNode<'a> {
    element: ElementRef<'a>,
    base: &'a Url,
}

impl<'a> DomNode for HtmlNode<'a> {
    fn select_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .element
            .select(&selector)
            .map(|element| HtmlNode {
                element,
                base: self.base,
            })
            .collect())
    }

    fn tag_name(&self) -> String {
        self.element.value().name().to_ascii_lowercase()
    }

    fn text(&self) -> Result<String, DomError> {
        let mut text = String::new();
        for node in self.element.descendants() {
            let Some(chunk) = node.value().as_text() else {
                continue;
            };
            let hidden = node
                .ancestors()
                .take_while(|ancestor| *ancestor != *self.element)
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| NON_RENDERED.contains(&element.name()));
            if !hidden {
                text.push_str(chunk);
            }
        }
        Ok(collapse_whitespace(&text))
    }

    fn attr(&self, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element.value().attr(name).map(str::to_string))
    }

    fn resolve_url(&self, attr: &str) -> Result<Option<Url>, DomError> {
        match self.element.value().attr(attr) {
            Some(raw) => resolve_against(self.base, attr, raw),
            None => Ok(None),
        }
    }
}
