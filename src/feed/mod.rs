//! Feed synthesis.
//!
//! [`FeedSynthesizer`] turns normalized items into a [`FeedDocument`];
//! [`FeedDocument::render`] serializes it as RSS 2.0 or Atom 1.0 in one pass,
//! and [`validate`] parses the result back before anything is written out.

mod atom;
mod rss;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::domain::{ExtractedItem, FeedDocument, FeedEntry, FeedFormat, FeedMetadata};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("refusing to synthesize a feed with no entries")]
    NoEntries,

    #[error("failed to write feed XML: {0}")]
    Write(String),

    #[error("generated feed is invalid: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Builds feed documents for one fixed set of metadata.
#[derive(Debug, Clone)]
pub struct FeedSynthesizer {
    metadata: FeedMetadata,
}

impl FeedSynthesizer {
    pub fn new(metadata: FeedMetadata) -> Self {
        Self { metadata }
    }

    /// Entries keep item order and all carry `now` as their publish time;
    /// the page exposes no per-article date.
    pub fn synthesize(&self, items: &[ExtractedItem], now: DateTime<Utc>) -> Result<FeedDocument> {
        if items.is_empty() {
            return Err(FeedError::NoEntries);
        }

        let entries = items
            .iter()
            .map(|item| FeedEntry {
                id: item.id.clone(),
                title: item.title.clone(),
                link: item.link.clone(),
                content: item.content_html(),
                image: item.image.clone(),
                published: now,
            })
            .collect();

        Ok(FeedDocument {
            metadata: self.metadata.clone(),
            entries,
            updated: now,
        })
    }
}

impl FeedDocument {
    /// Serialize the whole document.
    pub fn render(&self, format: FeedFormat) -> Result<String> {
        let bytes = match format {
            FeedFormat::Rss2 => rss::write(self)?,
            FeedFormat::Atom => atom::write(self)?,
        };
        String::from_utf8(bytes).map_err(|e| FeedError::Write(e.to_string()))
    }
}

/// Parse rendered XML back and check it holds `expected` entries.
pub fn validate(xml: &str, expected: usize) -> Result<()> {
    let parsed =
        feed_rs::parser::parse(xml.as_bytes()).map_err(|e| FeedError::Invalid(e.to_string()))?;

    if parsed.entries.len() != expected {
        return Err(FeedError::Invalid(format!(
            "expected {} entries, parsed {}",
            expected,
            parsed.entries.len()
        )));
    }

    if let Some(entry) = parsed.entries.iter().find(|e| e.links.is_empty()) {
        return Err(FeedError::Invalid(format!("entry `{}` has no link", entry.id)));
    }

    Ok(())
}

type XmlWriter = Writer<Vec<u8>>;

fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

fn write_event<'a>(writer: &mut XmlWriter, event: Event<'a>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Write(e.to_string()))
}

fn start(writer: &mut XmlWriter, element: BytesStart<'_>) -> Result<()> {
    write_event(writer, Event::Start(element))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn empty(writer: &mut XmlWriter, element: BytesStart<'_>) -> Result<()> {
    write_event(writer, Event::Empty(element))
}

fn text_element(writer: &mut XmlWriter, element: BytesStart<'_>, text: &str) -> Result<()> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    start(writer, element)?;
    let text = xml_safe(text);
    write_event(writer, Event::Text(BytesText::new(&text)))?;
    end(writer, &name)
}

fn simple_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    text_element(writer, BytesStart::new(name), text)
}

/// Drop control characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect()
}

/// MIME type for an image URL, from its extension.
fn image_mime(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(super) fn items() -> Vec<ExtractedItem> {
        vec![
            ExtractedItem {
                id: "https://x/a".into(),
                title: "A".into(),
                link: "https://x/a".into(),
                description: "No description".into(),
                image: None,
            },
            ExtractedItem {
                id: "b-1".into(),
                title: "B & friends".into(),
                link: "https://x/b".into(),
                description: "About <b>".into(),
                image: Some("https://x/b.png".into()),
            },
        ]
    }

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_items_rejected() {
        let synth = FeedSynthesizer::new(FeedMetadata::default());
        assert!(matches!(synth.synthesize(&[], now()), Err(FeedError::NoEntries)));
    }

    #[test]
    fn test_entries_follow_item_order() {
        let doc = FeedSynthesizer::new(FeedMetadata::default())
            .synthesize(&items(), now())
            .unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entries[0].id, "https://x/a");
        assert_eq!(doc.entries[1].id, "b-1");
        assert!(doc.entries[1].content.starts_with(r#"<img src="https://x/b.png""#));
        assert_eq!(doc.entries[0].content, "No description");
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let synth = FeedSynthesizer::new(FeedMetadata::default());
        let a = synth.synthesize(&items(), now()).unwrap();
        let b = synth.synthesize(&items(), now()).unwrap();
        assert_eq!(a.render(FeedFormat::Rss2).unwrap(), b.render(FeedFormat::Rss2).unwrap());
        assert_eq!(a.render(FeedFormat::Atom).unwrap(), b.render(FeedFormat::Atom).unwrap());
    }

    #[test]
    fn test_validate_counts_entries() {
        let doc = FeedSynthesizer::new(FeedMetadata::default())
            .synthesize(&items(), now())
            .unwrap();
        let xml = doc.render(FeedFormat::Rss2).unwrap();
        assert!(validate(&xml, 2).is_ok());
        assert!(matches!(validate(&xml, 3), Err(FeedError::Invalid(_))));
        assert!(matches!(validate("<not-a-feed/>", 0), Err(FeedError::Invalid(_))));
    }

    #[test]
    fn test_xml_safe_strips_control_chars() {
        assert_eq!(xml_safe("a\u{0}b\u{1b}c\n"), "abc\n");
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("https://x/b.png"), "image/png");
        assert_eq!(image_mime("https://x/b.WEBP?w=200"), "image/webp");
        assert_eq!(image_mime("https://x/photo"), "image/jpeg");
    }
}
