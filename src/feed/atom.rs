use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesStart, Event};

use crate::domain::FeedDocument;
use crate::feed::{empty, end, image_mime, new_writer, simple_element, start, text_element, write_event, Result};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn link(rel: &str, href: &str) -> BytesStart<'static> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("rel", rel));
    link.push_attribute(("href", href));
    link
}

fn html_element(name: &str) -> BytesStart<'_> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("type", "html"));
    element
}

/// Serialize as Atom 1.0.
pub(super) fn write(doc: &FeedDocument) -> Result<Vec<u8>> {
    let meta = &doc.metadata;
    let mut w = new_writer();

    write_event(&mut w, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", ATOM_NS));
    if !meta.language.is_empty() {
        feed.push_attribute(("xml:lang", meta.language.as_str()));
    }
    start(&mut w, feed)?;

    simple_element(&mut w, "id", &meta.id)?;
    simple_element(&mut w, "title", &meta.title)?;
    simple_element(&mut w, "subtitle", &meta.description)?;
    simple_element(&mut w, "updated", &timestamp(&doc.updated))?;
    simple_element(&mut w, "generator", &meta.generator)?;
    empty(&mut w, link("alternate", &meta.link))?;
    if let Some(ref self_link) = meta.self_link {
        empty(&mut w, link("self", self_link))?;
    }
    if let Some(ref image) = meta.image {
        simple_element(&mut w, "logo", image)?;
    }
    if let Some(ref favicon) = meta.favicon {
        simple_element(&mut w, "icon", favicon)?;
    }
    if let Some(ref copyright) = meta.copyright {
        simple_element(&mut w, "rights", copyright)?;
    }

    for entry in &doc.entries {
        start(&mut w, BytesStart::new("entry"))?;
        text_element(&mut w, html_element("title"), &entry.title)?;
        simple_element(&mut w, "id", &entry.id)?;
        empty(&mut w, link("alternate", &entry.link))?;
        simple_element(&mut w, "updated", &timestamp(&entry.published))?;
        simple_element(&mut w, "published", &timestamp(&entry.published))?;
        text_element(&mut w, html_element("summary"), &entry.content)?;
        text_element(&mut w, html_element("content"), &entry.content)?;
        if let Some(ref image) = entry.image {
            let mut enclosure = link("enclosure", image);
            enclosure.push_attribute(("type", image_mime(image)));
            empty(&mut w, enclosure)?;
        }
        end(&mut w, "entry")?;
    }

    end(&mut w, "feed")?;

    Ok(w.into_inner())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::domain::{FeedFormat, FeedMetadata};
    use crate::feed::tests::{items, now};
    use crate::feed::FeedSynthesizer;

    fn render() -> String {
        FeedSynthesizer::new(FeedMetadata::default())
            .synthesize(&items(), now())
            .unwrap()
            .render(FeedFormat::Atom)
            .unwrap()
    }

    #[test]
    fn test_feed_level_elements() {
        let xml = render();
        assert!(xml.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="zh-CN">"#));
        assert!(xml.contains("<updated>2024-03-01T08:00:00Z</updated>"));
        assert!(xml.contains("<icon>https://web.swipeinsight.app/favicon.ico</icon>"));
    }

    #[test]
    fn test_entries_parse_back_with_feed_rs() {
        let xml = render();
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        assert_eq!(feed.id, "https://web.swipeinsight.app/app/for-you");
        assert_eq!(feed.entries.len(), 2);

        let ids: Vec<_> = feed.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["https://x/a", "b-1"]);

        let second = &feed.entries[1];
        let alternate = second
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .unwrap();
        assert_eq!(alternate.href, "https://x/b");
        assert_eq!(
            second.published.unwrap().to_rfc3339(),
            "2024-03-01T08:00:00+00:00"
        );
    }
}
