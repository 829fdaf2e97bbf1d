use quick_xml::events::{BytesDecl, BytesStart, Event};

use crate::domain::FeedDocument;
use crate::feed::{
    empty, end, image_mime, new_writer, simple_element, start, text_element, write_event, Result,
};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const DOCS: &str = "https://validator.w3.org/feed/docs/rss2.html";

/// Serialize as RSS 2.0 with `content:encoded` bodies.
pub(super) fn write(doc: &FeedDocument) -> Result<Vec<u8>> {
    let meta = &doc.metadata;
    let mut w = new_writer();

    write_event(&mut w, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:content", CONTENT_NS));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    start(&mut w, rss)?;
    start(&mut w, BytesStart::new("channel"))?;

    simple_element(&mut w, "title", &meta.title)?;
    simple_element(&mut w, "link", &meta.link)?;
    simple_element(&mut w, "description", &meta.description)?;
    simple_element(&mut w, "lastBuildDate", &doc.updated.to_rfc2822())?;
    simple_element(&mut w, "docs", DOCS)?;
    simple_element(&mut w, "generator", &meta.generator)?;
    simple_element(&mut w, "language", &meta.language)?;
    if let Some(ref copyright) = meta.copyright {
        simple_element(&mut w, "copyright", copyright)?;
    }
    if let Some(ref image) = meta.image {
        start(&mut w, BytesStart::new("image"))?;
        simple_element(&mut w, "title", &meta.title)?;
        simple_element(&mut w, "url", image)?;
        simple_element(&mut w, "link", &meta.link)?;
        end(&mut w, "image")?;
    }
    if let Some(ref self_link) = meta.self_link {
        let mut link = BytesStart::new("atom:link");
        link.push_attribute(("href", self_link.as_str()));
        link.push_attribute(("rel", "self"));
        link.push_attribute(("type", "application/rss+xml"));
        empty(&mut w, link)?;
    }

    for entry in &doc.entries {
        start(&mut w, BytesStart::new("item"))?;
        simple_element(&mut w, "title", &entry.title)?;
        simple_element(&mut w, "link", &entry.link)?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "false"));
        text_element(&mut w, guid, &entry.id)?;

        simple_element(&mut w, "pubDate", &entry.published.to_rfc2822())?;
        simple_element(&mut w, "description", &entry.content)?;
        simple_element(&mut w, "content:encoded", &entry.content)?;

        if let Some(ref image) = entry.image {
            let mut enclosure = BytesStart::new("enclosure");
            enclosure.push_attribute(("url", image.as_str()));
            enclosure.push_attribute(("length", "0"));
            enclosure.push_attribute(("type", image_mime(image)));
            empty(&mut w, enclosure)?;
        }
        end(&mut w, "item")?;
    }

    end(&mut w, "channel")?;
    end(&mut w, "rss")?;

    Ok(w.into_inner())
}
