use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use url::Url;

use pagefeed::dom::HtmlDocument;
use pagefeed::domain::{FeedFormat, FeedMetadata};
use pagefeed::feed;
use pagefeed::pipeline::{ExtractionConfig, Pipeline, PipelineError, RunStage};

const LISTING: &str = r#"<!doctype html>
<html><body>
  <div class="article">
    <h2><a href="https://x/a">First   post</a></h2>
    <section><p>  Opening
      paragraph </p></section>
  </div>
  <div class="article">
    <h2><a href="https://x/b">Second post</a></h2>
    <img src="https://x/b.png">
    <section><p>With a picture</p></section>
  </div>
  <div class="article">
    <section><p>Untitled teaser</p></section>
  </div>
</body></html>"#;

fn document(markup: &str) -> HtmlDocument {
    HtmlDocument::parse(markup, Url::parse("https://x/app/for-you").unwrap())
}

fn pipeline() -> Pipeline {
    Pipeline::new(&ExtractionConfig::default(), FeedMetadata::default())
}

#[test]
fn listing_with_untitled_card_yields_two_entries() {
    let now = Utc.with_ymd_and_hms(2024, 5, 2, 6, 30, 0).unwrap();
    let output = pipeline().run(&document(LISTING), now).unwrap();

    let entries = &output.feed.entries;
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].title, "First post");
    assert_eq!(entries[0].link, "https://x/a");
    assert_eq!(entries[0].id, "https://x/a");
    assert_eq!(entries[0].content, "Opening paragraph");

    assert_eq!(entries[1].image.as_deref(), Some("https://x/b.png"));
    assert!(entries[1]
        .content
        .starts_with(r#"<img src="https://x/b.png" style="max-width:100%; height:auto; margin-bottom:10px;">"#));
    assert!(entries[1].content.ends_with("<br><br>With a picture"));

    assert_eq!(output.report.matched_selector.as_deref(), Some("div.article"));
    assert_eq!(output.report.candidates_found, 3);
    assert_eq!(output.report.items_failed, 1);
    assert_eq!(output.report.entries, 2);
}

#[test]
fn rendered_rss_parses_back_with_same_entries() {
    let now = Utc.with_ymd_and_hms(2024, 5, 2, 6, 30, 0).unwrap();
    let output = pipeline().run(&document(LISTING), now).unwrap();

    for format in [FeedFormat::Rss2, FeedFormat::Atom] {
        let xml = output.feed.render(format).unwrap();
        feed::validate(&xml, 2).unwrap();

        let parsed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        let links: Vec<_> = parsed
            .entries
            .iter()
            .map(|e| e.links[0].href.clone())
            .collect();
        assert_eq!(links, ["https://x/a", "https://x/b"]);
    }
}

#[test]
fn same_page_gives_same_fingerprint_across_runs() {
    let first = pipeline()
        .run(&document(LISTING), Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap())
        .unwrap();
    let second = pipeline()
        .run(&document(LISTING), Utc.with_ymd_and_hms(2024, 5, 3, 6, 0, 0).unwrap())
        .unwrap();

    assert_eq!(first.feed.fingerprint(), second.feed.fingerprint());
    assert_ne!(first.feed.updated, second.feed.updated);
}

#[test]
fn card_without_description_gets_default() {
    let markup = r#"<article><h3><a href="/only">Only title</a></h3></article>"#;
    let output = pipeline().run(&document(markup), Utc::now()).unwrap();

    assert_eq!(output.report.matched_selector.as_deref(), Some("article"));
    assert_eq!(output.feed.entries[0].link, "https://x/only");
    assert_eq!(output.feed.entries[0].content, "No description");
}

#[test]
fn listing_without_titles_is_an_empty_result() {
    let markup = r#"<div class="article"><p>teaser</p></div><div class="article"><p>more</p></div>"#;
    let aborted = pipeline().run(&document(markup), Utc::now()).unwrap_err();

    assert_eq!(aborted.stage, RunStage::Normalizing);
    assert_eq!(
        aborted.cause,
        PipelineError::EmptyResultSet {
            selector: "div.article".into(),
            candidates: 2,
        }
    );
}

#[test]
fn max_items_caps_candidates_in_order() {
    let cards: String = (1..=5)
        .map(|n| format!(r#"<div class="article"><h2><a href="/p/{n}">Post {n}</a></h2></div>"#))
        .collect();
    let config = ExtractionConfig {
        max_items: 3,
        ..ExtractionConfig::default()
    };
    let output = Pipeline::new(&config, FeedMetadata::default())
        .extract(&document(&cards))
        .unwrap();

    let titles: Vec<_> = output.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Post 1", "Post 2", "Post 3"]);
}
