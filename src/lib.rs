//! # pagefeed
//!
//! Turns a JavaScript-rendered listing page into an RSS 2.0 or Atom feed.
//!
//! ## Architecture
//!
//! ```text
//! Browser → RenderedDocument → SelectorCascade → ItemExtractor → Normalizer → FeedSynthesizer
//! ```
//!
//! - [`browser`]: headless Chrome rendering via chromiumoxide
//! - [`dom`]: read-only view over the rendered snapshot
//! - [`pipeline`]: candidate resolution, per-item extraction and normalization
//! - [`feed`]: RSS/Atom serialization and validation
//!
//! ## Quick Start
//!
//! ```bash
//! # Render the page and write feed.xml
//! pagefeed generate
//!
//! # Inspect what would be extracted
//! pagefeed extract
//!
//! # Rebuild a feed from a saved page
//! pagefeed convert -i debug-page.html -b https://web.swipeinsight.app/app/for-you
//!
//! # Regenerate every 30 minutes
//! pagefeed watch --interval 30m
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together configuration,
/// the pipeline and diagnostics.
pub mod app;

/// Page rendering.
///
/// - [`PageRenderer`](browser::PageRenderer): Async trait for renderers
/// - [`ChromeRenderer`](browser::ChromeRenderer): chromiumoxide implementation
pub mod browser;

/// Command-line interface using clap.
///
/// - `generate [-o path]` - Render the page and write the feed
/// - `extract` - Print extracted items as JSON
/// - `convert -i page.html` - Build a feed from saved markup
/// - `watch [--interval 1h]` - Regenerate periodically
/// - `config` - Show the effective configuration
pub mod cli;

/// Configuration loaded from `~/.config/pagefeed/config.toml`.
pub mod config;

/// Periodic regeneration for `pagefeed watch`.
pub mod daemon;

/// Failure snapshots (page markup, screenshot, summary).
pub mod diagnostics;

/// Document and node traits over the rendered DOM.
pub mod dom;

/// Core domain models.
///
/// - [`ExtractedItem`](domain::ExtractedItem): One normalized listing entry
/// - [`FeedDocument`](domain::FeedDocument): Synthesized feed ready to serialize
pub mod domain;

/// Feed synthesis and RSS/Atom writers.
pub mod feed;

/// Extraction pipeline and run state machine.
pub mod pipeline;
