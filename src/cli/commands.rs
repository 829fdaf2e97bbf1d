use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info};
use url::Url;

use crate::app::{AppContext, PagefeedError, Result};
use crate::browser::{PageRenderer, RenderedPage};
use crate::config::Config;
use crate::domain::FeedDocument;
use crate::feed;
use crate::pipeline::{RunAborted, RunOutput};

/// Render the source page and write the feed.
pub async fn generate(
    ctx: &AppContext,
    renderer: &dyn PageRenderer,
    output: Option<&Path>,
) -> Result<()> {
    let output_path = output.unwrap_or(&ctx.config.output.path);
    let run = produce(ctx, renderer).await?;
    let bytes = write_feed(ctx, &run.feed, output_path)?;

    println!(
        "Feed written to {} ({} entries, {:.2} KB)",
        output_path.display(),
        run.feed.len(),
        bytes as f64 / 1024.0
    );
    Ok(())
}

/// Render the source page and print the normalized items as JSON.
pub async fn extract(ctx: &AppContext, renderer: &dyn PageRenderer) -> Result<()> {
    let page = render_page(ctx, renderer).await?;
    let output = match ctx.extract_page(&page) {
        Ok(output) => output,
        Err(aborted) => return Err(fail(ctx, aborted, Some(&page))),
    };

    println!("{}", serde_json::to_string_pretty(&output.items)?);
    Ok(())
}

/// Build a feed from a saved HTML file instead of a live page.
///
/// Diagnostics are not captured here; the input usually is a previous dump.
pub fn convert(
    ctx: &AppContext,
    input: &Path,
    base_url: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let markup = fs::read_to_string(input)?;
    let url = match base_url {
        Some(raw) => Url::parse(raw)?,
        None => ctx.source_url.clone(),
    };
    let page = RenderedPage {
        url,
        markup,
        ready: true,
        screenshot: None,
    };

    let run = ctx.run_page(&page, Utc::now()).map_err(|aborted| {
        error!("{}", aborted);
        PagefeedError::from(aborted)
    })?;

    let output_path = output.unwrap_or(&ctx.config.output.path);
    write_feed(ctx, &run.feed, output_path)?;
    println!(
        "Converted {} into {} ({} entries)",
        input.display(),
        output_path.display(),
        run.feed.len()
    );
    Ok(())
}

/// Print where the configuration comes from and its effective values.
pub fn show_config(ctx: &AppContext, path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path()?,
    };
    let rendered =
        toml::to_string_pretty(&ctx.config).map_err(|e| PagefeedError::Other(e.to_string()))?;

    println!("# {}\n", path.display());
    println!("{}", rendered);
    Ok(())
}

/// Await a renderer launch. A failed launch aborts the run as an unavailable
/// document, with diagnostics captured like any other load failure.
pub async fn launch<R, F>(ctx: &AppContext, launching: F) -> Result<R>
where
    R: PageRenderer,
    F: Future<Output = Result<R>>,
{
    launching.await.map_err(|e| {
        let aborted = RunAborted::document_unavailable(ctx.source_url.as_str(), e.to_string());
        fail(ctx, aborted, None)
    })
}

/// Load the page and run the pipeline, capturing diagnostics on failure.
pub async fn produce(ctx: &AppContext, renderer: &dyn PageRenderer) -> Result<RunOutput> {
    let page = render_page(ctx, renderer).await?;
    ctx.run_page(&page, Utc::now())
        .map_err(|aborted| fail(ctx, aborted, Some(&page)))
}

/// Serialize, validate and atomically write `feed`. Returns the byte size.
pub fn write_feed(ctx: &AppContext, feed: &FeedDocument, path: &Path) -> Result<usize> {
    let format = ctx.config.output.format;
    let xml = feed.render(format)?;
    feed::validate(&xml, feed.len())?;

    write_atomic(path, xml.as_bytes())?;
    info!(
        "Wrote {} feed with {} entries to {}",
        format,
        feed.len(),
        path.display()
    );
    Ok(xml.len())
}

async fn render_page(ctx: &AppContext, renderer: &dyn PageRenderer) -> Result<RenderedPage> {
    let page = match renderer.render(&ctx.source_url, ctx.ready_selectors()).await {
        Ok(page) => page,
        Err(e) => {
            let aborted = RunAborted::document_unavailable(ctx.source_url.as_str(), e.to_string());
            return Err(fail(ctx, aborted, None));
        }
    };

    if !page.ready {
        let aborted = RunAborted::document_unavailable(
            page.url.as_str(),
            format!(
                "no candidate selector appeared within {}s",
                ctx.config.browser.ready_timeout_secs
            ),
        );
        return Err(fail(ctx, aborted, Some(&page)));
    }

    Ok(page)
}

fn fail(ctx: &AppContext, aborted: RunAborted, page: Option<&RenderedPage>) -> PagefeedError {
    error!("{}", aborted);
    ctx.diagnostics.capture(&aborted, page);
    aborted.into()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(path).with_file_name(tmp_name);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
