use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pagefeed::app::{AppContext, PagefeedError};
use pagefeed::browser::{ChromeRenderer, PageRenderer};
use pagefeed::cli::{commands, Cli, Commands};
use pagefeed::daemon::{WatchConfig, Watcher};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Generate { output } => match launch_browser(&ctx).await {
            Ok(mut renderer) => {
                let result = commands::generate(&ctx, &renderer, output.as_deref()).await;
                shutdown(&mut renderer).await;
                result
            }
            Err(e) => Err(e),
        },
        Commands::Extract => match launch_browser(&ctx).await {
            Ok(mut renderer) => {
                let result = commands::extract(&ctx, &renderer).await;
                shutdown(&mut renderer).await;
                result
            }
            Err(e) => Err(e),
        },
        Commands::Convert {
            input,
            base_url,
            output,
        } => commands::convert(&ctx, &input, base_url.as_deref(), output.as_deref()),
        Commands::Watch {
            interval,
            no_initial_run,
        } => {
            let interval_secs = WatchConfig::parse_interval(&interval).map_err(anyhow::Error::msg)?;
            let config = WatchConfig {
                interval_secs,
                run_on_start: !no_initial_run,
            };
            match launch_browser(&ctx).await {
                Ok(mut renderer) => {
                    let result = Watcher::new(&ctx, &renderer, config).run().await;
                    shutdown(&mut renderer).await;
                    result
                }
                Err(e) => Err(e),
            }
        }
        Commands::Config => commands::show_config(&ctx, cli.config.as_deref()),
    };

    exit_code(result)
}

async fn launch_browser(ctx: &AppContext) -> Result<ChromeRenderer, PagefeedError> {
    commands::launch(ctx, ChromeRenderer::launch(ctx.config.browser.clone())).await
}

async fn shutdown(renderer: &mut ChromeRenderer) {
    if let Err(e) = renderer.close().await {
        warn!("Failed to close browser: {}", e);
    }
}

fn exit_code(result: Result<(), PagefeedError>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already logged and captured
        Err(e) if e.is_run_failure() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e.into()),
    }
}
