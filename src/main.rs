use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skycast_core::App;
use skycast_ui::{AppContext, Dashboard, Field, UiEvent};
use tokio_util::sync::CancellationToken;

/// Weather dashboard: look up a place and render its forecast page
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// City name to search for
    #[arg(long)]
    city: Option<String>,

    /// ZIP code to search for, takes precedence over --city
    #[arg(long)]
    zip: Option<String>,

    /// Use the device position instead of the search form
    #[arg(long)]
    locate: bool,

    /// Write the rendered page here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    skycast_core::init()?;

    let app = App::new(args.config.as_deref())?;
    for warning in &app.warnings().warnings {
        eprintln!("warning: {}: {}", warning.field, warning.message);
    }

    let ctx = AppContext::from_config(app.config()).context("Failed to build provider clients")?;
    let dashboard = Dashboard::new(ctx);
    dashboard.start().await;

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let event = if args.locate {
        UiEvent::LocateClicked
    } else {
        for (field, value) in [(Field::City, args.city), (Field::Zip, args.zip)] {
            if let Some(value) = value {
                dashboard
                    .handle(UiEvent::Input { field, value }, &cancel)
                    .await;
            }
        }
        UiEvent::SearchClicked
    };
    tracing::info!("Dispatching {:?}", event);
    dashboard.handle(event, &cancel).await;
    ctrl_c.abort();

    for message in dashboard.take_notifications() {
        eprintln!("{message}");
    }

    let html = dashboard.page().to_html();
    match &args.output {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{html}"),
    }

    app.shutdown();
    Ok(())
}
