use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use chronywatch::config::Settings;
use chronywatch::data::duration::parse_duration;
use chronywatch::server::{self, Dashboard};
use chronywatch::{collect, logging, ClientSource, Collector, FileSource};

#[derive(Parser, Debug)]
#[command(name = "chronywatch")]
#[command(about = "Web dashboard for chrony NTP clients")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides server.listen_addr)
    #[arg(short, long)]
    listen: Option<String>,

    /// Read captured `chronyc clients` output from a file instead of running it
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Command timeout (e.g., "5s", "500ms")
    #[arg(long)]
    timeout: Option<String>,

    /// Collect one report, print it as JSON and exit
    #[arg(long)]
    once: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        settings.server.listen_addr = listen;
    }
    if let Some(timeout) = args.timeout {
        parse_duration(&timeout).with_context(|| format!("Invalid --timeout: {}", timeout))?;
        settings.command.timeout = timeout;
    }

    logging::init(&settings.log.filter, args.verbose)?;

    let source: Arc<dyn ClientSource> = match &args.file {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(settings.command.to_source()?),
    };

    if args.once {
        return run_once(source.as_ref()).await;
    }

    let config = settings.server.to_server_config()?;
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    let dashboard = Arc::new(Dashboard::new(Collector::new(source), &config));
    server::serve(listener, dashboard, async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl-C"),
            // No signal handler means no signal-driven shutdown.
            Err(_) => std::future::pending::<()>().await,
        }
    })
    .await;

    Ok(())
}

/// Collect a single report and print it to stdout.
async fn run_once(source: &dyn ClientSource) -> Result<()> {
    let mut report = collect(source).await;
    report.changed = true;

    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);

    if let Some(error) = report.error {
        bail!("{}", error);
    }
    Ok(())
}
