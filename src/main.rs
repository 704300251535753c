use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use objectivity_worker::{
    app::{ComponentRegistry, build_router},
    clients::HttpFeedClient,
    config::Config,
    observability::Telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(String::as_str)
            })
            .unwrap_or("unknown panic payload");

        if let Some(location) = panic_info.location() {
            error!(
                thread = thread_name,
                file = location.file(),
                line = location.line(),
                column = location.column(),
                message,
                "panic occurred"
            );
        } else {
            error!(
                thread = thread_name,
                message, "panic occurred without location information"
            );
        }
    }));

    let config = Config::from_env().context("failed to load configuration")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("report") => print_report(config, &args[1..]).await,
        Some(other) => bail!("unknown command '{other}'; usage: objectivity-worker [serve | report <handle> [limit]]"),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let bind_addr = config.http_bind();
    let registry = ComponentRegistry::build(config).context("failed to build component registry")?;
    let router = build_router(registry);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {bind_addr}"))?;

    info!(%bind_addr, "listening");

    if let Err(error) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        warn!(error = %error, "server exited with error");
    }

    info!("server shutdown complete");
    Ok(())
}

/// One-shot report on stdout. Logging stays off so the output is pure JSON.
async fn print_report(config: Config, args: &[String]) -> anyhow::Result<()> {
    let Some(handle) = args.first() else {
        bail!("usage: objectivity-worker report <handle> [limit]");
    };
    let limit = args
        .get(1)
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("limit must be a positive integer")?;

    let feed = Arc::new(
        HttpFeedClient::new(config.feed_client_config())
            .context("failed to build feed gateway client")?,
    );
    let telemetry = Telemetry::metrics_only()?;
    let registry = ComponentRegistry::with_feed(config, telemetry, feed)
        .context("failed to build component registry")?;

    let report = registry
        .report(handle, limit)
        .await
        .with_context(|| format!("failed to build report for {handle}"))?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Waits for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(error = %error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("received SIGTERM, initiating graceful shutdown"),
    }
}
