use anyhow::{Context, Result};
use clap::Parser;

use postfix_exporter::cli::Args;
use postfix_exporter::export::export_to_file;
use postfix_exporter::{logging, MetricsServer, QueueCollector, Sampler, Settings, SnapshotStore};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(&args).context("failed to load settings")?;
    logging::init(settings.level());

    let store = SnapshotStore::new();
    let sampler = Sampler::builder(&settings.spool_path, store.clone())
        .interval(settings.interval())
        .build();

    // Handle export mode (non-interactive)
    if let Some(path) = &args.export {
        export_to_file(&sampler, path)
            .with_context(|| format!("failed to export snapshot to {}", path.display()))?;
        println!("Exported spool snapshot to: {}", path.display());
        return Ok(());
    }

    let server = MetricsServer::bind(&settings.listen_addr, settings.metrics_path.clone())
        .await
        .context("cannot start metrics endpoint")?;

    tracing::info!(
        addr = %server.local_addr()?,
        spool = %settings.spool_path.display(),
        interval_secs = settings.interval_secs,
        "Listening on {}",
        settings.listen_addr
    );

    let sampler = sampler.start();

    tokio::select! {
        () = server.serve(QueueCollector::new(store)) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            tracing::info!("Shutting down");
        }
    }

    sampler.stop();
    Ok(())
}
