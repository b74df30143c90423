use clap::Parser;
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, ConfigError};

#[derive(Parser)]
#[command(name = "framed", about = "Version tracking API for the Framed app")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short)]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not initialize metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_statsd::StatsdError),
    #[error("could not install metrics recorder: {0}")]
    Recorder(#[from] metrics::SetRecorderError<metrics_exporter_statsd::StatsdRecorder>),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Serve(#[from] edge::EdgeError),
}

fn init_metrics(config: &config::MetricsConfig) -> Result<(), StartupError> {
    let recorder = StatsdBuilder::from(&config.statsd_host, config.statsd_port)
        .build(Some("framed"))?;
    metrics::set_global_recorder(recorder)?;
    shared::metrics_defs::describe_all(edge::metrics_defs::ALL_METRICS);

    Ok(())
}

fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    // Guard must stay alive for the lifetime of the process or events stop
    // being delivered.
    let _sentry_guard = config
        .common
        .logging
        .as_ref()
        .and_then(|logging| logging.sentry_dsn.clone())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    tracing::info!(
        host = %config.edge.listener.host,
        port = config.edge.listener.port,
        "starting framed edge service"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(edge::run(config.edge))?;

    Ok(())
}
