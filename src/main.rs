//! readynas-stats
//!
//! Polls one metric table from a ReadyNAS and emits it as JSON or to InfluxDB.

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use readynas_snmp::{
    poll_and_emit, AppConfig, Credential, Emitter, InfluxEmitter, JsonEmitter, Metric, SnmpQuery,
};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Output {
    /// Print a JSON array for the Telegraf exec input
    #[default]
    Json,
    /// Write points to InfluxDB
    Influxdb,
}

#[derive(Parser)]
#[command(name = "readynas-stats")]
#[command(about = "Get SNMP statistics from a Netgear ReadyNAS")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Where to send the results
    #[arg(short, long, default_value = "json", value_enum)]
    output: Output,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    #[command(flatten)]
    metric: MetricArgs,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct MetricArgs {
    /// Get disk statistics
    #[arg(short, long)]
    disks: bool,
    /// Get fan statistics
    #[arg(short, long)]
    fans: bool,
    /// Get temperature statistics
    #[arg(short, long)]
    temp: bool,
    /// Get volume statistics
    #[arg(short, long)]
    volumes: bool,
    /// Get interface statistics
    #[arg(short, long)]
    interfaces: bool,
    /// Get device uptime
    #[arg(short, long)]
    uptime: bool,
}

impl MetricArgs {
    fn metric(&self) -> Metric {
        if self.disks {
            Metric::Disks
        } else if self.fans {
            Metric::Fans
        } else if self.temp {
            Metric::Temperature
        } else if self.volumes {
            Metric::Volumes
        } else if self.interfaces {
            Metric::Interfaces
        } else {
            Metric::Uptime
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let metric = cli.metric.metric();

    // Resolve the sink before touching the network
    let mut emitter: Box<dyn Emitter> = match cli.output {
        Output::Json => Box::new(JsonEmitter::stdout(cli.pretty)),
        Output::Influxdb => Box::new(InfluxEmitter::new(config.influx()?.clone())),
    };

    let credential = Credential::build(config.use_v3(), config.secret())?;
    let target = config.get_target();
    info!("Polling {} table from {}", metric.table(), target.address());

    let mut query = SnmpQuery::connect(target, &credential, config.get_timeout())
        .await
        .context("Failed to create SNMP session")?;

    let normalizer = metric.normalizer(config.volume_status);
    let written = poll_and_emit(normalizer.as_ref(), &mut query, emitter.as_mut())
        .await
        .with_context(|| format!("Failed to process {} table", metric.table()))?;

    if !written {
        anyhow::bail!("{} statistics were not written", metric.table());
    }

    Ok(())
}
