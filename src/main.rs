use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aprs_tracker::aprs::{EncodingMode, Login};
use aprs_tracker::config::{ServerEndpoint, TrackerConfig};
use aprs_tracker::position::{DestinationTarget, GeoFix};
use aprs_tracker::session::{Connector, SessionManager, StdoutConnector, TcpConnector};
use aprs_tracker::tracking::{ReplaySource, TrackingController, spawn_feed};

#[derive(Parser, Debug)]
#[command(name = "aprs-tracker")]
#[command(about = "Report GPS position to APRS-IS", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Station callsign with optional SSID (overrides config)
    #[arg(long)]
    callsign: Option<String>,

    /// APRS-IS passcode (overrides config)
    #[arg(long)]
    passcode: Option<String>,

    /// APRS-IS server as host[:port] (overrides config)
    #[arg(short = 's', long)]
    server: Option<ServerEndpoint>,

    /// Destination for distance reports, e.g. "28.5383, -81.3792"
    #[arg(short = 'd', long)]
    destination: Option<DestinationTarget>,

    /// Packet layout: realtime, timestamped-default, timestamped-destination
    #[arg(short = 'm', long, value_enum)]
    mode: Option<EncodingMode>,

    /// Report interval in seconds (overrides config)
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// Newline-delimited JSON fixes; "-" reads stdin
    #[arg(short = 'f', long, default_value = "-")]
    fixes: String,

    /// Seconds to wait between replayed fixes (default: 0 for stdin, else
    /// the report interval)
    #[arg(long)]
    pace: Option<f64>,

    /// Print packets to stdout instead of connecting
    #[arg(long)]
    dry_run: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };
    apply_overrides(&mut config, &args);
    if args.dry_run {
        // Never echo a real passcode to stdout
        config.station.passcode = "-1".to_string();
    }
    config.validate()?;

    log::info!("Callsign: {}", config.station.callsign);
    log::info!("Server: {}", config.server.endpoint());
    log::info!(
        "Interval: {}s, mode: {:?}",
        config.report.interval_secs,
        config.report.mode
    );
    if let Some(destination) = &config.destination {
        log::info!("Destination: {}", destination);
    }

    let fixes = if args.fixes == "-" {
        let pace = pace_duration(args.pace.unwrap_or(0.0))?;
        spawn_feed(ReplaySource::stdin(), pace).0
    } else {
        let pace = match args.pace {
            Some(secs) => pace_duration(secs)?,
            None => config.report.interval(),
        };
        spawn_feed(ReplaySource::open(&args.fixes)?, pace).0
    };

    if args.dry_run {
        run(&config, StdoutConnector, fixes);
    } else {
        run(&config, TcpConnector::from_config(&config.server), fixes);
    }

    Ok(())
}

/// Negative paces mean "no delay"; NaN, infinite and overlong values are rejected.
fn pace_duration(secs: f64) -> anyhow::Result<Duration> {
    let clamped = if secs < 0.0 { 0.0 } else { secs };
    Duration::try_from_secs_f64(clamped)
        .with_context(|| format!("invalid --pace value: {}", secs))
}

fn apply_overrides(config: &mut TrackerConfig, args: &Args) {
    if let Some(callsign) = &args.callsign {
        config.station.callsign = callsign.clone();
    }
    if let Some(passcode) = &args.passcode {
        config.station.passcode = passcode.clone();
    }
    if let Some(server) = &args.server {
        config.server.host = server.host.clone();
        config.server.port = server.port;
    }
    if let Some(destination) = args.destination {
        config.destination = Some(destination);
    }
    if let Some(mode) = args.mode {
        config.report.mode = mode;
    }
    if let Some(interval) = args.interval {
        config.report.interval_secs = interval;
    }
}

fn run<C: Connector + 'static>(config: &TrackerConfig, connector: C, fixes: Receiver<GeoFix>) {
    let login = Login::new(&config.station, &config.software);
    let session = Arc::new(SessionManager::new(
        connector,
        config.server.endpoint(),
        login,
    ));

    let controller = TrackingController::new(config, Arc::clone(&session));
    controller.spawn(fixes).wait();

    let stats = session.stats();
    eprintln!(
        "Sent {} packets over {} connections ({} failures)",
        stats.packets_sent, stats.connections, stats.failures
    );
}
