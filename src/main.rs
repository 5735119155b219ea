use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use eeg_lib::constants::{DEFAULT_BAUD_RATE, DEFAULT_GAIN, DEFAULT_HANDOFF_CAPACITY, SYNTHETIC_RATE_HZ};
use eeg_lib::port::{self, SourceSelection, SyntheticReason};
use eeg_lib::session::{self, SessionConfig};
use eeg_lib::{EegError, GainStore, SyntheticSource, handoff, run_consumer};
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod output;

use output::OutputFormat;

/// How long producer and consumer get to wind down after Ctrl+C.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Generate synthetic frames instead of reading a serial port
    Mock,
}

/// Streams 8-channel EEG frames from a serial acquisition board, decodes them
/// to volts and serves a small HTTP API for tuning the gain.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pass `mock` to use the synthetic source even if a board is connected.
    #[arg(value_enum)]
    mode: Option<Mode>,
    /// Serial port to open instead of auto-selecting one.
    #[arg(short, long)]
    port: Option<String>,
    /// Serial baud rate.
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Address of the gain control API.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// Frames buffered between reader and decoder before dropping.
    #[arg(long, default_value_t = DEFAULT_HANDOFF_CAPACITY)]
    capacity: usize,
    /// Initial gain.
    #[arg(short, long, default_value_t = DEFAULT_GAIN)]
    gain: f64,
    /// Frame rate of the synthetic source.
    #[arg(long, default_value_t = SYNTHETIC_RATE_HZ, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    rate_hz: u32,
    /// How decoded frames are printed.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
    /// Exit instead of falling back to the synthetic source when no board is found.
    #[arg(long)]
    require_device: bool,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            capacity: self.capacity,
            synthetic_tick: Duration::from_secs_f64(1.0 / self.rate_hz as f64),
            ..SessionConfig::default()
        }
    }
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    // Decoded frames go to stdout, so logs go to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, DEBUG with -v, TRACE with -vv; RUST_LOG still wins
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.clone(), &cli.verbose)?;

    if let Err(e) = run(cli).await {
        error!("Server failed: {:?}", e);
        process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!("EEG server starting...");

    let gain = GainStore::with_gain(cli.gain).context("Invalid initial gain")?;
    let cancel = CancellationToken::new();

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind API server to {}", cli.listen))?;
    let api_task = tokio::spawn(api::serve(listener, gain.clone(), cancel.clone()));

    let selection = choose_source(&cli)?;
    info!("Using {}", selection);

    let config = cli.session_config();
    let (tx, rx) = handoff::channel(config.capacity).context("Invalid handoff capacity")?;

    let producer = match &selection {
        SourceSelection::Serial { port } => {
            info!("Connecting to {} at {} baud...", port, cli.baud);
            let stream = port::open_port(port, cli.baud).with_context(|| format!("Failed to open port {}", port))?;
            session::spawn_reader(stream, tx, cancel.clone(), config)
        }
        SourceSelection::Synthetic { .. } => {
            session::spawn_synthetic(SyntheticSource::new(), tx, cancel.clone(), config)
        }
    };

    let format = cli.output;
    let mut consumer = tokio::spawn(run_consumer(rx, gain.clone(), move |values| format.print(&values)));

    info!("Listening for data... (Press Ctrl+C to stop)");
    let consumer_result = tokio::select! {
        res = signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C, shutting down...");
            None
        }
        res = &mut consumer => {
            warn!("Decode loop ended, shutting down...");
            Some(res)
        }
    };
    cancel.cancel();

    shutdown(producer, consumer, consumer_result, api_task).await;
    info!("Server stopped.");
    Ok(())
}

/// Resolve the `mock` argument, `--port` and the detected ports into a source.
fn choose_source(cli: &Cli) -> Result<SourceSelection> {
    let force_synthetic = cli.mode == Some(Mode::Mock);
    let ports = if force_synthetic || cli.port.is_some() {
        Vec::new()
    } else {
        port::list_ports().context("Failed to list serial ports")?
    };

    if ports.is_empty() {
        info!("No serial ports found");
    } else {
        info!("Available ports:");
        for (i, p) in ports.iter().enumerate() {
            info!(" [{}] {}", i, p);
        }
    }

    let selection = port::select_source(force_synthetic, cli.port.as_deref(), &ports);
    match selection {
        SourceSelection::Synthetic {
            reason: SyntheticReason::NoMatchingPort,
        } if cli.require_device => bail!(EegError::NoDevice),
        SourceSelection::Synthetic {
            reason: SyntheticReason::NoMatchingPort,
        } => warn!("No acquisition board found, switching to synthetic source"),
        SourceSelection::Synthetic {
            reason: SyntheticReason::Requested,
        } => warn!("Manual override: switching to synthetic source"),
        SourceSelection::Serial { .. } => {}
    }
    Ok(selection)
}

/// Wait for the pipeline and the API to stop. `consumer_result` is set when
/// the consumer already finished and its handle must not be polled again.
async fn shutdown(
    producer: JoinHandle<eeg_lib::SessionReport>,
    consumer: JoinHandle<eeg_lib::ConsumerReport>,
    consumer_result: Option<Result<eeg_lib::ConsumerReport, JoinError>>,
    api_task: JoinHandle<std::io::Result<()>>,
) {
    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        match producer.await {
            Ok(report) => info!("{}", report),
            Err(e) => error!("Producer task failed: {}", e),
        }
        let consumer_result = match consumer_result {
            Some(res) => res,
            None => consumer.await,
        };
        match consumer_result {
            Ok(report) => info!("Consumer finished: {}", report),
            Err(e) => error!("Consumer task failed: {}", e),
        }
    })
    .await;
    if drained.is_err() {
        warn!("Pipeline did not stop within {:?}", SHUTDOWN_GRACE);
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, api_task).await {
        Ok(Ok(Err(e))) => error!("API server failed: {}", e),
        Ok(Err(e)) => error!("API task failed: {}", e),
        Err(_) => warn!("API server did not stop within {:?}", SHUTDOWN_GRACE),
        Ok(Ok(Ok(()))) => {}
    }
}
