//! jrpcd: JSON-RPC 2.0 dispatcher over HTTP
//!
//! Serves the built-in method namespaces on a single HTTP endpoint. Any
//! POST path accepts a JSON-RPC request or batch; `GET /health` reports
//! liveness.
//!
//! Usage:
//!   jrpcd                                  # Default port 7080
//!   jrpcd --port 8080                      # Custom port
//!   jrpcd --batch-timeout 30               # Abandon batch work after 30s
//!   jrpcd --no-threaded-batch              # Run batches serially

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use jrpc_dispatch::sample;
use jrpc_protocol::Encoding;
use jrpc_server::{Engine, EngineConfig};
use jrpc_transport::{TransportConfig, TransportServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jrpcd", about = "JSON-RPC 2.0 dispatcher")]
struct Cli {
    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "7080")]
    port: u16,

    /// Hostname to bind to
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// Text encoding of request and response bodies
    #[arg(long, default_value = "utf-8")]
    encoding: Encoding,

    /// Execute every batch serially on the receiving thread
    #[arg(long)]
    no_threaded_batch: bool,

    /// Maximum worker threads per batch
    #[arg(long, default_value = "10")]
    batch_threads_max: usize,

    /// Seconds before outstanding batch work is reported as timed out
    #[arg(long, default_value = "600")]
    batch_timeout: f64,

    /// Largest accepted request body in bytes
    #[arg(long, default_value = "2097152")]
    max_body_bytes: usize,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let batch_timeout = Duration::try_from_secs_f64(self.batch_timeout)
            .map_err(|e| anyhow::anyhow!("invalid --batch-timeout: {e}"))?;
        Ok(EngineConfig {
            encoding: self.encoding,
            threaded_batch: !self.no_threaded_batch,
            batch_threads_max: self.batch_threads_max,
            batch_timeout,
        })
    }

    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            port: self.port,
            hostname: self.hostname.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&cli.log_file, cli.log_json) {
        (Some(path), json) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let builder = builder.with_writer(std::sync::Mutex::new(file)).with_ansi(false);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            eprintln!("Logging to {}", path.display());
        }
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = match cli.engine_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    let registry = match sample::registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to build method registry: {e}");
            std::process::exit(1);
        }
    };

    let engine = match Engine::new(registry, config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid engine configuration: {e}");
            std::process::exit(2);
        }
    };

    info!(
        "Batch execution: threaded={} max_threads={} timeout={:?} encoding={}",
        engine.config().threaded_batch,
        engine.config().batch_threads_max,
        engine.config().batch_timeout,
        engine.config().encoding,
    );

    let mut transport = match TransportServer::start(cli.transport_config(), engine).await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to start transport: {e}");
            std::process::exit(1);
        }
    };

    info!("Serving on http://{}:{}/", cli.hostname, transport.port());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down...");
    transport.stop().await;
}
