use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chainprobe::config::Config;
use chainprobe::server;

/// TLS certificate chain inspection service.
///
/// Connects to an IP under a chosen hostname, captures the presented
/// certificate chain and reports per-certificate metadata plus an
/// independent chain-validation verdict over HTTP.
#[derive(Parser)]
#[command(name = "chainprobe", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address and port to listen on (overrides config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// TCP connect timeout in seconds (overrides config file)
    #[arg(long)]
    connect_timeout_secs: Option<u64>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.example_config {
        println!("{}", Config::example_toml());
        return;
    }

    let mut config = Config::default();
    if let Some(path) = &cli.config {
        match Config::from_file(path) {
            Ok(file_config) => config = config.merge_with(file_config),
            Err(e) => {
                eprintln!("Failed to load config file {}: {}", path.display(), e);
                exit(1);
            }
        }
    } else if PathBuf::from("chainprobe.toml").exists() {
        if let Ok(file_config) = Config::from_file("chainprobe.toml") {
            config = config.merge_with(file_config);
        }
    }
    config = config.merge_with(Config::from_cli_args(
        cli.listen,
        cli.connect_timeout_secs,
        cli.log_level,
    ));

    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listen = config
        .listen
        .clone()
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());
    let addr: SocketAddr = match listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid listen address '{}': {}", listen, e);
            exit(1);
        }
    };

    let app = server::router(config.connect_timeout());

    info!("Starting server on {}", addr);
    let server = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder.serve(app.into_make_service()),
        Err(e) => {
            // Startup failure (e.g. port already bound) is fatal.
            error!("could not start server: {}", e);
            exit(1);
        }
    };

    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!("server error: {}", e);
        exit(1);
    }
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received, stopping");
}
