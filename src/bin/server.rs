//! paramstore Server Binary
//!
//! Serves a path-keyed parameter service over TCP.

use std::sync::Arc;

use clap::Parser;
use paramstore::config::DEFAULT_ENDPOINT;
use paramstore::demo::demo_parameters;
use paramstore::network::Server;
use paramstore::service::{ParameterService, PathStore, PutParameter};
use paramstore::{path, Config, ParameterType};
use tracing_subscriber::{fmt, EnvFilter};

/// paramstore Server
#[derive(Parser, Debug)]
#[command(name = "paramstore-server")]
#[command(about = "Hierarchical parameter service")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, env = "PARAMSTORE_LISTEN", default_value = DEFAULT_ENDPOINT)]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Page size for path queries that do not ask for one
    #[arg(long, default_value = "10")]
    page_size: u32,

    /// Preload the demo parameters under ortelius/dev and ortelius/prod
    #[arg(long)]
    seed_demo: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paramstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("paramstore server v{}", paramstore::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .default_page_size(args.page_size)
        .build();

    let store = Arc::new(PathStore::with_page_limits(
        config.default_page_size,
        config.max_page_size,
    ));

    if args.seed_demo {
        if let Err(e) = seed_demo(&store) {
            tracing::error!("Failed to seed demo parameters: {}", e);
            std::process::exit(1);
        }
        tracing::info!("Seeded {} demo parameters", store.len());
    }

    let server = match Server::bind(config, store) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

fn seed_demo(store: &PathStore) -> paramstore::Result<()> {
    for (namespace, parameter) in demo_parameters() {
        store.put_parameter(&PutParameter {
            name: path::encode(namespace, &parameter.name)?,
            value: parameter.value,
            parameter_type: ParameterType::from_secure(parameter.is_secure),
            overwrite: false,
            expected_version: None,
        })?;
    }
    Ok(())
}
