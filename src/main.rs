//! `grpc-config`: inspect and exercise gRPC per-target configuration files.
//!
//! ```text
//! grpc-config check   <file>
//! grpc-config resolve <file> <uri>... [--client]
//! grpc-config watch   <file> [--uri <uri>]... [--client]
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use grpc_service_config::config::{ConfigError, ConfigWatcher, load_config, read_config};
use grpc_service_config::lifecycle::{Shutdown, wait_for_signal};
use grpc_service_config::observability::{logging, metrics};
use grpc_service_config::{ConfigRegistry, GrpcConfigService};

#[derive(Parser)]
#[command(name = "grpc-config")]
#[command(about = "Resolve per-target gRPC settings from a configuration file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Check { file: PathBuf },
    /// Print the merged settings for each URI
    Resolve {
        file: PathBuf,
        #[arg(required = true)]
        uris: Vec<String>,
        /// Resolve against client entries instead of service entries
        #[arg(long)]
        client: bool,
    },
    /// Apply the file and re-apply it whenever it changes
    Watch {
        file: PathBuf,
        /// URIs to re-resolve after every reload
        #[arg(long = "uri")]
        uris: Vec<String>,
        #[arg(long)]
        client: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Resolve { file, uris, client } => resolve(&file, &uris, client),
        Commands::Watch { file, uris, client } => watch(&file, uris, client).await,
    }
}

fn check(file: &Path) -> Result<(), Box<dyn Error>> {
    logging::init_logging("warn");

    match load_config(file) {
        Ok(config) => {
            println!(
                "{}: ok ({} service entries, {} client entries)",
                file.display(),
                config.services.len(),
                config.clients.len()
            );
            Ok(())
        }
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{}: {} problem(s)", file.display(), errors.len());
            for e in &errors {
                eprintln!("  - {}", e);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn resolve(file: &Path, uris: &[String], client: bool) -> Result<(), Box<dyn Error>> {
    let config = read_config(file)?;
    logging::init_logging(&config.observability.log_level);

    let service = GrpcConfigService::new();
    service.apply(config);

    let registry = pick(&service, client);
    println!("{}", serde_json::to_string_pretty(&resolve_all(&registry, uris))?);
    Ok(())
}

async fn watch(file: &Path, uris: Vec<String>, client: bool) -> Result<(), Box<dyn Error>> {
    let config = read_config(file)?;
    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = GrpcConfigService::new();
    service.apply(config);

    let registry = pick(&service, client);
    let print = |registry: &ConfigRegistry| {
        if !uris.is_empty() {
            match serde_json::to_string_pretty(&resolve_all(registry, &uris)) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to render resolution: {}", e),
            }
        }
    };
    print(&registry);

    let (watcher, updates) = ConfigWatcher::new(file);
    let _watch_handle = watcher.run()?;

    let shutdown = Shutdown::new();
    let reload_shutdown = shutdown.subscribe();

    let reload = service.run(updates, reload_shutdown, |_| print(&registry));

    tokio::pin!(reload);
    tokio::select! {
        _ = &mut reload => {}
        _ = wait_for_signal() => {
            shutdown.trigger();
            reload.await;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn pick(service: &GrpcConfigService, client: bool) -> std::sync::Arc<ConfigRegistry> {
    if client { service.clients() } else { service.services() }
}

fn resolve_all(registry: &ConfigRegistry, uris: &[String]) -> Value {
    let mut out = Map::new();
    for uri in uris {
        let value = match registry.resolve(uri) {
            Some(props) => serde_json::to_value(&*props).unwrap_or(Value::Null),
            None => Value::Null,
        };
        out.insert(uri.clone(), value);
    }
    Value::Object(out)
}
