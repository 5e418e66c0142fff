use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::actions::{ExecutionContext, ProcessExecutor};
use crate::config::{self, Config};
use crate::devices::{self, DeviceListError};
use crate::server::{simctl_router, Server};

use super::exit_codes;

#[derive(Parser)]
#[command(name = "simctl-bridge")]
#[command(about = "Run simctl commands on the host on behalf of apps in the iOS Simulator")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides SIMCTL_BRIDGE_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server and serve until Ctrl-C
    StartServer {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Log every simctl command and its outcome
        #[arg(short, long)]
        verbose: bool,
    },

    /// List available simulator devices
    ListDevices {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Show the default configuration
    Default,
    /// Verify configuration file for errors
    Verify,
}

impl Cli {
    /// whether this invocation runs the long-lived server
    pub fn is_server(&self) -> bool {
        matches!(self.command, Commands::StartServer { .. })
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::StartServer { port, verbose } => {
            let config = load_config(config_path);
            let addr = config.listen_addr(port)?;
            let verbose = verbose || config.server.verbose;
            let ctx = Arc::new(ExecutionContext::new(config.tool, verbose));

            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(serve(addr, ctx))
        }

        Commands::ListDevices { json } => {
            let config = load_config(config_path);
            let devices = match devices::list(&config.tool, &ProcessExecutor) {
                Ok(devices) => devices,
                Err(e @ DeviceListError::Exec(_)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(exit_codes::TOOL_FAILED);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                let json = serde_json::to_string_pretty(&devices)
                    .context("Failed to serialize devices")?;
                println!("{}", json);
            } else {
                for device in &devices {
                    println!("{}", device);
                }
            }
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(config_path);
                let json =
                    serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", json);
                Ok(())
            }
            ConfigCommands::Path => {
                let path = config::resolve_path(config_path)?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommands::Default => {
                let json = serde_json::to_string_pretty(&Config::default())
                    .context("Failed to serialize config")?;
                println!("{}", json);
                Ok(())
            }
            ConfigCommands::Verify => {
                let path = config::resolve_path(config_path)?;
                let errors = match config::verify(&path) {
                    Ok(errors) => errors,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(exit_codes::CONFIG_ERROR);
                    }
                };

                if errors.is_empty() {
                    println!("✓ Configuration is valid: {}", path.display());
                    Ok(())
                } else {
                    println!(
                        "✗ Configuration has {} error(s): {}",
                        errors.len(),
                        path.display()
                    );
                    println!();
                    for error in &errors {
                        println!("  - {}", error);
                    }
                    Err(anyhow!("configuration validation failed"))
                }
            }
        },
    }
}

/// load config or exit with CONFIG_ERROR
fn load_config(path: Option<&Path>) -> Config {
    match config::load_from(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    }
}

async fn serve(addr: SocketAddr, ctx: Arc<ExecutionContext>) -> Result<()> {
    let router = simctl_router(ctx)?;
    let handle = match Server::bind(addr, router).await {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: failed to listen on {}: {}", addr, e);
            if e.kind() == ErrorKind::AddrInUse {
                eprintln!("Another process is using port {}; pick one with --port", addr.port());
            }
            std::process::exit(exit_codes::BIND_FAILED);
        }
    };

    info!("press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("shutdown requested");
    handle.stop().await.context("server exited with an error")?;
    Ok(())
}
