// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relayhub - a multi-tenant messaging hub.
//!
//! This is the binary entry point for the hub server.

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relayhub_config::HubConfig;

/// Relayhub - a multi-tenant messaging hub.
#[derive(Parser, Debug)]
#[command(name = "relayhub", version, about, long_about = None)]
struct Cli {
    /// Path to a specific config file (skips the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the hub server.
    Serve,
    /// Load, validate, and print the resolved configuration.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<HubConfig, ()> {
    let result = match path {
        Some(path) => relayhub_config::load_config_from_path(path)
            .map_err(|e| {
                vec![relayhub_config::ConfigError::Other(e.to_string())]
            })
            .and_then(|config| {
                relayhub_config::validation::validate_config(&config).map(|()| config)
            }),
        None => relayhub_config::load_and_validate(),
    };

    match result {
        Ok(config) => Ok(config),
        Err(errors) => {
            relayhub_config::render_errors(&errors);
            Err(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let Ok(config) = load_config(cli.config.as_ref()) else {
        std::process::exit(1);
    };

    match cli.command {
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("relayhub: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!("hub.name             = {}", config.hub.name);
            println!("hub.log_level        = {}", config.hub.log_level);
            println!("server               = {}:{}", config.server.host, config.server.port);
            println!("storage.database     = {}", config.storage.database_path);
            println!("storage.wal_mode     = {}", config.storage.wal_mode);
            println!("telegram.api_base    = {}", config.telegram.api_base);
            println!("telegram.timeout     = {}s", config.telegram.request_timeout_secs);
            println!("dispatch.timeout     = {}s", config.dispatch.send_timeout_secs);
            println!("auth.operators       = {} configured", config.auth.operators.len());
            println!("config OK");
        }
    }
}
