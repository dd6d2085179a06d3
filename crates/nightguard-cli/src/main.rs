//! NightGuard CLI - query and command a connected vehicle
//!
//! Reads credentials and the media-type table from a service parameters JSON
//! document, confirms the VIN against the account, then runs one command.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nightguard_client::{ApiClient, Resource, ServiceConfig, UnitSystem, VehicleClient};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "nightguard")]
#[command(author, version, about = "Connected-vehicle API client")]
#[command(propagate_version = true)]
struct Cli {
    /// Service parameters JSON (token, API key, URI, media types)
    #[arg(short, long, env = "NIGHTGUARD_PARAMS")]
    params: Option<PathBuf>,

    /// Vehicle identification number
    #[arg(long, env = "NIGHTGUARD_VIN")]
    vin: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "NIGHTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Unit system for displayed values: metric or imperial
    #[arg(short, long)]
    units: Option<UnitSystem>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the vehicles on the account
    Vehicles,

    /// Show the media type configured for an endpoint (no API call)
    MediaType {
        /// Endpoint name, e.g. doors or commands/lock
        endpoint: String,
    },

    /// Vehicle details such as model and model year
    Details,

    /// Environment values such as external temperature
    Environment,

    /// Brake status, e.g. brake fluid level
    Brakes,

    /// Service status and time/distance to service
    Diagnostics,

    /// Door, hood, tailgate and lock status
    Doors,

    /// Engine running state, oil and coolant
    Engine,

    /// Fuel amount
    Fuel,

    /// Odometer
    Odometer,

    /// Average consumption, speed and trip meters
    Statistics,

    /// Tyre pressure status
    Tyres,

    /// Warnings such as bulb failures
    Warnings,

    /// Window status
    Windows {
        /// Action to invoke after reading, e.g. lock
        #[arg(long)]
        action: Option<String>,
    },

    /// Invoke an action such as lock or unlock
    Action {
        /// Action endpoint name
        name: String,

        /// Fetch the result once if the request is accepted (202)
        #[arg(long)]
        follow: bool,
    },
}

impl Commands {
    /// Telemetry resource read by this command, if it is a plain read
    fn resource(&self) -> Option<Resource> {
        match self {
            Self::Environment => Some(Resource::Environment),
            Self::Brakes => Some(Resource::Brakes),
            Self::Diagnostics => Some(Resource::Diagnostics),
            Self::Doors => Some(Resource::Doors),
            Self::Engine => Some(Resource::Engine),
            Self::Fuel => Some(Resource::Fuel),
            Self::Odometer => Some(Resource::Odometer),
            Self::Statistics => Some(Resource::Statistics),
            Self::Tyres => Some(Resource::Tyres),
            Self::Warnings => Some(Resource::Warnings),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        params: cli.params.as_deref(),
        vin: cli.vin.as_deref(),
        output: cli.output,
        units: cli.units,
        no_color: cli.no_color,
    })?;

    // Create output context
    let ctx = OutputContext::new(merged.output, merged.units, merged.no_color, cli.quiet);

    let service = ServiceConfig::load_from(&merged.params).with_context(|| {
        format!(
            "Failed to load service parameters from {}",
            merged.params.display()
        )
    })?;
    debug!(
        "Loaded {} endpoint mappings from {}",
        service.endpoints().count(),
        merged.params.display()
    );

    // Commands that do not need a confirmed VIN
    match &cli.command {
        Commands::Vehicles => {
            let client = create_client(service)?;
            return commands::vehicles(&client, &ctx).await;
        }
        Commands::MediaType { endpoint } => {
            let client = create_client(service)?;
            return commands::media_type(&client, endpoint, &ctx);
        }
        _ => {}
    }

    let car = connect(service, &merged).await?;

    // Execute command
    match &cli.command {
        Commands::Details => commands::details(&car, &ctx).await?,

        Commands::Windows { action } => commands::windows(&car, action.as_deref(), &ctx).await?,

        Commands::Action { name, follow } => commands::action(&car, name, *follow, &ctx).await?,

        other => {
            if let Some(resource) = other.resource() {
                commands::read(&car, resource, &ctx).await?;
            }
        }
    }

    Ok(())
}

/// Create an API client for the service configuration
fn create_client(service: ServiceConfig) -> Result<ApiClient> {
    ApiClient::new(service).context("Failed to create API client")
}

/// Connect to the configured vehicle, confirming its VIN with the API
async fn connect(service: ServiceConfig, merged: &MergedConfig) -> Result<VehicleClient> {
    let vin = merged.require_vin()?;
    let client = create_client(service)?;
    VehicleClient::with_api(client, vin)
        .await
        .with_context(|| format!("Failed to connect to vehicle {}", vin))
}
