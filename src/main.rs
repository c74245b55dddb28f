//! Tentaclio CLI - URL-addressed access to data resources
//!
//! Run `tentaclio --help` for usage information.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tentaclio::client::ResourceClient;
use tentaclio::config::{Config, LogFormat, DEFAULT_CONFIG_TEMPLATE};
use tentaclio::CredentialsInjector;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "tentaclio",
    about = "Read, write and list data resources by URL with credentials injected from the environment",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Reject URLs whose scheme has no registered handler
    #[arg(long, global = true)]
    strict_schemes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Resource(ResourceCommand),

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Commands that need registered credentials
#[derive(Subcommand)]
enum ResourceCommand {
    /// Print a URL with the matching registered credentials merged in
    #[command(alias = "auth")]
    Authenticate {
        /// Resource URL
        url: String,

        /// Print the password in clear instead of redacted
        #[arg(long)]
        show_secrets: bool,
    },

    /// List registered credentials (passwords redacted)
    Credentials {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Write a resource to stdout
    Cat {
        /// Resource URL
        url: String,
    },

    /// Write stdin to a resource
    Put {
        /// Resource URL
        url: String,
    },

    /// List the resources under a URL
    Ls {
        /// Resource URL
        url: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Copy a resource
    Cp {
        /// Source URL
        source: String,

        /// Destination URL
        destination: String,
    },

    /// Remove a resource
    Rm {
        /// Resource URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path).await?
    } else {
        let default_path = Config::default_path();
        if default_path.exists() {
            Config::load(&default_path).await?
        } else {
            Config::default()
        }
    };

    // Setup logging
    let log_level = match cli.verbose {
        0 => config.logging.level.parse().unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so `cat` output stays clean
    let (json_layer, pretty_layer) = match config.logging.format {
        LogFormat::Json => (Some(fmt::layer().json().with_writer(std::io::stderr)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(pretty_layer)
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    // Execute command
    match cli.command {
        Commands::Init { force } => {
            init_config(force).await?;
        }
        Commands::Resource(command) => {
            let injector = Arc::new(CredentialsInjector::load(&config.credentials)?);
            let mut client = ResourceClient::with_defaults(injector);
            if cli.strict_schemes {
                client = client.with_scheme_validation();
            }
            run_command(&client, command).await?;
        }
    }

    Ok(())
}

async fn run_command(
    client: &ResourceClient,
    command: ResourceCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ResourceCommand::Authenticate { url, show_secrets } => {
            let url = client.authenticate(&url)?;
            if show_secrets {
                println!("{}", url.as_str());
            } else {
                println!("{}", url);
            }
        }
        ResourceCommand::Credentials { format } => {
            list_credentials(client.injector(), &format)?;
        }
        ResourceCommand::Cat { url } => {
            let data = client.read(&url).await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
        ResourceCommand::Put { url } => {
            let mut data = Vec::new();
            tokio::io::stdin().read_to_end(&mut data).await?;
            client.write(&url, &data).await?;
            info!(bytes = data.len(), "Wrote resource");
        }
        ResourceCommand::Ls { url, format } => {
            let entries = client.scan(&url).await?;
            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                _ => {
                    for entry in entries {
                        let size = entry
                            .size
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        let kind = if entry.is_dir { "dir" } else { "file" };
                        println!("{:<5} {:>12} {}", kind, size, entry.url);
                    }
                }
            }
        }
        ResourceCommand::Cp {
            source,
            destination,
        } => match client.copy(&source, &destination).await? {
            Some(bytes) => println!("Copied {} bytes", bytes),
            None => println!("Copied"),
        },
        ResourceCommand::Rm { url } => {
            client.remove(&url).await?;
        }
    }

    Ok(())
}

/// List registered credentials
fn list_credentials(
    injector: &CredentialsInjector,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if injector.is_empty() {
        println!("No credentials registered");
        return Ok(());
    }

    match format {
        "json" => {
            let listing: Vec<_> = injector
                .schemes()
                .into_iter()
                .flat_map(|scheme| injector.credentials_for(scheme))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        _ => {
            // Table format
            println!("{:<10} {:<30} {:<20} {}", "SCHEME", "HOST", "USER", "URL");
            println!("{}", "-".repeat(90));
            for scheme in injector.schemes() {
                for url in injector.credentials_for(scheme) {
                    println!(
                        "{:<10} {:<30} {:<20} {}",
                        scheme,
                        url.hostname().unwrap_or("-"),
                        url.username().unwrap_or("-"),
                        url
                    );
                }
            }
        }
    }

    Ok(())
}

/// Write the default configuration file
async fn init_config(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        return Err(format!(
            "Configuration already exists at {}. Use --force to overwrite.",
            config_path.display()
        )
        .into());
    }

    // Create config directory
    if let Some(parent) = config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE).await?;

    println!("Configuration initialized at {}", config_path.display());
    Ok(())
}
