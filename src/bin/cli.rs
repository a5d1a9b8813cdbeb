//! dqdash CLI
//!
//! Command-line front end for the dqdash API:
//! - Manage datasets and connections
//! - Run validations
//! - Browse and export results

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use dqdash::client::{ClientConfig, DashboardClient};
use dqdash::model::{DatasetKind, NewConnection, ValidationRequest, ValidationResult};

#[derive(Parser)]
#[command(name = "dqdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Data quality dashboard client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (default: $DQDASH_API_URL or http://localhost:8000)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show API status
    Status,

    /// Manage uploaded datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetCommands,
    },

    /// Manage database connections
    Connections {
        #[command(subcommand)]
        action: ConnectionCommands,
    },

    /// Run a validation
    Validate {
        /// Dataset file name, or connection name for database runs
        dataset: String,
        /// Check document file
        #[arg(short, long)]
        config: PathBuf,
        /// Dataset type (csv, database)
        #[arg(short = 't', long = "type", default_value = "csv")]
        kind: String,
    },

    /// Browse validation results
    Results {
        #[command(subcommand)]
        action: ResultCommands,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// List datasets
    List,
    /// Upload a CSV file
    Upload { path: PathBuf },
    /// Delete a dataset
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    /// List connections
    List,
    /// Register a connection
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "5432")]
        port: u16,
        #[arg(long)]
        database: String,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Delete a connection
    Delete { id: u32 },
}

#[derive(Subcommand)]
pub enum ResultCommands {
    /// List results, oldest first
    List,
    /// Show one result
    Show { id: String },
    /// Export a result (JSON by default)
    Export {
        id: String,
        /// Export checks as CSV instead
        #[arg(long)]
        csv: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::resolve(cli.api_url.clone());
    let json = cli.format == "json";

    let client = DashboardClient::new(config)?;

    match cli.command {
        Commands::Status => {
            let health = client.health().await?;
            if json {
                return print_json(&health);
            }
            println!("dqdash v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API Status: {}", health.status);
            println!("Server version: {}", health.version);
            println!("Uploads: {}", health.uploads);
            println!(
                "History: {} ({}, {} results)",
                health.history, health.results_backend, health.results
            );
            println!("Connections: {}", health.connections);
            println!();
            println!("Uptime: {}", format_duration(health.uptime_seconds));
        }

        Commands::Datasets { action } => match action {
            DatasetCommands::List => {
                let datasets = client.list_datasets().await?;
                if json {
                    return print_json(&datasets);
                }
                if datasets.is_empty() {
                    println!("No datasets uploaded yet.");
                    return Ok(());
                }
                println!(
                    "{:<30} {:>10} {:>8} {:>8} {}",
                    "Name", "Size", "Rows", "Columns", "Date"
                );
                println!("{}", "-".repeat(72));
                for d in datasets {
                    println!(
                        "{:<30} {:>10} {:>8} {:>8} {}",
                        d.name, d.size, d.rows, d.columns, d.date
                    );
                }
            }
            DatasetCommands::Upload { path } => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .with_context(|| format!("{} is not a file", path.display()))?;
                let contents = std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?;

                let dataset = client.upload_dataset(&filename, contents).await?;
                if json {
                    return print_json(&dataset);
                }
                println!(
                    "Uploaded {} ({} rows, {} columns, {})",
                    dataset.name, dataset.rows, dataset.columns, dataset.size
                );
            }
            DatasetCommands::Delete { name } => {
                let ack = client.delete_dataset(&name).await?;
                println!("{}", ack.message);
            }
        },

        Commands::Connections { action } => match action {
            ConnectionCommands::List => {
                let connections = client.list_connections().await?;
                if json {
                    return print_json(&connections);
                }
                if connections.is_empty() {
                    println!("No connections registered yet.");
                    return Ok(());
                }
                println!(
                    "{:<4} {:<20} {:<25} {:<6} {}",
                    "ID", "Name", "Host", "Port", "Database"
                );
                println!("{}", "-".repeat(72));
                for c in connections {
                    println!(
                        "{:<4} {:<20} {:<25} {:<6} {}",
                        c.id, c.name, c.host, c.port, c.database
                    );
                }
            }
            ConnectionCommands::Add {
                name,
                host,
                port,
                database,
                username,
                password,
            } => {
                let form = NewConnection::new(name, host, database, username)
                    .port(port)
                    .password(password);
                let connection = client.create_connection(&form).await?;
                if json {
                    return print_json(&connection);
                }
                println!(
                    "Registered connection {} ({}@{}:{})",
                    connection.id, connection.database, connection.host, connection.port
                );
            }
            ConnectionCommands::Delete { id } => {
                let ack = client.delete_connection(id).await?;
                println!("{}", ack.message);
            }
        },

        Commands::Validate {
            dataset,
            config,
            kind,
        } => {
            let kind: DatasetKind = kind.parse().map_err(anyhow::Error::msg)?;
            let document = std::fs::read_to_string(&config)
                .with_context(|| format!("reading {}", config.display()))?;

            let result = client
                .run_validation(&ValidationRequest::new(dataset, document, kind))
                .await?;
            if json {
                return print_json(&result);
            }
            print_result(&result);
        }

        Commands::Results { action } => match action {
            ResultCommands::List => {
                let results = client.list_results().await?;
                if json {
                    return print_json(&results);
                }
                if results.is_empty() {
                    println!("No validation runs yet.");
                    return Ok(());
                }
                println!(
                    "{:<36} {:<25} {:<20} {:>6} {:>6} {:>6}",
                    "ID", "Dataset", "Timestamp", "Pass", "Warn", "Fail"
                );
                println!("{}", "-".repeat(104));
                for r in results {
                    println!(
                        "{:<36} {:<25} {:<20} {:>6} {:>6} {:>6}",
                        r.id,
                        r.dataset,
                        r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        r.summary.passed,
                        r.summary.warnings,
                        r.summary.failed
                    );
                }
            }
            ResultCommands::Show { id } => {
                let result = client.get_result(&id).await?;
                if json {
                    return print_json(&result);
                }
                print_result(&result);
            }
            ResultCommands::Export { id, csv, output } => {
                let body = if csv {
                    client.export_csv(&id).await?
                } else {
                    client.export_json(&id).await?
                };
                write_output(output.as_ref(), &body)?;
            }
        },

        Commands::Config { output } => {
            let config = dqdash::config::generate_default_config();
            write_output(output.as_ref(), &config)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(output: Option<&PathBuf>, body: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, body)?;
            println!("Written to {:?}", path);
        }
        None => print!("{}", body),
    }
    Ok(())
}

fn print_result(result: &ValidationResult) {
    println!("Result {} for {}", result.id, result.dataset);
    println!("Run at {}", result.timestamp.to_rfc3339());
    println!(
        "{} checks: {} passed, {} warnings, {} failed",
        result.summary.total, result.summary.passed, result.summary.warnings, result.summary.failed
    );
    println!();

    println!("{:<8} {:<45} {}", "Status", "Check", "Result");
    println!("{}", "-".repeat(72));
    for check in &result.checks {
        println!(
            "{:<8} {:<45} {}",
            check.status.as_str(),
            check.definition,
            check.result
        );
    }

    if !result.invalid_records.is_empty() {
        println!();
        println!("Invalid records (first 20 of {}):", result.invalid_records.len());
        for record in result.invalid_records.iter().take(20) {
            println!(
                "  row {:<6} {:<20} {:<20} {}",
                record.row, record.column, record.value, record.issue
            );
        }
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
