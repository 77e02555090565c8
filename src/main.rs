//! dbmeta CLI - replays exported DDL script directories into a database.

mod app;
mod db;
mod error;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use app::App;
use db::{BatchStatus, Driver, RunReport, ScriptExecutor};
use error::{Result, RunnerError};
use utils::AppConfig;

#[derive(Parser)]
#[command(name = "dbmeta")]
#[command(about = "Replay DDL/DML script directories, one transaction per file")]
#[command(version)]
struct Cli {
    /// Path to JSON configuration file [default: <config dir>/dbmeta/config.json]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute every category directory under the scripts directory
    Run {
        /// Directory holding one subdirectory per category
        #[arg(long)]
        scripts_dir: Option<PathBuf>,

        /// Category to run (repeatable); overrides the configured list
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Script file extension
        #[arg(long)]
        extension: Option<String>,

        #[arg(long, value_enum)]
        driver: Option<Driver>,

        /// SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        service_name: Option<String>,

        #[arg(short, long)]
        user: Option<String>,

        /// Parse all scripts and report statement counts without connecting
        #[arg(long)]
        dry_run: bool,

        /// Output JSON report to stdout
        #[arg(long)]
        output_json: bool,
    },

    /// Write a configuration file with default settings
    Init {
        /// Output path for configuration file [default: <config dir>/dbmeta/config.json]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Parse one script file and print its statements
    Parse {
        file: PathBuf,

        /// Output statements as a JSON array
        #[arg(long)]
        output_json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_format, &cli.verbosity);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(2)
        }
    }
}

fn init_logging(format: &str, verbosity: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dbmeta={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path),
        None => Ok(AppConfig::load()),
    }
}

/// Returns Ok(false) when any script failed.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Run {
            scripts_dir,
            categories,
            extension,
            driver,
            database,
            host,
            port,
            service_name,
            user,
            dry_run,
            output_json,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            if scripts_dir.is_some() {
                config.scripts_dir = scripts_dir;
            }
            if !categories.is_empty() {
                config.categories = categories;
            }
            if let Some(extension) = extension {
                config.extension = extension;
            }
            let conn = &mut config.connection;
            if let Some(driver) = driver {
                conn.driver = driver;
            }
            if database.is_some() {
                conn.database = database;
            }
            if let Some(host) = host {
                conn.host = host;
            }
            if let Some(port) = port {
                conn.port = port;
            }
            if let Some(service_name) = service_name {
                conn.service_name = service_name;
            }
            if let Some(user) = user {
                conn.username = user;
            }

            let mut app = App::new(config);
            let report = if dry_run { app.dry_run()? } else { app.run()? };
            if output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(report.is_success())
        }

        Commands::Init { output, force } => {
            let path = output
                .or_else(AppConfig::config_path)
                .ok_or_else(|| RunnerError::Config("no config directory available".to_string()))?;
            if path.exists() && !force {
                return Err(RunnerError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            AppConfig::new().save_to(&path)?;
            println!("Wrote {}", path.display());
            Ok(true)
        }

        Commands::Parse { file, output_json } => {
            let script = ScriptExecutor::parse_file(&file).map_err(|err| match err {
                RunnerError::Io(io) => {
                    RunnerError::Config(format!("cannot read {}: {io}", file.display()))
                }
                other => other,
            })?;
            if output_json {
                println!("{}", serde_json::to_string_pretty(&script.statements)?);
            } else {
                for (i, statement) in script.statements.iter().enumerate() {
                    println!("-- [{}]\n{}\n", i + 1, statement);
                }
                println!(
                    "{} statement(s){}",
                    script.len(),
                    if script.uses_directives {
                        ", SET TERM directives honored"
                    } else {
                        ""
                    }
                );
            }
            Ok(true)
        }
    }
}

fn print_report(report: &RunReport) {
    println!("Target: {}", report.target);
    for summary in &report.categories {
        println!("{}", summary.message());
        if summary.status != BatchStatus::Executed {
            continue;
        }
        for (file_name, error) in summary.failures() {
            println!("  {file_name}: ERROR: {error}");
        }
    }
    println!(
        "Total: {} succeeded, {} failed ({} ms)",
        report.success_count(),
        report.error_count(),
        (report.finished_at - report.started_at).num_milliseconds()
    );
}
