pub mod commands;
pub mod reports;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use restock_core::config::{LogFormat, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "restock",
    about = "Restock planner operator CLI",
    long_about = "Merge marketplace reports with vendor inventory and produce restock suggestions.",
    after_help = "Examples:\n  restock suggest --rules rules.json --pretty\n  restock config\n  restock doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Score restock candidates and print the suggestion response as JSON")]
    Suggest {
        #[arg(long, help = "Path to restock.toml")]
        config: Option<PathBuf>,
        #[arg(long, help = "Rules file (.json or .toml)")]
        rules: Option<PathBuf>,
        #[arg(long, help = "Sales-performance report CSV")]
        sales: Option<PathBuf>,
        #[arg(long, help = "Traffic report CSV")]
        traffic: Option<PathBuf>,
        #[arg(long, help = "Restock worklist CSV")]
        restock: Option<PathBuf>,
        #[arg(long, help = "Vendor inventory export CSV")]
        inventory: Option<PathBuf>,
        #[arg(long, help = "Suggest a price instead of dropping unprofitable SKUs")]
        suggest_price: bool,
        #[arg(long, help = "Pretty-print the JSON response")]
        pretty: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, rules file, and report file readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Suggest {
            config,
            rules,
            sales,
            traffic,
            restock,
            inventory,
            suggest_price,
            pretty,
        } => commands::suggest::run(commands::suggest::SuggestArgs {
            config_path: config,
            rules_path: rules,
            sales_report: sales,
            traffic_report: traffic,
            restock_report: restock,
            inventory_report: inventory,
            suggest_price,
            pretty,
        }),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber on stderr. Later calls are no-ops, so
/// commands may call this on every invocation.
pub fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
