mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{ScheduleArgs, SummaryArgs};
use commands::flipping::FlipArgs;

/// Real-estate finance calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "propfin",
    version,
    about = "Real-estate finance calculations with decimal precision",
    long_about = "A CLI for loan amortization schedules (French fixed-installment with \
                  insurance add-ons) and real-estate-flipping feasibility analysis: \
                  theoretical resale value, cost rollups, profitability ratios, \
                  maximum allowable offer, and a three-tier recommendation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full amortization table for a loan
    Schedule(ScheduleArgs),
    /// Summarize a loan: principal, installments, and totals
    Summary(SummaryArgs),
    /// Analyze a flipping project and classify it
    Flip(FlipArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Summary(args) => commands::amortization::run_summary(args),
        Commands::Flip(args) => commands::flipping::run_flip(args),
        Commands::Version => {
            println!("propfin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
