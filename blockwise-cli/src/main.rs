use anyhow::{Context, Result, bail};
use blockwise_core::{ScheduleReport, TaskKind, format_hhmm, parse_date};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod request;
mod server;
mod state;

#[derive(Parser, Debug)]
#[command(name = "blockwise", version, about = "Minute-level time-block scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schedule the tasks and goals in a JSON request document
    Plan {
        /// Path to the request document
        #[arg(long)]
        input: PathBuf,

        /// Anchor date (YYYY-MM-DD); overrides the document, defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP scheduling service
    Serve {
        /// Listen address (default: server.addr from config)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Manage ~/.blockwise/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_logging(&cfg.log.filter);

    match cli.command {
        Command::Plan { input, date, json } => {
            if !input.exists() {
                bail!("request not found: {}", input.display());
            }
            let mut req = state::read_request(&input)?;
            if let Some(d) = date {
                req.anchor_date = Some(parse_date(&d).with_context(|| format!("--date {d}"))?);
            }
            let today = chrono::Local::now().date_naive();
            let report = req.run(&[], today, cfg.day_bounds())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            server::serve(&addr, cfg.day_bounds()).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// RUST_LOG wins; otherwise the config file's filter.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &ScheduleReport) {
    let mut current = None;
    for t in &report.scheduled {
        if t.date != current {
            current = t.date;
            if let Some(d) = current {
                println!("\n{d}");
            }
        }
        let (Some(start), Some(end)) = (t.start_time, t.end_time) else {
            continue;
        };
        let marker = match (t.fixed, t.kind) {
            (true, _) => "*",
            (_, TaskKind::Rest) => "~",
            _ => " ",
        };
        println!(
            "  {}-{} {} {:<32} {:<6} {:>4}m",
            format_hhmm(start),
            format_hhmm(end),
            marker,
            t.title,
            t.priority,
            t.duration
        );
    }

    if !report.unscheduled.is_empty() {
        println!("\nUnscheduled ({}):", report.unscheduled.len());
        for t in &report.unscheduled {
            println!("  - {} ({}, {}m)", t.title, t.priority, t.duration);
        }
    }
}
