use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod dispatch;
mod logging;
mod render;

use dispatch::execute;
use render::current_output_style;

#[derive(Parser, Debug)]
#[command(name = "uplift")]
#[command(about = "Install and upgrade packages from configured catalogs", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    prefix: Option<PathBuf>,
    // Catalog directories to use instead of `<prefix>/catalogs`, highest priority first.
    #[arg(long = "registry-root", global = true)]
    registry_roots: Vec<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    jobs: u16,
    #[arg(long = "locale", global = true)]
    locales: Vec<String>,
    #[arg(long, global = true)]
    scope: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Install(InstallArgs),
    #[command(about = "Upgrade one package, every package (--all), or list available upgrades")]
    Upgrade(UpgradeArgs),
    List,
    #[command(subcommand)]
    Pin(PinCommands),
}

#[derive(Args, Debug, Clone)]
struct InstallArgs {
    query: String,
    #[arg(long)]
    version: Option<String>,
    #[arg(long)]
    force: bool,
    #[arg(long)]
    no_upgrade: bool,
    #[arg(long)]
    include_unknown: bool,
}

#[derive(Args, Debug, Clone)]
struct UpgradeArgs {
    #[arg(conflicts_with = "all")]
    query: Option<String>,
    #[arg(long)]
    all: bool,
    #[arg(long, requires = "query")]
    version: Option<String>,
    #[arg(long)]
    include_unknown: bool,
    #[arg(long)]
    include_pinned: bool,
    #[arg(long)]
    force: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum PinCommands {
    Add {
        id: String,
        #[arg(long, conflicts_with = "gating")]
        blocking: bool,
        #[arg(long, value_name = "VERSION_REQ")]
        gating: Option<String>,
    },
    Remove {
        id: String,
    },
    List,
}

fn main() -> ExitCode {
    logging::init_tracing();
    let cli = Cli::parse();
    let style = current_output_style();

    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", render::render_status_line(style, "err", &format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<ExitCode> {
    let style = current_output_style();
    let json = cli.json;
    let report = execute(cli)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines(style) {
            println!("{line}");
        }
    }

    Ok(report.exit_code())
}
