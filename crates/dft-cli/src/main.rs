// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DFT HARNESS CLI - amount conversion & reinstall plans
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "dft-cli")]
#[command(about = "DFT harness CLI - token amounts and canister reinstall plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Identity book mapping aliases to principals (TOML or JSON)
    #[arg(short, long, env = "DFT_IDENTITIES", global = true)]
    identities: Option<PathBuf>,

    /// Canister layout file (TOML); defaults to the standard DFT canister set
    #[arg(short, long, env = "DFT_LAYOUT", global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a human amount into origin units
    ToOrigin {
        /// Human amount, e.g. 12.5
        amount: String,

        /// Token decimals
        #[arg(short, long)]
        decimals: u8,
    },

    /// Convert origin units into a human amount
    ToHuman {
        /// Origin amount (integer)
        origin: String,

        /// Token decimals
        #[arg(short, long)]
        decimals: u8,
    },

    /// Compute the transfer fee for an amount
    Fee {
        /// Transfer amount (human)
        #[arg(short, long)]
        amount: String,

        /// Token decimals
        #[arg(short, long)]
        decimals: u8,

        /// Minimum fee (human)
        #[arg(short, long)]
        minimum: String,

        /// Fee rate as written in a config row, e.g. 0.001
        #[arg(short, long)]
        rate: String,

        /// Decimals of the fee rate
        #[arg(long)]
        rate_decimals: u8,
    },

    /// Build a reinstall plan from a row file
    Plan {
        /// Row file (.json array of objects or .toml [[rows]])
        #[arg(long)]
        rows: PathBuf,

        /// Recompile canister binaries before reinstalling
        #[arg(long)]
        build: bool,

        /// Run post-install initialization
        #[arg(long)]
        init: bool,

        /// Reinstall canisters one at a time
        #[arg(long)]
        one_by_one: bool,

        /// Write the plan here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::ToOrigin { amount, decimals } => commands::amount::to_origin(&amount, decimals)?,
        Commands::ToHuman { origin, decimals } => commands::amount::to_human(&origin, decimals)?,
        Commands::Fee {
            amount,
            decimals,
            minimum,
            rate,
            rate_decimals,
        } => commands::amount::fee(&amount, decimals, &minimum, &rate, rate_decimals)?,
        Commands::Plan {
            rows,
            build,
            init,
            one_by_one,
            output,
        } => {
            let flags = dft_core::PlanFlags {
                build,
                init,
                one_by_one,
            };
            commands::plan::handle(
                &rows,
                cli.identities.as_deref(),
                cli.layout.as_deref(),
                flags,
                output.as_deref(),
            )?
        }
    }
    Ok(())
}

fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
