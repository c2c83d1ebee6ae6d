//! PharmaCheck CLI - verify medicine packaging codes from the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use pharmacheck_core::{onboarding, DemoOutcome};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const AFTER_HELP: &str = "\
Exit codes:
  0   Product verified
  1   General error
  64  Usage error
  65  Verification failed (counterfeit, duplicate or invalid code)
  66  Input unavailable (camera or stdin)
  69  Verification service unavailable (timeout, network, server error)";

#[derive(Parser)]
#[command(name = "pharmacheck")]
#[command(author, version, about = "Scan-to-verify medicine authentication", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Verification service options shared by `verify` and `scan`.
#[derive(clap::Args, Clone)]
pub struct ServiceArgs {
    /// Base URL of the verification API
    #[arg(long, env = "PHARMACHECK_API_URL")]
    pub api_url: Option<String>,

    /// Lookup deadline in seconds
    #[arg(long, env = "PHARMACHECK_TIMEOUT_SECS", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Answer from the built-in demo fixtures instead of the network
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a product code, lookup URL or text containing one
    Verify {
        /// The scanned or typed code
        #[arg(value_name = "CODE")]
        code: String,

        /// Treat the input as a typed barcode rather than a QR payload
        #[arg(long)]
        barcode: bool,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Read scanner output from stdin, one code per line, until one verifies
    Scan {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Simulate a verification outcome without any network access
    Demo {
        /// Outcome to simulate
        #[arg(value_name = "OUTCOME", value_parser = parse_outcome)]
        outcome: DemoOutcome,
    },

    /// Extract the product identifier from scanned text
    Extract {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Ask the PharmaCheck assistant a question
    Chat {
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Base URL of the chat service
        #[arg(long, env = "PHARMACHECK_CHAT_URL")]
        chat_url: Option<String>,
    },

    /// Show the first-run tutorial
    Tutorial {
        /// Show a single step (1-based)
        #[arg(long, value_name = "N", value_parser = parse_step)]
        step: Option<usize>,
    },

    /// Resolve an application path to its page
    Route {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

fn parse_outcome(s: &str) -> Result<DemoOutcome, String> {
    s.parse()
}

fn parse_step(s: &str) -> Result<usize, String> {
    let total = onboarding::STEPS.len();
    match s.parse::<usize>() {
        Ok(n) if (1..=total).contains(&n) => Ok(n),
        _ => Err(format!("no tutorial step {s} (expected 1-{total})")),
    }
}

/// Output switches passed to every command.
#[derive(Clone, Copy)]
pub struct Output {
    pub quiet: bool,
    pub json: bool,
}

fn init_tracing(verbose: u8, ansi: bool) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("pharmacheck=debug,pharmacheck_core=debug"),
        _ => EnvFilter::new("pharmacheck=trace,pharmacheck_core=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let out = Output {
        quiet: cli.quiet,
        json: cli.json,
    };

    match cli.command {
        Commands::Verify {
            code,
            barcode,
            service,
        } => commands::verify::execute(code, barcode, service, out).await,
        Commands::Scan { service } => commands::scan::execute(service, out).await,
        Commands::Demo { outcome } => commands::demo::execute(outcome, out).await,
        Commands::Extract { text } => commands::extract::execute(&text, out),
        Commands::Chat { message, chat_url } => {
            commands::chat::execute(message, chat_url, out).await
        }
        Commands::Tutorial { step } => commands::tutorial::execute(step, out),
        Commands::Route { path } => commands::route::execute(&path, out),
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    init_tracing(cli.verbose, !matches!(cli.color, ColorChoice::Never));

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(e) => ExitCode::from_anyhow(&e),
    };
    if let Some(message) = &exit.message {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
