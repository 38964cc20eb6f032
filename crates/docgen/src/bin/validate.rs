use std::{path::PathBuf, process};

use anyhow::Result;
use clap::Parser;
use docgen_cli::init_tracing;
use libdocgen::Validator;
use tracing::{error, info, warn};

/// Validates YAML API docs against the documentation schema.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of YAML API docs
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Don't check types and links against the rest of the docs
    #[arg(short, long, default_value_t = false)]
    standalone: bool,

    /// Type names accepted without docs
    #[arg(short, long = "whitelisted", value_delimiter = ',')]
    whitelist: Vec<String>,

    /// Constant names accepted without docs
    #[arg(short, long = "constant", value_delimiter = ',')]
    constants: Vec<String>,

    /// Hide informational messages
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

/// Validates the docs and returns the exit code.
fn run(cli: &Cli) -> Result<i32> {
    if cli.standalone {
        info!("Standalone mode: types and links are not checked");
    }
    if !cli.whitelist.is_empty() {
        info!("Whitelisted types: {}", cli.whitelist.join(", "));
    }
    let report = Validator::new()
        .with_standalone(cli.standalone)
        .with_whitelisted(&cli.whitelist)
        .with_constants(&cli.constants)
        .validate(&cli.path)?;

    for problem in &report.parse_errors {
        error!("{problem}");
    }
    print!("{}", report.render(cli.quiet));

    let summary = report.summary();
    if report.error_count() > 0 {
        error!("{summary}");
    } else if report.warning_count() > 0 {
        warn!("{summary}");
    } else {
        info!("{summary}");
    }
    Ok(report.exit_code())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(if cli.quiet { "warn" } else { "info" });
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
