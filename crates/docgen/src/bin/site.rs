use std::{path::PathBuf, process};

use anyhow::Result;
use clap::Parser;
use docgen_cli::init_tracing;
use libdocgen::site::{self, SiteOptions};
use tracing::{error, info};

/// Builds versioned API metadata for the documentation site.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source directory of the site
    source_dir: PathBuf,

    /// Directory the metadata is written to
    #[arg(long)]
    out: PathBuf,

    /// Base path of the site
    #[arg(long, default_value = "/")]
    base: String,

    /// Metadata file, relative to the source directory and each version directory
    #[arg(long, default_value = "api/api.json")]
    metadata_file: PathBuf,

    /// Directory of released versions [default: <SOURCE_DIR>/../website/versioned_docs]
    #[arg(long)]
    versioned_dir: Option<PathBuf>,
}

/// Builds the metadata and writes it out.
fn run(cli: &Cli) -> Result<()> {
    let mut options = SiteOptions::default()
        .with_base(&cli.base)
        .with_metadata_file(&cli.metadata_file);
    if let Some(dir) = &cli.versioned_dir {
        options = options.with_versioned_dir(dir);
    }
    let artifact = site::generate(&cli.source_dir, &options)?;
    artifact.write(&cli.out)?;
    info!("Site metadata written to {}", cli.out.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing("info");
    if let Err(e) = run(&cli) {
        error!("{e}");
        process::exit(1);
    }
}
