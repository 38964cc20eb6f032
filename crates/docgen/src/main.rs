use std::{path::PathBuf, process};

use anyhow::Result;
use clap::Parser;
use docgen_cli::{init_tracing, should_highlight};
use libdocgen::{
    Docgen, Format, Layout,
    generators::{Artifact, Contents},
    highlight::highlight_code,
};
use tracing::{error, warn};

/// Generates API documentation from YAML docs.
#[derive(Parser)]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Paths to the YAML API docs
    paths: Vec<PathBuf>,

    /// Paths to add-on YAML docs merged over the base docs
    #[arg(short, long, value_delimiter = ',')]
    addon_docs: Vec<PathBuf>,

    /// Output formats: html, json, json-raw, jsca, typescript, changes, parity, addon
    #[arg(short, long, value_delimiter = ',', default_value = "html")]
    format: Vec<Format>,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    output: PathBuf,

    /// Platform to extract for the addon format
    #[arg(short, long)]
    platform: Option<String>,

    /// Stylesheet copied into the HTML output
    #[arg(long)]
    css: Option<PathBuf>,

    /// First version of the changes format
    #[arg(long)]
    start: Option<String>,

    /// Last version of the changes format
    #[arg(long)]
    end: Option<String>,

    /// Layout of the typescript format
    #[arg(long, default_value = "single", value_parser = ["single", "split"])]
    ts_layout: String,

    /// Print generated text to stdout instead of writing files
    #[arg(long, default_value_t = false)]
    stdout: bool,

    /// Colorize output printed with --stdout
    #[arg(long, default_value = "auto", value_parser = ["auto", "always", "never"], env = "DOCGEN_COLOR")]
    color: String,

    /// Deprecated
    #[arg(long, hide = true)]
    colorize: bool,

    /// Deprecated
    #[arg(short, long, hide = true)]
    exclude_external: bool,

    /// Deprecated
    #[arg(long, hide = true)]
    verbose: bool,

    /// Deprecated
    #[arg(short = 'v', long = "version", hide = true)]
    version: Option<String>,

    /// Deprecated
    #[arg(long, hide = true)]
    warn_inherited: bool,
}

impl Cli {
    /// Flags that are accepted but do nothing.
    fn deprecated_flags(&self) -> Vec<&'static str> {
        [
            (self.colorize, "--colorize"),
            (self.exclude_external, "--exclude-external"),
            (self.verbose, "--verbose"),
            (self.version.is_some(), "--version"),
            (self.warn_inherited, "--warn-inherited"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
    }

    /// Builds the generator from the arguments.
    fn docgen(&self) -> Result<Docgen> {
        let layout: Layout = self.ts_layout.parse()?;
        let mut docgen = Docgen::new(&self.paths)
            .with_addon_docs(&self.addon_docs)
            .with_formats(self.format.iter().copied())
            .with_output(&self.output)
            .with_layout(layout);
        if let Some(platform) = &self.platform {
            docgen = docgen.with_platform(platform);
        }
        if let Some(css) = &self.css {
            docgen = docgen.with_css(css);
        }
        if let Some(start) = &self.start {
            docgen = docgen.with_start(start);
        }
        if let Some(end) = &self.end {
            docgen = docgen.with_end(end);
        }
        Ok(docgen)
    }
}

/// Prints the text files of an artifact.
fn print_artifact(artifact: &Artifact, highlight: bool) {
    for file in artifact.files() {
        let Contents::Text(text) = &file.contents else {
            continue;
        };
        if highlight {
            let path = file.path.to_string_lossy();
            match highlight_code(text, &path) {
                Ok(colored) => print!("{colored}"),
                Err(_) => print!("{text}"),
            }
        } else {
            print!("{text}");
        }
        if !text.ends_with('\n') {
            println!();
        }
    }
}

/// Loads the docs and renders every requested format.
fn run(cli: &Cli) -> Result<()> {
    for flag in cli.deprecated_flags() {
        warn!("This command-line flag or argument has been deprecated or has not been implemented: {flag}");
    }
    let docgen = cli.docgen()?;
    docgen.check()?;
    let apis = docgen.load()?;
    if cli.stdout {
        let highlight = should_highlight(&cli.color);
        for &format in docgen.formats() {
            print_artifact(&docgen.generate(&apis, format)?, highlight);
        }
    } else {
        docgen.render(&apis)?;
    }
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
