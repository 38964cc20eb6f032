//! TypeScript ambient declarations.
//!
//! The processed documentation is turned into a [`SyntaxTree`] of namespace,
//! interface and class nodes, which a [`Writer`] renders either as one
//! `index.d.ts` or as one file per type.

pub mod nodes;
pub mod tree;
pub mod types;
pub mod writer;

use std::str::FromStr;

use tracing::info;

pub use self::{
    tree::{NodeId, NodeKind, SyntaxTree},
    writer::Writer,
};
use super::{Artifact, Context};
use crate::{DocgenError, Result, version::ApiVersion};

/// How declarations are split into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Everything in `index.d.ts`.
    #[default]
    Single,
    /// One file per type under `types/`.
    Split,
}

impl FromStr for Layout {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(Self::Single),
            "split" => Ok(Self::Split),
            other => Err(DocgenError::UnknownFormat(format!("typescript layout {other}"))),
        }
    }
}

/// Generates declarations for the SDK version in `ctx`.
///
/// A missing or unparseable SDK version is fatal, since the header needs it.
pub fn generate(ctx: &Context<'_>, layout: Layout) -> Result<Artifact> {
    info!("Generating TypeScript declaration file...");
    let version: ApiVersion = ctx
        .sdk_version
        .ok_or_else(|| DocgenError::InvalidVersion("no SDK version".to_string()))?
        .parse()?;
    let tree = SyntaxTree::build(ctx.apis)?;
    let mut artifact = Artifact::new();
    match layout {
        Layout::Single => {
            let mut writer = Writer::new(&tree, true);
            writer.write_definition(&version);
            artifact.push_text("index.d.ts", writer.finish());
        }
        Layout::Split => {
            let output = writer::write_split(&tree, &version);
            artifact.push_text("index.d.ts", output.index);
            if let Some(orphans) = output.orphans {
                artifact.push_text("orphans.d.ts", orphans);
            }
            for (name, text) in output.units {
                artifact.push_text(format!("types/{name}.d.ts"), text);
            }
        }
    }
    Ok(artifact)
}
