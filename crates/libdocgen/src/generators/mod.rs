//! Output generators.
//!
//! Each generator walks the processed documentation once and returns an
//! [`Artifact`]: the files it would write, relative to the output directory.
//! Nothing touches the filesystem until [`Artifact::write`] is called.

pub mod addon;
pub mod changes;
pub mod html;
pub mod json;
pub mod parity;
pub mod typescript;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{Result, apis::ApiDocs};

/// Where a generated file's contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// Generated text.
    Text(String),
    /// A file copied verbatim.
    Copy(PathBuf),
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Contents.
    pub contents: Contents,
}

/// The files produced by one generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    /// Files in generation order.
    files: Vec<ArtifactFile>,
}

impl Artifact {
    /// Creates an empty artifact.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file.
    pub fn push_text(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.push(ArtifactFile {
            path: path.into(),
            contents: Contents::Text(text.into()),
        });
    }

    /// Adds a file copied from `source`.
    pub fn push_copy(&mut self, path: impl Into<PathBuf>, source: impl Into<PathBuf>) {
        self.files.push(ArtifactFile {
            path: path.into(),
            contents: Contents::Copy(source.into()),
        });
    }

    /// Files in generation order.
    pub fn files(&self) -> &[ArtifactFile] {
        &self.files
    }

    /// Text of a generated file.
    pub fn text(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.iter().find_map(|f| match &f.contents {
            Contents::Text(text) if f.path == path.as_ref() => Some(text.as_str()),
            _ => None,
        })
    }

    /// Appends the files of another artifact.
    pub fn append(&mut self, other: Self) {
        self.files.extend(other.files);
    }

    /// Whether the artifact contains no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Writes every file below `out_dir`, creating directories as needed.
    pub fn write(&self, out_dir: &Path) -> Result<()> {
        for file in &self.files {
            let target = out_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            match &file.contents {
                Contents::Text(text) => fs::write(&target, text)?,
                Contents::Copy(source) => {
                    fs::copy(source, &target)?;
                }
            }
        }
        info!(files = self.files.len(), dir = %out_dir.display(), "wrote output");
        Ok(())
    }
}

/// Shared inputs of every generator.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Processed documentation.
    pub apis: &'a ApiDocs,
    /// SDK version the docs describe.
    pub sdk_version: Option<&'a str>,
    /// Documentation roots the docs were loaded from.
    pub base_paths: &'a [PathBuf],
}
