//! Error types for documentation processing.
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a generation run.
#[derive(Error, Debug)]
pub enum DocgenError {
    /// Reading or writing a file failed.
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML could not be parsed or converted.
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON could not be parsed or serialized.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML document does not fit the documentation model.
    #[error("Invalid documentation for {name}: {message}")]
    InvalidDoc {
        /// Type name of the offending document.
        name: String,
        /// Conversion failure detail.
        message: String,
    },

    /// An ancestor namespace referenced by a dotted name has no docs.
    #[error("Couldn't find docs for \"{0}\"")]
    MissingAncestor(String),

    /// A namespace path could not be built.
    #[error("Couldn't create namespace path up to {0}")]
    NamespacePath(String),

    /// A version string did not parse.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// The `extends` chain loops back on itself.
    #[error("Inheritance cycle detected at {0}")]
    InheritanceCycle(String),

    /// A `file:` reference points at a missing markdown file.
    #[error("Cannot find file {path} referenced in {name}")]
    MarkdownNotFound {
        /// Resolved markdown path.
        path: PathBuf,
        /// Type that holds the reference.
        name: String,
    },

    /// A `file:` reference names a heading the markdown file lacks.
    #[error("Unable to find heading '{heading}' in {path}")]
    HeadingNotFound {
        /// Resolved markdown path.
        path: PathBuf,
        /// Heading text searched for.
        heading: String,
    },

    /// The `addon` format was requested without a platform.
    #[error("Specify a platform to extract with the -p option.")]
    MissingPlatform,

    /// The requested platform is not a known platform name.
    #[error("Not a valid platform: {0}")]
    InvalidPlatform(String),

    /// An unknown output format name.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// No documentation root was given.
    #[error("Must specify at least one path to the API docs")]
    NoBasePaths,

    /// Syntax highlighting failed.
    #[error("Highlighting error: {0}")]
    Highlight(String),

    /// A documentation root is missing or not a directory.
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// A documentation root holds no YAML documents.
    #[error("Could not find YAML files in {}", .0.display())]
    NoDocuments(PathBuf),

    /// Site metadata could not be loaded or written.
    #[error("Metadata error: {0}")]
    Metadata(String),
}

impl From<syntect::Error> for DocgenError {
    fn from(err: syntect::Error) -> Self {
        Self::Highlight(err.to_string())
    }
}

impl From<walkdir::Error> for DocgenError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, DocgenError>;
