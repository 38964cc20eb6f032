//! Reads YAML documentation trees.
//!
//! Loading never stops at the first bad file. Problems are returned as
//! [`LoadError`]s alongside every document that did load.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory and file names skipped while walking a tree.
const IGNORED: &[&str] = &["node_modules", ".travis.yml"];

/// One YAML document as written.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlDoc {
    /// Value of the `name` key.
    pub name: String,
    /// File the document came from.
    pub file: PathBuf,
    /// The document itself.
    pub value: Mapping,
}

impl YamlDoc {
    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }
}

/// What went wrong with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// A document has no `name`.
    MissingName,
    /// A document reuses a name seen earlier.
    DuplicateName(String),
    /// The file is not valid YAML.
    Syntax(String),
    /// The file could not be read.
    Io(String),
}

/// A recoverable problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// Offending file.
    pub file: PathBuf,
    /// Problem.
    pub kind: LoadErrorKind,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoadErrorKind::MissingName => write!(
                f,
                "ERROR: Missing name for doc in file: {}",
                self.file.display()
            ),
            LoadErrorKind::DuplicateName(name) => write!(
                f,
                "Duplicate key: {name}. Please rename the key to be unique! ({})",
                self.file.display()
            ),
            LoadErrorKind::Syntax(msg) => {
                write!(f, "Failed to parse {}: {msg}", self.file.display())
            }
            LoadErrorKind::Io(msg) => write!(f, "Failed to read {}: {msg}", self.file.display()),
        }
    }
}

/// Documents loaded from one tree plus the problems encountered.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Documents keyed by name, in load order.
    pub docs: IndexMap<String, YamlDoc>,
    /// Per-file problems.
    pub errors: Vec<LoadError>,
}

/// Whether a walk entry should be skipped.
fn is_ignored(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| IGNORED.contains(&name))
}

/// Whether `path` is a `.yml` file.
fn is_yaml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "yml")
}

/// Parses every document in a YAML string.
pub fn parse_documents(content: &str) -> Result<Vec<Value>, serde_yaml::Error> {
    serde_yaml::Deserializer::from_str(content)
        .map(Value::deserialize)
        .filter(|doc| !matches!(doc, Ok(Value::Null)))
        .collect()
}

/// Loads every `.yml` file under `root`, depth first, in file name order.
pub fn parse_yaml(root: &Path) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                outcome.errors.push(LoadError {
                    file: err.path().map(Path::to_path_buf).unwrap_or_default(),
                    kind: LoadErrorKind::Io(err.to_string()),
                });
                continue;
            }
        };
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            load_file(entry.path(), &mut outcome);
        }
    }
    outcome
}

/// Loads one file into `outcome`.
fn load_file(path: &Path, outcome: &mut ParseOutcome) {
    debug!(file = %path.display(), "loading");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            outcome.errors.push(LoadError {
                file: path.to_path_buf(),
                kind: LoadErrorKind::Io(err.to_string()),
            });
            return;
        }
    };
    let docs = match parse_documents(&content) {
        Ok(docs) => docs,
        Err(err) => {
            outcome.errors.push(LoadError {
                file: path.to_path_buf(),
                kind: LoadErrorKind::Syntax(err.to_string()),
            });
            return;
        }
    };
    for doc in docs {
        let name = doc.get("name").and_then(Value::as_str).map(str::to_owned);
        let (Some(name), Value::Mapping(value)) = (name, doc) else {
            outcome.errors.push(LoadError {
                file: path.to_path_buf(),
                kind: LoadErrorKind::MissingName,
            });
            continue;
        };
        if outcome.docs.contains_key(&name) {
            outcome.errors.push(LoadError {
                file: path.to_path_buf(),
                kind: LoadErrorKind::DuplicateName(name),
            });
            continue;
        }
        outcome.docs.insert(
            name.clone(),
            YamlDoc {
                name,
                file: path.to_path_buf(),
                value,
            },
        );
    }
}
