//! Schema validation of raw YAML documentation.
//!
//! Each document is walked against a static [`schema`] and every problem is
//! recorded under the dotted path of the offending value, for example
//! `properties[foo].permission`. Only [`Severity::Error`] problems, or files
//! that failed to parse, make validation fail.
//!
//! ```no_run
//! use libdocgen::Validator;
//!
//! let report = Validator::new()
//!     .with_whitelisted(["Titanium.Proxy"])
//!     .validate("apidoc".as_ref())?;
//! print!("{}", report.render(false));
//! std::process::exit(report.exit_code());
//! # Ok::<(), libdocgen::DocgenError>(())
//! ```

mod checks;
pub mod problem;
pub mod schema;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

pub use self::problem::{Problem, Problems, Severity};
use self::checks::Checker;
use crate::{
    DocgenError, Result,
    loader::{LoadError, ParseOutcome, YamlDoc, parse_yaml},
};

/// Constant references that are valid but cannot be resolved from the docs.
const WHITELISTED_CONSTANTS: &[&str] = &["Titanium.UI.Windows.ListViewScrollPosition.*"];

/// Validation settings.
#[derive(Debug, Clone)]
pub struct Validator {
    /// Unresolvable types are warnings and parent lookups are skipped.
    standalone: bool,
    /// Types that need not resolve.
    whitelisted: Vec<String>,
    /// Constant references that need not resolve.
    constants: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with default settings.
    pub fn new() -> Self {
        Self {
            standalone: false,
            whitelisted: Vec::new(),
            constants: WHITELISTED_CONSTANTS
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }

    /// Validates a partial tree whose parents may live elsewhere.
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Adds types that need not resolve.
    pub fn with_whitelisted<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelisted.extend(types.into_iter().map(Into::into));
        self
    }

    /// Adds constant references that need not resolve.
    pub fn with_constants<I, S>(mut self, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constants.extend(constants.into_iter().map(Into::into));
        self
    }

    /// Loads and validates every document under `root`.
    pub fn validate(&self, root: &Path) -> Result<Report> {
        if !root.is_dir() {
            return Err(DocgenError::InvalidPath(root.to_path_buf()));
        }
        let outcome = parse_yaml(root);
        if outcome.docs.is_empty() {
            return Err(DocgenError::NoDocuments(root.to_path_buf()));
        }
        Ok(self.check(outcome))
    }

    /// Validates already loaded documents.
    pub fn check(&self, outcome: ParseOutcome) -> Report {
        let checker = Checker::new(&outcome.docs, self);
        let docs = outcome
            .docs
            .values()
            .map(|doc| DocReport {
                name: doc.name.clone(),
                file: doc.file.clone(),
                problems: checker.check_doc(doc, &schema::TYPE),
            })
            .collect();
        Report {
            docs,
            parse_errors: outcome.errors,
        }
    }

    /// Validates a single document against the others in `docs`.
    pub fn check_doc(&self, docs: &IndexMap<String, YamlDoc>, doc: &YamlDoc) -> Problems {
        Checker::new(docs, self).check_doc(doc, &schema::TYPE)
    }
}

/// Problems found in one document.
#[derive(Debug, Clone)]
pub struct DocReport {
    /// Type name.
    pub name: String,
    /// Source file.
    pub file: PathBuf,
    /// Problems by key path.
    pub problems: Problems,
}

impl DocReport {
    /// Number of errors.
    pub fn errors(&self) -> usize {
        self.problems.count(Severity::Error)
    }

    /// Number of warnings.
    pub fn warnings(&self) -> usize {
        self.problems.count(Severity::Warning)
    }
}

/// Outcome of validating a tree.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Per-document results in load order.
    pub docs: Vec<DocReport>,
    /// Files that could not be loaded.
    pub parse_errors: Vec<LoadError>,
}

impl Report {
    /// Results for one type.
    pub fn doc(&self, name: &str) -> Option<&DocReport> {
        self.docs.iter().find(|d| d.name == name)
    }

    /// Total errors across documents.
    pub fn error_count(&self) -> usize {
        self.docs.iter().map(DocReport::errors).sum()
    }

    /// Total warnings across documents.
    pub fn warning_count(&self) -> usize {
        self.docs.iter().map(DocReport::warnings).sum()
    }

    /// Whether the tree is free of errors and parse failures.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0 && self.parse_errors.is_empty()
    }

    /// Process exit code for the report.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_valid())
    }

    /// Per-file listing of problems. With `quiet`, hints are left out.
    pub fn render(&self, quiet: bool) -> String {
        let mut output = String::new();
        for doc in &self.docs {
            let visible: Vec<_> = doc
                .problems
                .iter()
                .filter(|(_, p)| !quiet || p.severity != Severity::Info)
                .collect();
            if visible.is_empty() {
                continue;
            }
            output.push_str(&format!("{}\n", doc.file.display()));
            let (errors, warnings) = (doc.errors(), doc.warnings());
            if errors > 0 {
                output.push_str(&format!(
                    "{}: found {errors} error(s), {warnings} warning(s)!\n",
                    doc.name
                ));
            } else if warnings > 0 {
                output.push_str(&format!("{}: found {warnings} warning(s)!\n", doc.name));
            } else {
                output.push_str(&format!("{}:\n", doc.name));
            }
            for (path, problem) in visible {
                output.push_str(&format!("\t{path} - [{}] {problem}\n", problem.severity));
            }
            output.push('\n');
        }
        output
    }

    /// One-line summary of the whole run.
    pub fn summary(&self) -> String {
        let (errors, warnings) = (self.error_count(), self.warning_count());
        if errors > 0 {
            format!("Found {errors} error(s), {warnings} warning(s)!")
        } else if warnings > 0 {
            format!("Found {warnings} warning(s)!")
        } else {
            "No errors found!".to_string()
        }
    }
}
