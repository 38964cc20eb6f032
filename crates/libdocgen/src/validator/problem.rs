//! Problems found while validating, keyed by the path of the offending value.

use std::fmt;

use indexmap::IndexMap;

/// How serious a problem is. Only errors fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Fails validation.
    Error,
    /// Reported but does not fail validation.
    Warning,
    /// A hint.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        })
    }
}

/// One problem with a documented value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// What is wrong.
    pub message: String,
    /// How serious it is.
    pub severity: Severity,
}

impl Problem {
    /// An error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// A warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// A hint.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Whether this is a warning.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Problems grouped by dotted key path, e.g. `properties[foo].permission`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Problems(IndexMap<String, Vec<Problem>>);

impl Problems {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one problem under `path`.
    pub fn push(&mut self, path: &str, problem: Problem) {
        self.0.entry(path.to_string()).or_default().push(problem);
    }

    /// Records several problems under `path`.
    pub fn extend(&mut self, path: &str, problems: Vec<Problem>) {
        if !problems.is_empty() {
            self.0.entry(path.to_string()).or_default().extend(problems);
        }
    }

    /// Records `problem` under `path` if there is one.
    pub fn push_opt(&mut self, path: &str, problem: Option<Problem>) {
        if let Some(problem) = problem {
            self.push(path, problem);
        }
    }

    /// Folds another set into this one, appending to shared paths.
    pub fn merge(&mut self, other: Self) {
        for (path, problems) in other.0 {
            self.extend(&path, problems);
        }
    }

    /// Problems recorded under `path`.
    pub fn get(&self, path: &str) -> &[Problem] {
        self.0.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every `(path, problem)` pair in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Problem)> {
        self.0
            .iter()
            .flat_map(|(path, problems)| problems.iter().map(move |p| (path.as_str(), p)))
    }

    /// Number of problems with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.iter().filter(|(_, p)| p.severity == severity).count()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merges_by_path() {
        let mut a = Problems::new();
        a.push("summary", Problem::error("one"));
        let mut b = Problems::new();
        b.push("summary", Problem::warning("two"));
        b.push_opt("name", None);
        b.extend("name", Vec::new());
        a.merge(b);

        assert_eq!(a.get("summary").len(), 2);
        assert!(a.get("name").is_empty());
        assert_eq!(a.count(Severity::Error), 1);
        assert_eq!(a.count(Severity::Warning), 1);
    }
}
