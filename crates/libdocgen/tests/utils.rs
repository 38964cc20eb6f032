// Dead code detection breaks here, because the integration test crates all use a disjoint set of
// the pub items.
#![allow(dead_code)]

use libdocgen::{ApiDocs, Artifact, Docgen, Format, Layout};
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// The types every fixture builds on.
pub const BASE_DOCS: &str = r#"
name: Titanium
summary: The top-level module.
extends: Titanium.Module
---
name: Titanium.Module
summary: Base of every module.
extends: Titanium.Proxy
---
name: Titanium.Proxy
summary: Base of every proxy.
createable: false
"#;

/// A documentation tree written to a temporary directory.
pub struct Fixture {
    /// Owns the directory.
    pub dir: TempDir,
    /// The `apidoc` root holding the YAML.
    pub root: PathBuf,
}

impl Fixture {
    /// Writes `docs` next to [`BASE_DOCS`].
    pub fn new(docs: &str) -> Self {
        Self::bare(&format!("{BASE_DOCS}---\n{}", dedent(docs)))
    }

    /// Writes `docs` as the only file.
    pub fn bare(docs: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("apidoc");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("docs.yml"), docs.trim_start()).unwrap();
        Self { dir, root }
    }

    /// Adds another YAML file under the root.
    pub fn with_file(self, name: &str, docs: &str) -> Self {
        fs::write(self.root.join(name), dedent(docs)).unwrap();
        self
    }

    /// A generator over this tree.
    pub fn docgen(&self) -> Docgen {
        Docgen::new([&self.root])
            .with_sdk_version("12.0.0")
            .with_output(self.dir.path().join("dist"))
    }

    /// Loads and processes the tree.
    pub fn load(&self) -> ApiDocs {
        self.docgen().load().unwrap()
    }
}

/// Strips the common leading indentation of a raw string literal.
pub fn dedent(s: &str) -> String {
    let lines: Vec<&str> = s.lines().collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one format for a fixture.
pub fn generate(docs: &str, format: Format, layout: Layout) -> Artifact {
    let fixture = Fixture::new(docs);
    let docgen = fixture.docgen().with_layout(layout);
    let apis = docgen.load().unwrap();
    docgen.generate(&apis, format).unwrap()
}

/// Lines of a generated file with surrounding whitespace removed.
pub fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Asserts that a generated file holds every expected line.
pub fn contains(docs: &str, format: Format, file: &str, expected: &[&str]) {
    let artifact = generate(docs, format, Layout::Single);
    let text = artifact
        .text(file)
        .unwrap_or_else(|| panic!("{file} was not generated"));
    let lines = trimmed_lines(text);
    for line in expected {
        assert!(
            lines.contains(line),
            "Missing line in {file}: {line}\n\n{text}"
        );
    }
}

/// Asserts that a generated file holds none of the given lines.
pub fn lacks(docs: &str, format: Format, file: &str, unexpected: &[&str]) {
    let artifact = generate(docs, format, Layout::Single);
    let text = artifact
        .text(file)
        .unwrap_or_else(|| panic!("{file} was not generated"));
    let lines = trimmed_lines(text);
    for line in unexpected {
        assert!(
            !lines.contains(line),
            "Unexpected line in {file}: {line}\n\n{text}"
        );
    }
}

#[macro_export]
macro_rules! gen_tests {
    ($prefix:ident, {
        $(contains {
            $contains_name:ident: {
                format: $contains_format:expr,
                file: $contains_file:expr,
                input: $contains_input:expr,
                lines: [$($contains_line:expr),* $(,)?]
            }
        })*
        $(lacks {
            $lacks_name:ident: {
                format: $lacks_format:expr,
                file: $lacks_file:expr,
                input: $lacks_input:expr,
                lines: [$($lacks_line:expr),* $(,)?]
            }
        })*
    }) => {
        mod $prefix {
            use super::*;

            $(
                #[test]
                fn $contains_name() {
                    contains($contains_input, $contains_format, $contains_file, &[$($contains_line),*]);
                }
            )*

            $(
                #[test]
                fn $lacks_name() {
                    lacks($lacks_input, $lacks_format, $lacks_file, &[$($lacks_line),*]);
                }
            )*
        }
    };
}
