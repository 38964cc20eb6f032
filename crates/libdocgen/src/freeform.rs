//! Resolves `file:` references in free-form text fields.
//!
//! A field such as `description: file:guide.md#### Usage` is replaced by the
//! section of `guide.md` that starts at `#### Usage` and runs up to the next
//! heading of the same level, an `<ApiDocs/>` marker, or the end of the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    DocgenError, Result,
    model::{Example, Examples, TypeDoc},
};

/// `file:<path>.md` with an optional `#heading` suffix.
static FILE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^file:([^#]+\.md)(#.*)?$").expect("file reference pattern must compile")
});

/// Level-three example titles.
static EXAMPLE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^###([^#]+?)$").expect("example title pattern must compile"));

/// Headings of level three or deeper.
static DEEP_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{3,})").expect("heading pattern must compile"));

/// Marker that ends an embedded section.
const API_DOCS_TAG: &str = "<ApiDocs/>";

/// A parsed `file:` reference.
struct FileReference {
    /// Markdown file, relative to the YAML file.
    path: String,
    /// Heading line, hashes included.
    heading: Option<String>,
}

/// Parses a field value as a file reference.
fn parse_reference(value: &str) -> Option<FileReference> {
    let caps = FILE_REFERENCE.captures(value.trim())?;
    Some(FileReference {
        path: caps[1].to_string(),
        heading: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Reads the referenced markdown and narrows it to the heading's section.
fn read_section(
    doc_name: &str,
    yaml_file: &Path,
    reference: &FileReference,
) -> Result<(String, bool)> {
    let base = yaml_file.parent().unwrap_or_else(|| Path::new("."));
    let path: PathBuf = base.join(&reference.path);
    if !path.exists() {
        return Err(DocgenError::MarkdownNotFound {
            path,
            name: doc_name.to_string(),
        });
    }
    let content = fs::read_to_string(&path)?;
    let Some(heading) = &reference.heading else {
        return Ok((content, false));
    };
    let Some(offset) = content.find(heading.as_str()) else {
        return Err(DocgenError::HeadingNotFound {
            path,
            heading: heading.clone(),
        });
    };
    Ok((section_after(&content, heading, offset), true))
}

/// Text between a heading and the next heading of the same level.
fn section_after(content: &str, heading: &str, offset: usize) -> String {
    let level = heading.matches('#').count();
    let start = offset + heading.len();
    let next_heading = Regex::new(&format!(r"(?m)^#{{{level}}}[^#]+$"))
        .ok()
        .and_then(|re| re.find_at(content, start))
        .map(|m| m.start());
    let end = next_heading
        .or_else(|| content.find(API_DOCS_TAG).filter(|idx| *idx >= start))
        .unwrap_or(content.len());
    content[start..end].trim().to_string()
}

/// Splits markdown into examples at level-three headings.
pub fn convert_examples(markdown: &str) -> Vec<Example> {
    let titles: Vec<_> = EXAMPLE_TITLE.captures_iter(markdown).collect();
    titles
        .iter()
        .enumerate()
        .map(|(idx, caps)| {
            let body_start = caps.get(0).map_or(0, |m| m.end());
            let body_end = titles
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map_or(markdown.len(), |m| m.start());
            Example {
                title: caps[1].trim().to_string(),
                example: markdown[body_start..body_end].trim().to_string(),
            }
        })
        .collect()
}

/// Bumps every heading of level three or deeper by one level.
fn demote_headings(markdown: &str) -> String {
    DEEP_HEADING.replace_all(markdown, "$1#").into_owned()
}

/// Replaces `file:` references in a type's description and examples.
pub fn resolve_free_form(ty: &mut TypeDoc) -> Result<()> {
    if let Some(reference) = ty.description.as_deref().and_then(parse_reference) {
        let (text, sectioned) = read_section(&ty.name, &ty.meta.file, &reference)?;
        ty.description = Some(if sectioned {
            demote_headings(&text)
        } else {
            text
        });
    }
    if let Some(Examples::Reference(value)) = &ty.examples
        && let Some(reference) = parse_reference(value)
    {
        let (text, _) = read_section(&ty.name, &ty.meta.file, &reference)?;
        ty.examples = Some(Examples::List(convert_examples(&text)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const GUIDE: &str = "# Guide\n\n## Description\n\nIntro text.\n\n### Details\n\nMore.\n\n## Examples\n\n### First\n\nconsole.log(1);\n\n### Second\n\nconsole.log(2);\n\n<ApiDocs/>\n\nFooter\n";

    fn doc_in(dir: &TempDir) -> TypeDoc {
        let mut ty = TypeDoc {
            name: "Titanium.Foo".into(),
            ..Default::default()
        };
        ty.meta.file = dir.path().join("Foo.yml");
        ty
    }

    #[test]
    fn extracts_description_section() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("guide.md"), GUIDE).unwrap();
        let mut ty = doc_in(&dir);
        ty.description = Some("file:guide.md## Description".into());

        resolve_free_form(&mut ty).unwrap();
        assert_eq!(
            ty.description.as_deref(),
            Some("Intro text.\n\n#### Details\n\nMore.")
        );
    }

    #[test]
    fn converts_examples_up_to_marker() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("guide.md"), GUIDE).unwrap();
        let mut ty = doc_in(&dir);
        ty.examples = Some(Examples::Reference("file:guide.md## Examples".into()));

        resolve_free_form(&mut ty).unwrap();
        let examples = ty.examples.unwrap();
        assert_eq!(
            examples.list(),
            &[
                Example {
                    title: "First".into(),
                    example: "console.log(1);".into()
                },
                Example {
                    title: "Second".into(),
                    example: "console.log(2);".into()
                },
            ]
        );
    }

    #[test]
    fn missing_file_and_heading_are_fatal() {
        let dir = TempDir::new().unwrap();
        let mut ty = doc_in(&dir);
        ty.description = Some("file:missing.md".into());
        assert!(matches!(
            resolve_free_form(&mut ty),
            Err(DocgenError::MarkdownNotFound { .. })
        ));

        fs::write(dir.path().join("guide.md"), GUIDE).unwrap();
        ty.description = Some("file:guide.md## Nowhere".into());
        assert!(matches!(
            resolve_free_form(&mut ty),
            Err(DocgenError::HeadingNotFound { .. })
        ));
    }

    #[test]
    fn plain_text_is_untouched() {
        let mut ty = TypeDoc {
            description: Some("Just text.".into()),
            ..Default::default()
        };
        resolve_free_form(&mut ty).unwrap();
        assert_eq!(ty.description.as_deref(), Some("Just text."));
    }
}
