//! Syntax highlighting for generated output printed to a terminal.

use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};

use crate::{DocgenError, Result};

/// Lazily loaded syntect syntax definitions including newline handling.
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
/// Shared theme catalog for syntax highlighting.
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);
/// Reference to the Solarized (dark) theme used for highlighting output.
static SOLARIZED_THEME: Lazy<&'static Theme> = Lazy::new(|| {
    THEME_SET
        .themes
        .get("Solarized (dark)")
        .expect("Solarized (dark) theme must exist")
});

/// Syntax for a generated file. Declarations use the JavaScript grammar.
fn syntax_for(path: &str) -> Option<&'static SyntaxReference> {
    let extension = match path.rsplit('.').next()? {
        "ts" => "js",
        "jsca" => "json",
        "yml" => "yaml",
        other => other,
    };
    SYNTAX_SET.find_syntax_by_extension(extension)
}

/// Applies syntax highlighting to generated output using the Solarized (dark) theme.
///
/// `path` selects the grammar by extension.
pub fn highlight_code(code: &str, path: &str) -> Result<String> {
    let syntax = syntax_for(path)
        .ok_or_else(|| DocgenError::Highlight(format!("no syntax for {path}")))?;
    let mut h = HighlightLines::new(syntax, *SOLARIZED_THEME);

    let mut output = String::new();
    for line in LinesWithEndings::from(code) {
        let ranges: Vec<(Style, &str)> = h.highlight_line(line, &SYNTAX_SET)?;
        let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
        output.push_str(&escaped);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_declarations() {
        let out = highlight_code("declare const x: number;\n", "index.d.ts").unwrap();
        assert!(out.contains("\x1b["));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        assert!(highlight_code("x", "file.unknownext").is_err());
    }
}
