//! Identifier and keyword helpers used while rendering declarations.

/// TypeScript reserved words that cannot name a parameter.
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "implements", "interface", "let", "package",
    "private", "protected", "public", "static", "yield",
];

/// Determine whether `ident` is a TypeScript keyword that needs renaming.
pub fn is_reserved_word(ident: &str) -> bool {
    RESERVED_WORDS.contains(&ident)
}

/// Renames a parameter so it is a legal identifier.
pub fn parameter_name(ident: &str) -> String {
    match ident {
        "default" => "defaultValue".to_string(),
        "function" => "func".to_string(),
        _ if is_reserved_word(ident) => format!("{ident}_"),
        _ => ident.to_string(),
    }
}

/// Whether `ident` can be written as an unquoted property key.
pub fn is_plain_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renames_reserved_parameters() {
        assert_eq!(parameter_name("default"), "defaultValue");
        assert_eq!(parameter_name("function"), "func");
        assert_eq!(parameter_name("class"), "class_");
        assert_eq!(parameter_name("url"), "url");
    }

    #[test]
    fn plain_identifiers() {
        assert!(is_plain_identifier("click"));
        assert!(!is_plain_identifier("app:resume"));
        assert!(!is_plain_identifier("2d"));
    }
}
