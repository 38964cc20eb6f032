//! Shared tables describing platforms, versions and data types.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Platforms a documented API may target.
pub const VALID_PLATFORMS: &[&str] = &[
    "android",
    "blackberry",
    "iphone",
    "ipad",
    "windowsphone",
    "macos",
];

/// Operating system names accepted in `osver` blocks.
pub const VALID_OSES: &[&str] = &["android", "blackberry", "ios", "windowsphone"];

/// Minimum version per core platform. An API without `since` starts here.
pub const DEFAULT_VERSIONS: &[(&str, &str)] = &[
    ("android", "0.8"),
    ("iphone", "0.8"),
    ("ipad", "0.8"),
    ("macos", "9.2.0"),
];

/// Platforms only available through add-on docs, with their first release.
pub const ADDON_VERSIONS: &[(&str, &str)] = &[("blackberry", "3.1.2"), ("windowsphone", "4.1.0")];

/// Built-in non-generic type names.
pub const SIMPLE_TYPES: &[&str] = &[
    "ArrayBuffer",
    "Boolean",
    "Date",
    "Error",
    "Float32Array",
    "Float64Array",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "Number",
    "Object",
    "RegExp",
    "String",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "any",
];

/// Built-in generic types with the number of type arguments each takes.
/// Zero means any number.
pub const COMPLEX_TYPES: &[(&str, usize)] = &[
    ("Array", 1),
    ("Callback", 0),
    ("Dictionary", 1),
    ("Function", 0),
    ("Map", 2),
    ("Promise", 1),
    ("Set", 1),
];

/// Matches names made only of uppercase letters, digits and underscores.
pub static CONSTANT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_0-9]*$").expect("constant name pattern must compile"));

/// Ordered platform -> version map. Insertion order follows the defaults.
pub type Versions = IndexMap<String, String>;

/// Default versions as an owned map.
pub fn default_versions() -> Versions {
    DEFAULT_VERSIONS
        .iter()
        .map(|(p, v)| ((*p).to_string(), (*v).to_string()))
        .collect()
}

/// First release of an add-on platform.
pub fn addon_version(platform: &str) -> Option<&'static str> {
    ADDON_VERSIONS
        .iter()
        .find(|(p, _)| *p == platform)
        .map(|(_, v)| *v)
}

/// Minimum version of a core platform.
pub fn default_version(platform: &str) -> Option<&'static str> {
    DEFAULT_VERSIONS
        .iter()
        .find(|(p, _)| *p == platform)
        .map(|(_, v)| *v)
}

/// Whether `name` is a known platform.
pub fn is_valid_platform(name: &str) -> bool {
    VALID_PLATFORMS.contains(&name)
}

/// Human readable platform name.
pub fn pretty_platform(name: &str) -> &str {
    match name {
        "android" => "Android",
        "blackberry" => "BlackBerry",
        "iphone" => "iPhone",
        "ipad" => "iPad",
        "macos" => "macOS",
        "windowsphone" => "Windows Phone",
        other => other,
    }
}

/// Arity of a built-in generic type, if `name` is one.
pub fn complex_type_arity(name: &str) -> Option<usize> {
    COMPLEX_TYPES
        .iter()
        .find(|(t, _)| *t == name)
        .map(|(_, n)| *n)
}

/// Whether a member name looks like a constant.
pub fn is_constant_name(name: &str) -> bool {
    CONSTANT_NAME.is_match(name)
}

/// Splits a dotted name into its namespace and its last segment.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.rfind('.') {
        Some(idx) => (Some(&name[..idx]), &name[idx + 1..]),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constant_names() {
        assert!(is_constant_name("ALIGN_LEFT"));
        assert!(is_constant_name("HTTP_2"));
        assert!(!is_constant_name("alignLeft"));
    }

    #[test]
    fn splits_dotted_names() {
        assert_eq!(split_name("Titanium.UI.View"), (Some("Titanium.UI"), "View"));
        assert_eq!(split_name("Global"), (None, "Global"));
    }

    #[test]
    fn platform_tables() {
        assert_eq!(default_version("macos"), Some("9.2.0"));
        assert_eq!(addon_version("blackberry"), Some("3.1.2"));
        assert_eq!(addon_version("android"), None);
        assert_eq!(complex_type_arity("Map"), Some(2));
        assert_eq!(pretty_platform("ipad"), "iPad");
    }
}
