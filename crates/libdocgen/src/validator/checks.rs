//! Walks a raw document against the schema.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::warn;

use super::{
    Validator,
    problem::{Problem, Problems},
    schema::{Check, MemberList, Schema, Syntax},
};
use crate::{
    common::{
        COMPLEX_TYPES, SIMPLE_TYPES, VALID_OSES, VALID_PLATFORMS, complex_type_arity,
        default_version, split_name,
    },
    loader::YamlDoc,
    markdown::dotted_references,
    model::scalar_to_string,
    platform::PlatformSet,
    version::ApiVersion,
};

/// Accepted `availability` values.
const AVAILABILITY: &[&str] = &["always", "creation", "not-creation"];

/// Accepted `permission` values.
const PERMISSIONS: &[&str] = &["read-only", "write-only", "read-write"];

/// Names written like `UPPER_CASE` constants.
static ALL_CAPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+(_[A-Z]+)*$").expect("all caps pattern must compile"));

/// Splits the inside of a generic type into its arguments.
static SUB_TYPES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^,<\s]+(<.+?>)?").expect("sub type pattern must compile"));

/// Short rendering of a value for messages.
fn show(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim().replace('\n', " "))
            .unwrap_or_default()
    })
}

/// Joins `prefix` and `key` into a dotted path.
fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// String items of a sequence value.
fn strings(value: &Value) -> Vec<&str> {
    value
        .as_sequence()
        .map(|seq| seq.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Platforms left after applying a member's `platforms` and
/// `exclude-platforms` to the inherited set.
pub fn narrow(obj: &Mapping, inherited: PlatformSet) -> PlatformSet {
    let mut set = match obj.get("platforms") {
        Some(listed) if listed.is_sequence() => PlatformSet::from_names(strings(listed)),
        _ => inherited,
    };
    if let Some(excluded) = obj.get("exclude-platforms") {
        set = set.difference(PlatformSet::from_names(strings(excluded)));
    }
    set
}

/// Where a value sits while it is being checked.
#[derive(Debug, Clone, Copy)]
struct Scope<'p> {
    /// Dotted key path of the value.
    path: &'p str,
    /// Member list the enclosing mapping belongs to.
    list: Option<&'p str>,
    /// Name of the enclosing member.
    member: Option<&'p str>,
    /// Platforms the enclosing API is available on.
    platforms: PlatformSet,
}

/// Checks the documents of one tree.
pub(super) struct Checker<'a> {
    /// Every document, by name.
    docs: &'a IndexMap<String, YamlDoc>,
    /// Settings.
    options: &'a Validator,
}

impl<'a> Checker<'a> {
    /// A checker over `docs`.
    pub(super) fn new(docs: &'a IndexMap<String, YamlDoc>, options: &'a Validator) -> Self {
        Self { docs, options }
    }

    /// Checks one document.
    pub(super) fn check_doc(&self, doc: &YamlDoc, schema: &Schema) -> Problems {
        let scope = Scope {
            path: "",
            list: None,
            member: None,
            platforms: narrow(&doc.value, PlatformSet::default()),
        };
        self.object(&doc.value, schema, &doc.name, scope)
    }

    /// Checks a mapping against a schema.
    fn object(&self, obj: &Mapping, schema: &Schema, class: &str, scope: Scope<'_>) -> Problems {
        let mut problems = Problems::new();
        let mut scope = scope;

        if let Some(list) = scope.list
            && matches!(list, "properties" | "methods" | "events")
        {
            let narrowed = narrow(obj, scope.platforms);
            if let Some(listed) = obj.get("platforms")
                && narrowed == scope.platforms
            {
                problems.push(
                    &join(scope.path, "platforms"),
                    Problem::warning(format!(
                        "Unnecessary platforms listing which is the same as the inherited set: {}",
                        strings(listed).join(",")
                    )),
                );
            }
            scope.platforms = narrowed;
        }

        for field in schema.required {
            let path = join(scope.path, field.key);
            match obj.get(field.key) {
                Some(value) => {
                    problems.merge(self.key(value, field.syntax, field.key, class, &path, scope));
                }
                None if self.parent_has(class, scope, field.key) => {}
                None => problems.push(
                    &path,
                    Problem::error(format!("Required property \"{}\" not found", field.key)),
                ),
            }
        }

        for field in schema.optional {
            if let Some(value) = obj.get(field.key) {
                let path = join(scope.path, field.key);
                problems.merge(self.key(value, field.syntax, field.key, class, &path, scope));
            }
        }

        for key in obj.keys() {
            let name = show(key);
            if !name.starts_with("__") && !schema.declares(&name) {
                problems.push(
                    &join(scope.path, &name),
                    Problem::error(format!("Invalid key(s) in {class}: {name}")),
                );
            }
        }

        if schema.declares("permission")
            && !obj.contains_key("permission")
            && let Some(member) = scope.member
            && ALL_CAPS.is_match(member)
        {
            problems.push(
                &join(scope.path, "permission"),
                Problem::info(
                    "property name is all caps so permissions should be set explicitly, likely to read-only",
                ),
            );
        }
        problems
    }

    /// Whether the same member on the parent type defines `key`.
    fn parent_has(&self, class: &str, scope: Scope<'_>, key: &str) -> bool {
        let (Some(list), Some(member)) = (scope.list, scope.member) else {
            return false;
        };
        self.docs
            .get(class)
            .and_then(|doc| doc.get("extends"))
            .and_then(Value::as_str)
            .and_then(|parent| self.docs.get(parent))
            .and_then(|parent| parent.get(list))
            .and_then(Value::as_sequence)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item.get("name").and_then(Value::as_str) == Some(member))
            })
            .and_then(|item| item.get(key))
            .is_some_and(|value| !value.is_null())
    }

    /// Checks one key's value.
    fn key(
        &self,
        value: &Value,
        syntax: Syntax,
        key: &str,
        class: &str,
        path: &str,
        scope: Scope<'_>,
    ) -> Problems {
        match syntax {
            Syntax::List(schema) => {
                let mut problems = Problems::new();
                let Some(items) = value.as_sequence() else {
                    problems.push(
                        path,
                        Problem::error(format!(
                            "We expect an Array of values for {key}, but received non-Array: {}",
                            show(value)
                        )),
                    );
                    return problems;
                };
                for (index, item) in items.iter().enumerate() {
                    let name = item.get("name").and_then(Value::as_str);
                    let item_path = format!(
                        "{path}[{}]",
                        name.map_or_else(|| index.to_string(), str::to_string)
                    );
                    let Some(obj) = item.as_mapping() else {
                        problems.push(
                            &item_path,
                            Problem::error(format!("Not a map of values: {}", show(item))),
                        );
                        continue;
                    };
                    let inner = Scope {
                        path: &item_path,
                        list: Some(key),
                        member: name,
                        platforms: scope.platforms,
                    };
                    problems.merge(self.object(obj, schema, class, inner));
                }
                problems
            }
            Syntax::Object(schema) => match value.as_mapping() {
                Some(obj) => {
                    let inner = Scope {
                        path,
                        list: None,
                        ..scope
                    };
                    self.object(obj, schema, class, inner)
                }
                None => {
                    let mut problems = Problems::new();
                    problems.push(
                        path,
                        Problem::error(format!("Not a map of values: {}", show(value))),
                    );
                    problems
                }
            },
            Syntax::Leaf(check) => {
                let mut problems = Problems::new();
                problems.extend(path, self.leaf(check, value, key, class, scope));
                problems
            }
        }
    }

    /// Runs a leaf check.
    fn leaf(
        &self,
        check: Check,
        value: &Value,
        key: &str,
        class: &str,
        scope: Scope<'_>,
    ) -> Vec<Problem> {
        match check {
            Check::Boolean => boolean(value).into_iter().collect(),
            Check::String => string(value).into_iter().collect(),
            Check::AsciiString => ascii_string(value).into_iter().collect(),
            Check::LowercaseAsciiString => lowercase_string(value).into_iter().collect(),
            Check::Markdown => self.markdown(value),
            Check::Class => self.class(value).into_iter().collect(),
            Check::Constants => self.constants(value),
            Check::DataType => self.data_type(value, None),
            Check::Default => default(value).into_iter().collect(),
            Check::Number => number(value).into_iter().collect(),
            Check::OsVersions => os_versions(value),
            Check::Primitive => primitive(value).into_iter().collect(),
            Check::Returns => self.returns(value),
            Check::Since => since(value, scope.platforms),
            Check::Removed => removed(value, scope.platforms),
            Check::Platforms => platforms(value).into_iter().collect(),
            Check::Availability => one_of(AVAILABILITY, value).into_iter().collect(),
            Check::Permission => permission(value, scope.member).into_iter().collect(),
            Check::Invalid => vec![Problem::error(format!("Invalid field \"{key}\""))],
            Check::Names(list) => self.names(value, list, class).into_iter().collect(),
        }
    }

    /// Markdown text whose dotted `<Type.Name>` links all resolve.
    fn markdown(&self, value: &Value) -> Vec<Problem> {
        let Some(text) = value.as_str() else {
            return string(value).into_iter().collect();
        };
        if self.options.standalone {
            return Vec::new();
        }
        dotted_references(text)
            .into_iter()
            .filter(|name| !self.resolves(name))
            .map(|name| Problem::warning(format!("Unresolved link to <{name}> in markdown")))
            .collect()
    }

    /// Whether a dotted reference names a type or a member of one.
    fn resolves(&self, name: &str) -> bool {
        if self.docs.contains_key(name) || self.options.whitelisted.iter().any(|t| t == name) {
            return true;
        }
        match split_name(name) {
            (Some(owner), member) => self.has_member(owner, member),
            (None, _) => false,
        }
    }

    /// Whether `owner` or one of its ancestors declares `member`.
    fn has_member(&self, owner: &str, member: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(owner);
        while let Some(name) = current {
            if !seen.insert(name) {
                return false;
            }
            let Some(doc) = self.docs.get(name) else {
                return false;
            };
            let declared = ["properties", "methods", "events"].iter().any(|list| {
                doc.get(list)
                    .and_then(Value::as_sequence)
                    .is_some_and(|items| {
                        items
                            .iter()
                            .any(|item| item.get("name").and_then(Value::as_str) == Some(member))
                    })
            });
            if declared {
                return true;
            }
            current = doc.get("extends").and_then(Value::as_str);
        }
        false
    }

    /// A documented or whitelisted type name.
    fn class(&self, value: &Value) -> Option<Problem> {
        let Some(name) = value.as_str() else {
            return string(value);
        };
        self.class_name(name)
    }

    /// Resolves a type name.
    fn class_name(&self, name: &str) -> Option<Problem> {
        if self.docs.contains_key(name) {
            return None;
        }
        if self.options.standalone {
            return Some(Problem::warning(format!(
                "Cannot validate class: {name} (standalone flag is set)"
            )));
        }
        if self.options.whitelisted.iter().any(|t| t == name) {
            return None;
        }
        Some(Problem::error(format!(
            "Not a valid or known class/type: {name}"
        )))
    }

    /// One constant reference or a list of them.
    fn constants(&self, value: &Value) -> Vec<Problem> {
        match value {
            Value::Sequence(items) => items.iter().flat_map(|c| self.constants(c)).collect(),
            Value::String(name) => self.constant(name).into_iter().collect(),
            other => string(other).into_iter().collect(),
        }
    }

    /// A `Type.NAME` or `Type.PREFIX_*` reference to a documented property.
    fn constant(&self, constant: &str) -> Option<Problem> {
        if self.options.constants.iter().any(|c| c == constant) {
            return None;
        }
        let (Some(type_name), base) = split_name(constant) else {
            return Some(Problem::error(format!("Invalid constant: {constant}")));
        };
        let Some(properties) = self
            .docs
            .get(type_name)
            .and_then(|doc| doc.get("properties"))
            .and_then(Value::as_sequence)
        else {
            return Some(Problem::error(format!(
                "Invalid constant: {constant}, type {type_name} does not exist"
            )));
        };
        let mut names = properties
            .iter()
            .filter_map(|p| p.get("name").and_then(Value::as_str));
        let found = match base.strip_suffix('*') {
            Some(prefix) => names.any(|n| n.starts_with(prefix)),
            None => names.any(|n| n == base),
        };
        (!found).then(|| Problem::error(format!("Invalid constant: {constant}")))
    }

    /// A type expression or a list of them.
    fn data_type(&self, value: &Value, context: Option<&str>) -> Vec<Problem> {
        match value {
            Value::Sequence(items) => items.iter().flat_map(|t| self.data_type(t, None)).collect(),
            Value::String(ty) => self.type_name(ty, context),
            other => string(other).into_iter().collect(),
        }
    }

    /// A single type expression, generic or not.
    fn type_name(&self, ty: &str, context: Option<&str>) -> Vec<Problem> {
        let context = context.unwrap_or(ty);
        if let (Some(open), Some(close)) = (ty.find('<'), ty.rfind('>'))
            && open < close
        {
            let base = &ty[..open];
            let Some(arity) = complex_type_arity(base) else {
                let known: Vec<_> = COMPLEX_TYPES.iter().map(|(t, _)| *t).collect();
                return vec![Problem::error(format!(
                    "{base} is not a valid complex type, must be one of {}: {context}",
                    known.join(",")
                ))];
            };
            let subs: Vec<&str> = SUB_TYPES
                .find_iter(&ty[open + 1..close])
                .map(|m| m.as_str())
                .collect();
            if arity != 0 && subs.len() != arity {
                return vec![Problem::error(format!(
                    "{ty} must have {arity} generic type(s) specified, but had {}: {context}",
                    subs.len()
                ))];
            }
            if arity == 0 && subs == ["void"] {
                return Vec::new();
            }
            return subs
                .iter()
                .flat_map(|sub| self.type_name(sub.trim(), Some(ty)))
                .collect();
        }

        if let Some(arity) = complex_type_arity(ty) {
            let strict = matches!(ty, "Map" | "Set" | "Promise");
            let count = if arity == 0 {
                "any number of".to_string()
            } else {
                arity.to_string()
            };
            let verb = if strict { "must" } else { "should" };
            let message =
                format!("{ty} {verb} have {count} generic type(s) specified, but had 0: {context}");
            return vec![if strict {
                Problem::error(message)
            } else {
                Problem::warning(message)
            }];
        }
        if SIMPLE_TYPES.contains(&ty) {
            if ty == "Object" {
                return vec![Problem::warning(format!(
                    "Please define a new type rather than using the generic Object type reference: {context}"
                ))];
            }
            return Vec::new();
        }
        self.class_name(ty).into_iter().collect()
    }

    /// A `returns` block, or a list of them.
    fn returns(&self, value: &Value) -> Vec<Problem> {
        match value {
            Value::Sequence(items) => {
                let mut problems = vec![Problem::warning(
                    "Replace array of returns with single returns value with type having array of type names",
                )];
                problems.extend(items.iter().flat_map(|r| self.returns(r)));
                problems
            }
            Value::Mapping(ret) => {
                let mut problems = Vec::new();
                let mut saw_type = false;
                for (key, value) in ret {
                    match key.as_str() {
                        Some("type") => {
                            saw_type = true;
                            if value.as_str() != Some("void") {
                                problems.extend(self.data_type(value, None));
                            }
                        }
                        Some("summary") => problems.extend(string(value)),
                        Some("constants") => problems.extend(self.constants(value)),
                        _ => problems.push(Problem::error(format!("Invalid key: {}", show(key)))),
                    }
                }
                if !saw_type {
                    problems.push(Problem::error("Missing \"type\" for returns"));
                }
                problems
            }
            other => vec![Problem::error(format!(
                "Not a valid returns value: {}",
                show(other)
            ))],
        }
    }

    /// `excludes` names that must exist on the type or an ancestor.
    fn names(&self, value: &Value, list: MemberList, class: &str) -> Option<Problem> {
        let Some(items) = value.as_sequence() else {
            return Some(Problem::error(format!(
                "Not an array of names: {}",
                show(value)
            )));
        };
        let mut remaining: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
        let mut seen = HashSet::new();
        let mut current = class;
        loop {
            let Some(doc) = self.docs.get(current) else {
                break;
            };
            if !seen.insert(current) {
                break;
            }
            let declared: Vec<&str> = doc
                .get(list.key())
                .map(strings_named)
                .unwrap_or_default();
            remaining.retain(|n| !declared.contains(n));
            if list == MemberList::Methods {
                for property in doc.get("properties").map(strings_named).unwrap_or_default() {
                    let capitalized = capitalize(property);
                    remaining.retain(|n| {
                        *n != format!("get{capitalized}") && *n != format!("set{capitalized}")
                    });
                }
            }
            let Some(parent) = doc.get("extends").and_then(Value::as_str) else {
                break;
            };
            if !self.docs.contains_key(parent) {
                if self.options.whitelisted.iter().any(|t| t == parent) {
                    return None;
                }
                if self.options.standalone {
                    warn!("Cannot validate parent class: {parent}");
                    return None;
                }
                return Some(Problem::error(format!("Invalid parent class: {parent}")));
            }
            current = parent;
        }
        (!remaining.is_empty()).then(|| {
            Problem::error(format!(
                "Could not find the following {}: {}",
                list.key(),
                remaining.join(",")
            ))
        })
    }
}

/// Names of the members in a member list value.
fn strings_named(value: &Value) -> Vec<&str> {
    value
        .as_sequence()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("name").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// `name` with its first letter uppercased.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `true` or `false`.
fn boolean(value: &Value) -> Option<Problem> {
    (!value.is_bool()).then(|| Problem::error(format!("Not a boolean value: {}", show(value))))
}

/// A number.
fn number(value: &Value) -> Option<Problem> {
    (!value.is_number()).then(|| Problem::error(format!("Not a number value: {}", show(value))))
}

/// A string.
fn string(value: &Value) -> Option<Problem> {
    (!value.is_string()).then(|| Problem::error(format!("Not a string value: {}", show(value))))
}

/// A string without non-ASCII characters.
fn ascii_string(value: &Value) -> Option<Problem> {
    string(value).or_else(|| {
        let text = value.as_str().unwrap_or_default();
        (!text.is_ascii()).then(|| Problem::error("String contains non-ASCII characters."))
    })
}

/// An ASCII string that should be lowercase.
fn lowercase_string(value: &Value) -> Option<Problem> {
    ascii_string(value).or_else(|| {
        let text = value.as_str().unwrap_or_default();
        (text.to_lowercase() != text).then(|| Problem::warning("Name should be all lowercase."))
    })
}

/// A boolean, number or string.
fn primitive(value: &Value) -> Option<Problem> {
    (!(value.is_bool() || value.is_number() || value.is_string())).then(|| {
        Problem::error(format!(
            "Not a primitive value (Boolean, Number, String): {}",
            show(value)
        ))
    })
}

/// A primitive, a list, a mapping or null.
fn default(value: &Value) -> Option<Problem> {
    matches!(value, Value::Tagged(_))
        .then(|| Problem::error(format!("Not a valid data type or string: {}", show(value))))
}

/// One of `possibilities`.
fn one_of(possibilities: &[&str], value: &Value) -> Option<Problem> {
    let valid = value.as_str().is_some_and(|v| possibilities.contains(&v));
    (!valid).then(|| {
        Problem::error(format!(
            "must be one of: {}. was: {}",
            possibilities.join(","),
            show(value)
        ))
    })
}

/// A valid permission. Constant-like properties should be read-only.
fn permission(value: &Value, property: Option<&str>) -> Option<Problem> {
    one_of(PERMISSIONS, value).or_else(|| {
        let permission = value.as_str().unwrap_or_default();
        (property.is_some_and(|p| ALL_CAPS.is_match(p)) && permission != "read-only").then(|| {
            Problem::warning(format!(
                "property name is all caps so permissions should likely be read-only (was {permission})"
            ))
        })
    })
}

/// A parseable version.
fn version(value: &Value) -> Option<Problem> {
    let parsed = scalar_to_string(value).and_then(|v| v.parse::<ApiVersion>().ok());
    parsed
        .is_none()
        .then(|| Problem::error(format!("Invalid version: {}", show(value))))
}

/// A non-empty list of known platform names.
fn platforms(value: &Value) -> Option<Problem> {
    let Some(items) = value.as_sequence() else {
        return Some(Problem::error("must be an array of valid platform names"));
    };
    if items.is_empty() {
        return Some(Problem::error(
            "array must not be empty. Remove to fall back to \"default\" platforms based on \"since\" value; or remove doc entry if this applies to no platforms.",
        ));
    }
    let invalid: Vec<String> = items
        .iter()
        .map(show)
        .filter(|p| !VALID_PLATFORMS.contains(&p.as_str()))
        .collect();
    (!invalid.is_empty())
        .then(|| Problem::error(format!("Invalid platform name(s): {}", invalid.join(","))))
}

/// `osver` ranges per operating system.
fn os_versions(value: &Value) -> Vec<Problem> {
    let Some(oses) = value.as_mapping() else {
        return vec![Problem::error(format!(
            "Not a map of OS versions: {}",
            show(value)
        ))];
    };
    let mut problems = Vec::new();
    for (os, range) in oses {
        let os = show(os);
        if !VALID_OSES.contains(&os.as_str()) {
            problems.push(Problem::error(format!(
                "Invalid OS: {os}; valid OSes are: {}",
                VALID_OSES.join(",")
            )));
            continue;
        }
        for (key, bound) in range.as_mapping().into_iter().flatten() {
            match key.as_str() {
                Some("min" | "max") => problems.extend(version(bound)),
                Some("versions") => match bound.as_sequence() {
                    Some(versions) => problems.extend(versions.iter().filter_map(version)),
                    None => problems.extend(version(bound)),
                },
                _ => problems.push(Problem::error(format!("Unknown key: {}", show(key)))),
            }
        }
    }
    problems
}

/// A `since` version, or per-platform versions for platforms in context.
fn since(value: &Value, platforms: PlatformSet) -> Vec<Problem> {
    let Some(per_platform) = value.as_mapping() else {
        return version(value).into_iter().collect();
    };
    let mut problems = Vec::new();
    for (platform, since) in per_platform {
        let platform = show(platform);
        let listed = PlatformSet::platform(&platform).is_some_and(|p| platforms.contains(p));
        if !listed {
            problems.push(Problem::error(format!(
                "Platform specified in 'since' ('{platform}') isn't one of the platforms this API is marked as available upon: {}",
                platforms.names().join(",")
            )));
        }
        let Some(minimum) = default_version(&platform) else {
            problems.push(Problem::error(format!("Invalid platform: {platform}")));
            continue;
        };
        let parsed = scalar_to_string(since).and_then(|v| v.parse::<ApiVersion>().ok());
        match (parsed, minimum.parse::<ApiVersion>()) {
            (Some(since), Ok(minimum)) if since < minimum => problems.push(Problem::error(
                format!("Minimum version for {platform} is {minimum}"),
            )),
            (Some(_), _) => {}
            (None, _) => problems.push(Problem::error(format!(
                "Invalid version string: {}",
                show(since)
            ))),
        }
    }
    problems
}

/// A removal version no earlier than any listed platform's first release.
fn removed(value: &Value, platforms: PlatformSet) -> Vec<Problem> {
    let Some(removed) = scalar_to_string(value).and_then(|v| v.parse::<ApiVersion>().ok()) else {
        return version(value).into_iter().collect();
    };
    platforms
        .names()
        .into_iter()
        .filter_map(|p| {
            let earliest = default_version(p)?;
            let minimum = earliest.parse::<ApiVersion>().ok()?;
            (removed < minimum).then(|| {
                Problem::error(format!(
                    "API was removed in version: {removed}, but lists a platform introduced in {earliest}: {p}"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Severity;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn permissions_on_constants() {
        let warning = permission(&yaml("read-write"), Some("FOO_BAR")).unwrap();
        assert_eq!(warning.severity, Severity::Warning);
        assert!(permission(&yaml("read-only"), Some("FOO_BAR")).is_none());
        assert!(permission(&yaml("read-write"), Some("fooBar")).is_none());
        assert!(permission(&yaml("sometimes"), Some("fooBar")).unwrap().is_error());
    }

    #[test]
    fn platform_lists() {
        assert!(platforms(&yaml("[android, iphone]")).is_none());
        assert!(platforms(&yaml("[]")).unwrap().is_error());
        assert_eq!(
            platforms(&yaml("[android, tizen]")).unwrap().message,
            "Invalid platform name(s): tizen"
        );
    }

    #[test]
    fn since_per_platform() {
        let context = PlatformSet::ANDROID | PlatformSet::MACOS;
        assert!(since(&yaml("{android: '3.1'}"), context).is_empty());
        let problems = since(&yaml("{macos: '8.0.0'}"), context);
        assert_eq!(problems[0].message, "Minimum version for macos is 9.2.0");
        let problems = since(&yaml("{iphone: '3.1'}"), context);
        assert_eq!(problems.len(), 1);
        assert!(since(&yaml("3.1"), context).is_empty());
        assert!(since(&yaml("soon"), context)[0].is_error());
    }

    #[test]
    fn removal_before_platform_release() {
        let problems = removed(&yaml("'5.0.0'"), PlatformSet::ANDROID | PlatformSet::MACOS);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.ends_with("9.2.0: macos"));
    }

    #[test]
    fn narrows_platforms() {
        let obj = yaml("platforms: [android, iphone]\nexclude-platforms: [iphone]\n");
        let set = narrow(obj.as_mapping().unwrap(), PlatformSet::default());
        assert_eq!(set, PlatformSet::ANDROID);
    }

    #[test]
    fn os_version_blocks() {
        assert!(os_versions(&yaml("{ios: {min: '8.0', versions: ['9.0']}}")).is_empty());
        let problems = os_versions(&yaml("{palm: {min: '1.0'}, android: {newest: '1'}}"));
        assert_eq!(problems.len(), 2);
    }
}
