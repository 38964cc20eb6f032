//! Merges add-on documentation overlays into base documents.

use std::mem;

use serde_yaml::{Mapping, Sequence, Value};
use tracing::{info, warn};

use crate::common::DEFAULT_VERSIONS;

/// Member collections new entries may be appended to.
const MEMBER_KEYS: &[&str] = &["properties", "methods", "events"];

/// Name prefixes of members an overlay may not introduce.
const RESERVED_PREFIXES: &[&str] = &["set", "get", "create"];

/// Merges `add` into `base` and returns the result.
pub fn addon_merge(mut base: Mapping, add: Mapping) -> Mapping {
    let add_platforms = add.get("platforms").and_then(Value::as_sequence).cloned();
    for (key, add_value) in add {
        let Some(key_str) = key.as_str().map(str::to_owned) else {
            continue;
        };
        let existing = base.get_mut(&key).map(mem::take);
        let merged = match existing {
            Some(Value::Sequence(items)) => Some(merge_sequence(&key_str, items, add_value)),
            Some(Value::Mapping(map)) => Some(merge_mapping(&key_str, map, add_value, &add_platforms)),
            Some(scalar @ (Value::String(_) | Value::Number(_))) if key_str == "since" => {
                match expand_since(&base, &scalar, &add_value, &add_platforms) {
                    Some(since) => Some(Value::Mapping(since)),
                    None => Some(scalar),
                }
            }
            Some(other) => Some(other),
            None => merge_missing(&key_str, &base, add_value, &add_platforms),
        };
        if let Some(value) = merged {
            base.insert(key, value);
        }
    }
    base
}

/// Merges into an existing sequence.
fn merge_sequence(key: &str, mut items: Sequence, add: Value) -> Value {
    let first_is_object = items.first().is_some_and(Value::is_mapping);
    match add {
        Value::Sequence(additions) if first_is_object => {
            for addition in additions {
                merge_named(key, &mut items, addition);
            }
        }
        Value::Sequence(additions) => items.extend(additions),
        other => items.push(other),
    }
    Value::Sequence(items)
}

/// Merges one named entry into a sequence of named objects.
fn merge_named(key: &str, items: &mut Sequence, addition: Value) {
    let Value::Mapping(addition) = addition else {
        warn!("Element in {key} array does not have a name key.");
        return;
    };
    let Some(name) = addition.get("name").and_then(Value::as_str).map(str::to_owned) else {
        warn!("Element in {key} array does not have a name key.");
        return;
    };
    let position = items
        .iter()
        .position(|item| item.get("name").and_then(Value::as_str) == Some(name.as_str()));
    if let Some(idx) = position {
        if let Value::Mapping(existing) = items.remove(idx) {
            items.push(Value::Mapping(addon_merge(existing, addition)));
        }
    } else if MEMBER_KEYS.contains(&key)
        && !RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
        && addition.get("summary").is_some()
    {
        info!("Adding new API to {key} array: {name}");
        items.push(Value::Mapping(addition));
    } else {
        warn!("Could not locate object in {key} array with name: {name}");
    }
}

/// Merges into an existing nested mapping.
fn merge_mapping(key: &str, mut map: Mapping, add: Value, add_platforms: &Option<Sequence>) -> Value {
    match add {
        Value::Mapping(add) => {
            let mut rest = Mapping::new();
            for (k, v) in add {
                let missing = map.get(&k).is_none_or(|existing| !is_truthy(existing));
                if missing {
                    map.insert(k, v);
                } else {
                    rest.insert(k, v);
                }
            }
            Value::Mapping(addon_merge(map, rest))
        }
        scalar if key == "since" => {
            if let Some(platforms) = add_platforms {
                for platform in platforms {
                    map.insert(platform.clone(), scalar.clone());
                }
            } else {
                warn!("Cannot set since version.  Set since as a dictionary or add the platforms property.");
            }
            Value::Mapping(map)
        }
        other => {
            warn!("Could not merge {key} key: {other:?}");
            Value::Mapping(map)
        }
    }
}

/// Turns a scalar `since` into a per-platform map and applies the overlay.
fn expand_since(
    base: &Mapping,
    since: &Value,
    add: &Value,
    add_platforms: &Option<Sequence>,
) -> Option<Mapping> {
    let platforms: Sequence = base
        .get("platforms")
        .and_then(Value::as_sequence)
        .cloned()
        .unwrap_or_else(default_platforms);
    let mut map: Mapping = platforms
        .into_iter()
        .map(|p| (p, since.clone()))
        .collect();
    apply_since(&mut map, add, add_platforms).then_some(map)
}

/// Applies an overlay `since` onto a per-platform map.
fn apply_since(map: &mut Mapping, add: &Value, add_platforms: &Option<Sequence>) -> bool {
    match (add, add_platforms) {
        (Value::Mapping(add), _) => {
            for (k, v) in add {
                map.insert(k.clone(), v.clone());
            }
            true
        }
        (_, Some(platforms)) => {
            for p in platforms {
                map.insert(p.clone(), add.clone());
            }
            true
        }
        _ => {
            warn!("Cannot set since version.  Set since as a dictionary or add the platforms property.");
            false
        }
    }
}

/// Handles a key the base document does not have.
fn merge_missing(
    key: &str,
    base: &Mapping,
    add: Value,
    add_platforms: &Option<Sequence>,
) -> Option<Value> {
    match key {
        "description" => Some(add),
        "exclude-platforms" if base.get("platforms").is_none() => Some(add),
        "platforms" => {
            let mut platforms = default_platforms();
            match add {
                Value::Sequence(extra) => platforms.extend(extra),
                other => platforms.push(other),
            }
            Some(Value::Sequence(platforms))
        }
        "since" => {
            let mut map = Mapping::new();
            apply_since(&mut map, &add, add_platforms);
            Some(Value::Mapping(map))
        }
        _ => {
            warn!("Base object does not have a value for {key}");
            None
        }
    }
}

/// Core platform names as YAML values.
fn default_platforms() -> Sequence {
    DEFAULT_VERSIONS
        .iter()
        .map(|(p, _)| Value::String((*p).to_string()))
        .collect()
}

/// JavaScript-style truthiness of a YAML value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn names(map: &Mapping, key: &str) -> Vec<String> {
        map.get(key)
            .and_then(Value::as_sequence)
            .unwrap()
            .iter()
            .filter_map(|v| v.get("name").and_then(Value::as_str).map(str::to_owned))
            .collect()
    }

    #[test]
    fn remerges_matches_and_appends_new_members() {
        let base = mapping(
            r#"
name: Titanium.UI.View
properties:
  - name: width
    summary: Width.
  - name: height
    summary: Height.
"#,
        );
        let add = mapping(
            r#"
name: Titanium.UI.View
properties:
  - name: width
    summary: Width in pixels.
    description: Measured in pixels.
  - name: depth
    summary: Depth.
  - name: getDepth
    summary: Accessor.
  - name: opacity
"#,
        );
        let merged = addon_merge(base, add);
        assert_eq!(names(&merged, "properties"), vec!["height", "width", "depth"]);
        let width = &merged.get("properties").unwrap().as_sequence().unwrap()[1];
        assert_eq!(width.get("summary").and_then(Value::as_str), Some("Width."));
        assert_eq!(
            width.get("description").and_then(Value::as_str),
            Some("Measured in pixels.")
        );
    }

    #[test]
    fn scalar_since_becomes_per_platform() {
        let base = mapping("name: Foo\nsince: '1.0'\n");
        let add = mapping("name: Foo\nplatforms: [blackberry]\nsince: '3.1.2'\n");
        let merged = addon_merge(base, add);
        let since = merged.get("since").and_then(Value::as_mapping).unwrap();
        assert_eq!(since.get("android").and_then(Value::as_str), Some("1.0"));
        assert_eq!(since.get("blackberry").and_then(Value::as_str), Some("3.1.2"));
        let platforms = merged.get("platforms").and_then(Value::as_sequence).unwrap();
        assert_eq!(platforms.len(), 5);
    }

    #[test]
    fn primitive_lists_concatenate() {
        let base = mapping("name: Foo\nplatforms: [android]\n");
        let add = mapping("name: Foo\nplatforms: [blackberry]\n");
        let merged = addon_merge(base, add);
        assert_eq!(
            merged.get("platforms"),
            Some(&serde_yaml::from_str::<Value>("[android, blackberry]").unwrap())
        );
    }
}
