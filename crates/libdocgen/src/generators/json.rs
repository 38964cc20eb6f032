//! JSON metadata for third-party tools (`api.json` and `api.jsca`).

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
    sync::{Mutex, PoisonError},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Serializer, Value, json, ser::PrettyFormatter};
use tracing::{debug, info};

use super::{Artifact, Context};
use crate::{
    Result,
    apis::ApiDocs,
    model::{
        Deprecated, EventDoc, Example, Examples, Member, MethodDoc, ParameterDoc, PropertyDoc,
        Subtype, Support, TypeDoc, TypeExpr,
    },
};

/// Edit URL prefix used when a checkout has no GitHub remote.
const FALLBACK_REPO_URL: &str = "https://github.com/appcelerator/titanium_mobile/edit/master/";

/// GitHub remotes over SSH or HTTPS.
static GITHUB_REMOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(git@|https://)github\.com[:/]([\w-]+)/([\w_-]+)\.git$")
        .expect("remote pattern must compile")
});

/// Edit URL prefixes keyed by checkout directory.
static REPO_URLS: Lazy<Mutex<HashMap<PathBuf, String>>> = Lazy::new(Mutex::default);

/// Edit URL prefix for a git checkout, from its `origin` remote.
fn repo_url(checkout: &Path) -> String {
    let mut cache = REPO_URLS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(url) = cache.get(checkout) {
        return url.clone();
    }
    let remote = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .current_dir(checkout)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());
    let url = remote
        .as_deref()
        .and_then(|remote| GITHUB_REMOTE.captures(remote))
        .map_or_else(
            || FALLBACK_REPO_URL.to_string(),
            |caps| format!("https://github.com/{}/{}/edit/master/", &caps[2], &caps[3]),
        );
    debug!(checkout = %checkout.display(), %url, "resolved edit url");
    cache.insert(checkout.to_path_buf(), url.clone());
    url
}

/// Link to edit the YAML file a type came from.
///
/// The path is taken relative to the `apidoc/` directory of the checkout.
pub fn edit_url(file: &Path) -> String {
    let text = file.to_string_lossy();
    let (checkout, relative) = match text.find("apidoc/") {
        Some(idx) => (PathBuf::from(&text[..idx]), text[idx..].to_string()),
        None => (
            file.parent().map(Path::to_path_buf).unwrap_or_default(),
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ),
    };
    let checkout = if checkout.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        checkout
    };
    format!("{}{relative}", repo_url(&checkout))
}

/// A type expression as written: a string or a list of alternatives.
fn type_value(expr: Option<&TypeExpr>) -> Value {
    match expr {
        Some(TypeExpr::Single(ty)) => Value::String(ty.clone()),
        Some(TypeExpr::Union(types)) => json!(types),
        None => Value::String("String".into()),
    }
}

/// Deprecation details.
fn deprecated(deprecated: &Deprecated) -> Value {
    let mut out = Map::new();
    out.insert(
        "notes".into(),
        Value::String(deprecated.notes.clone().unwrap_or_default()),
    );
    if let Some(since) = &deprecated.since {
        out.insert("since".into(), Value::String(since.as_str().to_string()));
    }
    if let Some(removed) = &deprecated.removed {
        out.insert("removed".into(), Value::String(removed.as_str().to_string()));
    }
    Value::Object(out)
}

/// `[{since, name}]` per supported platform.
fn platforms(support: &Support) -> Value {
    Value::Array(
        support
            .versions()
            .into_iter()
            .map(|(name, since)| json!({ "since": since, "name": name }))
            .collect(),
    )
}

/// Examples as `{description, code}` pairs.
fn examples(examples: &[Example]) -> Value {
    Value::Array(
        examples
            .iter()
            .map(|e| json!({ "description": e.title, "code": e.example }))
            .collect(),
    )
}

/// Inline examples of an optional `examples` field.
fn example_list(value: Option<&Examples>) -> &[Example] {
    value.map_or(&[], Examples::list)
}

/// Fields every exported member carries.
fn member_fields<M: Member>(
    member: &M,
    description: Option<&str>,
    owner: &str,
) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("name".into(), Value::String(member.name().to_string()));
    if let Some(d) = &member.support().deprecated {
        out.insert("deprecated".into(), deprecated(d));
    }
    out.insert(
        "summary".into(),
        Value::String(member.summary().unwrap_or_default().to_string()),
    );
    if let Some(description) = description {
        out.insert("description".into(), Value::String(description.to_string()));
    }
    out.insert("platforms".into(), platforms(member.support()));
    if let Some(inherits) = &member.meta().inherits
        && inherits != owner
    {
        out.insert("inherits".into(), Value::String(inherits.clone()));
    }
    out
}

/// Exports event properties or method parameters.
fn params<'a>(items: impl Iterator<Item = Param<'a>>) -> Value {
    Value::Array(
        items
            .map(|item| {
                let mut out = Map::new();
                out.insert("name".into(), Value::String(item.name.to_string()));
                if let Some(d) = item.deprecated {
                    out.insert("deprecated".into(), deprecated(d));
                }
                out.insert(
                    "summary".into(),
                    Value::String(item.summary.unwrap_or_default().to_string()),
                );
                if let Some(description) = item.description {
                    out.insert("description".into(), Value::String(description.to_string()));
                }
                out.insert("type".into(), type_value(item.type_expr));
                if let Some(optional) = item.optional {
                    out.insert("optional".into(), Value::Bool(optional));
                }
                Value::Object(out)
            })
            .collect(),
    )
}

/// The fields shared by parameters and event properties.
struct Param<'a> {
    /// Name.
    name: &'a str,
    /// Deprecation.
    deprecated: Option<&'a Deprecated>,
    /// Summary.
    summary: Option<&'a str>,
    /// Description.
    description: Option<&'a str>,
    /// Type.
    type_expr: Option<&'a TypeExpr>,
    /// Optionality, only exported for parameters.
    optional: Option<bool>,
}

impl<'a> From<&'a ParameterDoc> for Param<'a> {
    fn from(p: &'a ParameterDoc) -> Self {
        Self {
            name: &p.name,
            deprecated: None,
            summary: p.summary.as_deref(),
            description: None,
            type_expr: p.type_expr.as_ref(),
            optional: Some(p.optional.unwrap_or(false)),
        }
    }
}

impl<'a> From<&'a PropertyDoc> for Param<'a> {
    fn from(p: &'a PropertyDoc) -> Self {
        Self {
            name: &p.name,
            deprecated: p.support.deprecated.as_ref(),
            summary: p.summary.as_deref(),
            description: p.description.as_deref(),
            type_expr: p.type_expr.as_ref(),
            optional: None,
        }
    }
}

/// Exports an event. Payload properties include those of `Titanium.Event`.
fn export_event(event: &EventDoc, owner: &str, base_event: &[PropertyDoc]) -> Value {
    let mut out = member_fields(event, event.description.as_deref(), owner);
    if !event.properties.is_empty() {
        let props = event
            .properties
            .iter()
            .chain(base_event)
            .map(Param::from);
        out.insert("properties".into(), params(props));
    }
    Value::Object(out)
}

/// Exports a method.
fn export_method(method: &MethodDoc, owner: &str) -> Value {
    let mut out = member_fields(method, method.description.as_deref(), owner);
    let list = example_list(method.examples.as_ref());
    if !list.is_empty() {
        out.insert("examples".into(), examples(list));
    }
    if !method.parameters.is_empty() {
        out.insert(
            "parameters".into(),
            params(method.parameters.iter().map(Param::from)),
        );
    }
    let mut returns: Vec<Value> = method
        .returns
        .iter()
        .map(|r| {
            let mut ret = Map::new();
            if let Some(summary) = &r.summary {
                ret.insert("summary".into(), Value::String(summary.clone()));
            }
            ret.insert(
                "type".into(),
                r.type_expr
                    .as_ref()
                    .map_or(Value::Null, |t| type_value(Some(t))),
            );
            Value::Object(ret)
        })
        .collect();
    let returns = match returns.len() {
        0 => json!({ "type": "void" }),
        1 => returns.remove(0),
        _ => Value::Array(returns),
    };
    out.insert("returns".into(), returns);
    Value::Object(out)
}

/// Exports a property.
fn export_property(property: &PropertyDoc, owner: &str) -> Result<Value> {
    let mut out = member_fields(property, property.description.as_deref(), owner);
    let list = example_list(property.examples.as_ref());
    if !list.is_empty() {
        out.insert("examples".into(), examples(list));
    }
    out.insert("type".into(), type_value(property.type_expr.as_ref()));
    if let Some(availability) = &property.availability {
        out.insert("availability".into(), Value::String(availability.clone()));
    }
    if let Some(default) = &property.default {
        out.insert("default".into(), serde_json::to_value(default)?);
    }
    if let Some(optional) = property.optional {
        out.insert("optional".into(), Value::Bool(optional));
    }
    if let Some(permission) = &property.permission {
        out.insert("permission".into(), Value::String(permission.clone()));
    }
    if let Some(value) = &property.value {
        out.insert("value".into(), serde_json::to_value(value)?);
    }
    Ok(Value::Object(out))
}

/// Exports one type.
fn export_type(ty: &TypeDoc, base_event: &[PropertyDoc]) -> Result<Value> {
    let mut out = Map::new();
    out.insert("name".into(), Value::String(ty.name.clone()));
    out.insert(
        "summary".into(),
        Value::String(ty.summary.clone().unwrap_or_default()),
    );
    out.insert(
        "extends".into(),
        Value::String(ty.extends.clone().unwrap_or_else(|| "Object".into())),
    );
    out.insert("platforms".into(), platforms(&ty.support));
    out.insert("type".into(), Value::String(ty.meta.subtype.as_str().into()));
    out.insert("editUrl".into(), Value::String(edit_url(&ty.meta.file)));
    if let Some(d) = &ty.support.deprecated {
        out.insert("deprecated".into(), deprecated(d));
    }
    if let Some(description) = &ty.description {
        out.insert("description".into(), Value::String(description.clone()));
    }
    let visible_events: Vec<_> = ty
        .events
        .iter()
        .filter(|e| !e.meta.hide)
        .map(|e| export_event(e, &ty.name, base_event))
        .collect();
    if !ty.events.is_empty() {
        out.insert("events".into(), Value::Array(visible_events));
    }
    let list = example_list(ty.examples.as_ref());
    if !list.is_empty() {
        out.insert("examples".into(), examples(list));
    }
    if !ty.methods.is_empty() {
        let methods = ty
            .methods
            .iter()
            .filter(|m| !m.meta.hide)
            .map(|m| export_method(m, &ty.name))
            .collect();
        out.insert("methods".into(), Value::Array(methods));
    }
    if !ty.properties.is_empty() {
        let properties = ty
            .properties
            .iter()
            .filter(|p| !p.meta.hide)
            .map(|p| export_property(p, &ty.name))
            .collect::<Result<Vec<_>>>()?;
        out.insert("properties".into(), Value::Array(properties));
    }
    if matches!(ty.meta.subtype, Subtype::Proxy | Subtype::View) {
        out.insert("subtype".into(), Value::String(ty.meta.subtype.as_str().into()));
        out.insert("type".into(), Value::String("object".into()));
    }
    Ok(Value::Object(out))
}

/// Exports every type, keyed by name.
pub fn export(apis: &ApiDocs) -> Result<Value> {
    let base_event = apis
        .get("Titanium.Event")
        .map(|e| e.properties.as_slice())
        .unwrap_or_default();
    let mut out = Map::new();
    for ty in apis.iter() {
        out.insert(ty.name.clone(), export_type(ty, base_event)?);
    }
    Ok(Value::Object(out))
}

/// Serializes with four-space indentation.
pub fn to_pretty(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `api.json`.
pub fn generate_json(ctx: &Context<'_>) -> Result<Artifact> {
    info!("JSON generator starting...");
    let mut artifact = Artifact::new();
    artifact.push_text("api.json", to_pretty(&export(ctx.apis)?)?);
    Ok(artifact)
}

/// Writes `api.jsca`, the compact form.
pub fn generate_jsca(ctx: &Context<'_>) -> Result<Artifact> {
    info!("JSCA generator starting...");
    let mut artifact = Artifact::new();
    artifact.push_text("api.jsca", serde_json::to_string(&export(ctx.apis)?)?);
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberMeta;
    use pretty_assertions::assert_eq;

    fn owned<M: Member>(mut member: M, owner: &str) -> M {
        member.meta_mut().inherits = Some(owner.into());
        member
    }

    fn docs() -> ApiDocs {
        let mut view = TypeDoc {
            name: "Titanium.UI.View".into(),
            summary: Some("A view.".into()),
            extends: Some("Titanium.Proxy".into()),
            ..Default::default()
        };
        view.meta.subtype = Subtype::View;
        view.meta.file = PathBuf::from("/src/apidoc/Titanium/UI/View.yml");
        view.properties = vec![
            owned(
                PropertyDoc {
                    name: "width".into(),
                    type_expr: Some(TypeExpr::Union(vec!["Number".into(), "String".into()])),
                    ..Default::default()
                },
                "Titanium.UI.View",
            ),
            owned(
                PropertyDoc {
                    name: "id".into(),
                    ..Default::default()
                },
                "Titanium.Proxy",
            ),
            PropertyDoc {
                name: "secret".into(),
                meta: MemberMeta {
                    hide: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        view.methods = vec![owned(
            MethodDoc {
                name: "hide".into(),
                ..Default::default()
            },
            "Titanium.UI.View",
        )];
        view.events = vec![owned(
            EventDoc {
                name: "click".into(),
                properties: vec![PropertyDoc {
                    name: "x".into(),
                    type_expr: Some(TypeExpr::Single("Number".into())),
                    ..Default::default()
                }],
                ..Default::default()
            },
            "Titanium.UI.View",
        )];
        let event = TypeDoc {
            name: "Titanium.Event".into(),
            properties: vec![PropertyDoc {
                name: "source".into(),
                type_expr: Some(TypeExpr::Single("Object".into())),
                ..Default::default()
            }],
            ..Default::default()
        };
        ApiDocs::new(
            [view, event]
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        )
    }

    #[test]
    fn exports_view_shape() {
        let value = export(&docs()).unwrap();
        let view = &value["Titanium.UI.View"];
        assert_eq!(view["type"], "object");
        assert_eq!(view["subtype"], "view");
        assert_eq!(view["extends"], "Titanium.Proxy");
        assert_eq!(view["properties"].as_array().unwrap().len(), 2);
        assert_eq!(view["properties"][0]["type"], json!(["Number", "String"]));
        assert_eq!(view["properties"][1]["type"], "String");
        assert_eq!(view["properties"][1]["inherits"], "Titanium.Proxy");
        assert_eq!(view["methods"][0]["returns"], json!({ "type": "void" }));
        let props = view["events"][0]["properties"].as_array().unwrap();
        assert_eq!(
            props.iter().map(|p| p["name"].clone()).collect::<Vec<_>>(),
            vec![json!("x"), json!("source")]
        );
        assert_eq!(value["Titanium.Event"]["extends"], "Object");
        assert_eq!(value["Titanium.Event"]["type"], "pseudo");
    }

    #[test]
    fn pretty_output_uses_four_spaces() {
        let text = to_pretty(&json!({ "a": 1 })).unwrap();
        assert_eq!(text, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn edit_url_is_relative_to_apidoc() {
        let url = edit_url(Path::new("/nonexistent-checkout/apidoc/Titanium/UI/View.yml"));
        assert!(url.ends_with("apidoc/Titanium/UI/View.yml"), "{url}");
    }
}
