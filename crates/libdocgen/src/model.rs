//! Typed documentation model.
//!
//! YAML documents are converted into these structures once add-on overlays
//! have been merged. The processor then annotates them with [`TypeMeta`] and
//! [`MemberMeta`].

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de};
use serde_yaml::Value;

use crate::{
    DocgenError, Result,
    common::{Versions, split_name},
    loader::YamlDoc,
};

/// Documents keyed by fully-qualified type name, in load order.
pub type DocMap = IndexMap<String, TypeDoc>;

/// Renders a YAML scalar as a string.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A version string that may be written as a bare YAML number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionString(pub String);

impl VersionString {
    /// The version text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for VersionString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_to_string(&value)
            .map(Self)
            .ok_or_else(|| de::Error::custom("expected a version string"))
    }
}

/// Either a single version for every platform or one per platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Since {
    /// Applies to every platform.
    Version(VersionString),
    /// Applies per platform.
    PerPlatform(IndexMap<String, VersionString>),
}

/// A type expression: one type or a union of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    /// A single type name, possibly generic.
    Single(String),
    /// A union of alternatives.
    Union(Vec<String>),
}

impl TypeExpr {
    /// Each alternative of the expression.
    pub fn alternatives(&self) -> Vec<&str> {
        match self {
            Self::Single(t) => vec![t.as_str()],
            Self::Union(ts) => ts.iter().map(String::as_str).collect(),
        }
    }
}

/// Helper for fields that accept one value or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    /// A list.
    Many(Vec<T>),
    /// A lone value.
    One(T),
}

/// Deserializes one value or a list of values into a list.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(v)) => vec![v],
        Some(OneOrMany::Many(vs)) => vs,
    })
}

/// Deprecation details.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Deprecated {
    /// Version the API was deprecated in.
    pub since: Option<VersionString>,
    /// Version the API was removed in.
    pub removed: Option<VersionString>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// One code example.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Example {
    /// Example heading.
    pub title: String,
    /// Markdown body.
    pub example: String,
}

/// Examples as written: inline, or a `file:` markdown reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Examples {
    /// Inline examples.
    List(Vec<Example>),
    /// A `file:path.md#heading` reference.
    Reference(String),
}

impl Examples {
    /// Inline examples, empty for unresolved references.
    pub fn list(&self) -> &[Example] {
        match self {
            Self::List(list) => list,
            Self::Reference(_) => &[],
        }
    }
}

/// Member names hidden by a type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Excludes {
    /// Hidden events.
    #[serde(default)]
    pub events: Vec<String>,
    /// Hidden methods.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Hidden properties.
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Platform availability and deprecation shared by types and members.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Support {
    /// Platforms the API is restricted to.
    pub platforms: Option<Vec<String>>,
    /// Platforms the API is unavailable on.
    #[serde(rename = "exclude-platforms")]
    pub exclude_platforms: Option<Vec<String>>,
    /// First version per platform. After processing this is always per-platform.
    pub since: Option<Since>,
    /// Minimum OS versions.
    pub osver: Option<Value>,
    /// Deprecation details.
    pub deprecated: Option<Deprecated>,
}

impl Support {
    /// Processed versions, keyed by platform.
    pub fn versions(&self) -> IndexMap<&str, &str> {
        match &self.since {
            Some(Since::PerPlatform(map)) => {
                map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
            }
            _ => IndexMap::new(),
        }
    }

    /// Records processed versions as the platform list and per-platform `since`.
    pub fn set_versions(&mut self, versions: &Versions) {
        self.platforms = Some(versions.keys().cloned().collect());
        self.since = Some(Since::PerPlatform(
            versions
                .iter()
                .map(|(p, v)| (p.clone(), VersionString(v.clone())))
                .collect(),
        ));
    }

    /// Removal version, if any.
    pub fn removed(&self) -> Option<&str> {
        self.deprecated
            .as_ref()
            .and_then(|d| d.removed.as_ref())
            .map(VersionString::as_str)
    }

    /// Copies every field `other` sets.
    fn overlay(&mut self, other: &Self) {
        if other.platforms.as_ref().is_some_and(|p| !p.is_empty()) {
            self.platforms.clone_from(&other.platforms);
        }
        if other
            .exclude_platforms
            .as_ref()
            .is_some_and(|p| !p.is_empty())
        {
            self.exclude_platforms.clone_from(&other.exclude_platforms);
        }
        if other.since.is_some() {
            self.since.clone_from(&other.since);
        }
        if other.osver.is_some() {
            self.osver.clone_from(&other.osver);
        }
        if other.deprecated.is_some() {
            self.deprecated.clone_from(&other.deprecated);
        }
    }
}

/// Broad category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subtype {
    /// A module, or the global scope.
    Module,
    /// A native-backed object.
    Proxy,
    /// A visual element.
    View,
    /// A plain data shape.
    #[default]
    Pseudo,
}

impl Subtype {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Proxy => "proxy",
            Self::View => "view",
            Self::Pseudo => "pseudo",
        }
    }
}

/// Processing annotations for a type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeMeta {
    /// YAML file the type was loaded from.
    pub file: PathBuf,
    /// Inferred category.
    pub subtype: Subtype,
    /// A factory method was synthesized for it.
    pub creatable: bool,
    /// The type only exists in add-on docs.
    pub addon: bool,
}

/// Processing annotations for a member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberMeta {
    /// Type that owns the member after inheritance flattening.
    pub inherits: Option<String>,
    /// Hidden through `excludes`.
    pub hide: bool,
    /// Synthesized factory method.
    pub creator: bool,
}

/// A documented type.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TypeDoc {
    /// Fully-qualified dotted name.
    pub name: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Markdown description.
    pub description: Option<String>,
    /// Parent type.
    pub extends: Option<String>,
    /// Whether a factory method is synthesized.
    pub createable: Option<bool>,
    /// Availability.
    #[serde(flatten)]
    pub support: Support,
    /// Inherited members hidden on this type.
    pub excludes: Option<Excludes>,
    /// Examples.
    pub examples: Option<Examples>,
    /// Properties.
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
    /// Methods.
    #[serde(default)]
    pub methods: Vec<MethodDoc>,
    /// Events.
    #[serde(default)]
    pub events: Vec<EventDoc>,
    /// Processing annotations.
    #[serde(skip)]
    pub meta: TypeMeta,
}

impl TypeDoc {
    /// Converts a loaded YAML document.
    pub fn from_yaml(doc: &YamlDoc) -> Result<Self> {
        let mut ty: Self = serde_yaml::from_value(Value::Mapping(doc.value.clone())).map_err(
            |e| DocgenError::InvalidDoc {
                name: doc.name.clone(),
                message: e.to_string(),
            },
        )?;
        ty.meta.file.clone_from(&doc.file);
        Ok(ty)
    }

    /// Whether the type has been removed.
    pub fn is_removed(&self) -> bool {
        self.support.removed().is_some()
    }

    /// Last segment of the dotted name.
    pub fn short_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Members owned by this type.
    pub fn own<'a, M: Member>(&'a self, members: &'a [M]) -> impl Iterator<Item = &'a M> + 'a {
        members.iter().filter(move |m| m.is_owned_by(&self.name))
    }
}

/// A property, or a property of an event payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PropertyDoc {
    /// Name.
    pub name: String,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Type.
    #[serde(rename = "type")]
    pub type_expr: Option<TypeExpr>,
    /// `read-only`, `write-only` or `read-write`.
    pub permission: Option<String>,
    /// `always`, `creation` or `not-creation`.
    pub availability: Option<String>,
    /// Whether the property may be omitted.
    pub optional: Option<bool>,
    /// Default value.
    pub default: Option<Value>,
    /// Fixed value of a constant.
    pub value: Option<Value>,
    /// Constants the property accepts.
    #[serde(default, deserialize_with = "one_or_many")]
    pub constants: Vec<String>,
    /// Whether accessor methods exist.
    pub accessors: Option<bool>,
    /// Examples.
    pub examples: Option<Examples>,
    /// Availability.
    #[serde(flatten)]
    pub support: Support,
    /// Processing annotations.
    #[serde(skip)]
    pub meta: MemberMeta,
}

impl PropertyDoc {
    /// Whether the property cannot be assigned.
    pub fn is_read_only(&self) -> bool {
        self.permission.as_deref() == Some("read-only")
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ParameterDoc {
    /// Name.
    pub name: String,
    /// Summary.
    pub summary: Option<String>,
    /// Type.
    #[serde(rename = "type")]
    pub type_expr: Option<TypeExpr>,
    /// Whether the argument may be omitted.
    pub optional: Option<bool>,
    /// Default value.
    pub default: Option<Value>,
    /// Whether the argument may repeat.
    pub repeatable: Option<bool>,
    /// Constants the parameter accepts.
    #[serde(default, deserialize_with = "one_or_many")]
    pub constants: Vec<String>,
}

/// A method return value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ReturnDoc {
    /// Type.
    #[serde(rename = "type")]
    pub type_expr: Option<TypeExpr>,
    /// Summary.
    pub summary: Option<String>,
    /// Constants the value may take.
    #[serde(default, deserialize_with = "one_or_many")]
    pub constants: Vec<String>,
}

/// A method.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MethodDoc {
    /// Name.
    pub name: String,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterDoc>,
    /// Return values.
    #[serde(default, deserialize_with = "one_or_many")]
    pub returns: Vec<ReturnDoc>,
    /// Examples.
    pub examples: Option<Examples>,
    /// Whether an implementation may omit the method.
    pub optional: Option<bool>,
    /// Availability.
    #[serde(flatten)]
    pub support: Support,
    /// Processing annotations.
    #[serde(skip)]
    pub meta: MemberMeta,
}

/// An event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EventDoc {
    /// Name.
    pub name: String,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Payload properties.
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
    /// Availability.
    #[serde(flatten)]
    pub support: Support,
    /// Processing annotations.
    #[serde(skip)]
    pub meta: MemberMeta,
}

/// Behaviour shared by properties, methods and events.
pub trait Member: Clone {
    /// Member name.
    fn name(&self) -> &str;
    /// Summary text.
    fn summary(&self) -> Option<&str>;
    /// Availability.
    fn support(&self) -> &Support;
    /// Mutable availability.
    fn support_mut(&mut self) -> &mut Support;
    /// Processing annotations.
    fn meta(&self) -> &MemberMeta;
    /// Mutable processing annotations.
    fn meta_mut(&mut self) -> &mut MemberMeta;
    /// Copies every field `other` sets onto `self`.
    fn overlay(&mut self, other: &Self);

    /// Whether the member was removed.
    fn is_removed(&self) -> bool {
        self.support().removed().is_some()
    }

    /// Whether the member is owned by `owner`.
    fn is_owned_by(&self, owner: &str) -> bool {
        self.meta().inherits.as_deref() == Some(owner)
    }
}

/// Copies set optional fields and non-empty list fields.
macro_rules! overlay_fields {
    ($dst:ident, $src:ident; [$($opt:ident),*]; [$($list:ident),*]) => {
        $(
            if $src.$opt.is_some() {
                $dst.$opt.clone_from(&$src.$opt);
            }
        )*
        $(
            if !$src.$list.is_empty() {
                $dst.$list.clone_from(&$src.$list);
            }
        )*
        $dst.support.overlay(&$src.support);
    };
}

/// Implements [`Member`] for a member struct.
macro_rules! impl_member {
    ($ty:ty, [$($opt:ident),*], [$($list:ident),*]) => {
        impl Member for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn summary(&self) -> Option<&str> {
                self.summary.as_deref()
            }

            fn support(&self) -> &Support {
                &self.support
            }

            fn support_mut(&mut self) -> &mut Support {
                &mut self.support
            }

            fn meta(&self) -> &MemberMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut MemberMeta {
                &mut self.meta
            }

            fn overlay(&mut self, other: &Self) {
                overlay_fields!(self, other; [$($opt),*]; [$($list),*]);
            }
        }
    };
}

impl_member!(
    PropertyDoc,
    [
        summary,
        description,
        type_expr,
        permission,
        availability,
        optional,
        default,
        value,
        accessors,
        examples
    ],
    [constants]
);
impl_member!(
    MethodDoc,
    [summary, description, examples, optional],
    [parameters, returns]
);
impl_member!(EventDoc, [summary, description], [properties]);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> TypeDoc {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn numeric_since_is_a_string() {
        let ty = parse("name: Foo\nsince: 3.1\n");
        assert_eq!(
            ty.support.since,
            Some(Since::Version(VersionString("3.1".into())))
        );
    }

    #[test]
    fn per_platform_since() {
        let ty = parse("name: Foo\nsince: {android: '1.0', iphone: 2.5}\n");
        let Some(Since::PerPlatform(map)) = ty.support.since else {
            panic!("expected a per-platform map");
        };
        assert_eq!(map["iphone"].as_str(), "2.5");
    }

    #[test]
    fn returns_and_constants_accept_one_or_many() {
        let ty = parse(
            r#"
name: Foo
methods:
  - name: one
    returns: {type: String}
  - name: many
    returns:
      - type: String
      - type: Number
properties:
  - name: mode
    type: Number
    constants: Titanium.UI.FILL
"#,
        );
        assert_eq!(ty.methods[0].returns.len(), 1);
        assert_eq!(ty.methods[1].returns.len(), 2);
        assert_eq!(ty.properties[0].constants, vec!["Titanium.UI.FILL"]);
    }

    #[test]
    fn union_types() {
        let ty = parse("name: Foo\nproperties:\n  - name: x\n    type: [String, Number]\n");
        let expr = ty.properties[0].type_expr.as_ref().unwrap();
        assert_eq!(expr.alternatives(), vec!["String", "Number"]);
    }

    #[test]
    fn overlay_keeps_unset_fields() {
        let mut base = PropertyDoc {
            name: "x".into(),
            summary: Some("old".into()),
            permission: Some("read-only".into()),
            ..Default::default()
        };
        let update = PropertyDoc {
            name: "x".into(),
            summary: Some("new".into()),
            ..Default::default()
        };
        base.overlay(&update);
        assert_eq!(base.summary.as_deref(), Some("new"));
        assert!(base.is_read_only());
    }
}
