//! Member nodes of the declaration tree.
//!
//! Nodes are built from processed documentation and hold everything the
//! writer needs. Types stay in documentation form until they are written,
//! because the same type renders differently in parameter position.

use tracing::warn;

use super::types::{Usage, is_array_type, normalize_expr, normalize_union};
use crate::model::{MethodDoc, ParameterDoc, PropertyDoc, TypeExpr};

/// Methods regenerated with event-map generics.
pub const EVENT_METHODS: &[&str] = &["addEventListener", "removeEventListener", "fireEvent"];

/// The type of a variable or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// A documentation type expression, normalized at write time.
    Doc(Option<TypeExpr>),
    /// Already valid TypeScript.
    Raw(String),
    /// Removed or hidden.
    Never,
}

impl TsType {
    /// Renders the type for the given position.
    pub fn render(&self, usage: Usage) -> String {
        match self {
            Self::Doc(expr) => normalize_expr(expr.as_ref(), usage),
            Self::Raw(ty) => ty.clone(),
            Self::Never => "never".to_string(),
        }
    }
}

/// A property, namespace variable, event field or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    /// Identifier.
    pub name: String,
    /// Type.
    pub ty: TsType,
    /// Trimmed summary.
    pub summary: String,
    /// Rendered `readonly` or `const`.
    pub is_constant: bool,
    /// Rendered with `?`.
    pub optional: bool,
    /// Rendered `static` inside classes.
    pub is_static: bool,
    /// A rest parameter.
    pub rest: bool,
}

impl VariableNode {
    /// Creates a plain variable of a raw type.
    pub fn raw(name: &str, ty: &str, summary: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: TsType::Raw(ty.to_string()),
            summary: summary.to_string(),
            is_constant: false,
            optional: false,
            is_static: false,
            rest: false,
        }
    }

    /// Builds a node from a property.
    pub fn from_property(doc: &PropertyDoc, is_static: bool) -> Self {
        let ty = if doc.meta.hide || doc.support.removed().is_some() {
            TsType::Never
        } else {
            TsType::Doc(doc.type_expr.clone())
        };
        Self {
            name: doc.name.clone(),
            ty,
            summary: trimmed(doc.summary.as_deref()),
            is_constant: doc.is_read_only(),
            optional: doc.optional.unwrap_or(false),
            is_static,
            rest: false,
        }
    }

    /// Builds a node from a parameter.
    pub fn from_parameter(doc: &ParameterDoc) -> Self {
        Self {
            name: doc.name.clone(),
            ty: TsType::Doc(doc.type_expr.clone()),
            summary: trimmed(doc.summary.as_deref()),
            is_constant: false,
            optional: doc.optional.unwrap_or(false),
            is_static: false,
            rest: false,
        }
    }

    /// Makes this a rest parameter over `ty`.
    fn into_rest(mut self, ty: String) -> Self {
        self.rest = true;
        self.optional = false;
        self.ty = TsType::Raw(ty);
        self
    }
}

/// A method or namespace function. Overloads are separate nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    /// Identifier.
    pub name: String,
    /// Trimmed summary.
    pub summary: String,
    /// Parameters in order.
    pub parameters: Vec<VariableNode>,
    /// Return type.
    pub returns: TsType,
    /// Generic parameter list, including angle brackets.
    pub generic: String,
    /// Rendered as `name: never`.
    pub removed: bool,
    /// Rendered with `?`.
    pub optional: bool,
    /// Rendered `static` inside classes.
    pub is_static: bool,
    /// Parameters were made optional to keep them in a legal order.
    pub suspicious: bool,
}

impl FunctionNode {
    /// Builds every overload of a documented method owned by `owner`.
    pub fn overloads(doc: &MethodDoc, owner: &str, is_static: bool) -> Vec<Self> {
        let returns = if doc.returns.is_empty() {
            TsType::Raw("void".to_string())
        } else {
            let alternatives: Vec<String> = doc
                .returns
                .iter()
                .flat_map(|r| match &r.type_expr {
                    Some(expr) => expr.alternatives().into_iter().map(str::to_owned).collect(),
                    None => vec!["any".to_string()],
                })
                .collect();
            TsType::Raw(normalize_union(
                alternatives.iter().map(String::as_str),
                Usage::Value,
            ))
        };
        let base = Self {
            name: doc.name.clone(),
            summary: trimmed(doc.summary.as_deref()),
            parameters: Vec::new(),
            returns,
            generic: String::new(),
            removed: doc.meta.hide || doc.support.removed().is_some(),
            optional: doc.optional.unwrap_or(false),
            is_static,
            suspicious: false,
        };
        if base.removed {
            return vec![base];
        }
        let (parameters, suspicious) = parameters_for(doc, owner);
        expand_repeatable(doc.parameters.last(), parameters)
            .into_iter()
            .map(|parameters| Self {
                parameters,
                suspicious,
                ..base.clone()
            })
            .collect()
    }

    /// An `addEventListener`-style method typed by an event map.
    pub fn event_method(name: &str, summary: &str, map: &str, this: &str, is_static: bool) -> Self {
        let mut parameters = vec![VariableNode::raw("name", "K", "Name of the event.")];
        if name == "fireEvent" {
            let mut event = VariableNode::raw(
                "event",
                &format!("{map}[K]"),
                "A dictionary of keys and values to add to the <Titanium.Event> object sent to the listeners.",
            );
            event.optional = true;
            parameters.push(event);
        } else {
            parameters.push(VariableNode::raw(
                "callback",
                &format!("(this: {this}, event: {map}[K]) => void"),
                "Callback function name.",
            ));
        }
        Self {
            name: name.to_string(),
            summary: summary.to_string(),
            parameters,
            returns: TsType::Raw("void".to_string()),
            generic: format!("<K extends keyof {map}>"),
            removed: false,
            optional: false,
            is_static,
            suspicious: false,
        }
    }
}

/// Builds parameter nodes. Once a parameter is optional, every later one is
/// made optional too.
fn parameters_for(doc: &MethodDoc, owner: &str) -> (Vec<VariableNode>, bool) {
    if owner == "Titanium.Filesystem" && doc.name == "getFile" {
        let paths = VariableNode::raw("paths", "string", "").into_rest("string[]".to_string());
        return (vec![paths], false);
    }
    let mut parameters: Vec<VariableNode> =
        doc.parameters.iter().map(VariableNode::from_parameter).collect();
    if owner == "Titanium.Database.DB"
        && doc.name == "execute"
        && let Some(vararg) = parameters.get_mut(1)
    {
        *vararg = vararg.clone().into_rest("any[]".to_string());
        parameters.truncate(2);
        return (parameters, false);
    }
    let mut seen_optional = false;
    let mut suspicious = false;
    for parameter in &mut parameters {
        if parameter.optional {
            seen_optional = true;
        } else if seen_optional {
            parameter.optional = true;
            suspicious = true;
        }
    }
    if suspicious {
        warn!(
            "Suspicious method arguments on {owner}.{}: optional argument is not the last",
            doc.name
        );
    }
    (parameters, suspicious)
}

/// Expands a trailing repeatable parameter into its overload signatures.
fn expand_repeatable(
    last: Option<&ParameterDoc>,
    parameters: Vec<VariableNode>,
) -> Vec<Vec<VariableNode>> {
    let Some(doc) = last.filter(|p| p.repeatable == Some(true)) else {
        return vec![parameters];
    };
    let Some(last_node) = parameters.last().filter(|p| !p.rest).cloned() else {
        return vec![parameters];
    };
    let alternatives: Vec<&str> = doc
        .type_expr
        .as_ref()
        .map(TypeExpr::alternatives)
        .unwrap_or_else(|| vec!["any"]);
    let (arrays, singles): (Vec<&str>, Vec<&str>) =
        alternatives.into_iter().partition(|alt| is_array_type(alt));
    let head = &parameters[..parameters.len() - 1];

    let rest_over = |types: &[&str]| {
        let union = normalize_union(types.iter().copied(), Usage::Value);
        let ty = if union.contains(' ') {
            format!("({union})[]")
        } else {
            format!("{union}[]")
        };
        let mut signature = head.to_vec();
        signature.push(last_node.clone().into_rest(ty));
        signature
    };

    if arrays.is_empty() {
        return vec![rest_over(&singles)];
    }
    if singles.is_empty() {
        return vec![parameters];
    }
    let mut array_form = head.to_vec();
    let mut array_param = last_node.clone();
    array_param.ty = TsType::Doc(Some(match arrays.as_slice() {
        [single] => TypeExpr::Single((*single).to_string()),
        many => TypeExpr::Union(many.iter().map(|s| (*s).to_string()).collect()),
    }));
    array_form.push(array_param);
    vec![rest_over(&singles), array_form]
}

/// Trims optional text.
fn trimmed(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_string()
}
