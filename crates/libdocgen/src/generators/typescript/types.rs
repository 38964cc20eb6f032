//! Maps documentation type expressions onto TypeScript type syntax.

use crate::model::TypeExpr;

/// Where a type is used. Arrays render differently in parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// Property, return or generic argument.
    Value,
    /// Method or function parameter.
    Parameter,
}

/// Renamed documentation types.
const RENAMED_TYPES: &[(&str, &str)] = &[
    ("2DMatrix", "Matrix2D"),
    ("3DMatrix", "Matrix3D"),
    ("Dictionary", "any"),
    ("Object", "any"),
];

/// Splits generic arguments at top-level commas.
pub fn split_generic_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in args.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// Renders `ty[]`, parenthesizing unions and function types.
fn array_of(ty: &str) -> String {
    if ty.contains('<') {
        format!("Array<{ty}>")
    } else if ty.contains(' ') {
        format!("({ty})[]")
    } else {
        format!("{ty}[]")
    }
}

/// Normalizes a generic type such as `Array<String>` or `Callback<Object>`.
fn normalize_generic(ty: &str, base: &str, inner: &str, usage: Usage) -> String {
    let args: Vec<String> = split_generic_args(inner)
        .into_iter()
        .map(|arg| normalize_type(arg, Usage::Value))
        .collect();
    match base {
        "Array" => args
            .iter()
            .map(|arg| match usage {
                Usage::Parameter => format!("ReadonlyArray<{arg}>"),
                Usage::Value => array_of(arg),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        "Callback" if inner.trim() == "void" => "() => void".to_string(),
        "Callback" => {
            let params = args
                .iter()
                .enumerate()
                .map(|(idx, arg)| format!("param{idx}: {arg}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({params}) => void")
        }
        "Dictionary" => ty.to_string(),
        _ => format!("{base}<{}>", args.join(", ")),
    }
}

/// Normalizes a single documentation type name.
pub fn normalize_type(ty: &str, usage: Usage) -> String {
    let ty = ty.trim();
    if let Some(open) = ty.find('<')
        && let Some(close) = ty.rfind('>')
        && close > open
    {
        return normalize_generic(ty, &ty[..open], &ty[open + 1..close], usage);
    }
    match ty {
        "bool" => "boolean".to_string(),
        "Boolean" | "Function" | "Number" | "String" => ty.to_lowercase(),
        "Array" => "any[]".to_string(),
        "Callback" => "(...args: any[]) => void".to_string(),
        _ => rename(ty),
    }
}

/// Applies [`RENAMED_TYPES`] to the last segment of a possibly dotted name.
fn rename(ty: &str) -> String {
    let (prefix, last) = match ty.rfind('.') {
        Some(idx) => (&ty[..=idx], &ty[idx + 1..]),
        None => ("", ty),
    };
    match RENAMED_TYPES.iter().find(|(from, _)| *from == last) {
        Some((_, to)) if prefix.is_empty() => (*to).to_string(),
        Some((_, to)) if *to != "any" => format!("{prefix}{to}"),
        _ => ty.to_string(),
    }
}

/// Normalizes a union of alternatives. Any `any` collapses the union.
pub fn normalize_union<'a>(alternatives: impl IntoIterator<Item = &'a str>, usage: Usage) -> String {
    let normalized: Vec<String> = alternatives
        .into_iter()
        .map(|alt| normalize_type(alt, usage))
        .collect();
    if normalized.is_empty() || normalized.iter().any(|t| t == "any") {
        return "any".to_string();
    }
    let mut unique: Vec<String> = Vec::with_capacity(normalized.len());
    for ty in normalized {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }
    unique.join(" | ")
}

/// Normalizes an optional type expression. A missing type is `any`.
pub fn normalize_expr(expr: Option<&TypeExpr>, usage: Usage) -> String {
    match expr {
        Some(expr) => normalize_union(expr.alternatives(), usage),
        None => "any".to_string(),
    }
}

/// Whether a documentation type is an array type.
pub fn is_array_type(ty: &str) -> bool {
    let ty = ty.trim();
    ty == "Array" || ty.starts_with("Array<")
}
