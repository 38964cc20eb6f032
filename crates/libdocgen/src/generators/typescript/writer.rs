//! Renders a [`SyntaxTree`] as TypeScript declaration text.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    nodes::{FunctionNode, VariableNode},
    tree::{EventInterface, NodeId, NodeKind, SyntaxTree},
    types::Usage,
};
use crate::{common::split_name, keywords::parameter_name, version::ApiVersion};

/// Dotted identifiers that may name another declaration unit.
static DOTTED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z_$][\w$]*(?:\.[\w$]+)+").expect("dotted name pattern must compile")
});

/// Helper types every declaration file relies on.
const HELPER_TYPES: &str = "type _Omit<T, K extends keyof any | undefined> = Pick<T, Exclude<keyof T, K>>;
type FunctionPropertyNames<T> = {
\t// tslint:disable-next-line:ban-types
\t[K in keyof T]: T[K] extends Function ? K : never
}[keyof T];
type Dictionary<T> = Partial<_Omit<T, FunctionPropertyNames<Ti.Proxy>>>;
interface ProxyEventMap {}
";

/// Shorthand alias for the root namespace.
const TI_ALIAS: &str = "import Ti = Titanium;\n";

/// Renders declaration text, one node at a time.
pub struct Writer<'t, 'a> {
    /// Tree being written.
    tree: &'t SyntaxTree<'a>,
    /// Accumulated text.
    output: String,
    /// Write child namespaces and interfaces inside namespaces.
    nested: bool,
}

impl<'t, 'a> Writer<'t, 'a> {
    /// Creates a writer. With `nested` unset, namespaces omit their children.
    pub fn new(tree: &'t SyntaxTree<'a>, nested: bool) -> Self {
        Self {
            tree,
            output: String::new(),
            nested,
        }
    }

    /// Returns the accumulated text.
    pub fn finish(self) -> String {
        self.output
    }

    /// The DefinitelyTyped header for `version`.
    pub fn header(version: &ApiVersion) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "// Type definitions for non-npm package Titanium {}.{}\n",
            version.major(),
            version.minor()
        ));
        output.push_str("// Project: https://github.com/appcelerator/titanium_mobile\n");
        output.push_str("// Definitions by: Axway Appcelerator <https://github.com/appcelerator>\n");
        output.push_str("// Definitions: https://github.com/DefinitelyTyped/DefinitelyTyped\n");
        output.push_str("// TypeScript Version: 3.0\n\n");
        output
    }

    /// Writes the whole tree as one file.
    pub fn write_definition(&mut self, version: &ApiVersion) {
        self.output.push_str(&Self::header(version));
        self.output.push_str(HELPER_TYPES);
        self.output.push('\n');
        let tree = self.tree;
        self.write_nodes(tree.roots());
        self.output.push('\n');
        self.output.push_str(TI_ALIAS);
    }

    /// Writes top-level nodes, keeping companion pairs together.
    fn write_nodes(&mut self, nodes: &[NodeId]) {
        let mut written = HashSet::new();
        for id in nodes {
            if !written.insert(*id) {
                continue;
            }
            let tree = self.tree;
            let node = tree.node(*id);
            let related = node.related.filter(|r| nodes.contains(r));
            match node.kind {
                NodeKind::Namespace => {
                    if let Some(related) = related {
                        written.insert(related);
                        self.write_interface(related, 0);
                    }
                    self.write_namespace(*id, 0);
                }
                NodeKind::Interface | NodeKind::Class => {
                    self.write_interface(*id, 0);
                    if let Some(related) = related {
                        written.insert(related);
                        self.write_namespace(related, 0);
                    }
                }
            }
        }
    }

    /// Writes one unit: a type and its companion, without children.
    pub fn write_unit(&mut self, ids: &[NodeId], level: usize) {
        for id in ids {
            if self.tree.node(*id).kind != NodeKind::Namespace {
                self.write_interface(*id, level);
            }
        }
        for id in ids {
            if self.tree.node(*id).kind == NodeKind::Namespace {
                self.write_namespace(*id, level);
            }
        }
    }

    /// Writes a namespace node.
    pub fn write_namespace(&mut self, id: NodeId, level: usize) {
        let tree = self.tree;
        let node = tree.node(id);
        if node.suppressed {
            return;
        }
        let body = &node.body;
        let has_own = !body.properties.is_empty() || !body.methods.is_empty() || !body.events.is_empty();
        let has_children =
            self.nested && (!node.namespaces.is_empty() || !node.interfaces.is_empty());
        if !has_own && !has_children && !node.removed {
            return;
        }
        let is_global = node.fqn() == "Global";
        let inner = if is_global { level } else { level + 1 };
        let declare = if level == 0 { "declare " } else { "" };

        self.write_js_doc(&body.summary, level, false);
        if node.removed {
            self.output.push_str(&format!(
                "{}{declare}const {}: never;\n",
                indent(level),
                node.name
            ));
            return;
        }
        if !is_global {
            self.output
                .push_str(&format!("{}{declare}namespace {} {{\n", indent(level), node.name));
        }
        for event in &body.events {
            self.write_event_interface(event, inner);
        }
        for property in &body.properties {
            self.write_variable(property, inner);
        }
        for method in &body.methods {
            self.write_function(method, inner);
        }
        if self.nested {
            for child in &node.namespaces {
                self.write_namespace(*child, inner);
            }
            for child in &node.interfaces {
                self.write_interface(*child, inner);
            }
        }
        if !is_global {
            self.output.push_str(&format!("{}}}\n", indent(level)));
        }
    }

    /// Writes an interface or class node, preceded by its event interfaces.
    pub fn write_interface(&mut self, id: NodeId, level: usize) {
        let tree = self.tree;
        let node = tree.node(id);
        let body = &node.body;
        for event in &body.events {
            self.write_event_interface(event, level);
        }
        self.write_js_doc(&body.summary, level, node.name == "IOStream");
        let declare = if level == 0 && node.kind == NodeKind::Class {
            "declare "
        } else {
            ""
        };
        if node.removed {
            let declare = if level == 0 { "declare " } else { "" };
            self.output.push_str(&format!(
                "{}{declare}const {}: never;\n",
                indent(level),
                node.name
            ));
            return;
        }
        let keyword = match node.kind {
            NodeKind::Class => "class",
            _ => "interface",
        };
        let parent = body
            .extends
            .as_ref()
            .map(|e| format!("extends {e} "))
            .unwrap_or_default();
        self.output.push_str(&format!(
            "{}{declare}{keyword} {} {parent}{{\n",
            indent(level),
            node.name
        ));
        for property in &body.properties {
            self.write_property(property, level + 1);
        }
        for method in &body.methods {
            self.write_method(method, level + 1);
        }
        self.output.push_str(&format!("{}}}\n", indent(level)));
    }

    /// Writes a generated event interface.
    fn write_event_interface(&mut self, event: &EventInterface, level: usize) {
        self.write_js_doc(&event.summary, level, false);
        self.output.push_str(&format!(
            "{}interface {} extends {} {{\n",
            indent(level),
            event.name,
            event.extends
        ));
        for property in &event.properties {
            self.write_property(property, level + 1);
        }
        self.output.push_str(&format!("{}}}\n", indent(level)));
    }

    /// Writes a namespace variable.
    fn write_variable(&mut self, variable: &VariableNode, level: usize) {
        self.write_js_doc(&variable.summary, level, false);
        let declare = if level == 0 { "declare " } else { "" };
        let keyword = if variable.is_constant { "const" } else { "let" };
        self.output.push_str(&format!(
            "{}{declare}{keyword} {}: {};\n\n",
            indent(level),
            variable.name,
            variable.ty.render(Usage::Value)
        ));
    }

    /// Writes a property of an interface or class.
    fn write_property(&mut self, property: &VariableNode, level: usize) {
        self.write_js_doc(&property.summary, level, false);
        let is_static = if property.is_static { "static " } else { "" };
        let read_only = if property.is_constant { "readonly " } else { "" };
        let ty = property.ty.render(Usage::Value);
        let optional = if ty != "never" && property.optional {
            "?"
        } else {
            ""
        };
        self.output.push_str(&format!(
            "{}{is_static}{read_only}{}{optional}: {ty};\n\n",
            indent(level),
            property.name
        ));
    }

    /// Writes a namespace function.
    fn write_function(&mut self, function: &FunctionNode, level: usize) {
        self.write_js_doc(&function.summary, level, false);
        let declare = if level == 0 { "declare " } else { "" };
        if function.removed {
            self.output.push_str(&format!(
                "{}{declare}const {}: never;\n\n",
                indent(level),
                function.name
            ));
            return;
        }
        self.write_suspicious(function, level);
        self.output.push_str(&format!(
            "{}{declare}function {}{}({}): {};\n\n",
            indent(level),
            function.name,
            function.generic,
            Self::parameters(&function.parameters),
            function.returns.render(Usage::Value)
        ));
    }

    /// Writes a method of an interface or class.
    fn write_method(&mut self, method: &FunctionNode, level: usize) {
        self.write_js_doc(&method.summary, level, false);
        let is_static = if method.is_static { "static " } else { "" };
        if method.removed {
            self.output.push_str(&format!(
                "{}{is_static}{}: never;\n\n",
                indent(level),
                method.name
            ));
            return;
        }
        self.write_suspicious(method, level);
        let optional = if method.optional { "?" } else { "" };
        self.output.push_str(&format!(
            "{}{is_static}{}{}{optional}({}): {};\n\n",
            indent(level),
            method.name,
            method.generic,
            Self::parameters(&method.parameters),
            method.returns.render(Usage::Value)
        ));
    }

    /// Flags a signature whose parameters were reordered for optionality.
    fn write_suspicious(&mut self, function: &FunctionNode, level: usize) {
        if function.suspicious {
            self.output.push_str(&format!(
                "{}// Suspicious method arguments: optional argument is not the last\n",
                indent(level)
            ));
        }
    }

    /// Renders a parameter list.
    fn parameters(parameters: &[VariableNode]) -> String {
        parameters
            .iter()
            .map(|p| {
                let rest = if p.rest { "..." } else { "" };
                let optional = if p.optional { "?" } else { "" };
                let usage = if p.rest { Usage::Value } else { Usage::Parameter };
                format!(
                    "{rest}{}{optional}: {}",
                    parameter_name(&p.name),
                    p.ty.render(usage)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Writes a JSDoc block for a summary.
    fn write_js_doc(&mut self, summary: &str, level: usize, io_stream: bool) {
        let pad = indent(level);
        let summary = summary.trim();
        if !summary.is_empty() {
            let lines = summary
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join(&format!("\n{pad} * "));
            self.output.push_str(&format!("{pad}/**\n{pad} * {lines}\n{pad} */\n"));
        }
        if io_stream {
            self.output
                .push_str(&format!("{pad}// tslint:disable-next-line:interface-name\n"));
        }
    }
}

/// Tab indentation for a nesting level.
fn indent(level: usize) -> String {
    "\t".repeat(level)
}

/// Declaration units for the split layout, keyed by fully-qualified name.
fn units(tree: &SyntaxTree<'_>) -> IndexMap<String, Vec<NodeId>> {
    let mut units: IndexMap<String, Vec<NodeId>> = IndexMap::new();
    for id in tree.ids() {
        let node = tree.node(id);
        if node.suppressed {
            continue;
        }
        units.entry(node.fqn().to_string()).or_default().push(id);
    }
    units
}

/// Finds the unit a dotted name belongs to: the longest unit-name prefix.
fn owning_unit<'u>(name: &str, units: &'u IndexMap<String, Vec<NodeId>>) -> Option<&'u str> {
    let name = match name.strip_prefix("Ti.") {
        Some(rest) => format!("Titanium.{rest}"),
        None => name.to_string(),
    };
    let mut candidate = name.as_str();
    loop {
        if let Some((key, _)) = units.get_key_value(candidate) {
            return Some(key.as_str());
        }
        candidate = &candidate[..candidate.rfind('.')?];
    }
}

/// Units referenced by the declaration text of a unit. Comments are skipped.
fn references<'u>(
    own: &str,
    text: &str,
    units: &'u IndexMap<String, Vec<NodeId>>,
) -> Vec<&'u str> {
    let mut refs: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('*') || trimmed.starts_with("/*") || trimmed.starts_with("//") {
            continue;
        }
        for m in DOTTED_NAME.find_iter(line) {
            if let Some(unit) = owning_unit(m.as_str(), units)
                && unit != own
                && !refs.contains(&unit)
            {
                refs.push(unit);
            }
        }
    }
    refs
}

/// A rendered split layout.
pub struct SplitOutput {
    /// `index.d.ts`.
    pub index: String,
    /// `orphans.d.ts`, when some units are unreachable from the index.
    pub orphans: Option<String>,
    /// `types/<name>.d.ts` contents by unit name.
    pub units: IndexMap<String, String>,
}

/// Renders one file per declaration unit.
pub fn write_split(tree: &SyntaxTree<'_>, version: &ApiVersion) -> SplitOutput {
    let units = units(tree);
    let mut bodies: IndexMap<String, String> = IndexMap::new();
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, ids) in &units {
        let parent = split_name(name).0.filter(|p| *p != "Global");
        let mut writer = Writer::new(tree, false);
        match parent {
            Some(parent) => {
                writer.output.push_str(&format!("declare namespace {parent} {{\n"));
                writer.write_unit(ids, 1);
                writer.output.push_str("}\n");
            }
            None => writer.write_unit(ids, 0),
        }
        let declarations = writer.finish();
        let refs = references(name, &declarations, &units);
        let mut text = String::new();
        for target in &refs {
            text.push_str(&format!("/// <reference path=\"./{target}.d.ts\" />\n"));
        }
        if !refs.is_empty() {
            text.push('\n');
        }
        text.push_str(&declarations);
        graph.insert(name.as_str(), refs);
        bodies.insert(name.clone(), text);
    }

    let top_level: Vec<&str> = units
        .keys()
        .map(String::as_str)
        .filter(|name| !name.contains('.'))
        .collect();
    let mut reachable: HashSet<&str> = top_level.iter().copied().collect();
    let mut queue: VecDeque<&str> = top_level.iter().copied().collect();
    while let Some(name) = queue.pop_front() {
        for target in graph.get(name).into_iter().flatten() {
            if reachable.insert(*target) {
                queue.push_back(*target);
            }
        }
    }
    let orphaned: Vec<&str> = units
        .keys()
        .map(String::as_str)
        .filter(|name| !reachable.contains(name))
        .collect();

    let mut index = Writer::header(version);
    for name in &top_level {
        index.push_str(&format!("/// <reference path=\"types/{name}.d.ts\" />\n"));
    }
    let orphans = if orphaned.is_empty() {
        None
    } else {
        index.push_str("/// <reference path=\"orphans.d.ts\" />\n");
        let mut orphans = String::new();
        for name in &orphaned {
            orphans.push_str(&format!("/// <reference path=\"types/{name}.d.ts\" />\n"));
        }
        Some(orphans)
    };
    index.push('\n');
    index.push_str(HELPER_TYPES);
    index.push('\n');
    index.push_str(TI_ALIAS);

    SplitOutput {
        index,
        orphans,
        units: bodies,
    }
}
