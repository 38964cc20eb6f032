//! The declaration syntax tree.
//!
//! Every node lives in one arena and is addressed by [`NodeId`]. A namespace
//! and the interface or class of the same name are linked through the
//! non-owning `related` field. Building happens in passes: nodes are created
//! and attached, companion pairs are resolved, then members are initialised.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::nodes::{EVENT_METHODS, FunctionNode, VariableNode};
use crate::{
    DocgenError, Result,
    apis::ApiDocs,
    common::split_name,
    model::{EventDoc, Member, MethodDoc, PropertyDoc, Subtype, TypeDoc},
};

/// Types that never produce declarations.
pub const SKIP_APIS: &[&str] = &["Dictionary", "Titanium.UI.2DMatrix", "Titanium.UI.3DMatrix"];

/// Types rendered as interfaces whatever their subtype.
pub const FORCED_INTERFACES: &[&str] = &[
    "Titanium.App.iOS.UserDefaults",
    "Global.String",
    "Global.JSON",
    "Global.console",
];

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `namespace`.
    Namespace,
    /// `interface`.
    Interface,
    /// `class`.
    Class,
}

/// An event interface generated for a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInterface {
    /// Interface name.
    pub name: String,
    /// Parent interface.
    pub extends: String,
    /// Summary.
    pub summary: String,
    /// Fields.
    pub properties: Vec<VariableNode>,
}

/// Members filled in by initialisation.
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// Summary, with removal notes appended for removed types.
    pub summary: String,
    /// Parent type.
    pub extends: Option<String>,
    /// Properties or namespace variables.
    pub properties: Vec<VariableNode>,
    /// Methods or namespace functions, overloads included.
    pub methods: Vec<FunctionNode>,
    /// Event interfaces, written before the node.
    pub events: Vec<EventInterface>,
}

/// A declaration node.
#[derive(Debug)]
pub struct Node<'a> {
    /// Declaration kind.
    pub kind: NodeKind,
    /// Source documentation.
    pub doc: &'a TypeDoc,
    /// Last segment of the name.
    pub name: String,
    /// Companion node of the same name.
    pub related: Option<NodeId>,
    /// Child namespaces.
    pub namespaces: Vec<NodeId>,
    /// Child interfaces and classes.
    pub interfaces: Vec<NodeId>,
    /// Namespace emptied because its companion carries everything.
    pub suppressed: bool,
    /// The type was removed.
    pub removed: bool,
    /// Initialised members.
    pub body: Body,
}

impl Node<'_> {
    /// Fully-qualified name.
    pub fn fqn(&self) -> &str {
        &self.doc.name
    }
}

/// Whether a proxy's own members are read-only properties only.
pub fn is_constants_only_proxy(doc: &TypeDoc) -> bool {
    if doc.meta.subtype != Subtype::Proxy {
        return false;
    }
    let has_methods = doc.own(&doc.methods).any(|m| !m.meta.hide);
    let has_writable = doc
        .own(&doc.properties)
        .any(|p| !p.meta.hide && !p.is_read_only());
    // Hidden read-only properties still count.
    let has_read_only = doc.own(&doc.properties).any(|p| p.is_read_only());
    !has_methods && !has_writable && has_read_only
}

/// Whether a property name is all uppercase.
fn is_upper(name: &str) -> bool {
    name.to_uppercase() == name
}

/// The declaration tree for one generator run.
#[derive(Debug, Default)]
pub struct SyntaxTree<'a> {
    /// Node arena.
    nodes: Vec<Node<'a>>,
    /// Top-level nodes in creation order.
    roots: Vec<NodeId>,
    /// Namespaces by fully-qualified name.
    namespaces: HashMap<String, NodeId>,
    /// Interfaces and classes by fully-qualified name.
    interfaces: HashMap<String, NodeId>,
}

impl<'a> SyntaxTree<'a> {
    /// Builds and initialises the tree for `apis`.
    pub fn build(apis: &'a ApiDocs) -> Result<Self> {
        let mut tree = Self::default();
        if let Some(global) = apis.get("Global") {
            let id = tree.push(NodeKind::Namespace, global);
            tree.namespaces.insert(global.name.clone(), id);
            tree.roots.push(id);
        }
        let mut names: Vec<&str> = apis.names().filter(|n| *n != "Global").collect();
        names.sort_unstable();
        for name in names {
            if SKIP_APIS.contains(&name) {
                continue;
            }
            if let Some(doc) = apis.get(name) {
                tree.add_type(apis, doc)?;
            }
        }
        tree.resolve_pairs();
        for idx in 0..tree.nodes.len() {
            tree.init(NodeId(idx), apis);
        }
        Ok(tree)
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    /// Top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every node, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Allocates a node.
    fn push(&mut self, kind: NodeKind, doc: &'a TypeDoc) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            doc,
            name: doc.short_name().to_string(),
            related: None,
            namespaces: Vec::new(),
            interfaces: Vec::new(),
            suppressed: false,
            removed: doc.is_removed(),
            body: Body::default(),
        });
        id
    }

    /// Links a namespace with its companion.
    fn link(&mut self, namespace: NodeId, companion: NodeId) {
        self.nodes[namespace.0].related = Some(companion);
        self.nodes[companion.0].related = Some(namespace);
    }

    /// Attaches a node under `parent`, or at the top level.
    fn attach(&mut self, parent: Option<NodeId>, id: NodeId) {
        let kind = self.nodes[id.0].kind;
        match parent {
            Some(parent) if kind == NodeKind::Namespace => self.nodes[parent.0].namespaces.push(id),
            Some(parent) => self.nodes[parent.0].interfaces.push(id),
            None => self.roots.push(id),
        }
    }

    /// Classifies one type and attaches its nodes.
    fn add_type(&mut self, apis: &'a ApiDocs, doc: &'a TypeDoc) -> Result<()> {
        let parent = match split_name(&doc.name).0 {
            Some(namespace) => Some(self.find_or_create_namespace(apis, namespace)?),
            None => None,
        };
        let forced = FORCED_INTERFACES.contains(&doc.name.as_str());
        let subtype = doc.meta.subtype;
        let constants_only = is_constants_only_proxy(doc);
        let is_modules = doc.name == "Modules";
        let is_interface = subtype == Subtype::Pseudo || forced;
        let is_class = matches!(subtype, Subtype::Module | Subtype::Proxy | Subtype::View)
            && !forced
            && !constants_only;
        let is_namespace = (subtype == Subtype::Module || constants_only) && !forced;

        let mut namespace = None;
        if is_namespace || is_modules {
            namespace = Some(match self.namespaces.get(&doc.name) {
                Some(id) => *id,
                None => {
                    let id = self.push(NodeKind::Namespace, doc);
                    self.namespaces.insert(doc.name.clone(), id);
                    self.attach(parent, id);
                    id
                }
            });
        }
        if (is_interface || is_class) && !is_modules {
            if doc.name == "Titanium" {
                return Ok(());
            }
            let kind = if is_class {
                NodeKind::Class
            } else {
                NodeKind::Interface
            };
            let id = self.push(kind, doc);
            self.interfaces.insert(doc.name.clone(), id);
            if let Some(namespace) = namespace {
                self.link(namespace, id);
            }
            self.attach(parent, id);
        } else if namespace.is_none() {
            warn!("Unhandled type {}", doc.name);
        }
        Ok(())
    }

    /// Finds the namespace for a dotted path, creating missing ancestors
    /// from their documentation.
    fn find_or_create_namespace(&mut self, apis: &'a ApiDocs, path: &str) -> Result<NodeId> {
        if let Some(id) = self.namespaces.get(path) {
            return Ok(*id);
        }
        let mut parent = None;
        let mut prefix = String::new();
        for segment in path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            if let Some(id) = self.namespaces.get(&prefix) {
                parent = Some(*id);
                continue;
            }
            let doc = apis
                .get(&prefix)
                .ok_or_else(|| DocgenError::MissingAncestor(prefix.clone()))?;
            let id = self.push(NodeKind::Namespace, doc);
            self.namespaces.insert(prefix.clone(), id);
            self.attach(parent, id);
            if let Some(companion) = self.interfaces.get(&prefix).copied()
                && self.nodes[companion.0].related.is_none()
            {
                self.link(id, companion);
            }
            parent = Some(id);
        }
        parent.ok_or_else(|| DocgenError::NamespacePath(path.to_string()))
    }

    /// Unlinks companion pairs whose namespace would be empty.
    ///
    /// A linked namespace is kept when it has children or is a
    /// constants-only proxy, and the type is not removed. Otherwise the
    /// companion carries every member and the namespace is suppressed.
    fn resolve_pairs(&mut self) {
        for idx in 0..self.nodes.len() {
            let node = &self.nodes[idx];
            let Some(companion) = node.related else {
                continue;
            };
            if node.kind != NodeKind::Namespace {
                continue;
            }
            let has_children = !node.namespaces.is_empty() || !node.interfaces.is_empty();
            let keep = (has_children || is_constants_only_proxy(node.doc)) && !node.removed;
            if !keep {
                self.nodes[companion.0].related = None;
                self.nodes[idx].suppressed = true;
            }
        }
    }

    /// Initialises the members of one node.
    fn init(&mut self, id: NodeId, apis: &ApiDocs) {
        let node = &self.nodes[id.0];
        if node.suppressed {
            return;
        }
        let mut init = Initializer {
            doc: node.doc,
            apis,
            kind: node.kind,
            related: node.related.is_some(),
            removed: node.removed,
            names: HashSet::new(),
        };
        let mut body = init.run();
        if node.kind == NodeKind::Namespace {
            let children: Vec<String> = node
                .namespaces
                .iter()
                .chain(&node.interfaces)
                .map(|child| self.nodes[child.0].name.clone())
                .collect();
            remove_clashes(node.doc, &mut body, &children);
        }
        self.nodes[id.0].body = body;
    }
}

/// Removes namespace members that share a name with a child type.
fn remove_clashes(doc: &TypeDoc, body: &mut Body, children: &[String]) {
    for child in children {
        let before = body.properties.len() + body.methods.len();
        body.properties.retain(|p| &p.name != child);
        body.methods.retain(|m| &m.name != child);
        if body.properties.len() + body.methods.len() != before {
            warn!("Duplicate identifier \"{child}\" on {}", doc.name);
        }
    }
}

/// Builds the [`Body`] of one node.
struct Initializer<'d> {
    /// Source documentation.
    doc: &'d TypeDoc,
    /// Every type, for event map ancestry.
    apis: &'d ApiDocs,
    /// Kind of the node being built.
    kind: NodeKind,
    /// The node has a companion.
    related: bool,
    /// The type was removed.
    removed: bool,
    /// Identifiers already declared, for duplicate detection.
    names: HashSet<String>,
}

impl Initializer<'_> {
    /// Builds the body.
    fn run(&mut self) -> Body {
        let mut body = Body {
            summary: self.doc.summary.as_deref().unwrap_or_default().trim().to_string(),
            ..Default::default()
        };
        if self.removed
            && let Some(notes) = self.doc.support.deprecated.as_ref().and_then(|d| d.notes.as_deref())
        {
            body.summary.push('\n');
            body.summary.push_str(notes.trim());
        }
        if self.removed {
            return body;
        }
        match self.kind {
            NodeKind::Namespace if self.related => {
                body.properties = self.properties(false);
            }
            NodeKind::Namespace => {
                let map = self.events(&mut body);
                body.properties = self.properties(false);
                body.methods = self.methods(map.as_deref(), false);
            }
            NodeKind::Interface | NodeKind::Class => {
                if self.doc.short_name() != "Titanium" {
                    body.extends.clone_from(&self.doc.extends);
                }
                let is_static = self.kind == NodeKind::Class && self.doc.meta.subtype == Subtype::Module;
                let map = self.events(&mut body);
                body.properties = self.properties(is_static);
                body.methods = self.methods(map.as_deref(), is_static);
                if self.doc.name == "Titanium.Proxy" && !body.properties.iter().any(|p| p.name == "id") {
                    let mut id = VariableNode::raw("id", "string | number", "Proxy identifier");
                    id.optional = true;
                    body.properties.push(id);
                }
            }
        }
        body
    }

    /// Whether a property is declared on this node.
    fn keeps_property(&self, property: &PropertyDoc) -> bool {
        let name = self.doc.name.as_str();
        let special = (name == "Titanium.Map.View" && property.name == "animate")
            || (matches!(name, "Titanium.Android" | "Titanium.App.Android") && property.name == "R");
        if special || !property.is_owned_by(name) {
            return false;
        }
        match (self.kind, self.related) {
            (NodeKind::Namespace, true) => is_upper(&property.name),
            (_, true) => !is_upper(&property.name),
            _ => true,
        }
    }

    /// Declares a name, warning about duplicates.
    fn declare(&mut self, name: &str) -> bool {
        if !self.names.insert(name.to_string()) {
            warn!("Duplicate identifier \"{name}\" on API {}", self.doc.name);
            return false;
        }
        true
    }

    /// Property nodes sorted by name.
    fn properties(&mut self, is_static: bool) -> Vec<VariableNode> {
        let mut docs: Vec<&PropertyDoc> = self
            .doc
            .properties
            .iter()
            .filter(|p| self.keeps_property(p))
            .collect();
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        let top_level = !self.doc.name.contains('.');
        let mut nodes = Vec::with_capacity(docs.len());
        for doc in docs {
            if !self.declare(&doc.name) {
                continue;
            }
            let mut node = VariableNode::from_property(doc, is_static);
            if top_level && doc.optional.is_none() {
                node.optional = true;
            }
            if self.doc.name == "Titanium.Proxy" && doc.name == "lifecycleContainer" {
                node.optional = true;
            }
            nodes.push(node);
        }
        nodes
    }

    /// Method nodes sorted by name, with event methods regenerated when an
    /// event map exists.
    fn methods(&mut self, map: Option<&str>, is_static: bool) -> Vec<FunctionNode> {
        let mut docs: Vec<&MethodDoc> = self.doc.own(&self.doc.methods).collect();
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        let mut nodes = Vec::new();
        if let Some(map) = map {
            for name in EVENT_METHODS {
                let summary = self
                    .doc
                    .methods
                    .iter()
                    .find(|m| m.name == *name)
                    .and_then(|m| m.summary.as_deref())
                    .unwrap_or_default()
                    .trim();
                nodes.push(FunctionNode::event_method(
                    name,
                    summary,
                    map,
                    &self.doc.name,
                    is_static,
                ));
            }
        }
        for doc in docs {
            if !self.declare(&doc.name) {
                continue;
            }
            let mut overloads = FunctionNode::overloads(doc, &self.doc.name, is_static);
            if self.doc.name == "Titanium.Proxy" && doc.name.ends_with("LifecycleContainer") {
                for overload in &mut overloads {
                    overload.optional = true;
                }
            }
            nodes.extend(overloads);
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    /// Builds the event interfaces and returns the event map name.
    fn events(&self, body: &mut Body) -> Option<String> {
        let live: Vec<&EventDoc> = self
            .doc
            .own(&self.doc.events)
            .filter(|e| !e.meta.hide && !e.is_removed())
            .collect();
        if live.is_empty() {
            return None;
        }
        let short = self.doc.short_name();
        let base_event = format!("{short}BaseEvent");
        body.events.push(EventInterface {
            name: base_event.clone(),
            extends: "Ti.Event".to_string(),
            summary: format!("Base event for class {}", self.doc.name),
            properties: vec![VariableNode::raw(
                "source",
                &self.doc.name,
                "Source object that fired the event.",
            )],
        });
        let mut entries = Vec::with_capacity(live.len());
        for event in live {
            let properties: Vec<VariableNode> = event
                .properties
                .iter()
                .filter(|p| p.name != "source")
                .map(|p| {
                    let mut node = VariableNode::from_property(p, false);
                    node.optional = false;
                    node.is_constant = false;
                    node
                })
                .collect();
            let entry_type = if properties.is_empty() {
                base_event.clone()
            } else {
                let name = format!("{short}_{}_Event", event.name.replace(':', "_"));
                body.events.push(EventInterface {
                    name: name.clone(),
                    extends: base_event.clone(),
                    summary: event.summary.as_deref().unwrap_or_default().trim().to_string(),
                    properties,
                });
                name
            };
            let key = if event.name.contains(':') {
                format!("\"{}\"", event.name)
            } else {
                event.name.clone()
            };
            entries.push(VariableNode::raw(&key, &entry_type, ""));
        }
        let map = format!("{short}EventMap");
        body.events.push(EventInterface {
            name: map.clone(),
            extends: self.parent_event_map(),
            summary: String::new(),
            properties: entries,
        });
        Some(map)
    }

    /// Event map of the nearest ancestor that declares events.
    fn parent_event_map(&self) -> String {
        let mut current = self.doc.extends.as_deref();
        let mut hops = 0;
        while let Some(name) = current
            && hops < self.apis.len()
        {
            let Some(ancestor) = self.apis.get(name) else {
                break;
            };
            let emits_interface = !SKIP_APIS.contains(&name)
                && !matches!(name, "Titanium" | "Modules")
                && !ancestor.is_removed();
            let has_events = ancestor
                .own(&ancestor.events)
                .any(|e| !e.meta.hide && !e.is_removed());
            if emits_interface && has_events {
                return match split_name(name) {
                    (Some(namespace), short) => format!("{namespace}.{short}EventMap"),
                    (None, short) => format!("{short}EventMap"),
                };
            }
            current = ancestor.extends.as_deref();
            hops += 1;
        }
        "ProxyEventMap".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberMeta;

    fn property(name: &str, read_only: bool, hide: bool) -> PropertyDoc {
        PropertyDoc {
            name: name.to_string(),
            permission: read_only.then(|| "read-only".to_string()),
            meta: MemberMeta {
                inherits: Some("Titanium.Colors".to_string()),
                hide,
                creator: false,
            },
            ..Default::default()
        }
    }

    fn proxy(properties: Vec<PropertyDoc>) -> TypeDoc {
        let mut doc = TypeDoc {
            name: "Titanium.Colors".to_string(),
            properties,
            ..Default::default()
        };
        doc.meta.subtype = Subtype::Proxy;
        doc
    }

    #[test]
    fn constants_only_needs_a_read_only_property() {
        assert!(is_constants_only_proxy(&proxy(vec![property("RED", true, false)])));
        assert!(!is_constants_only_proxy(&proxy(vec![])));
        assert!(!is_constants_only_proxy(&proxy(vec![
            property("RED", true, false),
            property("color", false, false),
        ])));
    }

    #[test]
    fn hidden_members_only_count_as_constants() {
        assert!(is_constants_only_proxy(&proxy(vec![
            property("RED", true, false),
            property("color", false, true),
        ])));
        assert!(is_constants_only_proxy(&proxy(vec![property("RED", true, true)])));
    }

    #[test]
    fn inherited_members_are_ignored() {
        let mut inherited = property("BLUE", true, false);
        inherited.meta.inherits = Some("Titanium.Proxy".to_string());
        assert!(!is_constants_only_proxy(&proxy(vec![inherited])));
    }
}
