//! The processed documentation set handed to generators.

use indexmap::IndexMap;

use crate::{
    common::split_name,
    model::{DocMap, Member, Subtype, TypeDoc},
};

/// Flattened documentation keyed by fully-qualified type name.
#[derive(Debug, Clone, Default)]
pub struct ApiDocs {
    /// Processed types in processing order.
    types: DocMap,
}

impl ApiDocs {
    /// Wraps an already processed map.
    pub fn new(types: DocMap) -> Self {
        Self { types }
    }

    /// Looks up a type.
    pub fn get(&self, name: &str) -> Option<&TypeDoc> {
        self.types.get(name)
    }

    /// Whether a type exists.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates over every type.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDoc> {
        self.types.values()
    }

    /// Type names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether there are no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Types grouped by subtype, each group sorted by name.
    pub fn by_subtype(&self) -> IndexMap<Subtype, Vec<&TypeDoc>> {
        let mut groups: IndexMap<Subtype, Vec<&TypeDoc>> = [
            Subtype::Module,
            Subtype::Proxy,
            Subtype::View,
            Subtype::Pseudo,
        ]
        .into_iter()
        .map(|s| (s, Vec::new()))
        .collect();
        for ty in self.types.values() {
            groups.entry(ty.meta.subtype).or_default().push(ty);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Whether `name` names a type, or a member of a type, or a module.
    pub fn is_valid_type(&self, name: &str) -> bool {
        if name.starts_with("Modules.") || self.contains(name) {
            return true;
        }
        self.find_member(name)
    }

    /// Whether `name` is `Type.member` for an existing member.
    pub fn find_member(&self, name: &str) -> bool {
        let (Some(cls), member) = split_name(name) else {
            return false;
        };
        self.get(cls).is_some_and(|ty| {
            ty.properties.iter().any(|m| m.name() == member)
                || ty.methods.iter().any(|m| m.name() == member)
                || ty.events.iter().any(|m| m.name() == member)
        })
    }
}
