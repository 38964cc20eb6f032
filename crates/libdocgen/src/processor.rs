//! Flattens inheritance and computes platform availability.
//!
//! Processing works on the typed document map. Parents are processed before
//! their children and results are memoised, so every type sees its parent's
//! fully processed member lists.

use std::{
    collections::{HashMap, HashSet},
    mem,
};

use tracing::debug;

use crate::{
    DocgenError, Result,
    apis::ApiDocs,
    common::{ADDON_VERSIONS, Versions, default_versions, is_constant_name, split_name},
    freeform::resolve_free_form,
    model::{
        DocMap, Member, MethodDoc, ParameterDoc, PropertyDoc, ReturnDoc, Since, Subtype, Support,
        TypeDoc, TypeExpr,
    },
    version::is_greater,
};

/// Types processed ahead of everything else.
const PROCESS_FIRST: &[&str] = &["Titanium.Proxy", "Titanium.Module", "Titanium.UI.View"];

/// Placeholder documents that are never emitted.
const SKIP: &[&str] = &["Titanium.Namespace.Name"];

/// Computes the platforms and versions an API supports.
///
/// `versions` is the starting point, usually the enclosing type's versions.
/// With `match_version` set, add-on platforms are only added when `versions`
/// already includes them.
pub fn process_versions(
    support: &Support,
    versions: &Versions,
    match_version: bool,
    addon: bool,
) -> Result<Versions> {
    let mut out = versions.clone();
    let listed = support.platforms.as_ref().filter(|p| !p.is_empty());
    let excluded = support.exclude_platforms.as_ref().filter(|p| !p.is_empty());
    if let Some(platforms) = listed {
        out.retain(|p, _| platforms.contains(p));
        for (platform, version) in ADDON_VERSIONS {
            let allowed = !match_version || versions.contains_key(*platform);
            if allowed && platforms.iter().any(|p| p == platform) {
                out.insert((*platform).to_string(), (*version).to_string());
            }
        }
    } else if let Some(excluded) = excluded {
        out.retain(|p, _| !excluded.contains(p));
        remove_addon_platforms(&mut out);
    } else if addon {
        for (platform, version) in ADDON_VERSIONS {
            if versions.contains_key(*platform) {
                out.insert((*platform).to_string(), (*version).to_string());
            }
        }
    } else {
        remove_addon_platforms(&mut out);
    }

    match &support.since {
        Some(Since::Version(since)) => {
            for version in out.values_mut() {
                if is_greater(since.as_str(), version)? {
                    version.clone_from(&since.0);
                }
            }
        }
        Some(Since::PerPlatform(map)) => {
            for (platform, version) in out.iter_mut() {
                if let Some(since) = map.get(platform)
                    && is_greater(since.as_str(), version)?
                {
                    version.clone_from(&since.0);
                }
            }
        }
        None => {}
    }
    Ok(out)
}

/// Drops every add-on platform from `versions`.
fn remove_addon_platforms(versions: &mut Versions) {
    for (platform, _) in ADDON_VERSIONS {
        versions.shift_remove(*platform);
    }
}

/// Infers the subtype of `name` by walking its `extends` chain.
pub fn subtype_of(docs: &DocMap, name: &str) -> Subtype {
    let mut current = name;
    let mut seen = HashSet::new();
    loop {
        match current {
            "Global" | "Titanium.Module" => return Subtype::Module,
            "Titanium.Proxy" => return Subtype::Proxy,
            _ if current.starts_with("Global.") => return Subtype::Module,
            _ => {}
        }
        let Some(parent) = docs.get(current).and_then(|d| d.extends.as_deref()) else {
            return Subtype::Pseudo;
        };
        match parent {
            "Titanium.UI.View" => return Subtype::View,
            "Titanium.Module" => return Subtype::Module,
            "Titanium.Proxy" => return Subtype::Proxy,
            _ if !docs.contains_key(parent) || !seen.insert(parent) => return Subtype::Pseudo,
            _ => current = parent,
        }
    }
}

/// Merges own members over inherited ones.
///
/// An own member that shares a name with an inherited one overlays the
/// fields it sets and takes ownership. Other own members are appended.
fn inherit_members<M: Member>(inherited: &[M], own: &[M], owner: &str) -> Vec<M> {
    let mut result = inherited.to_vec();
    let mut matched = vec![false; own.len()];
    for member in &mut result {
        for (idx, candidate) in own.iter().enumerate() {
            if candidate.name() != member.name() {
                continue;
            }
            matched[idx] = true;
            if candidate.meta().inherits == member.meta().inherits {
                continue;
            }
            member.overlay(candidate);
            member.meta_mut().inherits = Some(owner.to_string());
        }
    }
    result.extend(
        own.iter()
            .zip(matched)
            .filter(|(_, matched)| !matched)
            .map(|(m, _)| owned_by(m.clone(), owner)),
    );
    result
}

/// Marks a member as owned by `owner`.
fn owned_by<M: Member>(mut member: M, owner: &str) -> M {
    member.meta_mut().inherits = Some(owner.to_string());
    member
}

/// Hides members listed in `excluded`.
fn hide_members<M: Member>(members: &mut [M], excluded: &[String], owner: &str) {
    for member in members {
        if member.meta().hide {
            continue;
        }
        if excluded.iter().any(|e| e == member.name()) {
            member.meta_mut().hide = true;
            member.meta_mut().inherits = Some(owner.to_string());
        }
    }
}

/// Computes member versions against the type's versions. Members left
/// without platforms are dropped.
fn process_members<M: Member>(members: Vec<M>, versions: &Versions, addon: bool) -> Result<Vec<M>> {
    let mut out = Vec::with_capacity(members.len());
    for mut member in members {
        let member_versions = process_versions(member.support(), versions, true, addon)?;
        member.support_mut().set_versions(&member_versions);
        if member_versions.is_empty() {
            debug!(member = member.name(), "dropping member without platforms");
            continue;
        }
        out.push(member);
    }
    Ok(out)
}

/// Whether an unprocessed type declares read-only properties and nothing else.
fn declares_only_constants(ty: &TypeDoc) -> bool {
    ty.methods.is_empty()
        && !ty.properties.is_empty()
        && ty.properties.iter().all(PropertyDoc::is_read_only)
}

/// Builds the factory method a namespace gets for a creatable type.
fn creator_method(ty: &TypeDoc, versions: &Versions, method_name: String) -> MethodDoc {
    let mut support = Support {
        deprecated: ty.support.deprecated.clone(),
        ..Default::default()
    };
    support.set_versions(versions);
    let mut method = MethodDoc {
        name: method_name,
        summary: Some(format!("Creates and returns an instance of <{}>.\n", ty.name)),
        returns: vec![ReturnDoc {
            type_expr: Some(TypeExpr::Single(ty.name.clone())),
            ..Default::default()
        }],
        parameters: vec![ParameterDoc {
            name: "parameters".into(),
            summary: Some(format!(
                "Properties to set on a new object, including any defined by <{}> except those marked not-creation or read-only.\n",
                ty.name
            )),
            type_expr: Some(TypeExpr::Single(format!("Dictionary<{}>", ty.name))),
            optional: Some(true),
            ..Default::default()
        }],
        support,
        ..Default::default()
    };
    method.meta.creator = true;
    method
}

/// Processes a typed document map.
pub struct Processor {
    /// Unprocessed documents.
    docs: DocMap,
    /// Subtype per type name.
    subtypes: HashMap<String, Subtype>,
    /// Memoised results.
    processed: DocMap,
    /// Types currently being processed, for cycle detection.
    in_progress: HashSet<String>,
}

impl Processor {
    /// Creates a processor over `docs`.
    pub fn new(docs: DocMap) -> Self {
        let subtypes = docs
            .keys()
            .map(|name| (name.clone(), subtype_of(&docs, name)))
            .collect();
        Self {
            docs,
            subtypes,
            processed: DocMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Type names in processing order.
    fn order(&self) -> Vec<String> {
        let mut order: Vec<String> = PROCESS_FIRST
            .iter()
            .filter(|name| self.docs.contains_key(**name))
            .map(|name| (*name).to_string())
            .collect();
        for name in self.docs.keys() {
            if !PROCESS_FIRST.contains(&name.as_str()) && !SKIP.contains(&name.as_str()) {
                order.push(name.clone());
            }
        }
        order
    }

    /// Runs every processing step and returns the flattened documentation.
    pub fn run(mut self) -> Result<ApiDocs> {
        let order = self.order();
        self.synthesize_creators(&order)?;
        for name in &order {
            self.process(name)?;
        }
        let mut processed = mem::take(&mut self.processed);
        let types = order
            .iter()
            .filter_map(|name| processed.shift_remove_entry(name))
            .collect();
        Ok(ApiDocs::new(types))
    }

    /// Adds `create<Name>` factories to the namespaces of creatable types.
    fn synthesize_creators(&mut self, order: &[String]) -> Result<()> {
        for name in order {
            let subtype = self.subtypes.get(name).copied().unwrap_or_default();
            let Some(ty) = self.docs.get(name) else {
                continue;
            };
            if !matches!(subtype, Subtype::View | Subtype::Proxy) || ty.createable == Some(false) {
                continue;
            }
            if subtype == Subtype::Proxy && declares_only_constants(ty) {
                continue;
            }
            let (Some(namespace), short) = split_name(name) else {
                continue;
            };
            let method_name = format!("create{short}");
            let Some(parent) = self.docs.get(namespace) else {
                continue;
            };
            if parent.methods.iter().any(|m| m.name == method_name) {
                continue;
            }
            let versions = process_versions(&ty.support, &default_versions(), false, ty.meta.addon)?;
            let method = creator_method(ty, &versions, method_name);
            let namespace = namespace.to_string();
            if let Some(parent) = self.docs.get_mut(&namespace) {
                parent.methods.push(method);
            }
            if let Some(ty) = self.docs.get_mut(name) {
                ty.meta.creatable = true;
            }
        }
        Ok(())
    }

    /// Processes one type, its ancestors first.
    fn process(&mut self, name: &str) -> Result<()> {
        if self.processed.contains_key(name) {
            return Ok(());
        }
        let Some(mut ty) = self.docs.get(name).cloned() else {
            return Ok(());
        };
        if !self.in_progress.insert(name.to_string()) {
            return Err(DocgenError::InheritanceCycle(name.to_string()));
        }

        let versions = process_versions(&ty.support, &default_versions(), false, ty.meta.addon)?;
        ty.support.set_versions(&versions);
        ty.meta.subtype = self.subtypes.get(name).copied().unwrap_or_default();

        let parent = ty
            .extends
            .clone()
            .filter(|parent| self.docs.contains_key(parent));
        if let Some(parent) = parent {
            self.process(&parent)?;
            if let Some(base) = self.processed.get(&parent) {
                ty.properties = inherit_members(&base.properties, &ty.properties, name);
                ty.methods = inherit_members(&base.methods, &ty.methods, name);
                ty.events = inherit_members(&base.events, &ty.events, name);
            }
        } else {
            ty.properties = ty.properties.into_iter().map(|m| owned_by(m, name)).collect();
            ty.methods = ty.methods.into_iter().map(|m| owned_by(m, name)).collect();
            ty.events = ty.events.into_iter().map(|m| owned_by(m, name)).collect();
        }

        if let Some(excludes) = ty.excludes.clone() {
            hide_members(&mut ty.events, &excludes.events, name);
            hide_members(&mut ty.properties, &excludes.properties, name);
            hide_members(&mut ty.methods, &excludes.methods, name);
        }

        let addon = ty.meta.addon;
        ty.events = process_members(ty.events, &versions, addon)?;
        ty.properties = process_members(ty.properties, &versions, addon)?;
        ty.methods = process_members(ty.methods, &versions, addon)?;
        self.expand_all_constants(&mut ty);
        resolve_free_form(&mut ty)?;

        self.in_progress.remove(name);
        self.processed.insert(name.to_string(), ty);
        Ok(())
    }

    /// Expands constant wildcards on every member of `ty`.
    fn expand_all_constants(&self, ty: &mut TypeDoc) {
        for property in &mut ty.properties {
            property.constants = self.expand_constants(&property.constants);
        }
        for event in &mut ty.events {
            for property in &mut event.properties {
                property.constants = self.expand_constants(&property.constants);
            }
        }
        for method in &mut ty.methods {
            for parameter in &mut method.parameters {
                parameter.constants = self.expand_constants(&parameter.constants);
            }
            for ret in &mut method.returns {
                ret.constants = self.expand_constants(&ret.constants);
            }
        }
    }

    /// Expands `Type.PREFIX_*` references into every matching constant.
    pub fn expand_constants(&self, constants: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for constant in constants {
            let Some(pattern) = constant.strip_suffix('*') else {
                out.push(constant.clone());
                continue;
            };
            let (Some(cls), prefix) = split_name(pattern) else {
                continue;
            };
            let Some(ty) = self.processed.get(cls).or_else(|| self.docs.get(cls)) else {
                continue;
            };
            out.extend(
                ty.properties
                    .iter()
                    .filter(|p| p.name.starts_with(prefix) && is_constant_name(&p.name))
                    .map(|p| format!("{cls}.{}", p.name)),
            );
        }
        out
    }
}

/// Processes a document map.
pub fn process(docs: DocMap) -> Result<ApiDocs> {
    Processor::new(docs).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VersionString;
    use pretty_assertions::assert_eq;

    fn docs(yaml: &[&str]) -> DocMap {
        yaml.iter()
            .map(|y| {
                let ty: TypeDoc = serde_yaml::from_str(y).unwrap();
                (ty.name.clone(), ty)
            })
            .collect()
    }

    fn versions(pairs: &[(&str, &str)]) -> Versions {
        pairs
            .iter()
            .map(|(p, v)| ((*p).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn since_raises_default_versions() {
        let support = Support {
            since: Some(Since::Version(VersionString("3.0".into()))),
            platforms: Some(vec!["android".into(), "iphone".into()]),
            ..Default::default()
        };
        let out = process_versions(&support, &default_versions(), false, false).unwrap();
        assert_eq!(out, versions(&[("android", "3.0"), ("iphone", "3.0")]));
    }

    #[test]
    fn addon_platforms_need_listing() {
        let support = Support {
            platforms: Some(vec!["android".into(), "blackberry".into()]),
            ..Default::default()
        };
        let out = process_versions(&support, &default_versions(), false, false).unwrap();
        assert_eq!(out, versions(&[("android", "0.8"), ("blackberry", "3.1.2")]));

        let member = process_versions(&support, &versions(&[("android", "1.0")]), true, false)
            .unwrap();
        assert_eq!(member, versions(&[("android", "1.0")]));
    }

    #[test]
    fn excluded_platforms_are_dropped() {
        let support = Support {
            exclude_platforms: Some(vec!["macos".into(), "ipad".into()]),
            since: Some(Since::PerPlatform(
                [("android".to_string(), VersionString("2.0".into()))]
                    .into_iter()
                    .collect(),
            )),
            ..Default::default()
        };
        let out = process_versions(&support, &default_versions(), false, false).unwrap();
        assert_eq!(out, versions(&[("android", "2.0"), ("iphone", "0.8")]));
    }

    #[test]
    fn invalid_since_is_fatal() {
        let support = Support {
            since: Some(Since::Version(VersionString("soon".into()))),
            ..Default::default()
        };
        assert!(matches!(
            process_versions(&support, &default_versions(), false, false),
            Err(DocgenError::InvalidVersion(_))
        ));
    }

    #[test]
    fn subtypes_follow_extends() {
        let map = docs(&[
            "name: Titanium.Proxy",
            "name: Titanium.UI.View\nextends: Titanium.Proxy",
            "name: Titanium.UI.Button\nextends: Titanium.UI.View",
            "name: Titanium.UI.Special\nextends: Titanium.UI.Button",
            "name: Titanium.UI.Font",
            "name: Global.console",
        ]);
        assert_eq!(subtype_of(&map, "Titanium.UI.Button"), Subtype::View);
        assert_eq!(subtype_of(&map, "Titanium.UI.Special"), Subtype::View);
        assert_eq!(subtype_of(&map, "Titanium.UI.View"), Subtype::Proxy);
        assert_eq!(subtype_of(&map, "Titanium.UI.Font"), Subtype::Pseudo);
        assert_eq!(subtype_of(&map, "Global.console"), Subtype::Module);
    }

    #[test]
    fn flattens_inheritance_and_overrides() {
        let apis = process(docs(&[
            r#"
name: Titanium.Proxy
properties:
  - name: apiName
    summary: Name of the API.
    type: String
    permission: read-only
"#,
            r#"
name: Titanium.Foo
extends: Titanium.Proxy
createable: false
properties:
  - name: apiName
    summary: Overridden.
  - name: color
    type: String
"#,
        ]))
        .unwrap();
        let foo = apis.get("Titanium.Foo").unwrap();
        let names: Vec<_> = foo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["apiName", "color"]);
        let api_name: &PropertyDoc = &foo.properties[0];
        assert_eq!(api_name.summary.as_deref(), Some("Overridden."));
        assert!(api_name.is_read_only());
        assert!(api_name.is_owned_by("Titanium.Foo"));
        let proxy = apis.get("Titanium.Proxy").unwrap();
        assert!(proxy.properties[0].is_owned_by("Titanium.Proxy"));
        assert_eq!(proxy.meta.subtype, Subtype::Proxy);
    }

    #[test]
    fn synthesizes_creator_methods() {
        let apis = process(docs(&[
            "name: Titanium.Proxy",
            "name: Titanium.Module\nextends: Titanium.Proxy",
            "name: Titanium.UI\nextends: Titanium.Module",
            "name: Titanium.UI.View\nextends: Titanium.Proxy",
            "name: Titanium.UI.Label\nextends: Titanium.UI.View",
        ]))
        .unwrap();
        let ui = apis.get("Titanium.UI").unwrap();
        let creators: Vec<_> = ui
            .methods
            .iter()
            .filter(|m| m.meta.creator)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(creators, vec!["createView", "createLabel"]);
        assert!(ui.methods.iter().all(|m| m.is_owned_by("Titanium.UI")));
        assert!(apis.get("Titanium.UI.Label").unwrap().meta.creatable);
    }

    #[test]
    fn constants_only_proxies_get_no_factory() {
        let apis = process(docs(&[
            "name: Titanium.Proxy",
            "name: Titanium.Module\nextends: Titanium.Proxy",
            "name: Titanium.UI\nextends: Titanium.Module",
            "name: Titanium.UI.Colors\nextends: Titanium.Proxy\nproperties:\n  - name: RED\n    type: String\n    permission: read-only\n",
            "name: Titanium.UI.Swatch\nextends: Titanium.Proxy\nproperties:\n  - name: RED\n    permission: read-only\n  - name: color\n",
        ]))
        .unwrap();
        let ui = apis.get("Titanium.UI").unwrap();
        let creators: Vec<_> = ui.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(creators, vec!["createSwatch"]);
        assert!(!apis.get("Titanium.UI.Colors").unwrap().meta.creatable);
    }

    #[test]
    fn excludes_hide_inherited_members() {
        let apis = process(docs(&[
            "name: Base\nmethods:\n  - name: focus\n  - name: blur\n",
            "name: Child\nextends: Base\nexcludes:\n  methods: [blur]\n",
        ]))
        .unwrap();
        let child = apis.get("Child").unwrap();
        let blur = child.methods.iter().find(|m| m.name == "blur").unwrap();
        assert!(blur.meta.hide);
        assert!(blur.is_owned_by("Child"));
        let focus = child.methods.iter().find(|m| m.name == "focus").unwrap();
        assert!(focus.is_owned_by("Base"));
    }

    #[test]
    fn expands_constant_wildcards() {
        let apis = process(docs(&[
            r#"
name: Titanium.UI
properties:
  - name: TEXT_ALIGNMENT_LEFT
    permission: read-only
  - name: TEXT_ALIGNMENT_RIGHT
    permission: read-only
  - name: textMode
"#,
            r#"
name: Titanium.UI.Label
properties:
  - name: textAlign
    constants: Titanium.UI.TEXT_ALIGNMENT_*
"#,
        ]))
        .unwrap();
        let label = apis.get("Titanium.UI.Label").unwrap();
        assert_eq!(
            label.properties[0].constants,
            vec![
                "Titanium.UI.TEXT_ALIGNMENT_LEFT",
                "Titanium.UI.TEXT_ALIGNMENT_RIGHT"
            ]
        );
    }

    #[test]
    fn members_without_platforms_are_dropped() {
        let apis = process(docs(&[
            "name: Foo\nplatforms: [android]\nmethods:\n  - name: iosOnly\n    platforms: [iphone]\n  - name: both\n",
        ]))
        .unwrap();
        let foo = apis.get("Foo").unwrap();
        assert_eq!(foo.methods.len(), 1);
        assert_eq!(foo.methods[0].support.platforms, Some(vec!["android".into()]));
    }

    #[test]
    fn cycles_are_fatal() {
        let result = process(docs(&["name: A\nextends: B", "name: B\nextends: A"]));
        assert!(matches!(result, Err(DocgenError::InheritanceCycle(_))));
    }
}
