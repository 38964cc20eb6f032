//! Versioned API metadata and links into the site.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::SiteOptions;
use crate::{DocgenError, Result, common::split_name};

/// Version key of the unreleased docs.
pub const NEXT: &str = "next";

/// Member lists searched when resolving `Type.member`.
const MEMBER_LISTS: &[&str] = &["properties", "methods", "events", "constants"];

/// Metadata of one type, as exported to `api.json`.
pub type TypeMetadata = Map<String, Value>;

/// A resolved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Display name: the type or member name.
    pub name: String,
    /// Site path of the page, with a member anchor if any.
    pub path: String,
}

/// Metadata for every version of the docs.
#[derive(Debug, Clone, Default)]
pub struct MetadataService {
    /// `next` followed by released versions, newest first.
    versions: Vec<String>,
    /// Released versions as listed in `versions.json`.
    released: Vec<String>,
    /// Types by name, per version.
    metadata: IndexMap<String, IndexMap<String, TypeMetadata>>,
}

/// Reads one `api.json` file.
fn read_metadata(path: &Path) -> Result<IndexMap<String, TypeMetadata>> {
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let Value::Object(types) = value else {
        return Err(DocgenError::Metadata(format!(
            "{} does not hold an object of types",
            path.display()
        )));
    };
    types
        .into_iter()
        .map(|(name, ty)| match ty {
            Value::Object(ty) => Ok((name, ty)),
            _ => Err(DocgenError::Metadata(format!(
                "metadata for {name} in {} is not an object",
                path.display()
            ))),
        })
        .collect()
}

impl MetadataService {
    /// Builds a service from in-memory metadata. `released` lists released
    /// versions, newest first.
    pub fn new(
        next: IndexMap<String, TypeMetadata>,
        released: Vec<(String, IndexMap<String, TypeMetadata>)>,
    ) -> Self {
        let mut service = Self::default();
        service.versions.push(NEXT.to_string());
        service.metadata.insert(NEXT.to_string(), next);
        for (version, types) in released {
            service.versions.push(version.clone());
            service.released.push(version.clone());
            service.metadata.insert(version, types);
        }
        service
    }

    /// Loads `next` from `<source_dir>/<metadata_file>` and every version in
    /// `<source_dir>/.vuepress/versions.json` from the versioned docs
    /// directory. Missing files are skipped with a warning.
    pub fn load(source_dir: &Path, options: &SiteOptions) -> Result<Self> {
        let versions_file = source_dir.join(".vuepress").join("versions.json");
        let released: Vec<String> = if versions_file.is_file() {
            serde_json::from_str(&fs::read_to_string(&versions_file)?)?
        } else {
            Vec::new()
        };

        let mut service = Self::default();
        let next_file = source_dir.join(&options.metadata_file);
        if !next_file.is_file() {
            warn!(
                "Couldn't load metadata file at {}. Generate it with `docgen -f json-raw`.",
                next_file.display()
            );
            return Ok(service);
        }
        info!(file = %next_file.display(), "loading metadata");
        service
            .metadata
            .insert(NEXT.to_string(), read_metadata(&next_file)?);

        let versioned_dir = options
            .versioned_dir
            .clone()
            .unwrap_or_else(|| default_versioned_dir(source_dir));
        for version in &released {
            let file = versioned_dir.join(version).join(&options.metadata_file);
            if !file.is_file() {
                warn!(
                    "Couldn't load metadata file for version {version} at {}.",
                    file.display()
                );
                continue;
            }
            service
                .metadata
                .insert(version.clone(), read_metadata(&file)?);
        }

        service.versions.push(NEXT.to_string());
        service.versions.extend(released.iter().cloned());
        service.released = released;
        Ok(service)
    }

    /// `next` followed by released versions.
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// Released versions, newest first.
    pub fn released(&self) -> &[String] {
        &self.released
    }

    /// Every type of `version`, if it was loaded.
    pub fn types(&self, version: &str) -> Option<&IndexMap<String, TypeMetadata>> {
        self.metadata.get(version)
    }

    /// Mutable access to the types of `version`.
    pub fn types_mut(&mut self, version: &str) -> Option<&mut IndexMap<String, TypeMetadata>> {
        self.metadata.get_mut(version)
    }

    /// Metadata of one type. `version` defaults to `next`.
    pub fn find(&self, name: &str, version: Option<&str>) -> Option<&TypeMetadata> {
        self.metadata
            .get(version.unwrap_or(NEXT))
            .and_then(|types| types.get(name))
    }

    /// Whether `key_path` names a type or a type member, in `version` or in
    /// any version when none is given.
    pub fn is_valid_type(&self, key_path: &str, version: Option<&str>) -> bool {
        self.versions
            .iter()
            .filter(|v| version.is_none_or(|wanted| wanted == v.as_str()))
            .any(|v| {
                self.find(key_path, Some(v.as_str())).is_some()
                    || self.find_member(key_path, v).is_some()
            })
    }

    /// The owning type and member metadata for `Type.member`.
    fn find_member(&self, key_path: &str, version: &str) -> Option<(&TypeMetadata, &Value)> {
        let (Some(parent), member) = split_name(key_path) else {
            return None;
        };
        let owner = self.find(parent, Some(version))?;
        MEMBER_LISTS.iter().find_map(|list| {
            owner
                .get(*list)
                .and_then(Value::as_array)?
                .iter()
                .find(|m| m.get("name").and_then(Value::as_str) == Some(member))
                .map(|m| (owner, m))
        })
    }

    /// Site link for a type or member. With a `version`, the link points into
    /// that version's pages and resolves against its metadata; otherwise it
    /// resolves against `next` and has no version segment.
    pub fn link_for_key_path(
        &self,
        key_path: &str,
        base: &str,
        version: Option<&str>,
    ) -> Option<Link> {
        self.link_in(key_path, base, version, version.unwrap_or(NEXT))
    }

    /// Resolves `key_path` in `lookup` and links into `version`'s pages.
    pub fn link_in(
        &self,
        key_path: &str,
        base: &str,
        version: Option<&str>,
        lookup: &str,
    ) -> Option<Link> {
        let prefix = match version {
            Some(version) => format!("{base}{version}/api"),
            None => format!("{base}api"),
        };
        if let Some(ty) = self.find(key_path, Some(lookup)) {
            let name = ty
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(key_path);
            return Some(Link {
                name: name.to_string(),
                path: format!("{}/{}.html", section(&prefix, ty), page_name(name)),
            });
        }
        let (owner, member) = self.find_member(key_path, lookup)?;
        let owner_name = owner
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| split_name(key_path).0)?;
        let member_name = member.get("name").and_then(Value::as_str)?;
        Some(Link {
            name: member_name.to_string(),
            path: format!(
                "{}/{}.html#{}",
                section(&prefix, owner),
                page_name(owner_name),
                member_name.to_lowercase()
            ),
        })
    }
}

/// `<source_dir>/../website/versioned_docs`.
pub fn default_versioned_dir(source_dir: &Path) -> PathBuf {
    source_dir
        .join("..")
        .join("website")
        .join("versioned_docs")
}

/// Prefix of a type's pages: pseudo types live under `structs/`.
fn section(prefix: &str, ty: &TypeMetadata) -> String {
    if ty.get("type").and_then(Value::as_str) == Some("pseudo") {
        format!("{prefix}/structs")
    } else {
        prefix.to_string()
    }
}

/// `Titanium.UI.View` becomes `titanium/ui/view`.
fn page_name(name: &str) -> String {
    name.to_lowercase().replace('.', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn types(value: Value) -> IndexMap<String, TypeMetadata> {
        let Value::Object(map) = value else {
            panic!("not an object")
        };
        map.into_iter()
            .map(|(k, v)| match v {
                Value::Object(v) => (k, v),
                _ => panic!("not an object"),
            })
            .collect()
    }

    fn service() -> MetadataService {
        let next = types(json!({
            "Titanium.UI.View": {
                "name": "Titanium.UI.View",
                "type": "object",
                "methods": [{"name": "add"}],
                "properties": [{"name": "backgroundColor"}],
            },
            "Point": {"name": "Point", "type": "pseudo", "properties": [{"name": "x"}]},
        }));
        let old = types(json!({
            "Titanium.UI.Window": {"name": "Titanium.UI.Window", "type": "object"},
        }));
        MetadataService::new(next, vec![("8.0.0".into(), old)])
    }

    #[test]
    fn links_types_and_members() {
        let service = service();
        assert_eq!(
            service.link_for_key_path("Titanium.UI.View", "/", None),
            Some(Link {
                name: "Titanium.UI.View".into(),
                path: "/api/titanium/ui/view.html".into(),
            })
        );
        assert_eq!(
            service
                .link_for_key_path("Titanium.UI.View.add", "/docs/", None)
                .unwrap()
                .path,
            "/docs/api/titanium/ui/view.html#add"
        );
        assert_eq!(
            service.link_for_key_path("Point.x", "/", None).unwrap().path,
            "/api/structs/point.html#x"
        );
        assert_eq!(
            service
                .link_for_key_path("Titanium.UI.Window", "/", Some("8.0.0"))
                .unwrap()
                .path,
            "/8.0.0/api/titanium/ui/window.html"
        );
        assert!(service.link_for_key_path("Titanium.UI.Window", "/", None).is_none());
    }

    #[test]
    fn validates_across_versions() {
        let service = service();
        assert!(service.is_valid_type("Titanium.UI.Window", None));
        assert!(!service.is_valid_type("Titanium.UI.Window", Some(NEXT)));
        assert!(service.is_valid_type("Titanium.UI.View.backgroundColor", Some(NEXT)));
        assert!(!service.is_valid_type("Titanium.UI.View.nope", None));
        assert_eq!(service.versions(), ["next", "8.0.0"]);
    }

    #[test]
    fn loads_versioned_metadata() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("docs");
        fs::create_dir_all(source.join(".vuepress")).unwrap();
        fs::create_dir_all(source.join("api")).unwrap();
        fs::write(source.join(".vuepress/versions.json"), r#"["8.0.0", "7.0.0"]"#).unwrap();
        fs::write(source.join("api/api.json"), r#"{"Titanium": {"name": "Titanium"}}"#).unwrap();
        let versioned = dir.path().join("website/versioned_docs/8.0.0/api");
        fs::create_dir_all(&versioned).unwrap();
        fs::write(versioned.join("api.json"), r#"{"Titanium": {"name": "Titanium"}}"#).unwrap();

        let service = MetadataService::load(&source, &SiteOptions::default()).unwrap();
        assert_eq!(service.versions(), ["next", "8.0.0", "7.0.0"]);
        assert!(service.types("8.0.0").is_some());
        assert!(service.types("7.0.0").is_none());
        assert!(service.find("Titanium", None).is_some());
    }
}
