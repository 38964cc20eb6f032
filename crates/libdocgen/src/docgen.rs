use std::{
    collections::HashSet,
    fmt, fs, mem,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    DocgenError, Result,
    apis::ApiDocs,
    common::is_valid_platform,
    generators::{
        Artifact, Context, addon, changes, html, json, parity,
        typescript::{self, Layout},
    },
    loader::{YamlDoc, parse_yaml},
    merge::addon_merge,
    model::{DocMap, TypeDoc},
    processor,
    version::ApiVersion,
};

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// HTML reference pages under `apidoc/`.
    Html,
    /// Pretty `api.json`.
    Json,
    /// Pretty `api.json`, as consumed by the documentation site.
    JsonRaw,
    /// Compact `api.jsca`.
    Jsca,
    /// TypeScript declarations.
    Typescript,
    /// API change log between two versions.
    Changes,
    /// Platform parity matrix.
    Parity,
    /// Per-platform add-on YAML.
    Addon,
}

impl Format {
    /// Every format.
    pub const ALL: &'static [Self] = &[
        Self::Html,
        Self::Json,
        Self::JsonRaw,
        Self::Jsca,
        Self::Typescript,
        Self::Changes,
        Self::Parity,
        Self::Addon,
    ];

    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::JsonRaw => "json-raw",
            Self::Jsca => "jsca",
            Self::Typescript => "typescript",
            Self::Changes => "changes",
            Self::Parity => "parity",
            Self::Addon => "addon",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DocgenError::UnknownFormat(s.to_string()))
    }
}

/// The `version` field of an SDK `package.json`.
#[derive(Deserialize)]
struct PackageJson {
    /// SDK version.
    version: Option<String>,
}

/// Loads documentation trees and renders them into one or more formats.
#[derive(Debug, Clone)]
pub struct Docgen {
    /// Documentation roots. The first one locates the SDK `package.json`.
    paths: Vec<PathBuf>,
    /// Add-on roots merged over the base docs.
    addon_docs: Vec<PathBuf>,
    /// Formats to render.
    formats: Vec<Format>,
    /// Output directory.
    output: PathBuf,
    /// Platform for the `addon` format.
    platform: Option<String>,
    /// Stylesheet for the `html` format.
    css: Option<PathBuf>,
    /// First version of the `changes` range.
    start: Option<String>,
    /// Last version of the `changes` range.
    end: Option<String>,
    /// Layout of the `typescript` format.
    layout: Layout,
    /// Overrides the version read from `package.json`.
    sdk_version: Option<String>,
}

impl Docgen {
    /// A generator over the given documentation roots, rendering HTML into
    /// `dist`.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            addon_docs: Vec::new(),
            formats: vec![Format::Html],
            output: PathBuf::from("dist"),
            platform: None,
            css: None,
            start: None,
            end: None,
            layout: Layout::default(),
            sdk_version: None,
        }
    }

    /// Adds add-on documentation roots.
    pub fn with_addon_docs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.addon_docs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Replaces the formats to render.
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = Format>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Sets the output directory.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the platform for the `addon` format.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the HTML stylesheet.
    pub fn with_css(mut self, css: impl Into<PathBuf>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Sets the first version of the change log.
    pub fn with_start(mut self, version: impl Into<String>) -> Self {
        self.start = Some(version.into());
        self
    }

    /// Sets the last version of the change log.
    pub fn with_end(mut self, version: impl Into<String>) -> Self {
        self.end = Some(version.into());
        self
    }

    /// Sets the TypeScript layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the SDK version instead of reading it from `package.json`.
    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = Some(version.into());
        self
    }

    /// Output directory.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Formats to render.
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Checks the settings before any work is done.
    pub fn check(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(DocgenError::NoBasePaths);
        }
        for path in self.paths.iter().chain(&self.addon_docs) {
            if !path.is_dir() {
                return Err(DocgenError::InvalidPath(path.clone()));
            }
        }
        if self.formats.contains(&Format::Addon) {
            let platform = self.platform.as_deref().ok_or(DocgenError::MissingPlatform)?;
            if !is_valid_platform(platform) {
                return Err(DocgenError::InvalidPlatform(platform.to_string()));
            }
        }
        for version in [&self.start, &self.end].into_iter().flatten() {
            version.parse::<ApiVersion>()?;
        }
        Ok(())
    }

    /// SDK version: the explicit one, or `version` from the `package.json`
    /// next to the first documentation root.
    pub fn sdk_version(&self) -> Result<Option<String>> {
        if self.sdk_version.is_some() {
            return Ok(self.sdk_version.clone());
        }
        let Some(first) = self.paths.first() else {
            return Ok(None);
        };
        let package = first.join("..").join("package.json");
        if !package.is_file() {
            debug!(path = %package.display(), "no package.json");
            return Ok(None);
        }
        let package: PackageJson = serde_json::from_str(&fs::read_to_string(&package)?)?;
        Ok(package.version)
    }

    /// Loads, merges and processes every documentation root.
    pub fn load(&self) -> Result<ApiDocs> {
        if self.paths.is_empty() {
            return Err(DocgenError::NoBasePaths);
        }
        let mut docs: IndexMap<String, YamlDoc> = IndexMap::new();
        for base in &self.paths {
            info!("Parsing YAML files in {}...", base.display());
            let outcome = parse_yaml(base);
            for error in &outcome.errors {
                warn!("{error}");
            }
            for (name, doc) in outcome.docs {
                if docs.contains_key(&name) {
                    warn!("Duplicate class found: {name}");
                    continue;
                }
                docs.insert(name, doc);
            }
        }

        let mut added = HashSet::new();
        for base in &self.addon_docs {
            info!("Parsing add-on YAML files in {}...", base.display());
            let outcome = parse_yaml(base);
            for error in &outcome.errors {
                warn!("{error}");
            }
            for (name, doc) in outcome.docs {
                if let Some(existing) = docs.get_mut(&name) {
                    info!("Adding on to {name}...");
                    existing.value = addon_merge(mem::take(&mut existing.value), doc.value);
                } else {
                    info!("New class found in add-on docs: {name}...");
                    added.insert(name.clone());
                    docs.insert(name, doc);
                }
            }
        }

        let mut types = DocMap::new();
        for (name, doc) in &docs {
            let mut ty = TypeDoc::from_yaml(doc)?;
            ty.meta.addon = added.contains(name);
            types.insert(name.clone(), ty);
        }
        info!("Processing YAML data...");
        processor::process(types)
    }

    /// Renders one format without writing it.
    pub fn generate(&self, apis: &ApiDocs, format: Format) -> Result<Artifact> {
        let sdk_version = self.sdk_version()?;
        let ctx = Context {
            apis,
            sdk_version: sdk_version.as_deref(),
            base_paths: &self.paths,
        };
        match format {
            Format::Html => html::generate(&ctx, self.css.as_deref()),
            Format::Json | Format::JsonRaw => json::generate_json(&ctx),
            Format::Jsca => json::generate_jsca(&ctx),
            Format::Typescript => typescript::generate(&ctx, self.layout),
            Format::Changes => {
                changes::generate(&ctx, self.start.as_deref(), self.end.as_deref())
            }
            Format::Parity => parity::generate(&ctx),
            Format::Addon => addon::generate(&ctx, self.platform.as_deref()),
        }
    }

    /// Renders every configured format into the output directory.
    pub fn render(&self, apis: &ApiDocs) -> Result<Artifact> {
        let mut all = Artifact::new();
        for &format in &self.formats {
            info!(%format, "Generating output...");
            let artifact = self.generate(apis, format)?;
            artifact.write(&self.output)?;
            all.append(artifact);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parses_format_names() {
        assert_eq!("json-raw".parse::<Format>().unwrap(), Format::JsonRaw);
        assert!(matches!(
            "jsduck".parse::<Format>(),
            Err(DocgenError::UnknownFormat(_))
        ));
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), *format);
        }
    }

    #[test]
    fn checks_settings() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Docgen::new(Vec::<PathBuf>::new()).check(),
            Err(DocgenError::NoBasePaths)
        ));
        let docgen = Docgen::new([dir.path()]).with_formats([Format::Addon]);
        assert!(matches!(docgen.check(), Err(DocgenError::MissingPlatform)));
        assert!(docgen.clone().with_platform("android").check().is_ok());
        assert!(matches!(
            Docgen::new([dir.path()]).with_start("soon").check(),
            Err(DocgenError::InvalidVersion(_))
        ));
    }

    #[test]
    fn reads_sdk_version_next_to_docs() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("apidoc");
        fs::create_dir(&docs).unwrap();
        fs::write(dir.path().join("package.json"), r#"{"version": "12.1.0"}"#).unwrap();

        let docgen = Docgen::new([&docs]);
        assert_eq!(docgen.sdk_version().unwrap().as_deref(), Some("12.1.0"));
        let docgen = docgen.with_sdk_version("9.0.0");
        assert_eq!(docgen.sdk_version().unwrap().as_deref(), Some("9.0.0"));
    }

    #[test]
    fn addon_docs_merge_and_mark_new_types() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base");
        let extra = dir.path().join("extra");
        fs::create_dir(&base).unwrap();
        fs::create_dir(&extra).unwrap();
        fs::write(
            base.join("foo.yml"),
            "name: Titanium.Foo\nsummary: Foo.\nproperties:\n  - name: a\n    summary: A.\n    type: String\n",
        )
        .unwrap();
        fs::write(
            extra.join("foo.yml"),
            "name: Titanium.Foo\nproperties:\n  - name: b\n    summary: B.\n    type: String\n---\nname: Titanium.Bar\nsummary: Bar.\n",
        )
        .unwrap();

        let apis = Docgen::new([&base])
            .with_addon_docs([&extra])
            .load()
            .unwrap();
        let foo = apis.get("Titanium.Foo").unwrap();
        let names: Vec<_> = foo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(apis.get("Titanium.Bar").unwrap().meta.addon);
        assert!(!foo.meta.addon);
    }
}
