//! Static metadata for a versioned documentation site.
//!
//! The site reads the `api.json` written by the JSON generator for the
//! current docs (`next`) and for every released version. Each type is
//! prepared for its reference page by a [`MetadataProcessor`] and written to
//! `metadata/<version>/<type>.json`. `type-links.json` maps every type name to
//! its page.

pub mod processor;
pub mod service;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::info;

pub use self::{
    processor::{Header, MetadataProcessor},
    service::{Link, MetadataService, NEXT},
};
use crate::{Result, generators::Artifact};

/// Where site metadata lives and how links are formed.
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Base path of the site.
    pub base: String,
    /// Metadata file, relative to the source directory and to each version
    /// directory.
    pub metadata_file: PathBuf,
    /// Directory holding one subdirectory per released version. Defaults to
    /// `<source>/../website/versioned_docs`.
    pub versioned_dir: Option<PathBuf>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
            metadata_file: PathBuf::from("api").join("api.json"),
            versioned_dir: None,
        }
    }
}

impl SiteOptions {
    /// Sets the base path.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Sets the metadata file path.
    pub fn with_metadata_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.metadata_file = file.into();
        self
    }

    /// Sets the versioned docs directory.
    pub fn with_versioned_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.versioned_dir = Some(dir.into());
        self
    }
}

/// Processes every version's metadata into the files of the site.
pub fn build(service: &MetadataService, base: &str) -> Result<Artifact> {
    let mut artifact = Artifact::new();
    let mut links = IndexMap::new();
    for version in service.versions() {
        let Some(types) = service.types(version) else {
            continue;
        };
        for (name, metadata) in types {
            if !links.contains_key(name)
                && let Some(link) = service.link_in(name, "/", None, version)
            {
                links.insert(name.clone(), link.path);
            }
            let mut metadata = metadata.clone();
            let mut processor = MetadataProcessor::new(service, base, version);
            processor.process(&mut metadata);
            metadata.insert(
                "headers".into(),
                serde_json::to_value(processor.into_headers())?,
            );
            artifact.push_text(
                format!("metadata/{version}/{}.json", name.to_lowercase()),
                serde_json::to_string(&metadata)?,
            );
        }
        info!(version = %version, types = types.len(), "processed metadata");
    }
    artifact.push_text("type-links.json", serde_json::to_string(&links)?);
    Ok(artifact)
}

/// Loads the metadata under `source_dir` and builds the site files.
pub fn generate(source_dir: &Path, options: &SiteOptions) -> Result<Artifact> {
    let service = MetadataService::load(source_dir, options)?;
    build(&service, &options.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_metadata_per_version() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("docs");
        fs::create_dir_all(source.join("api")).unwrap();
        fs::create_dir_all(source.join(".vuepress")).unwrap();
        fs::write(source.join(".vuepress/versions.json"), r#"["8.0.0"]"#).unwrap();
        let api = json!({
            "Titanium.UI.View": {
                "name": "Titanium.UI.View",
                "type": "object",
                "summary": "A view.",
                "properties": [{"name": "TOP", "summary": "Top."}],
            },
        });
        fs::write(source.join("api/api.json"), api.to_string()).unwrap();
        let versioned = dir.path().join("old/8.0.0/api");
        fs::create_dir_all(&versioned).unwrap();
        fs::write(versioned.join("api.json"), api.to_string()).unwrap();

        let options = SiteOptions::default().with_versioned_dir(dir.path().join("old"));
        let artifact = generate(&source, &options).unwrap();

        let next: Value =
            serde_json::from_str(artifact.text("metadata/next/titanium.ui.view.json").unwrap())
                .unwrap();
        assert_eq!(next["summary"], json!("<p>A view.</p>"));
        assert_eq!(next["constants"][0]["name"], json!("TOP"));
        assert_eq!(
            next["headers"],
            json!([{"level": 2, "title": "Constants", "slug": "constants"}])
        );
        assert!(artifact.text("metadata/8.0.0/titanium.ui.view.json").is_some());

        let links: Value = serde_json::from_str(artifact.text("type-links.json").unwrap()).unwrap();
        assert_eq!(links, json!({"Titanium.UI.View": "/api/titanium/ui/view.html"}));
    }

    #[test]
    fn missing_metadata_builds_nothing_but_links() {
        let dir = TempDir::new().unwrap();
        let artifact = generate(dir.path(), &SiteOptions::default()).unwrap();
        assert_eq!(artifact.files().len(), 1);
        assert_eq!(artifact.text("type-links.json"), Some("{}"));
    }
}
