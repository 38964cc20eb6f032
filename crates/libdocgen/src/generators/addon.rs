//! Per-platform add-on YAML (`addon/<Type>.yml`).
//!
//! For one platform, each available type is written with the members that
//! exist on that platform and the version each appeared in.

use serde_yaml::{Mapping, Sequence, Value};
use tracing::info;

use super::{Artifact, Context};
use crate::{
    DocgenError, Result,
    common::is_valid_platform,
    model::{Member, TypeDoc},
};

/// Members of one kind available on `platform`.
fn members<M: Member>(members: &[M], platform: &str) -> Sequence {
    members
        .iter()
        .filter(|m| !m.meta().hide)
        .filter_map(|m| {
            let versions = m.support().versions();
            let since = versions.get(platform)?;
            let mut entry = Mapping::new();
            entry.insert("name".into(), m.name().into());
            if let Some(summary) = m.summary() {
                entry.insert("summary".into(), summary.trim().into());
            }
            entry.insert("since".into(), (*since).into());
            Some(Value::Mapping(entry))
        })
        .collect()
}

/// The document for one type, if it is available on `platform`.
pub fn export_type(ty: &TypeDoc, platform: &str) -> Option<Mapping> {
    let versions = ty.support.versions();
    let since = versions.get(platform)?;
    let mut doc = Mapping::new();
    doc.insert("name".into(), ty.name.as_str().into());
    if let Some(summary) = &ty.summary {
        doc.insert("summary".into(), summary.trim().into());
    }
    if let Some(parent) = &ty.extends {
        doc.insert("extends".into(), parent.as_str().into());
    }
    doc.insert("since".into(), (*since).into());
    for (key, list) in [
        ("properties", members(&ty.properties, platform)),
        ("methods", members(&ty.methods, platform)),
        ("events", members(&ty.events, platform)),
    ] {
        if !list.is_empty() {
            doc.insert(key.into(), Value::Sequence(list));
        }
    }
    Some(doc)
}

/// Generates add-on YAML for `platform`.
pub fn generate(ctx: &Context<'_>, platform: Option<&str>) -> Result<Artifact> {
    let platform = platform.ok_or(DocgenError::MissingPlatform)?;
    if !is_valid_platform(platform) {
        return Err(DocgenError::InvalidPlatform(platform.to_string()));
    }
    info!(platform, "Generating add-on YAML...");
    let mut artifact = Artifact::new();
    for ty in ctx.apis.iter() {
        if let Some(doc) = export_type(ty, platform) {
            artifact.push_text(
                format!("addon/{}.yml", ty.name),
                serde_yaml::to_string(&doc)?,
            );
        }
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apis::ApiDocs,
        model::{PropertyDoc, Since, Support, VersionString},
    };
    use pretty_assertions::assert_eq;

    fn support(pairs: &[(&str, &str)]) -> Support {
        Support {
            since: Some(Since::PerPlatform(
                pairs
                    .iter()
                    .map(|(p, v)| ((*p).to_string(), VersionString((*v).to_string())))
                    .collect(),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_platform_members_only() {
        let ty = TypeDoc {
            name: "Titanium.Foo".into(),
            support: support(&[("android", "1.0"), ("iphone", "2.0")]),
            properties: vec![
                PropertyDoc {
                    name: "both".into(),
                    support: support(&[("android", "1.5"), ("iphone", "2.0")]),
                    ..Default::default()
                },
                PropertyDoc {
                    name: "ios".into(),
                    support: support(&[("iphone", "2.0")]),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let doc = export_type(&ty, "android").unwrap();
        assert_eq!(doc["since"], Value::from("1.0"));
        let props = doc["properties"].as_sequence().unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0]["name"], Value::from("both"));
        assert_eq!(props[0]["since"], Value::from("1.5"));
        assert!(export_type(&ty, "macos").is_none());
    }

    #[test]
    fn requires_a_valid_platform() {
        let apis = ApiDocs::default();
        let ctx = Context {
            apis: &apis,
            sdk_version: None,
            base_paths: &[],
        };
        assert!(matches!(
            generate(&ctx, None),
            Err(DocgenError::MissingPlatform)
        ));
        assert!(matches!(
            generate(&ctx, Some("tizen")),
            Err(DocgenError::InvalidPlatform(_))
        ));
    }
}
