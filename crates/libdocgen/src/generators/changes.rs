//! API change log between two SDK versions.

use html_escape::encode_text;
use tracing::{error, info};

use super::{Artifact, Context};
use crate::{
    DocgenError, Result,
    apis::ApiDocs,
    common::pretty_platform,
    model::{Member, Support, TypeDoc},
    version::ApiVersion,
};

/// What happened to an API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Introduced on at least one platform.
    Added,
    /// Deprecated.
    Deprecated,
    /// Removed.
    Removed,
}

/// One changed API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// `Type` or `Type.member`.
    pub name: String,
    /// `type`, `property`, `method` or `event`.
    pub category: &'static str,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Platforms and versions that fall in the range.
    pub platforms: Vec<(String, String)>,
    /// Summary text.
    pub summary: String,
}

/// Inclusive version range.
struct Range {
    /// First version.
    start: ApiVersion,
    /// Last version.
    end: ApiVersion,
}

impl Range {
    /// Whether `version` lies in the range. Unparseable versions never do.
    fn contains(&self, version: &str) -> bool {
        version
            .parse::<ApiVersion>()
            .is_ok_and(|v| v >= self.start && v <= self.end)
    }

    /// Changes recorded in one API's support block.
    fn check(
        &self,
        name: &str,
        category: &'static str,
        support: &Support,
        summary: Option<&str>,
        out: &mut Vec<Change>,
    ) {
        let summary = summary.unwrap_or_default().trim().to_string();
        let added: Vec<_> = support
            .versions()
            .into_iter()
            .filter(|(_, since)| self.contains(since))
            .map(|(p, v)| (p.to_string(), v.to_string()))
            .collect();
        if !added.is_empty() {
            out.push(Change {
                name: name.to_string(),
                category,
                kind: ChangeKind::Added,
                platforms: added,
                summary: summary.clone(),
            });
        }
        let Some(deprecated) = &support.deprecated else {
            return;
        };
        if let Some(since) = &deprecated.since
            && self.contains(since.as_str())
        {
            out.push(Change {
                name: name.to_string(),
                category,
                kind: ChangeKind::Deprecated,
                platforms: Vec::new(),
                summary: deprecated.notes.clone().unwrap_or_else(|| summary.clone()),
            });
        }
        if let Some(removed) = &deprecated.removed
            && self.contains(removed.as_str())
        {
            out.push(Change {
                name: name.to_string(),
                category,
                kind: ChangeKind::Removed,
                platforms: Vec::new(),
                summary: deprecated.notes.clone().unwrap_or(summary),
            });
        }
    }

    /// Changes to a type's own members.
    fn members<M: Member>(
        &self,
        ty: &TypeDoc,
        members: &[M],
        category: &'static str,
        out: &mut Vec<Change>,
    ) {
        for member in ty.own(members).filter(|m| !m.meta().hide) {
            self.check(
                &format!("{}.{}", ty.name, member.name()),
                category,
                member.support(),
                member.summary(),
                out,
            );
        }
    }
}

/// Collects every change in `[start, end]`.
pub fn collect(apis: &ApiDocs, start: &ApiVersion, end: &ApiVersion) -> Vec<Change> {
    let range = Range {
        start: start.clone(),
        end: end.clone(),
    };
    let mut out = Vec::new();
    for ty in apis.iter() {
        range.check(&ty.name, "type", &ty.support, ty.summary.as_deref(), &mut out);
        range.members(ty, &ty.properties, "property", &mut out);
        range.members(ty, &ty.methods, "method", &mut out);
        range.members(ty, &ty.events, "event", &mut out);
    }
    out
}

/// Renders one section of the change log.
fn section(output: &mut String, heading: &str, changes: &[&Change]) {
    if changes.is_empty() {
        return;
    }
    output.push_str(&format!("<h2>{heading}</h2>\n<table>\n"));
    output.push_str("<tr><th>API</th><th>Kind</th><th>Platforms</th><th>Summary</th></tr>\n");
    for change in changes {
        let platforms = change
            .platforms
            .iter()
            .map(|(p, v)| format!("{} {}", pretty_platform(p), encode_text(v)))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!(
            "<tr><td><code>{}</code></td><td>{}</td><td>{platforms}</td><td>{}</td></tr>\n",
            encode_text(&change.name),
            change.category,
            encode_text(&change.summary)
        ));
    }
    output.push_str("</table>\n");
}

/// Renders the change log page.
pub fn render(changes: &[Change], start: &ApiVersion, end: &ApiVersion) -> String {
    let title = if start == end {
        format!("API changes in {start}")
    } else {
        format!("API changes from {start} to {end}")
    };
    let mut output = String::new();
    output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    output.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", encode_text(&title)));
    output.push_str(&format!("<h1>{}</h1>\n", encode_text(&title)));
    let of = |kind| changes.iter().filter(|c| c.kind == kind).collect::<Vec<_>>();
    section(&mut output, "New APIs", &of(ChangeKind::Added));
    section(&mut output, "Deprecated APIs", &of(ChangeKind::Deprecated));
    section(&mut output, "Removed APIs", &of(ChangeKind::Removed));
    output.push_str("</body>\n</html>\n");
    output
}

/// Generates `changes_<start>.html`.
///
/// `start` defaults to the SDK version and `end` to `start`. A range whose
/// start is later than its end skips the format.
pub fn generate(ctx: &Context<'_>, start: Option<&str>, end: Option<&str>) -> Result<Artifact> {
    let mut artifact = Artifact::new();
    let start: ApiVersion = start
        .or(ctx.sdk_version)
        .ok_or_else(|| DocgenError::InvalidVersion("no start version for changes".into()))?
        .parse()?;
    let end: ApiVersion = match end {
        Some(end) => end.parse()?,
        None => start.clone(),
    };
    if start > end {
        error!(
            "Skipping changes format.  Start version ({start}) is greater than end version ({end})."
        );
        return Ok(artifact);
    }
    let changes = collect(ctx.apis, &start, &end);
    if changes.is_empty() {
        info!("No API changes found.");
        return Ok(artifact);
    }
    artifact.push_text(
        format!("changes_{}.html", start.as_str().replace('.', "_")),
        render(&changes, &start, &end),
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deprecated, PropertyDoc, Since, VersionString};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn since(pairs: &[(&str, &str)]) -> Support {
        Support {
            since: Some(Since::PerPlatform(
                pairs
                    .iter()
                    .map(|(p, v)| ((*p).to_string(), VersionString((*v).to_string())))
                    .collect::<IndexMap<_, _>>(),
            )),
            ..Default::default()
        }
    }

    fn docs() -> ApiDocs {
        let mut ty = TypeDoc {
            name: "Titanium.Foo".into(),
            support: since(&[("android", "9.0.0"), ("iphone", "8.0.0")]),
            ..Default::default()
        };
        let mut fresh = PropertyDoc {
            name: "fresh".into(),
            support: since(&[("android", "9.1.0")]),
            ..Default::default()
        };
        fresh.meta.inherits = Some("Titanium.Foo".into());
        let mut old = PropertyDoc {
            name: "old".into(),
            support: since(&[("android", "1.0")]),
            ..Default::default()
        };
        old.support.deprecated = Some(Deprecated {
            since: Some(VersionString("9.1.0".into())),
            removed: Some(VersionString("10.0.0".into())),
            notes: Some("Use fresh.".into()),
        });
        old.meta.inherits = Some("Titanium.Foo".into());
        let mut inherited = PropertyDoc {
            name: "inherited".into(),
            support: since(&[("android", "9.1.0")]),
            ..Default::default()
        };
        inherited.meta.inherits = Some("Titanium.Proxy".into());
        ty.properties = vec![fresh, old, inherited];
        ApiDocs::new([("Titanium.Foo".to_string(), ty)].into_iter().collect())
    }

    #[test]
    fn collects_changes_in_range() {
        let apis = docs();
        let start = "9.0.0".parse().unwrap();
        let end = "9.1.0".parse().unwrap();
        let changes = collect(&apis, &start, &end);
        let summary: Vec<_> = changes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("Titanium.Foo", ChangeKind::Added),
                ("Titanium.Foo.fresh", ChangeKind::Added),
                ("Titanium.Foo.old", ChangeKind::Deprecated),
            ]
        );
        assert_eq!(changes[0].platforms, vec![("android".into(), "9.0.0".into())]);
    }

    #[test]
    fn writes_page_named_after_start() {
        let apis = docs();
        let ctx = Context {
            apis: &apis,
            sdk_version: Some("10.0.0"),
            base_paths: &[],
        };
        let artifact = generate(&ctx, None, None).unwrap();
        let page = artifact.text("changes_10_0_0.html").unwrap();
        assert!(page.contains("Removed APIs"));
        assert!(page.contains("Titanium.Foo.old"));
    }

    #[test]
    fn empty_and_inverted_ranges_write_nothing() {
        let apis = docs();
        let ctx = Context {
            apis: &apis,
            sdk_version: None,
            base_paths: &[],
        };
        assert!(generate(&ctx, Some("2.0.0"), None).unwrap().is_empty());
        assert!(generate(&ctx, Some("9.1.0"), Some("9.0.0")).unwrap().is_empty());
        assert!(generate(&ctx, None, None).is_err());
    }
}
