//! Platform parity matrix (`parity.html`).

use html_escape::encode_text;
use tracing::info;

use super::{Artifact, Context};
use crate::{
    Result,
    apis::ApiDocs,
    common::{Versions, pretty_platform},
    model::{Member, Support, TypeDoc},
    platform::PlatformSet,
};

/// One row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityRow {
    /// `Type` or `Type.member`.
    pub name: String,
    /// Whether the row is a type rather than a member.
    pub is_type: bool,
    /// Version per supported platform.
    pub versions: Versions,
    /// Platforms the owning type supports but this member does not.
    pub gaps: PlatformSet,
}

/// Version map of a support block.
fn versions(support: &Support) -> Versions {
    support
        .versions()
        .into_iter()
        .map(|(p, v)| (p.to_string(), v.to_string()))
        .collect()
}

/// Rows for a type's own visible members.
fn member_rows<M: Member>(
    ty: &TypeDoc,
    members: &[M],
    type_set: PlatformSet,
    rows: &mut Vec<ParityRow>,
) {
    for member in ty.own(members).filter(|m| !m.meta().hide) {
        let versions = versions(member.support());
        let set = PlatformSet::from_names(versions.keys());
        rows.push(ParityRow {
            name: format!("{}.{}", ty.name, member.name()),
            is_type: false,
            versions,
            gaps: type_set.difference(set),
        });
    }
}

/// Builds the matrix rows, types sorted by name.
pub fn rows(apis: &ApiDocs) -> Vec<ParityRow> {
    let mut types: Vec<_> = apis.iter().collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));
    let mut rows = Vec::new();
    for ty in types {
        let versions = versions(&ty.support);
        let set = PlatformSet::from_names(versions.keys());
        rows.push(ParityRow {
            name: ty.name.clone(),
            is_type: true,
            versions,
            gaps: PlatformSet::empty(),
        });
        member_rows(ty, &ty.properties, set, &mut rows);
        member_rows(ty, &ty.methods, set, &mut rows);
        member_rows(ty, &ty.events, set, &mut rows);
    }
    rows
}

/// Renders the matrix.
pub fn render(rows: &[ParityRow]) -> String {
    let columns = rows
        .iter()
        .map(|r| PlatformSet::from_names(r.versions.keys()))
        .fold(PlatformSet::empty(), |acc, set| acc | set)
        .names();
    let mut output = String::new();
    output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    output.push_str("<title>API Parity</title>\n<style>\n");
    output.push_str("td.gap { background: #fdecea; }\ntr.type td { font-weight: bold; background: #f4f4f4; }\n");
    output.push_str("</style>\n</head>\n<body>\n<h1>API Parity</h1>\n<table>\n<tr><th>API</th>");
    for platform in &columns {
        output.push_str(&format!("<th>{}</th>", pretty_platform(platform)));
    }
    output.push_str("</tr>\n");
    for row in rows {
        let class = if row.is_type { " class=\"type\"" } else { "" };
        output.push_str(&format!("<tr{class}><td>{}</td>", encode_text(&row.name)));
        for platform in &columns {
            let gap = PlatformSet::platform(platform).is_some_and(|p| row.gaps.contains(p));
            match row.versions.get(*platform) {
                Some(version) => output.push_str(&format!("<td>{}</td>", encode_text(version))),
                None if gap => output.push_str("<td class=\"gap\">&#10007;</td>"),
                None => output.push_str("<td></td>"),
            }
        }
        output.push_str("</tr>\n");
    }
    output.push_str("</table>\n</body>\n</html>\n");
    output
}

/// Generates `parity.html`.
pub fn generate(ctx: &Context<'_>) -> Result<Artifact> {
    info!("Generating parity report...");
    let mut artifact = Artifact::new();
    artifact.push_text("parity.html", render(&rows(ctx.apis)));
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodDoc, Since, VersionString};
    use pretty_assertions::assert_eq;

    fn support(platforms: &[&str]) -> Support {
        Support {
            since: Some(Since::PerPlatform(
                platforms
                    .iter()
                    .map(|p| ((*p).to_string(), VersionString("1.0".into())))
                    .collect(),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn flags_member_gaps() {
        let mut ty = TypeDoc {
            name: "Titanium.Foo".into(),
            support: support(&["android", "iphone"]),
            ..Default::default()
        };
        let mut method = MethodDoc {
            name: "bar".into(),
            support: support(&["android"]),
            ..Default::default()
        };
        method.meta.inherits = Some("Titanium.Foo".into());
        ty.methods.push(method);
        let apis = ApiDocs::new([("Titanium.Foo".to_string(), ty)].into_iter().collect());

        let rows = rows(&apis);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Titanium.Foo.bar");
        assert_eq!(rows[1].gaps, PlatformSet::IPHONE);

        let html = render(&rows);
        assert!(html.contains("<th>Android</th><th>iPhone</th>"));
        assert!(html.contains("<td class=\"gap\">&#10007;</td>"));
    }
}
