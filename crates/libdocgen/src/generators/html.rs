//! Static HTML reference pages under `apidoc/`.
//!
//! One page is written per type and per event, plus an index grouped by
//! subtype. Markdown fields are rendered with type autolinks resolved
//! against the processed docs.

use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{Artifact, Context};
use crate::{
    Result,
    apis::ApiDocs,
    common::{pretty_platform, split_name},
    markdown,
    model::{EventDoc, Member, MethodDoc, PropertyDoc, Subtype, Support, TypeDoc, TypeExpr},
};

/// Stylesheet written when no `--css` file is given.
const DEFAULT_CSS: &str = "body { font-family: -apple-system, Helvetica, Arial, sans-serif; margin: 2em auto; max-width: 60em; color: #222; }
a { color: #b31b1b; text-decoration: none; }
a:hover { text-decoration: underline; }
h1 { border-bottom: 2px solid #b31b1b; padding-bottom: .2em; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; }
th, td { border: 1px solid #ddd; padding: .4em .6em; text-align: left; vertical-align: top; }
th { background: #f4f4f4; }
code, pre { background: #f7f7f7; font-family: Menlo, Consolas, monospace; }
pre { padding: .8em; overflow-x: auto; }
.deprecated { background: #fff4e5; border-left: 4px solid #f0a030; padding: .5em 1em; }
.removed { background: #fdecea; border-left: 4px solid #d9534f; padding: .5em 1em; }
.inherited { color: #888; }
.nav { font-size: .9em; }
";

/// Section headings of the index, in order.
const SECTIONS: &[(Subtype, &str)] = &[
    (Subtype::Module, "Modules"),
    (Subtype::Proxy, "Objects"),
    (Subtype::View, "Views"),
    (Subtype::Pseudo, "Pseudo Types"),
];

/// File name of a type's page.
fn type_page(name: &str) -> String {
    format!("{name}.html")
}

/// File name of an event's page.
fn event_page(owner: &str, event: &str) -> String {
    format!("{owner}.{}-event.html", event.replace(':', "_"))
}

/// Renders pages for one documentation set.
struct HtmlWriter<'a> {
    /// Processed docs.
    apis: &'a ApiDocs,
    /// Stylesheet file name, relative to `apidoc/`.
    css: String,
}

impl HtmlWriter<'_> {
    /// Link target for a referenced type or member.
    fn resolve(&self, name: &str) -> Option<String> {
        if self.apis.contains(name) {
            return Some(type_page(name));
        }
        if self.apis.find_member(name) {
            let (Some(owner), member) = split_name(name) else {
                return None;
            };
            return Some(format!("{}#{}", type_page(owner), member.to_lowercase()));
        }
        None
    }

    /// Renders markdown with type links.
    fn markdown(&self, text: &str) -> String {
        markdown::render(text, |name| self.resolve(name))
    }

    /// Renders a type expression, linking documented types.
    fn type_expr(&self, expr: Option<&TypeExpr>) -> String {
        let Some(expr) = expr else {
            return "String".into();
        };
        expr.alternatives()
            .into_iter()
            .map(|alt| match self.resolve(alt) {
                Some(href) => format!(
                    "<a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(&href),
                    encode_text(alt)
                ),
                None => encode_text(alt).into_owned(),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Page prologue.
    fn head(&self, title: &str) -> String {
        let mut output = String::new();
        output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!("<title>{}</title>\n", encode_text(title)));
        output.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            encode_double_quoted_attribute(&self.css)
        ));
        output.push_str("</head>\n<body>\n<p class=\"nav\"><a href=\"index.html\">API Index</a></p>\n");
        output
    }

    /// Deprecation notice, if any.
    fn deprecation(&self, support: &Support) -> String {
        let Some(deprecated) = &support.deprecated else {
            return String::new();
        };
        let mut output = String::new();
        match (&deprecated.removed, &deprecated.since) {
            (Some(removed), _) => output.push_str(&format!(
                "<div class=\"removed\"><p>Removed since {}</p>\n",
                encode_text(removed.as_str())
            )),
            (None, Some(since)) => output.push_str(&format!(
                "<div class=\"deprecated\"><p>Deprecated since {}</p>\n",
                encode_text(since.as_str())
            )),
            (None, None) => output.push_str("<div class=\"deprecated\"><p>Deprecated</p>\n"),
        }
        if let Some(notes) = &deprecated.notes {
            output.push_str(&self.markdown(notes));
            output.push('\n');
        }
        output.push_str("</div>\n");
        output
    }

    /// Platform availability table.
    fn platforms(support: &Support) -> String {
        let versions = support.versions();
        if versions.is_empty() {
            return String::new();
        }
        let mut output = String::from("<table class=\"platforms\">\n<tr><th>Platform</th><th>Since</th></tr>\n");
        for (platform, since) in versions {
            output.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                pretty_platform(platform),
                encode_text(since)
            ));
        }
        output.push_str("</table>\n");
        output
    }

    /// Marker for members defined on an ancestor.
    fn defined_by<M: Member>(&self, member: &M, owner: &str) -> String {
        match &member.meta().inherits {
            Some(inherits) if inherits != owner => format!(
                " <span class=\"inherited\">(from <a href=\"{}\">{}</a>)</span>",
                encode_double_quoted_attribute(&type_page(inherits)),
                encode_text(inherits)
            ),
            _ => String::new(),
        }
    }

    /// Properties table.
    fn properties(&self, properties: &[&PropertyDoc], owner: &str) -> String {
        let mut output = String::from(
            "<table class=\"properties\">\n<tr><th>Name</th><th>Type</th><th>Summary</th></tr>\n",
        );
        for property in properties {
            let permission = property
                .permission
                .as_deref()
                .filter(|p| *p != "read-write")
                .map(|p| format!(" <em>{p}</em>"))
                .unwrap_or_default();
            output.push_str(&format!(
                "<tr id=\"{}\"><td><code>{}</code>{permission}{}</td><td>{}</td><td>{}</td></tr>\n",
                encode_double_quoted_attribute(&property.name.to_lowercase()),
                encode_text(&property.name),
                self.defined_by(*property, owner),
                self.type_expr(property.type_expr.as_ref()),
                self.markdown(property.summary.as_deref().unwrap_or_default())
            ));
        }
        output.push_str("</table>\n");
        output
    }

    /// One method entry.
    fn method(&self, method: &MethodDoc, owner: &str) -> String {
        let params = method
            .parameters
            .iter()
            .map(|p| {
                let optional = if p.optional.unwrap_or(false) { "?" } else { "" };
                format!("{}{optional}", encode_text(&p.name))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let returns = if method.returns.is_empty() {
            "void".to_string()
        } else {
            method
                .returns
                .iter()
                .map(|r| self.type_expr(r.type_expr.as_ref()))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let mut output = format!(
            "<h3 id=\"{}\"><code>{}({params})</code>: {returns}{}</h3>\n",
            encode_double_quoted_attribute(&method.name.to_lowercase()),
            encode_text(&method.name),
            self.defined_by(method, owner)
        );
        output.push_str(&self.deprecation(&method.support));
        output.push_str(&self.markdown(method.summary.as_deref().unwrap_or_default()));
        output.push('\n');
        if !method.parameters.is_empty() {
            output.push_str(
                "<table class=\"parameters\">\n<tr><th>Parameter</th><th>Type</th><th>Summary</th></tr>\n",
            );
            for param in &method.parameters {
                output.push_str(&format!(
                    "<tr><td><code>{}</code></td><td>{}</td><td>{}</td></tr>\n",
                    encode_text(&param.name),
                    self.type_expr(param.type_expr.as_ref()),
                    self.markdown(param.summary.as_deref().unwrap_or_default())
                ));
            }
            output.push_str("</table>\n");
        }
        output
    }

    /// Page for one type.
    fn type_doc(&self, ty: &TypeDoc) -> String {
        let mut output = self.head(&ty.name);
        output.push_str(&format!("<h1>{}</h1>\n", encode_text(&ty.name)));
        if let Some(parent) = &ty.extends {
            output.push_str(&format!(
                "<p>Extends {}</p>\n",
                self.type_expr(Some(&TypeExpr::Single(parent.clone())))
            ));
        }
        output.push_str(&self.deprecation(&ty.support));
        output.push_str(&self.markdown(ty.summary.as_deref().unwrap_or_default()));
        output.push('\n');
        output.push_str(&Self::platforms(&ty.support));
        if let Some(description) = &ty.description {
            output.push_str("<h2>Description</h2>\n");
            output.push_str(&self.markdown(description));
            output.push('\n');
        }
        let examples = ty.examples.as_ref().map(|e| e.list()).unwrap_or_default();
        if !examples.is_empty() {
            output.push_str("<h2>Examples</h2>\n");
            for example in examples {
                output.push_str(&format!("<h3>{}</h3>\n", encode_text(&example.title)));
                output.push_str(&self.markdown(&example.example));
                output.push('\n');
            }
        }
        let properties: Vec<_> = ty.properties.iter().filter(|p| !p.meta.hide).collect();
        if !properties.is_empty() {
            output.push_str("<h2>Properties</h2>\n");
            output.push_str(&self.properties(&properties, &ty.name));
        }
        let methods: Vec<_> = ty.methods.iter().filter(|m| !m.meta.hide).collect();
        if !methods.is_empty() {
            output.push_str("<h2>Methods</h2>\n");
            for method in methods {
                output.push_str(&self.method(method, &ty.name));
            }
        }
        let events: Vec<_> = ty.events.iter().filter(|e| !e.meta.hide).collect();
        if !events.is_empty() {
            output.push_str("<h2>Events</h2>\n<ul class=\"events\">\n");
            for event in events {
                let owner = event.meta.inherits.as_deref().unwrap_or(&ty.name);
                output.push_str(&format!(
                    "<li id=\"{}\"><a href=\"{}\">{}</a>: {}</li>\n",
                    encode_double_quoted_attribute(&event.name.to_lowercase()),
                    encode_double_quoted_attribute(&event_page(owner, &event.name)),
                    encode_text(&event.name),
                    self.markdown(event.summary.as_deref().unwrap_or_default())
                ));
            }
            output.push_str("</ul>\n");
        }
        output.push_str("</body>\n</html>\n");
        output
    }

    /// Page for one event. Payload properties include `Titanium.Event`'s.
    fn event_doc(&self, owner: &TypeDoc, event: &EventDoc) -> String {
        let title = format!("{}.{}", owner.name, event.name);
        let mut output = self.head(&title);
        output.push_str(&format!(
            "<h1>{} <small>event of <a href=\"{}\">{}</a></small></h1>\n",
            encode_text(&event.name),
            encode_double_quoted_attribute(&type_page(&owner.name)),
            encode_text(&owner.name)
        ));
        output.push_str(&self.deprecation(&event.support));
        output.push_str(&self.markdown(event.summary.as_deref().unwrap_or_default()));
        output.push('\n');
        output.push_str(&Self::platforms(&event.support));
        if let Some(description) = &event.description {
            output.push_str(&self.markdown(description));
            output.push('\n');
        }
        let base = self
            .apis
            .get("Titanium.Event")
            .map(|e| e.properties.as_slice())
            .unwrap_or_default();
        let properties: Vec<_> = event.properties.iter().chain(base).collect();
        if !properties.is_empty() {
            output.push_str("<h2>Properties</h2>\n");
            output.push_str(&self.properties(&properties, &owner.name));
        }
        output.push_str("</body>\n</html>\n");
        output
    }

    /// Index grouped by subtype.
    fn index(&self) -> String {
        let mut output = self.head("API Reference");
        output.push_str("<h1>API Reference</h1>\n");
        let groups = self.apis.by_subtype();
        for (subtype, heading) in SECTIONS {
            let Some(types) = groups.get(subtype).filter(|t| !t.is_empty()) else {
                continue;
            };
            output.push_str(&format!("<h2>{heading}</h2>\n<ul>\n"));
            for ty in types {
                output.push_str(&format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    encode_double_quoted_attribute(&type_page(&ty.name)),
                    encode_text(&ty.name)
                ));
            }
            output.push_str("</ul>\n");
        }
        output.push_str("</body>\n</html>\n");
        output
    }
}

/// Adds every file under `<base>/images` to `apidoc/images`.
fn copy_images(base: &Path, artifact: &mut Artifact) -> Result<()> {
    let images = base.join("images");
    if !images.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(&images).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        artifact.push_copy(Path::new("apidoc").join(relative), entry.path());
    }
    Ok(())
}

/// Generates the HTML reference.
///
/// With `css` set, that stylesheet is copied instead of the built-in one.
pub fn generate(ctx: &Context<'_>, css: Option<&Path>) -> Result<Artifact> {
    info!("Generating HTML output...");
    let mut artifact = Artifact::new();
    let css_name = match css {
        Some(path) => {
            let name = path
                .file_name()
                .map_or_else(|| "styles.css".to_string(), |n| n.to_string_lossy().into_owned());
            artifact.push_copy(PathBuf::from("apidoc").join(&name), path);
            name
        }
        None => {
            artifact.push_text("apidoc/styles.css", DEFAULT_CSS);
            "styles.css".to_string()
        }
    };
    for base in ctx.base_paths {
        copy_images(base, &mut artifact)?;
    }
    let writer = HtmlWriter {
        apis: ctx.apis,
        css: css_name,
    };
    for ty in ctx.apis.iter() {
        artifact.push_text(format!("apidoc/{}", type_page(&ty.name)), writer.type_doc(ty));
        for event in ty.own(&ty.events).filter(|e| !e.meta.hide) {
            artifact.push_text(
                format!("apidoc/{}", event_page(&ty.name, &event.name)),
                writer.event_doc(ty, event),
            );
        }
    }
    if ctx.apis.is_empty() {
        warn!("No APIs to render");
    }
    artifact.push_text("apidoc/index.html", writer.index());
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Examples;
    use std::fs;
    use tempfile::TempDir;

    fn docs() -> ApiDocs {
        let mut ui = TypeDoc {
            name: "Titanium.UI".into(),
            summary: Some("UI module. See <Titanium.UI.Button>.".into()),
            ..Default::default()
        };
        ui.meta.subtype = Subtype::Module;
        let mut button = TypeDoc {
            name: "Titanium.UI.Button".into(),
            summary: Some("A <b>button</b>.".into()),
            examples: Some(Examples::List(Vec::new())),
            ..Default::default()
        };
        button.meta.subtype = Subtype::View;
        let mut click = EventDoc {
            name: "click".into(),
            summary: Some("Fired on tap.".into()),
            ..Default::default()
        };
        click.meta.inherits = Some("Titanium.UI.Button".into());
        button.events.push(click);
        let mut title = PropertyDoc {
            name: "title".into(),
            summary: Some("Label of <Titanium.UI.Button>.".into()),
            ..Default::default()
        };
        title.meta.inherits = Some("Titanium.UI.Button".into());
        button.properties.push(title);
        ApiDocs::new(
            [ui, button]
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        )
    }

    #[test]
    fn writes_pages_index_and_stylesheet() {
        let apis = docs();
        let dir = TempDir::new().unwrap();
        let ctx = Context {
            apis: &apis,
            sdk_version: None,
            base_paths: &[dir.path().to_path_buf()],
        };
        let artifact = generate(&ctx, None).unwrap();
        let page = artifact.text("apidoc/Titanium.UI.html").unwrap();
        assert!(page.contains("<a href=\"Titanium.UI.Button.html\">Titanium.UI.Button</a>"));
        let button = artifact.text("apidoc/Titanium.UI.Button.html").unwrap();
        assert!(button.contains("<tr id=\"title\">"));
        assert!(button.contains("Titanium.UI.Button.click-event.html"));
        assert!(artifact.text("apidoc/Titanium.UI.Button.click-event.html").is_some());
        let index = artifact.text("apidoc/index.html").unwrap();
        assert!(index.contains("<h2>Modules</h2>"));
        assert!(index.contains("<h2>Views</h2>"));
        assert!(!index.contains("<h2>Objects</h2>"));
        assert!(artifact.text("apidoc/styles.css").is_some());
    }

    #[test]
    fn copies_images_and_custom_css() {
        let apis = docs();
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("images/ui")).unwrap();
        fs::write(dir.path().join("images/ui/button.png"), b"png").unwrap();
        let css = dir.path().join("custom.css");
        fs::write(&css, "body {}").unwrap();
        let ctx = Context {
            apis: &apis,
            sdk_version: None,
            base_paths: &[dir.path().to_path_buf()],
        };
        let artifact = generate(&ctx, Some(&css)).unwrap();
        let paths: Vec<_> = artifact.files().iter().map(|f| f.path.clone()).collect();
        assert!(paths.contains(&PathBuf::from("apidoc/images/ui/button.png")));
        assert!(paths.contains(&PathBuf::from("apidoc/custom.css")));
        let page = artifact.text("apidoc/index.html").unwrap();
        assert!(page.contains("href=\"custom.css\""));
    }
}
