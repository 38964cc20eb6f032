//! Prepares one type's metadata for an API reference page.

use std::mem;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use super::service::{MetadataService, TypeMetadata};
use crate::{common::is_constant_name, markdown::to_html};

/// `<Type.Name>` references.
static ANGLE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^>/]+)>").expect("angle link pattern must compile"));

/// `[text](target)` links.
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link pattern must compile")
});

/// A sidebar heading of an API page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Heading level.
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor.
    pub slug: String,
}

impl Header {
    /// Creates a heading.
    fn new(level: u8, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            slug: slug.into(),
        }
    }
}

/// Transforms the metadata of a single type.
#[derive(Debug)]
pub struct MetadataProcessor<'a> {
    /// Link resolution.
    service: &'a MetadataService,
    /// Site base path, e.g. `/`.
    base: &'a str,
    /// Version segment of rewritten links. `None` for the current docs.
    link_version: Option<&'a str>,
    /// Headings collected so far.
    headers: Vec<Header>,
    /// Whether constants were split out.
    has_constants: bool,
}

impl<'a> MetadataProcessor<'a> {
    /// A processor for a type of `version`. Links from the newest released
    /// version, or from any version when nothing is released, carry no
    /// version segment.
    pub fn new(service: &'a MetadataService, base: &'a str, version: &'a str) -> Self {
        let link_version = match service.released().first() {
            Some(latest) if latest != version => Some(version),
            _ => None,
        };
        Self {
            service,
            base,
            link_version,
            headers: Vec::new(),
            has_constants: false,
        }
    }

    /// Rewrites `metadata` in place: drops type-level prose, keeps only
    /// members the type owns, sorts them, renders markdown and splits
    /// constants from properties.
    pub fn process(&mut self, metadata: &mut TypeMetadata) {
        metadata.shift_remove("description");
        metadata.shift_remove("examples");

        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        for list in ["properties", "methods", "events"] {
            if let Some(Value::Array(members)) = metadata.get_mut(list) {
                members.retain(|m| {
                    m.get("inherits")
                        .and_then(Value::as_str)
                        .is_none_or(|owner| owner == name)
                });
            }
        }
        for list in ["properties", "methods"] {
            if let Some(Value::Array(members)) = metadata.get_mut(list) {
                members.sort_by_cached_key(|m| {
                    let name = m.get("name").and_then(Value::as_str).unwrap_or_default();
                    (name.to_lowercase(), name.to_string())
                });
            }
        }

        if let Some(Value::String(summary)) = metadata.get_mut("summary") {
            *summary = self.render(summary);
        }
        for list in ["properties", "methods", "events"] {
            self.members(list, metadata);
        }
        split_constants(metadata);
    }

    /// Renders member prose and collects member headings.
    fn members(&mut self, list: &str, metadata: &mut TypeMetadata) {
        let Some(Value::Array(members)) = metadata.get_mut(list) else {
            return;
        };
        let mut headers = Vec::new();
        for member in members.iter_mut() {
            let Value::Object(member) = member else {
                continue;
            };
            for key in ["summary", "description"] {
                if let Some(Value::String(text)) = member.get_mut(key)
                    && !text.is_empty()
                {
                    *text = self.render(text);
                }
            }
            if let Some(Value::Array(examples)) = member.get("examples")
                && !examples.is_empty()
            {
                let mut combined = String::from("#### Examples\n\n");
                for example in examples {
                    combined.push_str(&format!(
                        "##### {}\n{}",
                        text_field(example, "description"),
                        text_field(example, "code")
                    ));
                }
                member.insert("examples".into(), Value::String(self.render(&combined)));
            }
            if let Some(Value::String(notes)) = member
                .get_mut("deprecated")
                .and_then(|d| d.get_mut("notes"))
            {
                *notes = self.render(notes);
            }
            if let Some(returns) = member.get_mut("returns") {
                self.returns(returns);
            }

            let name = member
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if list == "properties" && is_constant_name(name) {
                self.has_constants = true;
                continue;
            }
            headers.push(Header::new(3, name, name.to_lowercase()));
        }
        if !headers.is_empty() {
            let mut title = list.to_string();
            title[..1].make_ascii_uppercase();
            self.headers.push(Header::new(2, title, list));
            self.headers.extend(headers);
        }
    }

    /// Renders `returns` summaries.
    fn returns(&self, returns: &mut Value) {
        match returns {
            Value::Array(all) => all.iter_mut().for_each(|r| self.returns(r)),
            Value::Object(ret) => {
                if let Some(Value::String(summary)) = ret.get_mut("summary") {
                    *summary = self.render(summary);
                }
            }
            _ => {}
        }
    }

    /// Rewrites type links and renders markdown.
    fn render(&self, text: &str) -> String {
        to_html(&self.rewrite_type_links(text))
    }

    /// Turns `<Type.Name>` and `[text](Type.Name)` into site links.
    pub fn rewrite_type_links(&self, text: &str) -> String {
        let link = |key: &str| {
            self.service
                .link_for_key_path(key, self.base, self.link_version)
                .map(|link| format!("[{}]({})", link.name, link.path))
        };
        let text = ANGLE_LINK.replace_all(text, |caps: &Captures<'_>| {
            link(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        });
        MARKDOWN_LINK
            .replace_all(&text, |caps: &Captures<'_>| {
                link(&caps[2]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Headings collected by [`Self::process`], with a trailing `Constants`
    /// heading when constants were split out.
    pub fn into_headers(self) -> Vec<Header> {
        let mut headers = self.headers;
        if self.has_constants {
            headers.push(Header::new(2, "Constants", "constants"));
        }
        headers
    }
}

/// A string field of a JSON object, or `""`.
fn text_field<'v>(value: &'v Value, key: &str) -> &'v str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Moves constant-named properties into `constants`.
fn split_constants(metadata: &mut TypeMetadata) {
    let Some(Value::Array(properties)) = metadata.get_mut("properties") else {
        return;
    };
    let (constants, rest): (Vec<_>, Vec<_>) = mem::take(properties).into_iter().partition(|p| {
        p.get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| !n.is_empty() && is_constant_name(n))
    });
    *properties = rest;
    metadata.insert("constants".into(), Value::Array(constants));
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn service() -> MetadataService {
        let view = json!({
            "name": "Titanium.UI.View",
            "type": "object",
            "summary": "Base view, see <Titanium.UI.View.add>.",
            "description": "Long text.",
            "methods": [
                {"name": "remove", "summary": "Removes."},
                {"name": "add", "summary": "Adds a [child](Titanium.UI.View).",
                 "examples": [{"description": "Simple", "code": "view.add(x);"}]},
                {"name": "fireEvent", "inherits": "Titanium.Proxy"},
            ],
            "properties": [
                {"name": "width", "summary": "Width."},
                {"name": "FILL", "summary": "Fill."},
            ],
        });
        let Value::Object(view) = view else {
            panic!("not an object")
        };
        let mut next = IndexMap::new();
        next.insert("Titanium.UI.View".to_string(), view);
        MetadataService::new(next, Vec::new())
    }

    #[test]
    fn transforms_type_metadata() {
        let service = service();
        let mut metadata = service.find("Titanium.UI.View", None).unwrap().clone();
        let mut processor = MetadataProcessor::new(&service, "/", "next");
        processor.process(&mut metadata);

        assert!(!metadata.contains_key("description"));
        assert_eq!(
            metadata["summary"],
            json!(
                "<p>Base view, see <a href=\"/api/titanium/ui/view.html#add\">add</a>.</p>"
            )
        );
        let methods: Vec<_> = metadata["methods"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(methods, vec!["add", "remove"]);
        assert!(
            metadata["methods"][0]["examples"]
                .as_str()
                .unwrap()
                .contains("<h4>Examples</h4>")
        );
        assert_eq!(metadata["constants"][0]["name"], json!("FILL"));
        assert_eq!(metadata["properties"].as_array().unwrap().len(), 1);

        let headers = processor.into_headers();
        let titles: Vec<_> = headers.iter().map(|h| (h.level, h.title.as_str())).collect();
        assert_eq!(
            titles,
            vec![
                (2, "Properties"),
                (3, "width"),
                (2, "Methods"),
                (3, "add"),
                (3, "remove"),
                (2, "Constants"),
            ]
        );
    }

    #[test]
    fn rewrites_markdown_links() {
        let service = service();
        let processor = MetadataProcessor::new(&service, "/", "next");
        assert_eq!(
            processor.rewrite_type_links("A [view](Titanium.UI.View) and <Titanium.Nope>."),
            "A [Titanium.UI.View](/api/titanium/ui/view.html) and <Titanium.Nope>."
        );
    }
}
