//! Markdown rendering with `<Type.Name>` autolinks.
//!
//! Documentation text refers to other APIs as `<Titanium.UI.View>` or
//! `<Titanium.UI.View.add>`. Before handing text to comrak, every such
//! reference that resolves is rewritten as a regular markdown link. Anything
//! that does not resolve is left alone and ends up as inline HTML.

use comrak::{Options, markdown_to_html};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `<Name>` or `<Dotted.Name>` type references.
static TYPE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9._]+)>").expect("type link pattern must compile")
});

/// Comrak options for every render.
fn options() -> Options<'static> {
    let mut options = Options::default();
    options.render.unsafe_ = true;
    options.extension.table = true;
    options.extension.strikethrough = true;
    options
}

/// Applies `f` to the parts of `text` outside code spans and fenced blocks.
fn map_prose(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut output = String::with_capacity(text.len());
    let mut fenced = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fenced = !fenced;
            output.push_str(line);
            continue;
        }
        if fenced {
            output.push_str(line);
            continue;
        }
        for (idx, part) in line.split('`').enumerate() {
            if idx > 0 {
                output.push('`');
            }
            if idx % 2 == 0 {
                output.push_str(&f(part));
            } else {
                output.push_str(part);
            }
        }
    }
    output
}

/// Rewrites resolvable `<Type.Name>` references as markdown links.
///
/// `resolve` maps a referenced name to a link target.
pub fn autolink(text: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    map_prose(text, |prose| {
        TYPE_LINK
            .replace_all(prose, |caps: &Captures<'_>| match resolve(&caps[1]) {
                Some(href) => format!("[{}]({href})", &caps[1]),
                None => caps[0].to_string(),
            })
            .into_owned()
    })
}

/// Dotted `<Type.Name>` references outside code.
pub fn dotted_references(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    map_prose(text, |prose| {
        for caps in TYPE_LINK.captures_iter(prose) {
            if caps[1].contains('.') {
                found.push(caps[1].to_string());
            }
        }
        String::new()
    });
    found
}

/// Renders markdown to HTML.
pub fn to_html(text: &str) -> String {
    markdown_to_html(text, &options()).trim().to_string()
}

/// Autolinks and renders markdown.
pub fn render(text: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    to_html(&autolink(text, resolve))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve(name: &str) -> Option<String> {
        name.starts_with("Titanium.")
            .then(|| format!("{name}.html"))
    }

    #[test]
    fn links_known_types() {
        assert_eq!(
            autolink("See <Titanium.UI.View> and <p>.", resolve),
            "See [Titanium.UI.View](Titanium.UI.View.html) and <p>."
        );
    }

    #[test]
    fn leaves_code_untouched() {
        let text = "Use `<Titanium.UI.View>` here.\n```\n<Titanium.UI.Window>\n```\n<Titanium.App>\n";
        assert_eq!(
            autolink(text, resolve),
            "Use `<Titanium.UI.View>` here.\n```\n<Titanium.UI.Window>\n```\n[Titanium.App](Titanium.App.html)\n"
        );
    }

    #[test]
    fn renders_links() {
        assert_eq!(
            render("A <Titanium.UI.View>.", resolve),
            "<p>A <a href=\"Titanium.UI.View.html\">Titanium.UI.View</a>.</p>"
        );
    }

    #[test]
    fn keeps_inline_html_and_extensions() {
        assert_eq!(to_html("~~old~~ <b>new</b>"), "<p><del>old</del> <b>new</b></p>");
        let table = to_html("| a |\n|---|\n| 1 |\n");
        assert!(table.starts_with("<table>"), "{table}");
    }

    #[test]
    fn collects_dotted_references() {
        assert_eq!(
            dotted_references("<Titanium.UI.View>, <b>, `<Foo.Bar>` and <ItemTemplate>"),
            vec!["Titanium.UI.View".to_string()]
        );
    }
}
