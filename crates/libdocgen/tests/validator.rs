mod utils;
use libdocgen::{DocgenError, Severity, Validator};
use pretty_assertions::assert_eq;
use utils::*;

#[test]
fn valid_tree_passes() {
    let fixture = Fixture::new(
        r#"
        name: Titanium.Shape
        summary: A shape.
        extends: Titanium.Proxy
        platforms: [android, iphone]
        since: "8.0.0"
        properties:
          - name: color
            summary: Fill color.
            type: String
            default: red
        methods:
          - name: resize
            summary: Resizes the shape.
            parameters:
              - name: factor
                summary: Scale factor.
                type: Number
            returns:
              type: Boolean
        "#,
    );
    let report = Validator::new().validate(&fixture.root).unwrap();
    assert!(report.is_valid(), "{}", report.render(false));
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.summary(), "No errors found!");
    assert_eq!(report.docs.len(), 4);
}

#[test]
fn problems_are_grouped_per_document() {
    let fixture = Fixture::new(
        r#"
        name: Titanium.Shape
        summary: A shape.
        extends: Titanium.Proxy
        platforms: [android, windows]
        properties:
          - name: color
            summary: Fill color.
            type: Colour
        "#,
    );
    let report = Validator::new().validate(&fixture.root).unwrap();
    let shape = report.doc("Titanium.Shape").unwrap();
    assert_eq!(shape.errors(), 2);
    assert_eq!(shape.problems.get("platforms").len(), 1);
    assert_eq!(
        shape.problems.get("properties[color].type")[0].message,
        "Not a valid or known class/type: Colour"
    );
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.summary(), "Found 2 error(s), 0 warning(s)!");

    let rendered = report.render(false);
    assert!(rendered.contains("Titanium.Shape: found 2 error(s), 0 warning(s)!\n"));
    assert!(rendered.contains(
        "\tproperties[color].type - [ERROR] Not a valid or known class/type: Colour\n"
    ));
}

#[test]
fn whitelisted_types_resolve() {
    let fixture = Fixture::bare(
        "name: Titanium.Shape\nsummary: A shape.\nextends: Titanium.Proxy\n",
    );
    let report = Validator::new().validate(&fixture.root).unwrap();
    assert_eq!(report.error_count(), 1);

    let report = Validator::new()
        .with_whitelisted(["Titanium.Proxy"])
        .validate(&fixture.root)
        .unwrap();
    assert!(report.is_valid());

    let report = Validator::new()
        .with_standalone(true)
        .validate(&fixture.root)
        .unwrap();
    assert!(report.is_valid());
    assert_eq!(
        report.doc("Titanium.Shape").unwrap().problems.count(Severity::Warning),
        1
    );
}

#[test]
fn parse_errors_fail_validation() {
    let fixture = Fixture::new("name: Titanium.Shape\nsummary: A shape.\nextends: Titanium.Proxy\n")
        .with_file("broken.yml", "name: [unclosed\n");
    let report = Validator::new().validate(&fixture.root).unwrap();
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.parse_errors.len(), 1);
    assert!(!report.is_valid());
}

#[test]
fn missing_roots_are_errors() {
    let fixture = Fixture::bare("");
    assert!(matches!(
        Validator::new().validate(&fixture.root),
        Err(DocgenError::NoDocuments(_))
    ));
    let missing = fixture.dir.path().join("nope");
    assert!(matches!(
        Validator::new().validate(&missing),
        Err(DocgenError::InvalidPath(_))
    ));
}
