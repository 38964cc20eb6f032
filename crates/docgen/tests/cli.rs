use assert_cmd::Command;
use predicates::prelude::*;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

const DOCS: &str = "name: Titanium
summary: The top-level module.
extends: Titanium.Module
---
name: Titanium.Module
summary: Base of every module.
extends: Titanium.Proxy
---
name: Titanium.Proxy
summary: Base of every proxy.
createable: false
";

/// A checkout with `apidoc/` and a `package.json`.
fn checkout(docs: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("apidoc");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("Titanium.yml"), docs).unwrap();
    fs::write(dir.path().join("package.json"), r#"{"version": "12.1.0"}"#).unwrap();
    (dir, root)
}

fn docgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docgen"));
    cmd.env_remove("RUST_LOG").env_remove("DOCGEN_COLOR");
    cmd
}

#[test]
fn requires_a_path() {
    docgen()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Must specify at least one path"));
}

#[test]
fn writes_json() {
    let (dir, root) = checkout(DOCS);
    let out = dir.path().join("dist");
    docgen()
        .arg(&root)
        .args(["-f", "json,jsca", "-o"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("api.json").is_file());
    assert!(out.join("api.jsca").is_file());
}

#[test]
fn prints_declarations_to_stdout() {
    let (dir, root) = checkout(DOCS);
    docgen()
        .arg(&root)
        .args(["-f", "typescript", "--stdout", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "// Type definitions for non-npm package Titanium 12.1",
        ))
        .stdout(predicate::str::contains("declare namespace Titanium {"));
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn deprecated_flags_only_warn() {
    let (dir, root) = checkout(DOCS);
    docgen()
        .arg(&root)
        .args(["--colorize", "--warn-inherited", "-f", "parity", "-o"])
        .arg(dir.path().join("dist"))
        .assert()
        .success()
        .stderr(predicate::str::contains("deprecated").and(predicate::str::contains("--colorize")));
}

#[test]
fn addon_needs_a_platform() {
    let (_dir, root) = checkout(DOCS);
    docgen()
        .arg(&root)
        .args(["-f", "addon"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Specify a platform to extract with the -p option."));
}

#[test]
fn rejects_unknown_formats() {
    let (_dir, root) = checkout(DOCS);
    docgen()
        .arg(&root)
        .args(["-f", "jsduck"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jsduck"));
}

#[test]
fn validate_reports_problems() {
    let (_dir, root) = checkout(DOCS);
    Command::new(env!("CARGO_BIN_EXE_docgen-validate"))
        .env_remove("RUST_LOG")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("No errors found!"));

    let (_dir, root) = checkout(&format!("{DOCS}---\nname: Titanium.Bad\nsummary: Bad.\nextends: Titanium.Nope\n"));
    Command::new(env!("CARGO_BIN_EXE_docgen-validate"))
        .env_remove("RUST_LOG")
        .arg(&root)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "\textends - [ERROR] Not a valid or known class/type: Titanium.Nope",
        ))
        .stderr(predicate::str::contains("Found 1 error(s), 0 warning(s)!"));
}

#[test]
fn site_writes_type_links() {
    let (dir, root) = checkout(DOCS);
    let site = dir.path().join("site");
    fs::create_dir_all(site.join("api")).unwrap();
    docgen()
        .arg(&root)
        .args(["-f", "json-raw", "-o"])
        .arg(site.join("api"))
        .assert()
        .success();

    let out = dir.path().join("out");
    Command::new(env!("CARGO_BIN_EXE_docgen-site"))
        .env_remove("RUST_LOG")
        .arg(&site)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    let links = fs::read_to_string(out.join("type-links.json")).unwrap();
    assert!(links.contains(r#""Titanium.Proxy":"/api/titanium/proxy.html""#));
    assert!(out.join("metadata/next/titanium.proxy.json").is_file());
}
