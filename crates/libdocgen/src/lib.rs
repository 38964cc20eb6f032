//! Libdocgen turns YAML API documentation into reference material.
//!
//! A documentation tree holds one YAML document per type of an SDK object
//! model. Libdocgen loads those documents, merges add-on overlays, flattens
//! inheritance along `extends` chains and hands the result to one or more
//! generators: HTML pages, JSON metadata, TypeScript declarations, a change
//! log, a platform parity matrix or per-platform add-on YAML. A schema
//! [`validator`] checks raw documents, and the [`site`] module prepares
//! generated JSON for a versioned documentation site.
//!
//! ```no_run
//! use libdocgen::{Docgen, Format};
//!
//! let docgen = Docgen::new(["apidoc"])
//!     .with_formats([Format::Json, Format::Typescript])
//!     .with_output("dist");
//! let apis = docgen.load()?;
//! docgen.render(&apis)?;
//! # Ok::<(), libdocgen::DocgenError>(())
//! ```

pub mod apis;
pub mod common;
mod docgen;
mod error;
pub mod freeform;
pub mod generators;
pub mod highlight;
pub mod keywords;
pub mod loader;
pub mod markdown;
pub mod merge;
pub mod model;
pub mod platform;
pub mod processor;
pub mod site;
pub mod validator;
pub mod version;

pub use crate::{
    apis::ApiDocs,
    docgen::{Docgen, Format},
    error::{DocgenError, Result},
    generators::{Artifact, typescript::Layout},
    loader::{LoadError, parse_yaml},
    validator::{Report, Severity, Validator},
};
