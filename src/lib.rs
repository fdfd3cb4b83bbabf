//! repodeps - git-repo manifests to JSON dependency lists
//!
//! Parses the `project` list of a repository manifest, lets the user override
//! each project's remote and branch (individually or for all projects at
//! once), and exports the result as a JSON array of
//! `{remote, repository, target_path, branch}` objects.
//!
//! # Architecture
//!
//! - **manifest**: XML parsing into repository records
//! - **convert**: override resolution, validation and JSON export
//! - **web**: form workflow, HTML rendering, HTTP server and JSON API
//! - **config**: server configuration file
//! - **logging**: tracing setup
//!
//! # Example
//!
//! ```
//! use repodeps::convert::{self, Overrides};
//! use repodeps::manifest;
//!
//! let xml = r#"<manifest><project name="core" path="src/core" remote="aosp" revision="main"/></manifest>"#;
//! let records = manifest::parse_projects(xml).unwrap();
//!
//! let overrides = Overrides::new().with_branch("core", "stable");
//! let json = convert::convert(&records, &overrides).unwrap();
//! assert!(json.contains("\"branch\": \"stable\""));
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod web;

// Re-exports
pub use error::{RepoDepsError, Result};
