//! Manifest parsing for multi-repository checkouts
//!
//! Reads the `project` list of a git-repo style XML manifest into flat
//! [`RepositoryRecord`]s. Only the four attributes that matter for a
//! dependency list are kept; remotes, defaults and annotations are ignored.
//!
//! # Example Manifest
//!
//! ```xml
//! <manifest>
//!   <remote name="aosp" fetch="https://android.googlesource.com" />
//!   <default revision="main" remote="aosp" />
//!
//!   <project path="src/core" name="core" remote="aosp" revision="main" />
//!   <project path="vendor/lib" name="vendor-lib" />
//! </manifest>
//! ```

mod parser;
mod records;

pub use parser::{parse_projects, parse_projects_from_file};
pub use records::{RepositoryList, RepositoryRecord};
