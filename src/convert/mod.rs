//! Override merging and dependency-list export
//!
//! Turns parsed [`RepositoryRecord`](crate::manifest::RepositoryRecord)s into
//! [`DependencyRecord`]s. Each record's remote and branch are resolved in
//! this order, per field:
//!
//! 1. the "apply to all" value, when one was given
//! 2. the override submitted for that repository
//! 3. the value from the manifest
//!
//! Conversion is all-or-nothing: a single repository left without a remote
//! or branch rejects the whole list.

mod merger;
mod overrides;

pub use merger::{convert, merge, to_json, DependencyRecord};
pub use overrides::{
    Overrides, BRANCH_FOR_ALL_FIELD, BRANCH_PREFIX, REMOTE_FOR_ALL_FIELD, REMOTE_PREFIX,
};
