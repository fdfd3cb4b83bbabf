//! Web front end
//!
//! An axum server that renders the conversion form, runs each submission
//! through the request [`workflow`], and exposes the same operations as a
//! small JSON API.

pub mod api;
mod render;
mod server;
pub mod workflow;

pub use render::Templates;
pub use server::WebServer;
pub use workflow::{Page, Submission, WorkflowState};
