//! JSON API
//!
//! The same two operations as the form, for scripts:
//!
//! - `POST /api/parse` - body `{"xml": "..."}`, returns the parsed records
//! - `POST /api/convert` - body `{"repositories": [...], "branches": {...},
//!   "remotes": {...}, "branch_for_all": "...", "remote_for_all": "..."}`,
//!   returns the dependency list

use crate::convert::{self, DependencyRecord, Overrides};
use crate::manifest::{self, RepositoryRecord};
use crate::RepoDepsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Repositories missing a remote or branch, for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl RepoDepsError {
    fn status_code(&self) -> StatusCode {
        match self {
            RepoDepsError::MalformedXml(_) | RepoDepsError::Decode(_) => StatusCode::BAD_REQUEST,
            RepoDepsError::MissingFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RepoDepsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !self.is_user_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let missing = match &self {
            RepoDepsError::MissingFields { repositories } => repositories.clone(),
            _ => Vec::new(),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                missing,
            }),
        )
            .into_response()
    }
}

/// Request to parse a manifest
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub xml: String,
}

/// Request to convert parsed records
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub repositories: Vec<RepositoryRecord>,

    #[serde(default)]
    pub branches: HashMap<String, String>,

    #[serde(default)]
    pub remotes: HashMap<String, String>,

    #[serde(default)]
    pub branch_for_all: Option<String>,

    #[serde(default)]
    pub remote_for_all: Option<String>,
}

impl ConvertRequest {
    /// Build overrides with the same trimming rules as the form
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for (name, branch) in &self.branches {
            overrides.set_branch(name.clone(), branch);
        }
        for (name, remote) in &self.remotes {
            overrides.set_remote(name.clone(), remote);
        }
        if let Some(ref branch) = self.branch_for_all {
            overrides = overrides.with_branch_for_all(branch);
        }
        if let Some(ref remote) = self.remote_for_all {
            overrides = overrides.with_remote_for_all(remote);
        }
        overrides
    }
}

pub(crate) async fn parse_manifest(
    Json(req): Json<ParseRequest>,
) -> Result<Json<Vec<RepositoryRecord>>, RepoDepsError> {
    let records = manifest::parse_projects(&req.xml)?;
    tracing::info!(projects = records.len(), "API parse");
    Ok(Json(records))
}

pub(crate) async fn convert_records(
    Json(req): Json<ConvertRequest>,
) -> Result<Json<Vec<DependencyRecord>>, RepoDepsError> {
    let dependencies = convert::merge(&req.repositories, &req.overrides())?;
    tracing::info!(dependencies = dependencies.len(), "API convert");
    Ok(Json(dependencies))
}
