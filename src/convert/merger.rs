//! Resolve overrides against parsed records and export the result

use super::overrides::Overrides;
use crate::manifest::RepositoryRecord;
use crate::{RepoDepsError, Result};
use serde::{Deserialize, Serialize};

/// A repository with its remote and branch resolved
///
/// Field order is the key order of the exported JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub remote: String,
    pub repository: String,
    pub target_path: String,
    pub branch: String,
}

impl DependencyRecord {
    /// Whether both resolved fields hold something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.remote.trim().is_empty() && !self.branch.trim().is_empty()
    }
}

impl From<&RepositoryRecord> for DependencyRecord {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            remote: record.remote.clone(),
            repository: record.repository.clone(),
            target_path: record.target_path.clone(),
            branch: record.branch.clone(),
        }
    }
}

impl Overrides {
    /// Apply the overrides to every record without validating
    ///
    /// Used to redisplay what the user entered after a rejected conversion.
    pub fn resolve(&self, records: &[RepositoryRecord]) -> Vec<DependencyRecord> {
        records
            .iter()
            .map(|record| DependencyRecord {
                remote: self
                    .remote_for(&record.repository, &record.remote)
                    .to_string(),
                repository: record.repository.clone(),
                target_path: record.target_path.clone(),
                branch: self
                    .branch_for(&record.repository, &record.branch)
                    .to_string(),
            })
            .collect()
    }
}

/// Resolve overrides and require a remote and branch for every repository
///
/// Fails with [`RepoDepsError::MissingFields`] listing each repository whose
/// remote or branch is blank; nothing is produced in that case.
pub fn merge(records: &[RepositoryRecord], overrides: &Overrides) -> Result<Vec<DependencyRecord>> {
    let dependencies = overrides.resolve(records);

    let missing: Vec<String> = dependencies
        .iter()
        .filter(|dep| !dep.is_complete())
        .map(|dep| dep.repository.clone())
        .collect();

    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            total = dependencies.len(),
            "Rejecting conversion with unfilled remote or branch"
        );
        return Err(RepoDepsError::MissingFields {
            repositories: missing,
        });
    }

    tracing::debug!(dependencies = dependencies.len(), "Merged overrides");
    Ok(dependencies)
}

/// Serialize dependencies as a pretty-printed JSON array (2-space indent)
pub fn to_json(dependencies: &[DependencyRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(dependencies)?)
}

/// Merge and serialize in one step
pub fn convert(records: &[RepositoryRecord], overrides: &Overrides) -> Result<String> {
    let dependencies = merge(records, overrides)?;
    to_json(&dependencies)
}
