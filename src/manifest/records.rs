//! Parsed repository records and their JSON round-trip form

use crate::{RepoDepsError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// One `project` element of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Project name, the key every override is matched against
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repository: String,

    /// Checkout path relative to the workspace root
    #[serde(default, deserialize_with = "null_as_empty")]
    pub target_path: String,

    /// Remote name from the manifest
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remote: String,

    /// Revision from the manifest
    #[serde(default, deserialize_with = "null_as_empty")]
    pub branch: String,
}

impl RepositoryRecord {
    pub fn new(
        repository: impl Into<String>,
        target_path: impl Into<String>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            target_path: target_path.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }
}

/// Older clients send `null` for attributes the manifest left out.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The records carried from the "parsed" page back into the "convert" request
///
/// The form embeds this as a JSON string in a hidden field; the server never
/// keeps it between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryList(pub Vec<RepositoryRecord>);

impl RepositoryList {
    pub fn new(records: Vec<RepositoryRecord>) -> Self {
        Self(records)
    }

    /// Encode for embedding in the page
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Decode a submitted blob
    ///
    /// A missing or blank blob is a decode error just like invalid JSON.
    pub fn from_json(blob: Option<&str>) -> Result<Self> {
        let blob = match blob {
            Some(b) if !b.trim().is_empty() => b,
            _ => return Err(RepoDepsError::Decode("No repositories JSON".to_string())),
        };

        serde_json::from_str(blob)
            .map(Self)
            .map_err(|e| RepoDepsError::Decode(e.to_string()))
    }

    pub fn records(&self) -> &[RepositoryRecord] {
        &self.0
    }

    pub fn into_records(self) -> Vec<RepositoryRecord> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<RepositoryRecord>> for RepositoryList {
    fn from(records: Vec<RepositoryRecord>) -> Self {
        Self(records)
    }
}
