//! Form submission workflow
//!
//! Every request is handled on its own: a submission is classified, run
//! through at most one transition, and turned into a [`Page`]. Records that
//! must survive to the next request travel inside the page itself.

use crate::convert::{self, DependencyRecord, Overrides};
use crate::manifest::{self, RepositoryList};
use crate::RepoDepsError;
use serde::Serialize;

/// Field that marks a conversion submission
pub const CONVERT_FIELD: &str = "convert";

/// Field carrying the manifest XML
pub const XML_FIELD: &str = "xml_content";

/// Field carrying the round-tripped records
pub const REPOSITORIES_FIELD: &str = "repositories";

/// Opaque passthrough field
pub const DEVICE_CODENAME_FIELD: &str = "device_codename";

/// A classified form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing to do, show the empty form
    Blank,

    /// Manifest XML to parse
    Parse {
        xml_content: String,
        device_codename: String,
    },

    /// Overrides to merge into previously parsed records
    Convert {
        repositories: Option<String>,
        overrides: Overrides,
        device_codename: String,
        xml_content: String,
    },
}

impl Submission {
    /// Classify submitted form pairs
    ///
    /// `convert` takes priority over `xml_content` because the conversion
    /// form also carries the XML back for display.
    pub fn from_form(fields: &[(String, String)]) -> Self {
        let field = |name: &str| {
            fields
                .iter()
                .rev()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        let device_codename = field(DEVICE_CODENAME_FIELD).unwrap_or_default();

        if field(CONVERT_FIELD).is_some() {
            Submission::Convert {
                repositories: field(REPOSITORIES_FIELD),
                overrides: Overrides::from_form_fields(
                    fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                ),
                device_codename,
                xml_content: field(XML_FIELD).unwrap_or_default(),
            }
        } else if let Some(xml_content) = field(XML_FIELD) {
            Submission::Parse {
                xml_content,
                device_codename,
            }
        } else {
            Submission::Blank
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Submission::Blank => "blank",
            Submission::Parse { .. } => "parse",
            Submission::Convert { .. } => "convert",
        }
    }
}

/// Where a request ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No manifest submitted yet
    Empty,
    /// Manifest parsed, records ready for editing
    Parsed,
    /// Overrides merged, JSON produced
    Converted,
    /// Manifest was not well-formed
    ParseError,
    /// Round-tripped records could not be decoded
    DecodeError,
    /// Some repository was left without a remote or branch
    ValidationError,
    /// Records merged but the JSON output could not be produced
    OutputError,
}

impl WorkflowState {
    pub fn is_error(self) -> bool {
        matches!(
            self,
            WorkflowState::ParseError
                | WorkflowState::DecodeError
                | WorkflowState::ValidationError
                | WorkflowState::OutputError
        )
    }
}

/// Everything the form page shows after one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub state: WorkflowState,

    /// Original XML, echoed back
    pub xml_content: String,

    pub device_codename: String,

    /// Editable rows, pre-filled with the values to show in each input
    pub rows: Vec<DependencyRecord>,

    /// Records to embed for the next request
    pub repositories: RepositoryList,

    /// Converted JSON
    pub output: String,

    pub error_message: String,
}

impl Page {
    pub fn empty(device_codename: String) -> Self {
        Self {
            state: WorkflowState::Empty,
            xml_content: String::new(),
            device_codename,
            rows: Vec::new(),
            repositories: RepositoryList::default(),
            output: String::new(),
            error_message: String::new(),
        }
    }
}

/// Run one submission through the workflow
pub fn process(submission: Submission) -> Page {
    let kind = submission.kind();

    let page = match submission {
        Submission::Blank => Page::empty(String::new()),
        Submission::Parse {
            xml_content,
            device_codename,
        } => parse_step(xml_content, device_codename),
        Submission::Convert {
            repositories,
            overrides,
            device_codename,
            xml_content,
        } => convert_step(repositories, overrides, device_codename, xml_content),
    };

    tracing::info!(
        submission = kind,
        state = ?page.state,
        repositories = page.repositories.len(),
        "Processed submission"
    );

    page
}

fn parse_step(xml_content: String, device_codename: String) -> Page {
    if xml_content.trim().is_empty() {
        return Page::empty(device_codename);
    }

    match manifest::parse_projects(&xml_content) {
        Ok(records) => Page {
            state: WorkflowState::Parsed,
            rows: records.iter().map(DependencyRecord::from).collect(),
            repositories: RepositoryList::new(records),
            xml_content,
            device_codename,
            output: String::new(),
            error_message: String::new(),
        },
        Err(err) => {
            tracing::warn!(error = %err, "Manifest could not be parsed");
            Page {
                state: WorkflowState::ParseError,
                error_message: err.to_string(),
                xml_content,
                device_codename,
                ..Page::empty(String::new())
            }
        }
    }
}

fn convert_step(
    repositories: Option<String>,
    overrides: Overrides,
    device_codename: String,
    xml_content: String,
) -> Page {
    let list = match RepositoryList::from_json(repositories.as_deref()) {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(error = %err, "Submitted repositories could not be decoded");
            return Page {
                state: WorkflowState::DecodeError,
                error_message: err.to_string(),
                xml_content,
                device_codename,
                ..Page::empty(String::new())
            };
        }
    };

    let result = convert::merge(list.records(), &overrides)
        .and_then(|deps| convert::to_json(&deps).map(|json| (deps, json)));

    match result {
        Ok((rows, output)) => Page {
            state: WorkflowState::Converted,
            rows,
            repositories: list,
            output,
            xml_content,
            device_codename,
            error_message: String::new(),
        },
        Err(err) => {
            let state = failure_state(&err);
            if state == WorkflowState::OutputError {
                tracing::error!(error = %err, "Dependency list could not be written");
            }
            Page {
                state,
                rows: overrides.resolve(list.records()),
                repositories: list,
                error_message: err.to_string(),
                xml_content,
                device_codename,
                output: String::new(),
            }
        }
    }
}

/// State for a conversion that failed after the records were decoded
fn failure_state(err: &RepoDepsError) -> WorkflowState {
    match err {
        RepoDepsError::MissingFields { .. } => WorkflowState::ValidationError,
        RepoDepsError::Decode(_) => WorkflowState::DecodeError,
        _ => WorkflowState::OutputError,
    }
}
