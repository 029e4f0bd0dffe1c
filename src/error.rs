//! Error types shared by the loader, the API client and the provisioner.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The input document does not describe a folder tree we can walk.
    #[error("Invalid JSON structure: {0}")]
    InvalidStructure(String),

    /// The input file could not be read.
    #[error("Error reading JSON file '{}': {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API answered with anything other than a usable 200.
    #[error("API call failed with status {status}: {body}")]
    ApiCallFailed { status: u16, body: String },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProvisionError {
    /// Text recorded in the status log for a failed call: the response body
    /// verbatim for API failures, the error message otherwise.
    pub fn detail(&self) -> String {
        match self {
            ProvisionError::ApiCallFailed { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
