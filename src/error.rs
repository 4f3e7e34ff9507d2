// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching the catalog from the remote API.
///
/// Any of these blocks the catalog view; none of them is retried.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to fetch catalog from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Catalog response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed catalog: {0}")]
    Malformed(#[from] NormalizeError),
}

/// Errors that abort a whole normalization pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("expected a JSON array of show records, found {found}")]
    NotASequence { found: &'static str },
}

/// Errors that can occur when reading or writing persisted favorites
#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Failed to read favorites file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write favorites file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize favorites: {0}")]
    SerializeFailed(#[from] serde_json::Error),

    #[error("Favorites storage is unavailable: {0}")]
    StorageUnavailable(String),
}

/// Errors that can occur when fetching a single show's detail
#[derive(Error, Debug)]
pub enum DetailError {
    #[error("Failed to fetch show detail from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Show detail response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid show detail URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Show detail for '{show_id}' is not a JSON object")]
    NotAnObject { show_id: String },
}

/// Returns a short name for the kind of a JSON value, for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
