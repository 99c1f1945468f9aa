use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client and the reshaping helpers.
///
/// Rate limits (429) and empty results (404) never appear here: the client
/// absorbs both, retrying the former and normalizing the latter to an empty
/// result list.
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with an error code other than 404 or 429.
    #[error("{code}: {message}")]
    Remote { code: i64, message: String },

    /// Transport-level failure (connect, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("failed to decode API response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body was neither a document list nor a coded error object.
    #[error("unexpected response shape from API")]
    UnexpectedResponse,

    /// A metadata document is required to resolve the requested key.
    #[error("please provide metadata document _id {0}")]
    MissingMetadata(String),

    /// The supplied metadata document does not belong to the data document.
    #[error(
        "data document doesn't match metadata document: needs metadata document _id {expected}, but got {got}"
    )]
    MismatchedDocuments { expected: String, got: String },

    /// The key is present on neither the data nor the metadata document.
    #[error("key {0:?} not found on data or metadata document")]
    KeyNotFound(String),

    /// `data` and the variable names in `data_info` disagree in length.
    #[error("data document has {data} data columns but data_info names {names} variables")]
    ShapeMismatch { data: usize, names: usize },

    /// Document structure departs from the documented Argovis shapes.
    #[error("malformed document: {0}")]
    Malformed(&'static str),

    /// The string is not in the `YYYY-MM-DDTHH:MM:SS.sssZ` wire format.
    #[error("invalid time string {0:?}")]
    InvalidTime(String),
}
