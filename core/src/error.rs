//! Error types for the Wilddog REST client.
//!
//! # Design
//! One error enum covers every structural failure of a call: the URL cannot
//! be built, the payload cannot be serialized, the server cannot be reached,
//! or the response cannot be parsed. `ErrorKind` is the flat tag callers match
//! on when they only care about the category.
//!
//! A non-2xx HTTP status is not an error. It normalizes into a
//! `NormalizedResponse` with `success == false`.

use thiserror::Error;

use crate::http::Verb;

/// Boxed source error produced by a `Transport`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Encoding,
    Serialization,
    Transport,
    ResponseFormat,
    Invariant,
}

/// Errors returned by `Client` verb operations and the pipeline stages.
#[derive(Debug, Error)]
pub enum Error {
    /// The base location or auth token is missing or malformed.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// A query parameter or the assembled URL cannot be represented.
    #[error("unable to encode '{name}' into the request url: {reason}")]
    Encoding { name: String, reason: String },

    /// The outgoing payload could not be converted to JSON.
    #[error("unable to serialize request payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The HTTP exchange itself failed (DNS, refused connection, TLS, I/O).
    #[error("unable to receive response from request ({verb}) @ {url}")]
    Transport {
        verb: Verb,
        url: String,
        #[source]
        source: BoxError,
    },

    /// The response body is not UTF-8 JSON.
    #[error("unable to parse response body as JSON; body was: '{raw}'")]
    ResponseFormat {
        raw: String,
        #[source]
        source: BoxError,
    },

    /// A pipeline stage received arguments that contradict each other.
    #[error("pipeline invariant violated: {0}")]
    Invariant(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Encoding { .. } => ErrorKind::Encoding,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::ResponseFormat { .. } => ErrorKind::ResponseFormat,
            Error::Invariant(_) => ErrorKind::Invariant,
        }
    }
}
