//! HTTP transport types and the verb table.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! from a `Verb` and a fully encoded URL, a `Transport` turns it into an
//! `HttpResponse`, and the normalizer consumes that response. Nothing in this
//! module touches the network.
//!
//! `Verb` is the closed set of logical operations the data API understands.
//! Its mapping onto HTTP methods lives in one place, `Verb::method`, instead
//! of being repeated at every call site.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical operation on the hierarchical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Fetch the value at a path.
    Read,
    /// Overwrite the value at a path. An empty payload deletes it.
    Replace,
    /// Update the listed children of a path, leaving the others untouched.
    Merge,
    /// Store the payload under a new server-generated key below a path.
    Append,
    /// Delete the value at a path.
    Remove,
}

impl Verb {
    pub const ALL: [Verb; 5] = [
        Verb::Read,
        Verb::Replace,
        Verb::Merge,
        Verb::Append,
        Verb::Remove,
    ];

    /// The HTTP method that carries this verb on the wire.
    pub fn method(self) -> HttpMethod {
        match self {
            Verb::Read => HttpMethod::Get,
            Verb::Replace => HttpMethod::Put,
            Verb::Merge => HttpMethod::Patch,
            Verb::Append => HttpMethod::Post,
            Verb::Remove => HttpMethod::Delete,
        }
    }

    /// Whether requests for this verb carry a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, Verb::Replace | Verb::Merge | Verb::Append)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Read => "READ",
            Verb::Replace => "REPLACE",
            Verb::Merge => "MERGE",
            Verb::Append => "APPEND",
            Verb::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is fully assembled: base location, path, format suffix and query
/// string. `body` is present exactly when `verb.carries_body()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn method(&self) -> HttpMethod {
        self.verb.method()
    }
}

/// An HTTP response described as plain data.
///
/// `body` holds the raw bytes as received; decoding is the normalizer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}
