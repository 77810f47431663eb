//! Query-string assembly.
//!
//! # Design
//! Every entry is written as `name=value&`, so the query string always ends
//! with a separator. The auth token is appended directly after it, which
//! yields `...&auth=<token>`. When no token follows, the trailing `&` stays:
//! the data API ignores empty pairs.

use tracing::error;
use url::{form_urlencoded, Url};

use crate::error::{Error, Result};

/// Name of the query parameter carrying the auth token.
pub const AUTH_PARAM: &str = "auth";

/// One query pair. A pair without a value is written as the bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: Option<String>,
}

/// An ordered sequence of query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<QueryParam>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, Some(value.into()));
        self
    }

    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.push(name, None);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.params.push(QueryParam {
            name: name.into(),
            value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryParam> {
        self.params.iter()
    }
}

/// Append `query` and `auth_token` to a resolved resource path.
///
/// A present query, even an empty one, opens the query string with `?`.
/// Values are form-urlencoded; names are written as given and must not
/// contain characters that would change the structure of the query string.
pub fn encode(path: &str, query: Option<&Query>, auth_token: Option<&str>) -> Result<String> {
    let mut url = String::from(path);

    if let Some(query) = query {
        url.push('?');
        for param in query.iter() {
            check_name(&param.name)?;
            url.push_str(&param.name);
            if let Some(value) = &param.value {
                url.push('=');
                url.extend(form_urlencoded::byte_serialize(value.as_bytes()));
            }
            url.push('&');
        }
    }

    if let Some(token) = auth_token {
        if query.is_none() {
            url.push('?');
        }
        url.push_str(AUTH_PARAM);
        url.push('=');
        url.push_str(token);
    }

    Ok(url)
}

/// Parse an assembled URL and return its canonical serialization.
///
/// Characters that cannot appear in a request target, such as spaces or
/// non-ASCII text in the resource path, are percent-encoded. Pairs already
/// written by `encode` keep their order and separators.
pub fn canonicalize(url: &str) -> Result<String> {
    Url::parse(url).map(String::from).map_err(|e| {
        error!(%url, error = %e, "unable to build request url");
        Error::Encoding {
            name: url.to_string(),
            reason: e.to_string(),
        }
    })
}

fn check_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty".to_string())
    } else {
        name.chars()
            .find(|c| matches!(c, '=' | '&' | '?' | '#') || c.is_whitespace() || c.is_control())
            .map(|c| format!("name contains reserved character {c:?}"))
    };

    match reason {
        None => Ok(()),
        Some(reason) => {
            error!(name, %reason, "unable to encode query parameter");
            Err(Error::Encoding {
                name: name.to_string(),
                reason,
            })
        }
    }
}
