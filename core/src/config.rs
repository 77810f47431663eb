//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data that can be deserialized or assembled from
//! `key=value` program arguments. `validate` is the single place where the
//! base location and auth token are checked; every `Client` constructor goes
//! through it.

use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;

use crate::error::{Error, Result};

/// Key of the base location in `key=value` options.
pub const BASE_URL_KEY: &str = "baseUrl";
/// Key of the auth token in `key=value` options.
pub const AUTH_KEY: &str = "auth";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default, rename = "auth", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// A `ClientConfig` that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Build a config from `key=value` pairs. Unknown keys are ignored; a
    /// missing `baseUrl` is a configuration error.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut base_url = None;
        let mut auth_token = None;
        for (key, value) in pairs {
            match key.as_ref().trim() {
                BASE_URL_KEY => base_url = Some(value.into()),
                AUTH_KEY => auth_token = Some(value.into()),
                _ => {}
            }
        }

        let Some(base_url) = base_url else {
            let msg = format!("option '{BASE_URL_KEY}' not found but required");
            error!("{msg}");
            return Err(Error::Configuration(msg));
        };
        Ok(Self {
            base_url,
            auth_token,
        })
    }

    pub(crate) fn validate(&self) -> Result<ValidConfig> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(config_error(format!(
                "base url cannot be empty; was: '{}'",
                self.base_url
            )));
        }

        let parsed = Url::parse(base_url)
            .map_err(|e| config_error(format!("base url '{base_url}' is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(config_error(format!(
                "base url '{base_url}' must use http or https"
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(config_error(format!(
                "base url '{base_url}' must not carry a query or fragment"
            )));
        }

        let auth_token = match self.auth_token.as_deref() {
            None => None,
            Some(token) => {
                let token = token.trim();
                if token.is_empty() {
                    return Err(config_error("auth token cannot be blank".to_string()));
                }
                if token
                    .chars()
                    .any(|c| matches!(c, '&' | '#' | '?') || c.is_whitespace() || c.is_control())
                {
                    return Err(config_error(
                        "auth token contains characters reserved in query strings".to_string(),
                    ));
                }
                Some(token.to_string())
            }
        };

        Ok(ValidConfig {
            base_url: base_url.to_string(),
            auth_token,
        })
    }
}

fn config_error(msg: String) -> Error {
    error!("{msg}");
    Error::Configuration(msg)
}
