//! Request dispatch over a pluggable transport.
//!
//! # Design
//! `Transport` is the only place that performs I/O. `dispatch` wraps it with
//! the checks and tracing every call shares, so alternative transports (and
//! the test double below) get the same behavior for free.

use std::time::Instant;

use tracing::{error, info};

use crate::error::{BoxError, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP exchange.
///
/// Implementations must return non-2xx responses as data. Only failures to
/// complete the exchange are errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Blocking transport backed by `ureq`.
///
/// A fresh agent is configured for every call, so no connection is reused
/// between calls. No timeout is set beyond ureq's defaults, and response
/// bodies are read in full whatever their size.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();
        let mut response = match request.method() {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Put => with_headers(agent.put(url), &request.headers).send(body),
            HttpMethod::Patch => with_headers(agent.patch(url), &request.headers).send(body),
            HttpMethod::Post => with_headers(agent.post(url), &request.headers).send(body),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Perform one HTTP exchange for `request`.
///
/// Fails with `Error::Invariant` if the request's body does not match its
/// verb, and with `Error::Transport` if the exchange cannot be completed.
pub fn dispatch<T: Transport + ?Sized>(transport: &T, request: &HttpRequest) -> Result<HttpResponse> {
    if request.verb.carries_body() != request.body.is_some() {
        let msg = if request.body.is_some() {
            format!("{} request must not carry a body", request.verb)
        } else {
            format!("{} request requires a body", request.verb)
        };
        error!(url = %request.url, "{msg}");
        return Err(Error::Invariant(msg));
    }

    info!(
        method = %request.method(),
        url = %request.url,
        headers = ?request.headers,
        "sending request"
    );
    let started = Instant::now();

    let response = transport.execute(request).map_err(|source| {
        error!(
            method = %request.method(),
            url = %request.url,
            error = %source,
            "unable to receive response"
        );
        Error::Transport {
            verb: request.verb,
            url: request.url.clone(),
            source,
        }
    })?;

    info!(
        url = %request.url,
        status = response.status,
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        bytes = response.body.len(),
        headers = ?response.headers,
        "received response"
    );
    Ok(response)
}
