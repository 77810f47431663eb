//! The `Client` façade over the request pipeline.
//!
//! # Design
//! `Client` holds only immutable configuration: the base location, an
//! optional auth token and a transport. Every verb runs the same pipeline:
//! resolve the path, encode the query, encode the body, dispatch, normalize.
//!
//! Query parameters are scoped to a single call. `add_query_parameter`
//! returns a `Call` that owns the parameters and is consumed by the verb it
//! runs, so parameters can never leak into a later call and the client can
//! be shared between threads.

use tracing::{error, info};

use crate::codec;
use crate::config::ClientConfig;
use crate::dispatch::{self, Transport, UreqTransport};
use crate::error::Result;
use crate::http::{HttpRequest, Verb};
use crate::normalize::normalize;
use crate::path;
use crate::query::{self, Query};
use crate::types::{NormalizedResponse, Payload};

/// Blocking client for the Wilddog REST data API.
///
/// Each verb comes in two forms: one that targets the base location and an
/// `_at` form that targets a path relative to it. Payload arguments accept a
/// `serde_json::Value`, a `serde_json::Map`, or a `Payload` (use
/// `Payload::raw` for pre-serialized JSON).
#[derive(Debug, Clone)]
pub struct Client<T: Transport = UreqTransport> {
    base_url: String,
    auth_token: Option<String>,
    transport: T,
}

impl Client<UreqTransport> {
    /// Create a client for `base_url` without authentication.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    /// Create a client that sends `token` as the `auth` query parameter.
    pub fn with_auth(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_auth_token(token))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    /// Create a client that performs its exchanges through `transport`.
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self> {
        let config = config.validate()?;
        info!(
            base_url = %config.base_url,
            authenticated = config.auth_token.is_some(),
            "initialized client"
        );
        Ok(Self {
            base_url: config.base_url,
            auth_token: config.auth_token,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Start a call carrying the query parameter `name=value`.
    ///
    /// The returned `Call` accepts further parameters and is consumed by the
    /// verb it runs.
    pub fn add_query_parameter(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Call<'_, T> {
        self.call().add_query_parameter(name, value)
    }

    /// Start a call carrying the value-less query parameter `name`.
    pub fn add_query_flag(&self, name: impl Into<String>) -> Call<'_, T> {
        self.call().add_query_flag(name)
    }

    /// Start a call carrying `query`.
    pub fn with_query(&self, query: Query) -> Call<'_, T> {
        Call {
            client: self,
            query,
        }
    }

    fn call(&self) -> Call<'_, T> {
        self.with_query(Query::new())
    }

    /// Read the data at the base location.
    pub fn read(&self) -> Result<NormalizedResponse> {
        self.call().read()
    }

    pub fn read_at(&self, path: &str) -> Result<NormalizedResponse> {
        self.call().read_at(path)
    }

    /// Overwrite the base location. Empty data deletes it.
    pub fn replace(&self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().replace(data)
    }

    pub fn replace_at(&self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().replace_at(path, data)
    }

    /// Update the given children of the base location.
    pub fn merge(&self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().merge(data)
    }

    pub fn merge_at(&self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().merge_at(path, data)
    }

    /// Store `data` under a new generated key below the base location.
    ///
    /// Never idempotent: every call creates another child. The key is
    /// available through `NormalizedResponse::generated_key`.
    pub fn append(&self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().append(data)
    }

    pub fn append_at(&self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.call().append_at(path, data)
    }

    /// Delete the data at the base location.
    pub fn remove(&self) -> Result<NormalizedResponse> {
        self.call().remove()
    }

    pub fn remove_at(&self, path: &str) -> Result<NormalizedResponse> {
        self.call().remove_at(path)
    }

    fn execute(
        &self,
        verb: Verb,
        relative: Option<&str>,
        query: Option<&Query>,
        payload: Option<Payload>,
    ) -> Result<NormalizedResponse> {
        let resource = path::resolve(&self.base_url, relative);
        let url = query::encode(&resource, query, self.auth_token.as_deref())?;
        let url = query::canonicalize(&url)?;
        info!(
            %url,
            relative_path = relative.unwrap_or_default(),
            "built full url"
        );

        let mut headers = Vec::new();
        let body = match payload {
            Some(payload) => {
                let body = codec::to_request_body(&payload)?;
                headers.push(("content-type".to_string(), body.content_type.to_string()));
                Some(body.bytes)
            }
            None => None,
        };

        let request = HttpRequest {
            verb,
            url,
            headers,
            body,
        };
        let response = dispatch::dispatch(&self.transport, &request)?;
        normalize(verb, response).inspect_err(|e| {
            error!(%verb, url = %request.url, error = %e, "unable to normalize response");
        })
    }
}

/// A single pending call with its own query parameters.
///
/// Created by `Client::add_query_parameter` and friends; consumed by exactly
/// one verb method.
#[must_use = "a Call does nothing until a verb method runs it"]
#[derive(Debug)]
pub struct Call<'a, T: Transport = UreqTransport> {
    client: &'a Client<T>,
    query: Query,
}

impl<'a, T: Transport> Call<'a, T> {
    pub fn add_query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(name, Some(value.into()));
        self
    }

    pub fn add_query_flag(mut self, name: impl Into<String>) -> Self {
        self.query.push(name, None);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn read(self) -> Result<NormalizedResponse> {
        self.run(Verb::Read, None, None)
    }

    pub fn read_at(self, path: &str) -> Result<NormalizedResponse> {
        self.run(Verb::Read, Some(path), None)
    }

    pub fn replace(self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Replace, None, Some(data.into()))
    }

    pub fn replace_at(self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Replace, Some(path), Some(data.into()))
    }

    pub fn merge(self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Merge, None, Some(data.into()))
    }

    pub fn merge_at(self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Merge, Some(path), Some(data.into()))
    }

    pub fn append(self, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Append, None, Some(data.into()))
    }

    pub fn append_at(self, path: &str, data: impl Into<Payload>) -> Result<NormalizedResponse> {
        self.run(Verb::Append, Some(path), Some(data.into()))
    }

    pub fn remove(self) -> Result<NormalizedResponse> {
        self.run(Verb::Remove, None, None)
    }

    pub fn remove_at(self, path: &str) -> Result<NormalizedResponse> {
        self.run(Verb::Remove, Some(path), None)
    }

    fn run(self, verb: Verb, path: Option<&str>, payload: Option<Payload>) -> Result<NormalizedResponse> {
        let query = (!self.query.is_empty()).then_some(&self.query);
        self.client.execute(verb, path, query, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::mock::MockTransport;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use serde_json::{json, Map, Value};

    const BASE: &str = "https://demo.wilddogio.com/rest";

    fn client(transport: &MockTransport) -> Client<MockTransport> {
        Client::with_transport(&ClientConfig::new(BASE), transport.clone()).unwrap()
    }

    fn authed(transport: &MockTransport) -> Client<MockTransport> {
        Client::with_transport(
            &ClientConfig::new(BASE).with_auth_token("t0k"),
            transport.clone(),
        )
        .unwrap()
    }

    #[test]
    fn constructors_validate_base_url() {
        assert_eq!(Client::new("   ").unwrap_err().kind(), ErrorKind::Configuration);
        let client = Client::with_auth(" https://host/rest ", "abc").unwrap();
        assert_eq!(client.base_url(), "https://host/rest");
        assert_eq!(client.auth_token(), Some("abc"));
    }

    #[test]
    fn read_builds_get_on_base() {
        let transport = MockTransport::new().respond(200, r#"{"a":1}"#);
        let response = client(&transport).read().unwrap();
        assert_eq!(response.body(), &json!({"a": 1}));

        let req = &transport.requests()[0];
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE}.json"));
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn every_verb_uses_its_method_and_path() {
        let transport = MockTransport::new();
        let c = client(&transport);
        c.read_at("r").unwrap();
        c.replace_at("p", json!({"k": "v"})).unwrap();
        c.merge_at("/m", json!({"k": "v"})).unwrap();
        c.append_at("a", json!("x")).unwrap();
        c.remove_at(" d ").unwrap();

        let seen: Vec<(HttpMethod, String, bool)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method(), r.url, r.body.is_some()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (HttpMethod::Get, format!("{BASE}/r.json"), false),
                (HttpMethod::Put, format!("{BASE}/p.json"), true),
                (HttpMethod::Patch, format!("{BASE}/m.json"), true),
                (HttpMethod::Post, format!("{BASE}/a.json"), true),
                (HttpMethod::Delete, format!("{BASE}/d.json"), false),
            ]
        );
    }

    #[test]
    fn bodies_are_json_with_content_type() {
        let transport = MockTransport::new();
        let mut data = Map::new();
        data.insert("PUT-root".into(), json!("This was PUT into the root"));
        client(&transport).replace(data).unwrap();

        let req = &transport.requests()[0];
        assert_eq!(
            req.headers,
            vec![(
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string()
            )]
        );
        assert_eq!(
            req.body.as_deref().unwrap(),
            br#"{"PUT-root":"This was PUT into the root"}"#
        );
    }

    #[test]
    fn raw_json_payload_is_sent_as_given() {
        let transport = MockTransport::new();
        client(&transport)
            .merge_at("users", Payload::raw(r#"{"ada": {"born": 1815}}"#))
            .unwrap();
        assert_eq!(
            transport.requests()[0].body.as_deref().unwrap(),
            br#"{"ada": {"born": 1815}}"#
        );
    }

    #[test]
    fn empty_replace_sends_null() {
        let transport = MockTransport::new();
        client(&transport).replace_at("gone", Payload::Empty).unwrap();
        client(&transport).replace_at("gone", None::<Value>).unwrap();
        for req in transport.requests() {
            assert_eq!(req.method(), HttpMethod::Put);
            assert_eq!(req.body.as_deref().unwrap(), b"null");
        }
    }

    #[test]
    fn query_parameters_apply_to_one_call_only() {
        let transport = MockTransport::new();
        let c = client(&transport);

        c.add_query_parameter("orderBy", "\"$key\"")
            .add_query_parameter("limitToFirst", "1")
            .read_at("users")
            .unwrap();
        c.read_at("users").unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{BASE}/users.json?orderBy=%22%24key%22&limitToFirst=1&"),
                format!("{BASE}/users.json"),
            ]
        );
    }

    #[test]
    fn auth_token_joins_the_query() {
        let transport = MockTransport::new();
        let c = authed(&transport);

        c.read().unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}.json?auth=t0k"));

        c.add_query_parameter("print", "pretty").remove_at("x").unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}/x.json?print=pretty&auth=t0k"));

        c.add_query_flag("shallow").read().unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}.json?shallow&auth=t0k"));
    }

    #[test]
    fn with_query_uses_prebuilt_query() {
        let transport = MockTransport::new();
        let query = Query::new().param("startAt", "a").param("endAt", "m");
        client(&transport).with_query(query).read_at("names").unwrap();
        assert_eq!(
            transport.last_url(),
            format!("{BASE}/names.json?startAt=a&endAt=m&")
        );
    }

    #[test]
    fn encoding_error_stops_before_dispatch() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .add_query_parameter("a&b", "v")
            .read()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn path_characters_are_percent_encoded() {
        let transport = MockTransport::new();
        let c = client(&transport);
        c.replace_at("my node", json!({"a": 1})).unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}/my%20node.json"));

        c.read_at("users/José").unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}/users/Jos%C3%A9.json"));
    }

    #[test]
    fn padded_auth_token_is_sent_unchanged() {
        let transport = MockTransport::new();
        let c = Client::with_transport(
            &ClientConfig::new(BASE).with_auth_token("YWJj=="),
            transport.clone(),
        )
        .unwrap();
        c.read().unwrap();
        assert_eq!(transport.last_url(), format!("{BASE}.json?auth=YWJj=="));
    }

    #[test]
    fn non_2xx_is_a_normalized_response() {
        let transport = MockTransport::new().respond(401, r#"{"error":"Permission denied"}"#);
        let response = client(&transport).read().unwrap();
        assert!(!response.is_success());
        assert_eq!(response.status(), 401);
    }

    #[test]
    fn malformed_body_is_a_format_error() {
        let transport = MockTransport::new().respond_bytes(200, &[0xc3, 0x28]);
        let err = client(&transport).read().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseFormat);
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = MockTransport::new().fail_with("dns failure");
        let err = client(&transport).append(json!({"a": 1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Client>();
        assert_send_sync::<Client<MockTransport>>();
    }
}
