//! Blocking client for the Wilddog REST data API.
//!
//! # Overview
//! The data API exposes a hierarchical JSON store under a base location.
//! `Client` attaches a relative path (and optional one-shot query
//! parameters) to that location, issues one of five verbs and returns a
//! `NormalizedResponse` with the status, a success flag, the raw body and
//! the parsed JSON body.
//!
//! # Design
//! - The pipeline is split into small stages: `path` (resource path),
//!   `query` (query string and auth token), `codec` (JSON bodies),
//!   `dispatch` (the HTTP exchange through a `Transport`) and `normalize`.
//! - `Client` holds only immutable configuration. Query parameters live on
//!   a per-call `Call` that the verb method consumes.
//! - Non-2xx statuses are data (`success == false`); only structural
//!   failures are `Error`s, tagged with an `ErrorKind`.
//!
//! ```no_run
//! use serde_json::json;
//! use wilddog_core::Client;
//!
//! # fn main() -> Result<(), wilddog_core::Error> {
//! let client = Client::new("https://<appId>.wilddogio.com/rest")?;
//! client.replace_at("users/ada", json!({"born": 1815}))?;
//! let response = client
//!     .add_query_parameter("print", "pretty")
//!     .read_at("users/ada")?;
//! assert_eq!(response.body()["born"], 1815);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod normalize;
pub mod path;
pub mod query;
pub mod types;

pub use client::{Call, Client};
pub use config::ClientConfig;
pub use dispatch::{Transport, UreqTransport};
pub use error::{Error, ErrorKind, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Verb};
pub use query::Query;
pub use types::{NormalizedResponse, Payload};
