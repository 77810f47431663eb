//! Walkthrough of every verb against a live data API.
//!
//! Usage: `wilddog-demo baseUrl=https://<appId>.wilddogio.com/rest [auth=<token>]`
//!
//! `WILDDOG_BASE_URL` is used when no `baseUrl=` option is given.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Map};
use tracing::error;
use tracing_subscriber::EnvFilter;
use wilddog_core::{config::BASE_URL_KEY, Client, ClientConfig, NormalizedResponse, Transport};

const BASE_URL_ENV: &str = "WILDDOG_BASE_URL";

#[derive(Debug, Parser)]
#[command(name = "wilddog-demo", about = "Exercise the Wilddog REST client")]
struct Args {
    /// Program options as key=value tokens (baseUrl=..., auth=...)
    #[arg(value_parser = parse_key_val)]
    options: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .trim()
        .split_once('=')
        .ok_or_else(|| format!("invalid option '{s}': expected key=value"))?;
    Ok((key.to_string(), value.to_string()))
}

fn config_from(mut options: Vec<(String, String)>) -> Result<ClientConfig> {
    if !options.iter().any(|(key, _)| key == BASE_URL_KEY) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            options.push((BASE_URL_KEY.to_string(), base_url));
        }
    }
    ClientConfig::from_pairs(options)
        .inspect_err(|e| error!(error = %e, "invalid program options"))
        .with_context(|| format!("program option '{BASE_URL_KEY}' (or ${BASE_URL_ENV}) is required"))
}

fn print(title: &str, response: &NormalizedResponse) {
    println!("\n\nResult of {title}:\n{response}\n");
}

/// Run the walkthrough: clear the root, write and read it back, then work
/// on child nodes with each verb.
fn run<T: Transport>(client: &Client<T>) -> Result<()> {
    client.remove().context("clearing the root")?;

    let mut data = Map::new();
    data.insert("PUT-root".into(), json!("This was PUT into the root"));
    print("PUT (to the root)", &client.replace(data)?);
    print("GET (the root)", &client.read()?);

    let data = json!({
        "Key_1": "This is the first value",
        "Key_2": "This is value #2",
        "Key_3": {"Sub-Key1": "This is the first sub-value"}
    });
    print("PUT (test-PUT)", &client.replace_at("test-PUT", data.clone())?);
    print("GET (test-PUT)", &client.read_at("test-PUT")?);

    print("POST (test-POST)", &client.append_at("test-POST", data)?);

    print(
        "PATCH (test-PUT)",
        &client.merge_at("test-PUT", json!({"Key_2": "This value was PATCHed"}))?,
    );
    print(
        "GET (test-PUT, pretty)",
        &client
            .add_query_parameter("print", "pretty")
            .read_at("test-PUT")?,
    );

    let data = json!({"DELETE": "This should not appear; should have been DELETED"});
    print("PUT (test-DELETE)", &client.replace_at("test-DELETE", data)?);
    print("DELETE (test-DELETE)", &client.remove_at("test-DELETE")?);
    print("GET (test-DELETE)", &client.read_at("test-DELETE")?);

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config_from(args.options)?;
    let client = Client::from_config(&config)?;
    run(&client).inspect_err(|e| error!("walkthrough failed: {e:#}"))
}
