//! `hookcast send`: post one event built from command-line arguments

use eyre::Result;
use indexmap::IndexMap;
use lazy_regex::regex_captures;

use crate::config::Config;
use crate::observability::{Event, Forwarder};

pub fn run(event_type: &str, data: Option<&str>, meta: &[String], dry_run: bool, config: &Config) -> Result<()> {
    let data = data.map(parse_value).unwrap_or(serde_json::Value::Null);
    let metadata = meta
        .iter()
        .map(|pair| parse_meta(pair))
        .collect::<Result<IndexMap<_, _>>>()?;

    let forwarder = Forwarder::from_config(config);

    if dry_run {
        let mut event = Event::new(forwarder.source_app(), event_type, data);
        for (key, value) in metadata {
            event = event.with_metadata(&key, value);
        }
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(());
    }

    log::info!("Sending {} event to {}", event_type, config.observability.server_url);
    forwarder.send(event_type, data, metadata);

    Ok(())
}

/// JSON when it parses, otherwise the raw text as a string
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn parse_meta(pair: &str) -> Result<(String, serde_json::Value)> {
    let Some((_, key, value)) = regex_captures!(r"^([A-Za-z_][A-Za-z0-9_.-]*)=(.*)$"s, pair) else {
        eyre::bail!("Invalid metadata '{}': expected KEY=VALUE", pair);
    };
    Ok((key.to_string(), parse_value(value)))
}
