//! Decoder-selecting fetch helper
//!
//! One GET through a caller-selected transport, decoded as the requested
//! format. Faults never propagate to the caller: any error collapses to
//! `None`, so an empty body and a network failure look the same here.

use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::Client;
use std::str::FromStr;
use tracing::warn;

/// How to decode a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
    Bytes,
}

impl FromStr for ResponseFormat {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "bytes" | "binary" => Ok(Self::Bytes),
            other => Err(FetchError::UnsupportedResponseType(other.to_string())),
        }
    }
}

/// A decoded response body
#[derive(Debug, Clone)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// Fetch `url` through `client` and decode per `format`.
/// Returns `None` on any fault; the error is logged, not surfaced.
pub async fn fetch_with_format(
    client: &Client,
    url: &str,
    format: ResponseFormat,
) -> Option<Payload> {
    match try_fetch(client, url, format).await {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("fetch of {} failed: {:#}", url, e);
            None
        },
    }
}

async fn try_fetch(client: &Client, url: &str, format: ResponseFormat) -> Result<Payload> {
    let response = client
        .get(url)
        .send()
        .await
        .context("request failed")?
        .error_for_status()
        .context("server returned an error status")?;

    let payload = match format {
        ResponseFormat::Json => {
            Payload::Json(response.json().await.context("body is not valid JSON")?)
        },
        ResponseFormat::Text => {
            Payload::Text(response.text().await.context("failed to read body")?)
        },
        ResponseFormat::Bytes => {
            Payload::Bytes(response.bytes().await.context("failed to read body")?.to_vec())
        },
    };

    Ok(payload)
}
