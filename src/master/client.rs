// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use thiserror::Error;
use tracing::debug;

use crate::{
    cfg::config::Config,
    master::{
        value::{Value, encode_method_call},
        xml::{MethodResponse, parse_method_response},
    },
};

/// Slave URI handed to registerSubscriber. The library never serves the
/// slave API, so publisherUpdate callbacks land on a dead port.
const DUMMY_SLAVE_URI: &str = "http://127.0.0.1:1";

#[derive(Debug, Error)]
pub enum MasterError {
    #[error("master call {method} timed out")]
    Timeout { method: &'static str },
    #[error("master fault: {0}")]
    Fault(String),
    #[error("master call {method} failed with code {code}: {message}")]
    Status {
        method: &'static str,
        code: i32,
        message: String,
    },
    #[error("no publishers for topic {0}")]
    NoPublishers(String),
    #[error("peer offered non-TCPROS protocol {0:?}")]
    NonTcpros(String),
}

/// A candidate publisher for a topic: `getSystemState` yields node names
/// that still need a slave-URI lookup, `registerSubscriber` yields the
/// slave URIs directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publisher {
    Node(String),
    Uri(String),
}

/// Minimal XML-RPC client for the loopback master and for node slave APIs.
#[derive(Debug, Clone)]
pub struct MasterClient {
    http: reqwest::Client,
    master_uri: String,
    caller_id: String,
    call_timeout: Duration,
}

impl MasterClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            master_uri: normalize_localhost(&cfg.master.uri),
            caller_id: cfg.master.caller_id.clone(),
            call_timeout: cfg.timeouts.call(),
        })
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    /// `lookupService` → the host/port behind a `rosrpc://` URI.
    pub async fn lookup_service(&self, service: &str) -> Result<(String, u16)> {
        let payload = self
            .call(
                &self.master_uri,
                "lookupService",
                vec![Value::string(self.caller_id.as_str()), Value::string(service)],
            )
            .await?;
        let uri = payload
            .as_str()
            .with_context(|| format!("lookupService for {service} returned a non-string"))?;
        parse_rosrpc(uri)
    }

    /// The publishers section of `getSystemState`, filtered to one topic.
    /// Returns node names; an absent topic is an empty list.
    pub async fn get_publishers(&self, topic: &str) -> Result<Vec<Publisher>> {
        let payload = self
            .call(
                &self.master_uri,
                "getSystemState",
                vec![Value::string(self.caller_id.as_str())],
            )
            .await?;
        let sections = payload
            .as_array()
            .context("getSystemState returned a non-array")?;
        let publishers = sections
            .first()
            .and_then(Value::as_array)
            .context("getSystemState is missing the publishers section")?;
        for entry in publishers {
            let Some(pair) = entry.as_array() else { continue };
            let (Some(name), Some(nodes)) =
                (pair.first().and_then(Value::as_str), pair.get(1).and_then(Value::as_array))
            else {
                continue;
            };
            if name == topic {
                return Ok(nodes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|n| Publisher::Node(n.to_string()))
                    .collect());
            }
        }
        Ok(Vec::new())
    }

    /// `lookupNode` → the node's slave API URI, loopback-normalised.
    pub async fn lookup_node(&self, node: &str) -> Result<String> {
        let payload = self
            .call(
                &self.master_uri,
                "lookupNode",
                vec![Value::string(self.caller_id.as_str()), Value::string(node)],
            )
            .await?;
        let uri = payload
            .as_str()
            .with_context(|| format!("lookupNode for {node} returned a non-string"))?;
        Ok(normalize_localhost(uri))
    }

    /// `requestTopic` against a node's slave API; only TCPROS is accepted.
    pub async fn request_topic(&self, node_uri: &str, topic: &str) -> Result<(String, u16)> {
        let payload = self
            .call(
                node_uri,
                "requestTopic",
                vec![
                    Value::string(self.caller_id.as_str()),
                    Value::string(topic),
                    Value::Array(vec![Value::Array(vec![Value::string("TCPROS")])]),
                ],
            )
            .await?;
        let fields = payload
            .as_array()
            .context("requestTopic returned a non-array")?;
        let proto = fields.first().and_then(Value::as_str).unwrap_or_default();
        if proto != "TCPROS" {
            return Err(MasterError::NonTcpros(proto.to_string()).into());
        }
        let host = fields
            .get(1)
            .and_then(Value::as_str)
            .context("requestTopic is missing the host")?;
        let port = fields
            .get(2)
            .and_then(Value::as_i32)
            .context("requestTopic is missing the port")?;
        ensure!((1..=65535).contains(&port), "requestTopic port {port} out of range");
        Ok((normalize_localhost(host), port as u16))
    }

    /// `registerSubscriber` with the deliberate dummy slave URI. Used only
    /// by resolver policies that permit it, when `getSystemState` lists no
    /// publishers. The return carries the current publisher slave URIs.
    pub async fn register_subscriber(
        &self,
        topic: &str,
        msg_type: &str,
    ) -> Result<Vec<Publisher>> {
        let payload = self
            .call(
                &self.master_uri,
                "registerSubscriber",
                vec![
                    Value::string(self.caller_id.as_str()),
                    Value::string(topic),
                    Value::string(msg_type),
                    Value::string(DUMMY_SLAVE_URI),
                ],
            )
            .await?;
        let uris = payload
            .as_array()
            .context("registerSubscriber returned a non-array")?;
        Ok(uris
            .iter()
            .filter_map(Value::as_str)
            .map(|u| Publisher::Uri(normalize_localhost(u)))
            .collect())
    }

    /// POST one method call and unwrap the `[status, text, payload]` triple.
    async fn call(
        &self,
        uri: &str,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<Value> {
        let body = encode_method_call(method, &params);
        debug!(method, uri, "master call");
        let response = self
            .http
            .post(uri)
            .header("Content-Type", "text/xml")
            .body(body)
            .timeout(self.call_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::Error::new(MasterError::Timeout { method })
                } else {
                    anyhow::Error::new(e).context(format!("master call {method} failed"))
                }
            })?;
        ensure!(
            response.status().is_success(),
            "master call {method} got HTTP {}",
            response.status()
        );
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                anyhow::Error::new(MasterError::Timeout { method })
            } else {
                anyhow::Error::new(e).context(format!("master call {method} body read failed"))
            }
        })?;
        let value = match parse_method_response(&text)? {
            MethodResponse::Ok(v) => v,
            MethodResponse::Fault(f) => {
                return Err(MasterError::Fault(f.to_json().to_string()).into());
            },
        };
        let Value::Array(mut triple) = value else {
            bail!("master call {method} returned a non-triple payload");
        };
        ensure!(triple.len() == 3, "master call {method} returned {} elements", triple.len());
        let payload = triple.pop().unwrap_or(Value::Int(0));
        let message = triple
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let code = triple.first().and_then(Value::as_i32).unwrap_or(0);
        if code != 1 {
            return Err(MasterError::Status { method, code, message }.into());
        }
        Ok(payload)
    }
}

/// The firmware nodes bind IPv4 only; a dual-stack resolution of
/// "localhost" races the IPv6 address. Force the IPv4 literal everywhere.
/// Idempotent.
pub fn normalize_localhost(uri: &str) -> String {
    uri.replace("localhost", "127.0.0.1")
}

/// Split a `rosrpc://host:port` URI at the rightmost colon.
pub fn parse_rosrpc(uri: &str) -> Result<(String, u16)> {
    let rest = uri
        .strip_prefix("rosrpc://")
        .with_context(|| format!("not a rosrpc URI: {uri:?}"))?;
    let (host, port) = rest
        .rsplit_once(':')
        .with_context(|| format!("rosrpc URI without a port: {uri:?}"))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("bad port in rosrpc URI {uri:?}"))?;
    Ok((normalize_localhost(host), port))
}
