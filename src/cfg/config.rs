// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{env, fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Runtime configuration. Every field has a sane default, so an empty YAML
/// document (or no file at all) yields a working loopback setup.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Config {
    /// Master endpoint and the identity sent in every handshake.
    #[serde(default)]
    pub master: MasterConfig,
    /// Per-operation deadlines, all integer milliseconds.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Local command-injector collaborator.
    #[serde(default)]
    pub helper: HelperConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MasterConfig {
    #[serde(default = "default_master_uri", rename = "MasterUri")]
    /// Master address; loopback is the only supported deployment.
    pub uri: String,

    #[serde(default = "default_caller_id", rename = "CallerId")]
    /// Node identity used in master calls and session handshakes.
    pub caller_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_ms", rename = "ConnectMs")]
    pub connect_ms: u64,
    #[serde(default = "default_call_ms", rename = "CallMs")]
    pub call_ms: u64,
    #[serde(default = "default_topic_read_ms", rename = "TopicReadMs")]
    pub topic_read_ms: u64,
    #[serde(default = "default_reconnect_delay_ms", rename = "ReconnectDelayMs")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_helper_ms", rename = "HelperMs")]
    pub helper_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HelperConfig {
    #[serde(default = "default_helper_binary", rename = "Binary")]
    /// Vendor binary that injects JSON commands into the firmware socket.
    pub binary: String,

    #[serde(default = "default_helper_socket", rename = "Socket")]
    /// Unix socket owned by the firmware.
    pub socket: String,
}

fn default_master_uri() -> String {
    env::var("MDS_MASTER_URI").unwrap_or_else(|_| "http://127.0.0.1:11311".to_string())
}

fn default_caller_id() -> String {
    env::var("MDS_CALLER_ID").unwrap_or_else(|_| "/ROSNODE".to_string())
}

fn default_helper_binary() -> String {
    env::var("MDS_HELPER_BIN").unwrap_or_else(|_| "mdsctl".to_string())
}

fn default_helper_socket() -> String {
    env::var("MDS_HELPER_SOCKET").unwrap_or_else(|_| "/tmp/mds_cmd.sock".to_string())
}

fn default_connect_ms() -> u64 {
    4000
}

fn default_call_ms() -> u64 {
    5000
}

fn default_topic_read_ms() -> u64 {
    60_000
}

fn default_reconnect_delay_ms() -> u64 {
    1500
}

fn default_helper_ms() -> u64 {
    2000
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            uri: default_master_uri(),
            caller_id: default_caller_id(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            call_ms: default_call_ms(),
            topic_read_ms: default_topic_read_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            helper_ms: default_helper_ms(),
        }
    }
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            binary: default_helper_binary(),
            socket: default_helper_socket(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn call(&self) -> Duration {
        Duration::from_millis(self.call_ms)
    }

    pub fn topic_read(&self) -> Duration {
        Duration::from_millis(self.topic_read_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn helper(&self) -> Duration {
        Duration::from_millis(self.helper_ms)
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path:?}"))?;
        let cfg: Config = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {path:?}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.master.uri.starts_with("http://"),
            "master URI must be plain http, got {:?}",
            self.master.uri
        );
        ensure!(
            self.master.caller_id.starts_with('/'),
            "caller id must start with '/', got {:?}",
            self.master.caller_id
        );
        ensure!(self.timeouts.connect_ms > 0, "ConnectMs must be positive");
        ensure!(self.timeouts.call_ms > 0, "CallMs must be positive");
        ensure!(self.timeouts.topic_read_ms > 0, "TopicReadMs must be positive");
        ensure!(self.timeouts.helper_ms > 0, "HelperMs must be positive");
        Ok(())
    }
}
