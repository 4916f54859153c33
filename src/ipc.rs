// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Collaborator for the handful of verbs that bypass the master/node stack
//! entirely: a vendor binary pushes a JSON payload into the firmware's
//! command socket. The library never opens that socket itself.

use std::{env, time::Duration};

use anyhow::Result;
use once_cell::sync::Lazy;
use serde_json::json;
use thiserror::Error;
use tokio::{process::Command, time::timeout};
use tracing::debug;

use crate::cfg::config::HelperConfig;

pub static DEFAULT_HELPER_BIN: Lazy<String> =
    Lazy::new(|| env::var("MDS_HELPER_BIN").unwrap_or_else(|_| "mdsctl".to_string()));

pub static DEFAULT_HELPER_SOCKET: Lazy<String> = Lazy::new(|| {
    env::var("MDS_HELPER_SOCKET").unwrap_or_else(|_| "/tmp/mds_cmd.sock".to_string())
});

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("helper {bin} failed to spawn: {reason}")]
    Spawn { bin: String, reason: String },
    #[error("helper call {element} timed out after {timeout_ms} ms")]
    Timeout { element: String, timeout_ms: u64 },
    #[error("helper call {element} exited with {code}: stdout={stdout:?} stderr={stderr:?}")]
    Exit {
        element: String,
        code: i32,
        stdout: String,
        stderr: String,
    },
}

#[derive(Debug, Clone)]
pub struct IpcClient {
    binary: String,
    socket: String,
    call_timeout: Duration,
}

impl IpcClient {
    pub fn new(helper: &HelperConfig, call_timeout: Duration) -> Self {
        // Empty config fields fall back to env override then the vendor
        // paths.
        let binary = if helper.binary.is_empty() {
            DEFAULT_HELPER_BIN.clone()
        } else {
            helper.binary.clone()
        };
        let socket = if helper.socket.is_empty() {
            DEFAULT_HELPER_SOCKET.clone()
        } else {
            helper.socket.clone()
        };
        Self {
            binary,
            socket,
            call_timeout,
        }
    }

    /// Invoke the binary with `[socket, element, payload]` and a deadline.
    pub async fn send(&self, element: &str, payload: serde_json::Value) -> Result<String> {
        let body = payload.to_string();
        debug!(element, body, "helper call");
        let run = Command::new(&self.binary)
            .arg(&self.socket)
            .arg(element)
            .arg(&body)
            .kill_on_drop(true)
            .output();
        let output = match timeout(self.call_timeout, run).await {
            Ok(res) => res.map_err(|e| HelperError::Spawn {
                bin: self.binary.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                return Err(HelperError::Timeout {
                    element: element.to_string(),
                    timeout_ms: self.call_timeout.as_millis() as u64,
                }
                .into());
            },
        };
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(HelperError::Exit {
                element: element.to_string(),
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        Ok(stdout)
    }

    pub async fn start_video(&self, password: &str) -> Result<()> {
        self.send("video", json!({"cmd": "start", "password": password}))
            .await?;
        Ok(())
    }

    pub async fn stop_video(&self) -> Result<()> {
        self.send("video", json!({"cmd": "stop"})).await?;
        Ok(())
    }

    pub async fn play_sound(&self, sound_id: u32) -> Result<()> {
        self.send("audio", json!({"cmd": "play", "sid": sound_id}))
            .await?;
        Ok(())
    }

    pub async fn beep(&self) -> Result<()> {
        self.send("audio", json!({"cmd": "beep"})).await?;
        Ok(())
    }
}
