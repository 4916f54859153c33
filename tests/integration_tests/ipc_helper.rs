// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The helper collaborator shells out to a binary; ordinary coreutils make
//! serviceable stand-ins for the vendor tool.

use std::time::Duration;

use anyhow::Result;
use mds_client_rs::{cfg::config::HelperConfig, ipc::IpcClient};
use serde_json::json;

fn helper(binary: &str, timeout_ms: u64) -> IpcClient {
    let cfg = HelperConfig {
        binary: binary.to_string(),
        socket: "/tmp/mds_cmd.sock".to_string(),
    };
    IpcClient::new(&cfg, Duration::from_millis(timeout_ms))
}

#[tokio::test]
async fn arguments_arrive_in_order() -> Result<()> {
    let client = helper("echo", 2000);
    let stdout = client.send("video", json!({"cmd": "start"})).await?;
    // echo prints [socket, element, payload] space-separated.
    assert_eq!(stdout.trim(), "/tmp/mds_cmd.sock video {\"cmd\":\"start\"}");
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_surfaces_the_streams() {
    let client = helper("false", 2000);
    let err = client
        .send("video", json!({"cmd": "stop"}))
        .await
        .expect_err("false exits 1");
    let text = format!("{err:#}");
    assert!(text.contains("exited with 1"), "got: {text}");
}

#[tokio::test]
async fn spawn_failure_is_reported() {
    let client = helper("/nonexistent/mdsctl", 2000);
    let err = client
        .send("audio", json!({"cmd": "beep"}))
        .await
        .expect_err("no such binary");
    assert!(format!("{err:#}").contains("failed to spawn"));
}
