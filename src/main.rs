// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Context, Result};
use mds_client_rs::{
    cfg::{cli::config_path_from_env, config::Config, logger::init_logger},
    robot::Robot,
};
use tokio::time::sleep;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _init_logger = init_logger("tests/config_logger.yaml")?;

    let cfg = config_path_from_env("tests/config.yaml")
        .and_then(Config::load_from_file)
        .unwrap_or_else(|_| Config::default());
    cfg.validate().context("invalid configuration")?;

    let robot = Robot::new(cfg)?;
    robot.start().await;
    info!("subscribers started, waiting for first messages");

    // Give the workers a moment to resolve and cache something.
    sleep(Duration::from_secs(3)).await;

    match robot.get_active_map_id().await {
        Ok(Some(map_id)) => info!(map_id, "active map"),
        Ok(None) => info!("no active map"),
        Err(e) => info!("active map lookup failed: {e:#}"),
    }

    if let Some(battery) = robot.battery(Some(Duration::from_secs(60))) {
        info!(level = battery.level, "battery");
    }
    if let Some(charge) = robot.charge_state(Some(Duration::from_secs(60))) {
        info!(on_charger = charge.on_charger, state = charge.state, "charge state");
    }

    robot.shutdown().await;
    Ok(())
}
