// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Cleaning-run verbs, all carried by the work-manage service.

use anyhow::Result;

use crate::{
    codecs::work::{RemoteMove, WorkKind, WorkOp, WorkRequest, encode_work_request},
    robot::{Robot, names},
};

/// Rectangle in robot coordinates for custom cleans, given by two opposite
/// corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Robot {
    async fn work(&self, op: WorkOp, kind: WorkKind, req: WorkRequest) -> Result<()> {
        self.call(names::WORK_MANAGE, encode_work_request(op, kind, &req))
            .await?;
        Ok(())
    }

    pub async fn start_auto_clean(&self) -> Result<()> {
        self.work(WorkOp::Start, WorkKind::Auto, WorkRequest::default())
            .await
    }

    pub async fn pause_clean(&self) -> Result<()> {
        self.work(WorkOp::Pause, WorkKind::Auto, WorkRequest::default())
            .await
    }

    pub async fn resume_clean(&self) -> Result<()> {
        self.work(WorkOp::Resume, WorkKind::Auto, WorkRequest::default())
            .await
    }

    pub async fn stop_clean(&self) -> Result<()> {
        self.work(WorkOp::Stop, WorkKind::Auto, WorkRequest::default())
            .await
    }

    pub async fn return_to_dock(&self) -> Result<()> {
        self.work(WorkOp::Dock, WorkKind::Auto, WorkRequest::default())
            .await
    }

    /// Send the robot to empty its dustbin into the dock.
    pub async fn trigger_auto_collect(&self) -> Result<()> {
        self.work(WorkOp::CollectDirt, WorkKind::Auto, WorkRequest::default())
            .await
    }

    /// Clean the given rooms of the active map.
    pub async fn start_area_clean(&self, room_ids: &[u8]) -> Result<()> {
        self.require_active_map().await?;
        self.work(
            WorkOp::Start,
            WorkKind::Area,
            WorkRequest {
                clean_ids: room_ids.to_vec(),
                ..WorkRequest::default()
            },
        )
        .await
    }

    /// Clean freehand rectangles; each contributes its two corner points.
    pub async fn start_custom_clean(&self, rects: &[CleanRect]) -> Result<()> {
        self.require_active_map().await?;
        let mut custom_areas = Vec::with_capacity(rects.len() * 2);
        for rect in rects {
            custom_areas.push((rect.x0, rect.y0));
            custom_areas.push((rect.x1, rect.y1));
        }
        self.work(
            WorkOp::Start,
            WorkKind::Custom,
            WorkRequest {
                custom_areas,
                ..WorkRequest::default()
            },
        )
        .await
    }

    /// One manual-drive nudge. Velocities are signed firmware units.
    pub async fn remote_move(&self, velocity: i16, angular_velocity: i16) -> Result<()> {
        self.work(
            WorkOp::Start,
            WorkKind::Remote,
            WorkRequest {
                remote: RemoteMove {
                    move_type: 1,
                    last_time: 0,
                    velocity,
                    angular_velocity,
                },
                ..WorkRequest::default()
            },
        )
        .await
    }
}
