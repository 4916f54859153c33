// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Settings, consumables, traces and statistics verbs.

use anyhow::Result;

use crate::{
    codecs::{
        lifespan::{self, Lifespan, LifespanPart},
        setting::{
            self, MANAGE_GET, MANAGE_SET, SettingKind, SettingReply, SettingRequest,
        },
        stats::{self, SessionStats, TotalStats},
        trace::{self, TraceData},
    },
    robot::{Robot, names},
};

impl Robot {
    async fn setting_get(&self, kind: SettingKind) -> Result<SettingReply> {
        let req = SettingRequest {
            manage_type: MANAGE_GET,
            setting_type: kind.code(),
            ..SettingRequest::default()
        };
        let body = self
            .call(names::SETTING_MANAGE, setting::encode_setting_request(&req))
            .await?;
        setting::decode_setting_reply(&body)
    }

    async fn setting_set(&self, req: &SettingRequest) -> Result<()> {
        self.call(names::SETTING_MANAGE, setting::encode_setting_request(req))
            .await?;
        Ok(())
    }

    /// SET for a kind whose authoritative value lives at a tail offset.
    async fn setting_set_tail(&self, kind: SettingKind, value: u8) -> Result<()> {
        let req = SettingRequest {
            manage_type: MANAGE_SET,
            setting_type: kind.code(),
            ..SettingRequest::default()
        };
        self.call(
            names::SETTING_MANAGE,
            setting::encode_setting_request_with_tail(&req, kind, value),
        )
        .await?;
        Ok(())
    }

    /// Fan level plus the silent-mode flag.
    pub async fn get_fan(&self) -> Result<(u8, bool)> {
        let reply = self.setting_get(SettingKind::FanMode).await?;
        Ok((reply.fan_mode, reply.fan_silent != 0))
    }

    pub async fn set_fan(&self, level: u8, silent: bool) -> Result<()> {
        self.setting_set(&SettingRequest {
            manage_type: MANAGE_SET,
            setting_type: SettingKind::FanMode.code(),
            fan_mode: level,
            fan_silent: u8::from(silent),
            ..SettingRequest::default()
        })
        .await
    }

    pub async fn get_water_level(&self) -> Result<u8> {
        Ok(self.setting_get(SettingKind::WaterLevel).await?.water_level)
    }

    pub async fn set_water_level(&self, level: u8) -> Result<()> {
        self.setting_set(&SettingRequest {
            manage_type: MANAGE_SET,
            setting_type: SettingKind::WaterLevel.code(),
            water_level: level,
            ..SettingRequest::default()
        })
        .await
    }

    /// Suction boost when a carpet is detected.
    pub async fn get_carpet_turbo(&self) -> Result<bool> {
        let reply = self.setting_get(SettingKind::CarpetTurbo).await?;
        Ok(reply.custom_value != 0)
    }

    pub async fn set_carpet_turbo(&self, on: bool) -> Result<()> {
        self.setting_set(&SettingRequest {
            manage_type: MANAGE_SET,
            setting_type: SettingKind::CarpetTurbo.code(),
            custom_type: SettingKind::CarpetTurbo.code(),
            custom_value: u8::from(on),
            ..SettingRequest::default()
        })
        .await
    }

    /// Passes per room. `None` when this firmware's reply is too short to
    /// carry the value.
    pub async fn get_cleaning_times(&self) -> Result<Option<u8>> {
        let reply = self.setting_get(SettingKind::CleaningTimes).await?;
        Ok(reply.cleaning_times())
    }

    pub async fn set_cleaning_times(&self, passes: u8) -> Result<()> {
        self.setting_set_tail(SettingKind::CleaningTimes, passes).await
    }

    pub async fn get_room_preferences_enabled(&self) -> Result<Option<bool>> {
        let reply = self.setting_get(SettingKind::RoomPreferences).await?;
        Ok(reply.room_preferences().map(|v| v != 0))
    }

    pub async fn set_room_preferences_enabled(&self, enabled: bool) -> Result<()> {
        self.setting_set_tail(SettingKind::RoomPreferences, u8::from(enabled))
            .await
    }

    pub async fn get_auto_collect_enabled(&self) -> Result<Option<bool>> {
        let reply = self.setting_get(SettingKind::AutoCollect).await?;
        Ok(reply.auto_collect().map(|v| v != 0))
    }

    pub async fn set_auto_collect_enabled(&self, enabled: bool) -> Result<()> {
        self.setting_set_tail(SettingKind::AutoCollect, u8::from(enabled))
            .await
    }

    pub async fn get_lifespan(&self, part: LifespanPart) -> Result<Lifespan> {
        let body = self
            .call(
                names::LIFESPAN_MANAGE,
                lifespan::encode_lifespan_request(lifespan::LIFESPAN_GET, part),
            )
            .await?;
        lifespan::decode_lifespan_reply(&body)
    }

    pub async fn reset_lifespan(&self, part: LifespanPart) -> Result<()> {
        self.call(
            names::LIFESPAN_MANAGE,
            lifespan::encode_lifespan_request(lifespan::LIFESPAN_RESET, part),
        )
        .await?;
        Ok(())
    }

    /// Raw bytes of the newest `max_points` trace points, or `None` while
    /// the trace is being reset.
    pub async fn get_trace_tail(&self, max_points: u32) -> Result<Option<TraceData>> {
        let body = self
            .call(names::TRACE, trace::encode_info_request())
            .await?;
        let info = trace::decode_info_reply(&body)?;
        let end = info.total_points;
        let start = end.saturating_sub(max_points);
        let body = self
            .call(
                names::TRACE,
                trace::encode_between_request(info.map_id, info.trace_id, start, end),
            )
            .await?;
        trace::decode_between_reply(&body)
    }

    pub async fn get_total_stats(&self) -> Result<TotalStats> {
        let body = self
            .call(names::TOTAL_LOG_INFO, stats::encode_total_stats_request())
            .await?;
        stats::decode_total_stats_reply(&body)
    }

    pub async fn get_last_session_stats(&self) -> Result<SessionStats> {
        let body = self
            .call(names::LAST_LOG_INFO, stats::encode_last_stats_request())
            .await?;
        stats::decode_last_stats_reply(&body)
    }
}
