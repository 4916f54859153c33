// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use bytes::Bytes;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U32, Unaligned};

use crate::transport::cursor::Cursor;

/// Lifetime counters: three little-endian words.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TotalStats {
    pub area_dm2: u32,
    pub time_secs: u32,
    pub sessions: u32,
}

pub fn encode_total_stats_request() -> Bytes {
    Bytes::from_static(&[0])
}

pub fn decode_total_stats_reply(body: &[u8]) -> Result<TotalStats> {
    let mut cur = Cursor::new(body);
    Ok(TotalStats {
        area_dm2: cur.read_u32_le()?,
        time_secs: cur.read_u32_le()?,
        sessions: cur.read_u32_le()?,
    })
}

/// The per-session statistic record, shared by the last-session service
/// reply and the work-statistic topic.
///
/// The firmware nominally sends a 22-byte record; the named fields cover
/// the leading 18 bytes and the decoders ignore whatever padding follows.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned,
)]
pub struct SessionStatsRecord {
    pub work_type: u8,
    pub work_time_secs: U32<LittleEndian>,
    pub area_dm2: U32<LittleEndian>,
    pub extra_area_dm2: U32<LittleEndian>,
    pub waterbox_type: u8,
    pub start_time_secs: U32<LittleEndian>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    pub work_type: u8,
    pub work_time_secs: u32,
    pub area_dm2: u32,
    pub extra_area_dm2: u32,
    pub waterbox_type: u8,
    pub start_time_secs: u32,
}

impl From<&SessionStatsRecord> for SessionStats {
    fn from(r: &SessionStatsRecord) -> Self {
        Self {
            work_type: r.work_type,
            work_time_secs: r.work_time_secs.get(),
            area_dm2: r.area_dm2.get(),
            extra_area_dm2: r.extra_area_dm2.get(),
            waterbox_type: r.waterbox_type,
            start_time_secs: r.start_time_secs.get(),
        }
    }
}

pub fn encode_last_stats_request() -> Bytes {
    Bytes::from_static(&[0])
}

pub fn decode_last_stats_reply(body: &[u8]) -> Result<SessionStats> {
    let (record, _rest) = SessionStatsRecord::ref_from_prefix(body)
        .ok()
        .context("last-session stats reply truncated")?;
    Ok(record.into())
}
