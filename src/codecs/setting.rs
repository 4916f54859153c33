// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Setting-manage codec.
//!
//! The reply is a mixed-shape record whose early fields are stable across
//! firmware, while a few setting kinds carry their authoritative value at
//! positions counted from the END of the body. Those tail offsets live in
//! exactly one table here; out-of-range tail indices mean "value
//! unavailable", never an error, because minor firmware versions disagree
//! on the record length.

use anyhow::{Context, Result};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

pub const MANAGE_GET: u8 = 0;
pub const MANAGE_SET: u8 = 1;

/// Every setting the facade can read or write, with its wire code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SettingKind {
    WaterLevel = 1,
    FanMode = 2,
    FanSilent = 3,
    CarpetTurbo = 4,
    AutoCollect = 5,
    RoomPreferences = 6,
    CleaningTimes = 7,
}

impl SettingKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Offset from the end of the body where this kind's authoritative
    /// value sits, when it has one.
    pub fn tail_offset(self) -> Option<usize> {
        match self {
            SettingKind::CleaningTimes => Some(1),
            SettingKind::RoomPreferences => Some(2),
            SettingKind::AutoCollect => Some(3),
            _ => None,
        }
    }
}

/// Fields the request encoder can set. Everything else in the body is
/// zero-fill per the observed traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingRequest {
    pub manage_type: u8,
    pub setting_type: u8,
    pub custom_type: u8,
    pub custom_value: u8,
    pub water_level: u8,
    pub fan_mode: u8,
    pub fan_silent: u8,
}

/// Body layout: 24-byte fixed prefix (manage/setting/custom pair at 0..4,
/// water at 20, fan at 21, silent at 22), a zeroed ai-values block (4-byte
/// length + 5 bytes), 10 reserved bytes, 2 bytes padding.
pub fn encode_setting_request(req: &SettingRequest) -> Bytes {
    let mut out = BytesMut::with_capacity(45);
    out.put_u8(req.manage_type);
    out.put_u8(req.setting_type);
    out.put_u8(req.custom_type);
    out.put_u8(req.custom_value);
    out.put_slice(&[0u8; 16]);
    out.put_u8(req.water_level);
    out.put_u8(req.fan_mode);
    out.put_u8(req.fan_silent);
    out.put_u8(0);
    out.put_u32_le(5);
    out.put_slice(&[0u8; 5]);
    out.put_slice(&[0u8; 10]);
    out.put_slice(&[0u8; 2]);
    out.freeze()
}

/// Patch the kind-specific value into its tail position. No-op for kinds
/// without a tail slot.
pub fn apply_tail_override(body: &mut BytesMut, kind: SettingKind, value: u8) {
    if let Some(offset) = kind.tail_offset()
        && let Some(index) = body.len().checked_sub(offset)
    {
        body[index] = value;
    }
}

/// Request with the tail override already applied; the common path for
/// SET verbs on tail-addressed kinds.
pub fn encode_setting_request_with_tail(req: &SettingRequest, kind: SettingKind, value: u8) -> Bytes {
    let mut body = BytesMut::from(encode_setting_request(req).as_ref());
    apply_tail_override(&mut body, kind, value);
    body.freeze()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingReply {
    pub status: u8,
    pub setting_type: u8,
    pub custom_type: u8,
    pub custom_value: u8,
    pub water_level: u8,
    pub fan_mode: u8,
    pub fan_silent: u8,
    pub ai_on: u8,
    pub ai_values: Vec<u8>,
    /// Whole body, kept for tail lookups.
    raw: Bytes,
}

impl SettingReply {
    /// The authoritative value for a tail-addressed kind, when the body is
    /// long enough to carry it. This is the only decode path for those
    /// kinds; they have no positional field.
    pub fn tail_value(&self, kind: SettingKind) -> Option<u8> {
        tail_value(&self.raw, kind)
    }

    pub fn auto_collect(&self) -> Option<u8> {
        self.tail_value(SettingKind::AutoCollect)
    }

    pub fn room_preferences(&self) -> Option<u8> {
        self.tail_value(SettingKind::RoomPreferences)
    }

    pub fn cleaning_times(&self) -> Option<u8> {
        self.tail_value(SettingKind::CleaningTimes)
    }
}

pub fn tail_value(body: &[u8], kind: SettingKind) -> Option<u8> {
    let offset = kind.tail_offset()?;
    body.len().checked_sub(offset).map(|i| body[i])
}

/// Decode the reply. The first 23 bytes are required; later fields vary
/// between firmware minors and degrade to zero/empty when absent.
pub fn decode_setting_reply(body: &[u8]) -> Result<SettingReply> {
    let mut cur = Cursor::new(body);
    let status = cur.read_u8().context("setting reply truncated")?;
    let setting_type = cur.read_u8()?;
    let custom_type = cur.read_u8()?;
    let custom_value = cur.read_u8()?;
    cur.take(16)?;
    let water_level = cur.read_u8()?;
    let fan_mode = cur.read_u8()?;
    let fan_silent = cur.read_u8()?;

    let ai_on = cur.read_u8().unwrap_or(0);
    let ai_values = cur
        .read_len_prefixed()
        .map(<[u8]>::to_vec)
        .unwrap_or_default();

    Ok(SettingReply {
        status,
        setting_type,
        custom_type,
        custom_value,
        water_level,
        fan_mode,
        fan_silent,
        ai_on,
        ai_values,
        raw: Bytes::copy_from_slice(body),
    })
}
