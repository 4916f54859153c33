// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Topic payload decoders. Per contract they yield `Ok(None)` on payloads
//! shorter than their minimum instead of failing, so a glitchy publisher
//! only costs one cached update, not the whole session.

use anyhow::Result;

use crate::{
    codecs::{
        pose::{Pose, read_headered_pose},
        stats::{SessionStats, SessionStatsRecord},
    },
    transport::cursor::{Cursor, ShortBuffer},
};
use zerocopy::FromBytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryState {
    /// Percentage 0–100.
    pub level: u8,
    pub low_voltage_shutoff: bool,
}

pub fn decode_battery(body: &[u8]) -> Result<Option<BatteryState>> {
    if body.len() < 2 {
        return Ok(None);
    }
    Ok(Some(BatteryState {
        level: body[0],
        low_voltage_shutoff: body[1] != 0,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeState {
    pub on_charger: bool,
    pub state: u8,
}

pub fn decode_charge_state(body: &[u8]) -> Result<Option<ChargeState>> {
    if body.len() < 2 {
        return Ok(None);
    }
    Ok(Some(ChargeState {
        on_charger: body[0] != 0,
        state: body[1],
    }))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkState {
    pub work_type: u8,
    pub state: u8,
    pub cause: u8,
    pub poses: Vec<Pose>,
}

pub fn decode_work_state(body: &[u8]) -> Result<Option<WorkState>> {
    let mut cur = Cursor::new(body);
    let parsed = (|| -> Result<WorkState, ShortBuffer> {
        let work_type = cur.read_u8()?;
        let state = cur.read_u8()?;

        // Five arrays the cache does not surface: clean ids, dot pairs,
        // cycles, clean states, extra ids.
        skip_array(&mut cur, 1)?;
        skip_array(&mut cur, 8)?;
        skip_array(&mut cur, 1)?;
        skip_array(&mut cur, 1)?;
        skip_array(&mut cur, 1)?;

        let pose_count = cur.read_u32_le()? as usize;
        let mut poses = Vec::with_capacity(pose_count.min(64));
        for _ in 0..pose_count {
            poses.push(read_headered_pose(&mut cur)?);
        }

        // Remote-move block.
        cur.take(7)?;
        skip_array(&mut cur, 1)?;
        let cause = cur.read_u8()?;

        Ok(WorkState {
            work_type,
            state,
            cause,
            poses,
        })
    })();
    Ok(parsed.ok())
}

fn skip_array(cur: &mut Cursor<'_>, elem_size: usize) -> Result<(), ShortBuffer> {
    let count = cur.read_u32_le()? as usize;
    cur.take(count * elem_size)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub kind: u8,
    pub state: u8,
}

/// Only entries whose state is 1 (triggered) are surfaced.
pub fn decode_alerts(body: &[u8]) -> Result<Option<Vec<Alert>>> {
    let mut cur = Cursor::new(body);
    let parsed = (|| -> Result<Vec<Alert>, ShortBuffer> {
        let count = cur.read_u32_le()? as usize;
        let mut alerts = Vec::new();
        for _ in 0..count {
            let kind = cur.read_u8()?;
            let state = cur.read_u8()?;
            if state == 1 {
                alerts.push(Alert { kind, state });
            }
        }
        Ok(alerts)
    })();
    Ok(parsed.ok())
}

/// The work-statistic topic carries the same record as the last-session
/// stats service.
pub fn decode_work_statistic(body: &[u8]) -> Result<Option<SessionStats>> {
    Ok(SessionStatsRecord::ref_from_prefix(body)
        .ok()
        .map(|(record, _rest)| record.into()))
}
