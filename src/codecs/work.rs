// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::{BufMut, Bytes, BytesMut};

/// Manage-type code points for the work service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkOp {
    Start = 1,
    Pause = 2,
    Resume = 3,
    Stop = 4,
    Dock = 5,
    CollectDirt = 6,
}

/// What kind of run a Start refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkKind {
    Auto = 1,
    Area = 2,
    Custom = 3,
    Remote = 4,
}

/// The 7-byte remote-move block present in every work request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RemoteMove {
    pub move_type: u8,
    pub last_time: u16,
    pub velocity: i16,
    pub angular_velocity: i16,
}

#[derive(Debug, Clone, Default)]
pub struct WorkRequest {
    pub clean_ids: Vec<u8>,
    pub custom_areas: Vec<(f32, f32)>,
    pub remote: RemoteMove,
}

/// Work-manage body: op, kind, then the fixed array train. Cycles,
/// clean-states, extra-ids, extra-poses and extra-states are always sent
/// empty; the firmware fills them on the topic side only.
pub fn encode_work_request(op: WorkOp, kind: WorkKind, req: &WorkRequest) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(op as u8);
    out.put_u8(kind as u8);

    out.put_u32_le(req.clean_ids.len() as u32);
    out.put_slice(&req.clean_ids);

    out.put_u32_le(req.custom_areas.len() as u32);
    for (x, y) in &req.custom_areas {
        out.put_f32_le(*x);
        out.put_f32_le(*y);
    }

    // cycles, clean-states, extra-ids
    out.put_u32_le(0);
    out.put_u32_le(0);
    out.put_u32_le(0);
    // extra-pose count
    out.put_u32_le(0);

    out.put_u8(req.remote.move_type);
    out.put_u16_le(req.remote.last_time);
    out.put_i16_le(req.remote.velocity);
    out.put_i16_le(req.remote.angular_velocity);

    // extra-states
    out.put_u32_le(0);

    out.freeze()
}
