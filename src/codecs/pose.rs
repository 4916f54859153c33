// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;

use crate::{
    codecs::header::skip_message_header,
    transport::cursor::{Cursor, ShortBuffer},
};

/// Planar pose in robot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// Read one headered pose: message preamble, then x/y/θ float32s.
pub fn read_headered_pose(cur: &mut Cursor<'_>) -> Result<Pose, ShortBuffer> {
    skip_message_header(cur)?;
    Ok(Pose {
        x: cur.read_f32_le()?,
        y: cur.read_f32_le()?,
        theta: cur.read_f32_le()?,
    })
}

/// Prediction-pose update: two headered poses plus a trailing interpolation
/// flag; the second pose is the one callers want.
pub fn decode_prediction_pose(body: &[u8]) -> Result<Option<Pose>> {
    let mut cur = Cursor::new(body);
    let parsed = (|| {
        let _first = read_headered_pose(&mut cur)?;
        let second = read_headered_pose(&mut cur)?;
        cur.read_u8()?;
        Ok::<_, ShortBuffer>(second)
    })();
    Ok(parsed.ok())
}

/// Charger-pose service reply: status, validity flag, then the dock pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargerPoseReply {
    pub status: u8,
    pub valid: bool,
    pub pose: Pose,
}

pub fn encode_charger_pose_request() -> bytes::Bytes {
    bytes::Bytes::from_static(&[0])
}

pub fn decode_charger_pose_reply(body: &[u8]) -> Result<ChargerPoseReply> {
    let mut cur = Cursor::new(body);
    let status = cur.read_u8()?;
    let valid = cur.read_u8()? != 0;
    let pose = Pose {
        x: cur.read_f32_le()?,
        y: cur.read_f32_le()?,
        theta: cur.read_f32_le()?,
    };
    Ok(ChargerPoseReply { status, valid, pose })
}
