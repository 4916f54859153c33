// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Result, ensure};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

pub const LIFESPAN_GET: u8 = 0;
pub const LIFESPAN_RESET: u8 = 1;

/// Consumable parts the lifespan service tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifespanPart {
    MainBrush = 0,
    SideBrush = 1,
    HepaFilter = 2,
    All = 3,
}

/// Remaining vs total life, one word per tracked part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lifespan {
    pub life: Vec<u32>,
    pub total: Vec<u32>,
}

pub fn encode_lifespan_request(op: u8, part: LifespanPart) -> Bytes {
    let mut out = BytesMut::with_capacity(2);
    out.put_u8(op);
    out.put_u8(part as u8);
    out.freeze()
}

pub fn decode_lifespan_reply(body: &[u8]) -> Result<Lifespan> {
    let mut cur = Cursor::new(body);
    let _status = cur.read_u8()?;
    let life_count = cur.read_u32_le()? as usize;
    ensure!(life_count <= 16, "lifespan reply claims {life_count} parts");
    let mut life = Vec::with_capacity(life_count);
    for _ in 0..life_count {
        life.push(cur.read_u32_le()?);
    }
    let total_count = cur.read_u32_le()? as usize;
    ensure!(total_count <= 16, "lifespan reply claims {total_count} totals");
    let mut total = Vec::with_capacity(total_count);
    for _ in 0..total_count {
        total.push(cur.read_u32_le()?);
    }
    Ok(Lifespan { life, total })
}
