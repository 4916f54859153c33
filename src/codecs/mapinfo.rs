// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, ensure};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

pub const GET_MULTI_MAPINFOS: u8 = 0;

/// One stored floor plan. Map id zero means "no active map".
#[derive(Debug, Clone, PartialEq)]
pub struct MapInfo {
    pub map_id: u32,
    pub extra_id: u32,
    pub active: bool,
    pub slot: u8,
    pub recent: bool,
    pub name: String,
}

pub fn encode_mapinfos_request() -> Bytes {
    Bytes::from_static(&[GET_MULTI_MAPINFOS])
}

pub fn decode_mapinfos_reply(body: &[u8]) -> Result<Vec<MapInfo>> {
    let mut cur = Cursor::new(body);
    let parsed = (|| -> Result<Vec<MapInfo>> {
        let _status = cur.read_u8()?;
        let count = cur.read_u32_le()? as usize;
        ensure!(count <= 64, "map infos claim {count} entries");
        let mut infos = Vec::with_capacity(count);
        for _ in 0..count {
            let map_id = cur.read_u32_le()?;
            let extra_id = cur.read_u32_le()?;
            let active = cur.read_u8()? != 0;
            let slot = cur.read_u8()?;
            let recent = cur.read_u8()? != 0;
            let name = String::from_utf8_lossy(cur.read_len_prefixed()?).into_owned();
            infos.push(MapInfo {
                map_id,
                extra_id,
                active,
                slot,
                recent,
                name,
            });
        }
        Ok(infos)
    })();
    parsed.context("map infos truncated")
}

/// The first entry that is flagged active and carries a non-zero map id.
pub fn active_map(infos: &[MapInfo]) -> Option<&MapInfo> {
    infos.iter().find(|i| i.active && i.map_id != 0)
}

/// Fixture/round-trip encoder for the reply shape.
pub fn encode_mapinfos_reply(infos: &[MapInfo]) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(0);
    out.put_u32_le(infos.len() as u32);
    for info in infos {
        out.put_u32_le(info.map_id);
        out.put_u32_le(info.extra_id);
        out.put_u8(u8::from(info.active));
        out.put_u8(info.slot);
        out.put_u8(u8::from(info.recent));
        out.put_u32_le(info.name.len() as u32);
        out.put_slice(info.name.as_bytes());
    }
    out.freeze()
}
