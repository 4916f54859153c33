// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, ensure};
use bytes::{BufMut, Bytes, BytesMut};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32, Unaligned,
};

use crate::transport::cursor::Cursor;

/// Fixed-width info block at the head of a compressed-map reply.
#[repr(C)]
#[derive(Debug, Default, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct MapInfoBlock {
    pub status: u8,
    pub map_id: U32<LittleEndian>,
    pub map_width: U16<LittleEndian>,
    pub map_height: U16<LittleEndian>,
    pub columns: U16<LittleEndian>,
    pub rows: U16<LittleEndian>,
    pub sub_width: U16<LittleEndian>,
    pub sub_height: U16<LittleEndian>,
    pub resolution: U16<LittleEndian>,
    pub sub_count: U32<LittleEndian>,
}

/// One compressed tile of the occupancy grid. The crc32 travels opaquely,
/// like the handshake md5.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMap {
    pub id: u16,
    pub crc32: u32,
    pub uncompressed_len: u32,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMap {
    pub map_id: u32,
    pub map_width: u16,
    pub map_height: u16,
    pub columns: u16,
    pub rows: u16,
    pub sub_width: u16,
    pub sub_height: u16,
    pub resolution: u16,
    pub sub_maps: Vec<SubMap>,
}

pub fn encode_map_request(map_id: u32) -> Bytes {
    let mut out = BytesMut::with_capacity(5);
    out.put_u8(0);
    out.put_u32_le(map_id);
    out.freeze()
}

pub fn decode_map_reply(body: &[u8]) -> Result<CompressedMap> {
    let (info, rest) = MapInfoBlock::ref_from_prefix(body)
        .ok()
        .context("map reply shorter than its info block")?;
    let mut cur = Cursor::new(rest);
    let count = info.sub_count.get() as usize;
    ensure!(count <= 4096, "map reply claims {count} sub-maps");
    let mut sub_maps = Vec::with_capacity(count);
    for _ in 0..count {
        let id = cur.read_u16_le()?;
        let crc32 = cur.read_u32_le()?;
        let uncompressed_len = cur.read_u32_le()?;
        let data = cur.read_len_prefixed()?;
        sub_maps.push(SubMap {
            id,
            crc32,
            uncompressed_len,
            data: Bytes::copy_from_slice(data),
        });
    }
    Ok(CompressedMap {
        map_id: info.map_id.get(),
        map_width: info.map_width.get(),
        map_height: info.map_height.get(),
        columns: info.columns.get(),
        rows: info.rows.get(),
        sub_width: info.sub_width.get(),
        sub_height: info.sub_height.get(),
        resolution: info.resolution.get(),
        sub_maps,
    })
}

/// Re-encode a map reply; used to build fixtures and by the round-trip
/// tests, the firmware only ever sends this shape.
pub fn encode_map_reply(map: &CompressedMap) -> Bytes {
    let info = MapInfoBlock {
        status: 0,
        map_id: U32::new(map.map_id),
        map_width: U16::new(map.map_width),
        map_height: U16::new(map.map_height),
        columns: U16::new(map.columns),
        rows: U16::new(map.rows),
        sub_width: U16::new(map.sub_width),
        sub_height: U16::new(map.sub_height),
        resolution: U16::new(map.resolution),
        sub_count: U32::new(map.sub_maps.len() as u32),
    };
    let mut out = BytesMut::new();
    out.put_slice(info.as_bytes());
    for sub in &map.sub_maps {
        out.put_u16_le(sub.id);
        out.put_u32_le(sub.crc32);
        out.put_u32_le(sub.uncompressed_len);
        out.put_u32_le(sub.data.len() as u32);
        out.put_slice(&sub.data);
    }
    out.freeze()
}
