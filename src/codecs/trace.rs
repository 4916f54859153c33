// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

pub const OP_GET_BETWEEN: u8 = 0;
pub const OP_GET_INFO: u8 = 1;

/// End indices at or above this mark a trace that is being reset; the
/// reply carries no usable data then.
const RESET_SENTINEL: u32 = 0xFFFF_FFFF - 0x10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceInfo {
    pub map_id: u32,
    pub trace_id: u32,
    pub total_points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    pub map_id: u32,
    pub trace_id: u32,
    pub start: u32,
    pub end: u32,
    pub data: Bytes,
}

pub fn encode_info_request() -> Bytes {
    Bytes::from_static(&[OP_GET_INFO])
}

pub fn decode_info_reply(body: &[u8]) -> Result<TraceInfo> {
    let mut cur = Cursor::new(body);
    let _status = cur.read_u8()?;
    Ok(TraceInfo {
        map_id: cur.read_u32_le()?,
        trace_id: cur.read_u32_le()?,
        total_points: cur.read_u32_le()?,
    })
}

pub fn encode_between_request(map_id: u32, trace_id: u32, start: u32, end: u32) -> Bytes {
    let mut out = BytesMut::with_capacity(17);
    out.put_u8(OP_GET_BETWEEN);
    out.put_u32_le(map_id);
    out.put_u32_le(trace_id);
    out.put_u32_le(start);
    out.put_u32_le(end);
    out.freeze()
}

/// `None` when the trace is under reset (end index at the sentinel).
pub fn decode_between_reply(body: &[u8]) -> Result<Option<TraceData>> {
    let mut cur = Cursor::new(body);
    let _status = cur.read_u8()?;
    let map_id = cur.read_u32_le()?;
    let trace_id = cur.read_u32_le()?;
    let start = cur.read_u32_le()?;
    let end = cur.read_u32_le()?;
    if end >= RESET_SENTINEL {
        return Ok(None);
    }
    let data = cur.read_len_prefixed()?;
    Ok(Some(TraceData {
        map_id,
        trace_id,
        start,
        end,
        data: Bytes::copy_from_slice(data),
    }))
}
