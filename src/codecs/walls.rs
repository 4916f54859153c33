// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Result, ensure};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

/// Manage-type code points for the virtual-wall service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WallOp {
    Get = 0,
    Add = 1,
    Delete = 2,
}

/// Keep-out region kinds. `MopOnly` doubles as the no-mop-zone type.
pub const WALL_KIND_NORMAL: u8 = 0;
pub const WALL_KIND_MOP_ONLY: u8 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualWall {
    pub id: u32,
    pub kind: u8,
    pub dots: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallReply {
    pub status: u8,
    pub map_id: u32,
    pub walls: Vec<VirtualWall>,
}

pub fn encode_wall_request(
    op: WallOp,
    map_id: u32,
    wall_id: u32,
    walls: &[VirtualWall],
) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(op as u8);
    out.put_u32_le(map_id);
    out.put_u32_le(wall_id);
    out.put_u32_le(walls.len() as u32);
    for wall in walls {
        put_wall(&mut out, wall);
    }
    out.freeze()
}

pub fn decode_wall_reply(body: &[u8]) -> Result<WallReply> {
    let mut cur = Cursor::new(body);
    let status = cur.read_u8()?;
    let map_id = cur.read_u32_le()?;
    let count = cur.read_u32_le()? as usize;
    ensure!(count <= 256, "wall reply claims {count} walls");
    let mut walls = Vec::with_capacity(count);
    for _ in 0..count {
        walls.push(read_wall(&mut cur)?);
    }
    Ok(WallReply {
        status,
        map_id,
        walls,
    })
}

/// Fixture/round-trip encoder for the reply shape.
pub fn encode_wall_reply(reply: &WallReply) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(reply.status);
    out.put_u32_le(reply.map_id);
    out.put_u32_le(reply.walls.len() as u32);
    for wall in &reply.walls {
        put_wall(&mut out, wall);
    }
    out.freeze()
}

fn put_wall(out: &mut BytesMut, wall: &VirtualWall) {
    out.put_u32_le(wall.id);
    out.put_u8(wall.kind);
    out.put_u32_le(wall.dots.len() as u32);
    for (x, y) in &wall.dots {
        out.put_f32_le(*x);
        out.put_f32_le(*y);
    }
}

fn read_wall(cur: &mut Cursor<'_>) -> Result<VirtualWall> {
    let id = cur.read_u32_le()?;
    let kind = cur.read_u8()?;
    let dots = cur.read_u32_le()? as usize;
    ensure!(dots <= 1024, "wall claims {dots} dots");
    let mut points = Vec::with_capacity(dots);
    for _ in 0..dots {
        points.push((cur.read_f32_le()?, cur.read_f32_le()?));
    }
    Ok(VirtualWall {
        id,
        kind,
        dots: points,
    })
}

/// Four corner dots for an axis-aligned rectangle, the shape the app-side
/// "add rectangle" verbs produce.
pub fn rect_dots(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(f32, f32)> {
    vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
}
