// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Room (spot-area) list codec.
//!
//! Two firmware dialects of the reply exist: one matches the upstream
//! schema, the other interleaves per-room preferences between polygons,
//! shifting every metadata offset. The decoder therefore never trusts the
//! schema offsets; it locates each polygon with a deterministic scan and
//! derives everything else from the polygon positions.

use anyhow::{Result, ensure};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::cursor::Cursor;

/// Inclusive polygon point-count bounds accepted by the scanner.
pub const MIN_POINTS: u32 = 3;
pub const MAX_POINTS: u32 = 256;
/// Robot coordinates never leave this envelope (metres × 1000 would not
/// fit a house either way).
pub const COORD_LIMIT: f32 = 20_000.0;

/// Manage-type code points for the spot-area service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SpotAreaOp {
    Get = 0,
    Merge = 1,
    Split = 2,
    SetLabel = 3,
    SetPreferences = 4,
    SetSequence = 5,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomPreferences {
    pub suction: u32,
    pub water: u32,
    pub cleaning_times: u32,
    pub sequence: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: u32,
    pub label: u8,
    pub polygon: Vec<(f32, f32)>,
    pub connections: Vec<u32>,
    pub preferences: RoomPreferences,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomList {
    pub status: u8,
    pub map_id: u32,
    pub areas_id: u32,
    pub rooms: Vec<Room>,
}

/// The 5-byte minimal GET some firmware require after a "buffer overrun"
/// on the full form.
pub fn encode_get_minimal(map_id: u32) -> Bytes {
    let mut out = BytesMut::with_capacity(5);
    out.put_u8(SpotAreaOp::Get as u8);
    out.put_u32_le(map_id);
    out.freeze()
}

/// Full manage request: op byte, map id, then the room records. GET sends
/// an empty record list; SET operations carry the rooms they touch.
pub fn encode_manage_request(op: SpotAreaOp, map_id: u32, rooms: &[Room]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    out.put_u8(op as u8);
    out.put_u32_le(map_id);
    out.put_u32_le(rooms.len() as u32);
    for room in rooms {
        put_room(&mut out, room)?;
    }
    Ok(out.freeze())
}

/// Reply shape in the canonical (scanner-accepted) layout; also the fixture
/// builder for the parser tests.
pub fn encode_rooms_reply(list: &RoomList) -> Result<Bytes> {
    let mut out = BytesMut::new();
    out.put_u8(list.status);
    out.put_u32_le(list.map_id);
    out.put_u32_le(list.areas_id);
    out.put_u32_le(list.rooms.len() as u32);
    for room in &list.rooms {
        put_room(&mut out, room)?;
    }
    Ok(out.freeze())
}

/// One canonical room record: label, areaid, the zeroed name/type slot the
/// scanner keys on, polygon, then connections and preferences.
fn put_room(out: &mut BytesMut, room: &Room) -> Result<()> {
    ensure!(room.id <= 0xFF, "room id {} does not fit the wire format", room.id);
    out.put_u8(room.label);
    out.put_u32_le(room.id);
    out.put_slice(&[0u8; 5]);
    out.put_u32_le(room.polygon.len() as u32);
    for (x, y) in &room.polygon {
        out.put_f32_le(*x);
        out.put_f32_le(*y);
    }
    out.put_u32_le(room.connections.len() as u32);
    for conn in &room.connections {
        out.put_u32_le(*conn);
    }
    out.put_u32_le(room.preferences.suction);
    out.put_u32_le(room.preferences.water);
    out.put_u32_le(room.preferences.cleaning_times);
    out.put_u8(room.preferences.sequence);
    Ok(())
}

pub fn decode_rooms_reply(body: &[u8]) -> Result<RoomList> {
    let mut cur = Cursor::new(body);
    let status = cur.read_u8()?;
    let map_id = cur.read_u32_le()?;
    let areas_id = cur.read_u32_le()?;
    let count = cur.read_u32_le()? as usize;
    ensure!(count <= 128, "room list claims {count} rooms");

    // First pass: polygon origins, each scanned forward from the end of the
    // previous polygon.
    let mut origins = Vec::with_capacity(count);
    let mut ends = Vec::with_capacity(count);
    let mut search_from = cur.offset();
    for n in 0..count {
        let origin = scan_polygon(body, search_from)
            .ok_or_else(|| anyhow::anyhow!("room {n}: no polygon found after offset {search_from}"))?;
        let points = point_count(body, origin);
        let end = origin + 4 + points as usize * 8;
        origins.push(origin);
        ends.push(end);
        search_from = end;
    }

    // Second pass: metadata sits just before each polygon, preferences in
    // the gap after it (the tail for the last room).
    let mut rooms = Vec::with_capacity(count);
    for n in 0..count {
        let origin = origins[n];
        let id = u32::from_le_bytes([
            body[origin - 9],
            body[origin - 8],
            body[origin - 7],
            body[origin - 6],
        ]);
        let label = body[origin - 10];

        let points = point_count(body, origin) as usize;
        let mut pcur = Cursor::new(&body[origin + 4..]);
        let mut polygon = Vec::with_capacity(points);
        for _ in 0..points {
            polygon.push((pcur.read_f32_le()?, pcur.read_f32_le()?));
        }

        let gap_end = if n + 1 < count {
            // The next room's metadata (label + areaid + zero slot) is not
            // part of this room's gap.
            origins[n + 1] - 10
        } else {
            body.len()
        };
        let gap = &body[ends[n]..gap_end.max(ends[n])];
        let (connections, preferences) = decode_gap(gap);

        rooms.push(Room {
            id,
            label,
            polygon,
            connections,
            preferences,
        });
    }

    Ok(RoomList {
        status,
        map_id,
        areas_id,
        rooms,
    })
}

fn point_count(body: &[u8], origin: usize) -> u32 {
    u32::from_le_bytes([
        body[origin],
        body[origin + 1],
        body[origin + 2],
        body[origin + 3],
    ])
}

/// Find the next polygon origin at or after `from`: a little-endian point
/// count in [MIN_POINTS, MAX_POINTS] whose preceding 8 bytes are zero (the
/// upstream schema's name length and type low bytes) and whose points all
/// decode to plausible coordinates. Ten bytes of metadata (label + areaid +
/// zero slot) must fit before it.
fn scan_polygon(body: &[u8], from: usize) -> Option<usize> {
    let first = from.checked_add(10)?;
    if body.len() < 4 {
        return None;
    }
    for origin in first..=body.len() - 4 {
        let count = point_count(body, origin);
        if !(MIN_POINTS..=MAX_POINTS).contains(&count) {
            continue;
        }
        if body[origin - 8..origin].iter().any(|b| *b != 0) {
            continue;
        }
        let end = origin + 4 + count as usize * 8;
        if end > body.len() {
            continue;
        }
        if !points_plausible(&body[origin + 4..end]) {
            continue;
        }
        return Some(origin);
    }
    None
}

fn points_plausible(raw: &[u8]) -> bool {
    raw.chunks_exact(4).all(|c| {
        let v = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
        v.is_finite() && v.abs() <= COORD_LIMIT
    })
}

/// Decode connections + preference words from the bytes between two
/// polygons. Firmware that omit them (or pad the gap) degrade to defaults
/// rather than failing the whole reply.
fn decode_gap(gap: &[u8]) -> (Vec<u32>, RoomPreferences) {
    let mut cur = Cursor::new(gap);
    let mut connections = Vec::new();
    let mut prefs = RoomPreferences::default();

    let Ok(conn_count) = cur.read_u32_le() else {
        return (connections, prefs);
    };
    if conn_count > 64 || cur.remaining() < conn_count as usize * 4 {
        return (connections, prefs);
    }
    for _ in 0..conn_count {
        match cur.read_u32_le() {
            Ok(id) => connections.push(id),
            Err(_) => return (connections, prefs),
        }
    }

    if let (Ok(suction), Ok(water), Ok(times), Ok(sequence)) = (
        cur.read_u32_le(),
        cur.read_u32_le(),
        cur.read_u32_le(),
        cur.read_u8(),
    ) {
        prefs = RoomPreferences {
            suction,
            water,
            cleaning_times: times,
            sequence,
        };
    }
    (connections, prefs)
}

/// Sanity gate used by callers that address a single room.
pub fn find_room<'a>(list: &'a RoomList, room_id: u32) -> Option<&'a Room> {
    list.rooms.iter().find(|r| r.id == room_id)
}

/// A helper the facade uses to build a one-room record carrying only the
/// fields an operation cares about.
pub fn room_stub(id: u32) -> Room {
    Room {
        id,
        label: 0,
        polygon: Vec::new(),
        connections: Vec::new(),
        preferences: RoomPreferences::default(),
    }
}
