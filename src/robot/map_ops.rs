// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Map, room and virtual-wall verbs.

use anyhow::Result;
use tracing::debug;

use crate::{
    codecs::{
        map::{self, CompressedMap},
        mapinfo,
        rooms::{self, Room, RoomList, RoomPreferences, SpotAreaOp},
        walls::{self, VirtualWall, WALL_KIND_MOP_ONLY, WALL_KIND_NORMAL, WallOp},
    },
    robot::{DomainError, Robot, names},
};

impl Robot {
    /// Map id of the active floor plan, or `None` when no map is active.
    pub async fn get_active_map_id(&self) -> Result<Option<u32>> {
        let body = self
            .call(names::MULTI_MAP_INFOS, mapinfo::encode_mapinfos_request())
            .await?;
        let infos = mapinfo::decode_mapinfos_reply(&body)?;
        Ok(mapinfo::active_map(&infos).map(|i| i.map_id))
    }

    /// Precondition gate for every operation that names a map id.
    pub(crate) async fn require_active_map(&self) -> Result<u32> {
        self.get_active_map_id()
            .await?
            .ok_or_else(|| DomainError::ActiveMapNotInitialised.into())
    }

    pub async fn get_compressed_map(&self) -> Result<CompressedMap> {
        let map_id = self.require_active_map().await?;
        let body = self
            .call(names::MAP_DATA, map::encode_map_request(map_id))
            .await?;
        map::decode_map_reply(&body)
    }

    /// Rooms of the active map, with labels, polygons, preferences and
    /// connections.
    ///
    /// Some firmware choke on the full GET body; when the error text says
    /// so ("buffer overrun" / "broken pipe"), the call is retried once
    /// with the 5-byte minimal form.
    pub async fn get_rooms(&self) -> Result<RoomList> {
        let map_id = self.require_active_map().await?;
        let full = rooms::encode_manage_request(SpotAreaOp::Get, map_id, &[])?;
        let body = match self.call(names::SPOT_AREA, full).await {
            Ok(body) => body,
            Err(e) => {
                let text = format!("{e:#}").to_lowercase();
                if text.contains("buffer overrun") || text.contains("broken pipe") {
                    debug!("rooms GET falling back to the minimal form: {e:#}");
                    self.call(names::SPOT_AREA, rooms::encode_get_minimal(map_id))
                        .await?
                } else {
                    return Err(e);
                }
            },
        };
        rooms::decode_rooms_reply(&body)
    }

    async fn room_checked(&self, room_id: u32) -> Result<Room> {
        let list = self.get_rooms().await?;
        rooms::find_room(&list, room_id)
            .cloned()
            .ok_or_else(|| DomainError::InvalidRoomId(room_id).into())
    }

    pub async fn set_room_label(&self, room_id: u32, label: u8) -> Result<()> {
        let map_id = self.require_active_map().await?;
        let mut room = rooms::room_stub(room_id);
        room.label = label;
        self.call(
            names::SPOT_AREA,
            rooms::encode_manage_request(SpotAreaOp::SetLabel, map_id, &[room])?,
        )
        .await?;
        Ok(())
    }

    pub async fn merge_rooms(&self, first: u32, second: u32) -> Result<()> {
        if first == second {
            return Err(DomainError::SameRoomMerge(first).into());
        }
        let map_id = self.require_active_map().await?;
        self.call(
            names::SPOT_AREA,
            rooms::encode_manage_request(
                SpotAreaOp::Merge,
                map_id,
                &[rooms::room_stub(first), rooms::room_stub(second)],
            )?,
        )
        .await?;
        Ok(())
    }

    /// Split a room along a line given in robot coordinates.
    pub async fn split_room(
        &self,
        room_id: u32,
        line: ((f32, f32), (f32, f32)),
    ) -> Result<()> {
        let map_id = self.require_active_map().await?;
        let mut room = rooms::room_stub(room_id);
        room.polygon = vec![line.0, line.1];
        self.call(
            names::SPOT_AREA,
            rooms::encode_manage_request(SpotAreaOp::Split, map_id, &[room])?,
        )
        .await?;
        Ok(())
    }

    pub async fn get_room_preferences(&self, room_id: u32) -> Result<RoomPreferences> {
        Ok(self.room_checked(room_id).await?.preferences)
    }

    pub async fn set_room_preferences(
        &self,
        room_id: u32,
        preferences: RoomPreferences,
    ) -> Result<()> {
        let map_id = self.require_active_map().await?;
        let mut room = self.room_checked(room_id).await?;
        room.preferences = preferences;
        self.call(
            names::SPOT_AREA,
            rooms::encode_manage_request(SpotAreaOp::SetPreferences, map_id, &[room])?,
        )
        .await?;
        Ok(())
    }

    /// Set the cleaning order: position in `order` becomes the sequence
    /// number of that room.
    pub async fn set_cleaning_sequence(&self, order: &[u32]) -> Result<()> {
        let map_id = self.require_active_map().await?;
        let records = order
            .iter()
            .enumerate()
            .map(|(position, room_id)| {
                let mut room = rooms::room_stub(*room_id);
                room.preferences.sequence = position as u8;
                room
            })
            .collect::<Vec<_>>();
        self.call(
            names::SPOT_AREA,
            rooms::encode_manage_request(SpotAreaOp::SetSequence, map_id, &records)?,
        )
        .await?;
        Ok(())
    }

    async fn wall_list(&self) -> Result<Vec<VirtualWall>> {
        let map_id = self.require_active_map().await?;
        let body = self
            .call(
                names::VIRTUAL_WALL,
                walls::encode_wall_request(WallOp::Get, map_id, 0, &[]),
            )
            .await?;
        Ok(walls::decode_wall_reply(&body)?.walls)
    }

    pub async fn get_virtual_walls(&self) -> Result<Vec<VirtualWall>> {
        Ok(self
            .wall_list()
            .await?
            .into_iter()
            .filter(|w| w.kind == WALL_KIND_NORMAL)
            .collect())
    }

    pub async fn get_no_mop_zones(&self) -> Result<Vec<VirtualWall>> {
        Ok(self
            .wall_list()
            .await?
            .into_iter()
            .filter(|w| w.kind == WALL_KIND_MOP_ONLY)
            .collect())
    }

    async fn add_wall(&self, kind: u8, dots: Vec<(f32, f32)>) -> Result<()> {
        let map_id = self.require_active_map().await?;
        let wall = VirtualWall { id: 0, kind, dots };
        self.call(
            names::VIRTUAL_WALL,
            walls::encode_wall_request(WallOp::Add, map_id, 0, &[wall]),
        )
        .await?;
        Ok(())
    }

    pub async fn add_virtual_wall(&self, dots: Vec<(f32, f32)>) -> Result<()> {
        self.add_wall(WALL_KIND_NORMAL, dots).await
    }

    pub async fn add_virtual_wall_rect(
        &self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) -> Result<()> {
        self.add_wall(WALL_KIND_NORMAL, walls::rect_dots(x0, y0, x1, y1))
            .await
    }

    pub async fn add_no_mop_zone(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<()> {
        self.add_wall(WALL_KIND_MOP_ONLY, walls::rect_dots(x0, y0, x1, y1))
            .await
    }

    pub async fn delete_virtual_wall(&self, wall_id: u32) -> Result<()> {
        let map_id = self.require_active_map().await?;
        self.call(
            names::VIRTUAL_WALL,
            walls::encode_wall_request(WallOp::Delete, map_id, wall_id, &[]),
        )
        .await?;
        Ok(())
    }
}
