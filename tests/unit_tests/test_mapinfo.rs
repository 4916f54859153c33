// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::codecs::mapinfo::{
    GET_MULTI_MAPINFOS, MapInfo, active_map, decode_mapinfos_reply,
    encode_mapinfos_reply, encode_mapinfos_request,
};

fn infos() -> Vec<MapInfo> {
    vec![
        MapInfo {
            map_id: 0,
            extra_id: 0,
            active: true,
            slot: 0,
            recent: false,
            name: String::new(),
        },
        MapInfo {
            map_id: 11,
            extra_id: 4,
            active: false,
            slot: 1,
            recent: true,
            name: "upstairs".to_string(),
        },
        MapInfo {
            map_id: 7,
            extra_id: 2,
            active: true,
            slot: 2,
            recent: false,
            name: "ground floor".to_string(),
        },
    ]
}

#[test]
fn request_is_one_byte() {
    assert_eq!(encode_mapinfos_request().as_ref(), &[GET_MULTI_MAPINFOS]);
}

#[test]
fn reply_round_trips() {
    let encoded = encode_mapinfos_reply(&infos());
    let decoded = decode_mapinfos_reply(&encoded).expect("decode");
    assert_eq!(decoded, infos());
}

#[test]
fn active_map_skips_slot_zero() {
    let infos = infos();
    // The first entry is active but map id 0 means "no active map".
    let active = active_map(&infos).expect("one real active entry");
    assert_eq!(active.map_id, 7);
    assert_eq!(active.name, "ground floor");
}

#[test]
fn no_active_entry_yields_none() {
    let mut infos = infos();
    infos[2].active = false;
    assert!(active_map(&infos).is_none());
}

#[test]
fn truncation_is_reported() {
    let encoded = encode_mapinfos_reply(&infos());
    let err = decode_mapinfos_reply(&encoded[..encoded.len() - 3]).expect_err("cut name");
    assert!(format!("{err:#}").contains("map infos truncated"));
}
