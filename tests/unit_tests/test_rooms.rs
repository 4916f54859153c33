// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::codecs::rooms::{
    Room, RoomList, RoomPreferences, SpotAreaOp, decode_rooms_reply, encode_get_minimal,
    encode_manage_request, encode_rooms_reply, find_room,
};

fn sample_rooms() -> RoomList {
    RoomList {
        status: 0,
        map_id: 3,
        areas_id: 9,
        rooms: vec![
            Room {
                id: 5,
                label: 1,
                polygon: vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)],
                connections: vec![7],
                preferences: RoomPreferences {
                    suction: 2,
                    water: 1,
                    cleaning_times: 2,
                    sequence: 0,
                },
            },
            Room {
                id: 7,
                label: 5,
                polygon: vec![(10.5, -2.0), (11.0, -2.0), (11.0, 3.5), (10.5, 3.5)],
                connections: vec![5],
                preferences: RoomPreferences {
                    suction: 1,
                    water: 2,
                    cleaning_times: 1,
                    sequence: 1,
                },
            },
        ],
    }
}

#[test]
fn minimal_get_is_five_bytes() {
    let req = encode_get_minimal(3);
    assert_eq!(req.as_ref(), &[0x00, 0x03, 0x00, 0x00, 0x00]);
}

#[test]
fn full_get_is_larger_than_the_minimal_form() {
    let full = encode_manage_request(SpotAreaOp::Get, 3, &[]).expect("encode");
    assert!(full.len() > encode_get_minimal(3).len());
    assert_eq!(full[0], 0x00);
}

#[test]
fn canonical_reply_round_trips() {
    let list = sample_rooms();
    let encoded = encode_rooms_reply(&list).expect("encode");
    let decoded = decode_rooms_reply(&encoded).expect("decode");
    assert_eq!(decoded, list);
}

#[test]
fn parser_is_idempotent() {
    let encoded = encode_rooms_reply(&sample_rooms()).expect("encode");
    let once = decode_rooms_reply(&encoded).expect("first");
    let re_encoded = encode_rooms_reply(&once).expect("re-encode");
    assert_eq!(re_encoded, encoded);
    let twice = decode_rooms_reply(&re_encoded).expect("second");
    assert_eq!(twice, once);
}

// The other firmware dialect carries room names (and other metadata) before
// each room record. The scanner must still find the polygons and take the
// label from the byte just before the areaid.
#[test]
fn dialect_with_name_metadata_still_parses() {
    let list = sample_rooms();
    let encoded = encode_rooms_reply(&list).expect("encode");

    // Locate room 2's metadata: its label byte is followed by areaid 7.
    let marker = [5u8, 7, 0, 0, 0, 0, 0, 0, 0, 0];
    let pos = encoded
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("room 2 metadata");
    let mut shifted = Vec::with_capacity(encoded.len() + 8);
    shifted.extend_from_slice(&encoded[..pos]);
    shifted.extend_from_slice(b"bedroom\0");
    shifted.extend_from_slice(&encoded[pos..]);

    let decoded = decode_rooms_reply(&shifted).expect("decode shifted layout");
    assert_eq!(decoded.rooms.len(), 2);
    assert_eq!(decoded.rooms[1].id, 7);
    assert_eq!(decoded.rooms[1].label, 5);
    assert_eq!(decoded.rooms[1].polygon, list.rooms[1].polygon);
    assert_eq!(decoded.rooms[1].preferences, list.rooms[1].preferences);
    // Room 1 is untouched by the splice.
    assert_eq!(decoded.rooms[0], list.rooms[0]);
}

#[test]
fn missing_preferences_degrade_to_defaults() {
    let mut list = sample_rooms();
    list.rooms.truncate(1);
    let encoded = encode_rooms_reply(&list).expect("encode");
    // Drop the trailing preference words; connections survive.
    let truncated = &encoded[..encoded.len() - 13];
    let decoded = decode_rooms_reply(truncated).expect("decode");
    assert_eq!(decoded.rooms[0].connections, vec![7]);
    assert_eq!(decoded.rooms[0].preferences, RoomPreferences::default());
}

#[test]
fn room_without_a_polygon_is_an_error() {
    let mut encoded = encode_rooms_reply(&sample_rooms()).expect("encode").to_vec();
    // Claim a third room that does not exist.
    encoded[9] = 3;
    let err = decode_rooms_reply(&encoded).expect_err("no third polygon");
    assert!(err.to_string().contains("no polygon"));
}

#[test]
fn oversized_room_ids_are_rejected_on_encode() {
    let mut list = sample_rooms();
    list.rooms[0].id = 300;
    encode_rooms_reply(&list).expect_err("id does not fit");
}

#[test]
fn find_room_by_id() {
    let list = sample_rooms();
    assert_eq!(find_room(&list, 7).expect("present").label, 5);
    assert!(find_room(&list, 42).is_none());
}
