// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::codecs::walls::{
    VirtualWall, WALL_KIND_MOP_ONLY, WALL_KIND_NORMAL, WallOp, WallReply,
    decode_wall_reply, encode_wall_reply, encode_wall_request, rect_dots,
};

fn sample_walls() -> Vec<VirtualWall> {
    vec![
        VirtualWall {
            id: 1,
            kind: WALL_KIND_NORMAL,
            dots: vec![(0.5, 0.5), (2.5, 0.5), (2.5, 1.5), (0.5, 1.5)],
        },
        VirtualWall {
            id: 2,
            kind: WALL_KIND_MOP_ONLY,
            dots: vec![(-1.0, -1.0), (1.0, -1.0), (0.0, 1.0)],
        },
    ]
}

#[test]
fn request_header_layout() {
    let req = encode_wall_request(WallOp::Delete, 7, 42, &[]);
    assert_eq!(req[0], 2);
    assert_eq!(&req[1..5], &7u32.to_le_bytes());
    assert_eq!(&req[5..9], &42u32.to_le_bytes());
    assert_eq!(&req[9..13], &0u32.to_le_bytes());
    assert_eq!(req.len(), 13);
}

#[test]
fn reply_round_trips() {
    let reply = WallReply {
        status: 0,
        map_id: 7,
        walls: sample_walls(),
    };
    let encoded = encode_wall_reply(&reply);
    let decoded = decode_wall_reply(&encoded).expect("decode");
    assert_eq!(decoded, reply);
}

#[test]
fn add_request_shares_the_per_wall_layout() {
    let walls = sample_walls();
    let req = encode_wall_request(WallOp::Add, 7, 0, &walls);
    // Strip op byte + map id + wall id, keep the count + records, which is
    // exactly the reply layout after its status + map id.
    let reply_like: Vec<u8> = [&[0u8][..], &7u32.to_le_bytes()[..], &req[9..]].concat();
    let decoded = decode_wall_reply(&reply_like).expect("decode");
    assert_eq!(decoded.walls, walls);
}

#[test]
fn truncated_reply_fails() {
    let encoded = encode_wall_reply(&WallReply {
        status: 0,
        map_id: 7,
        walls: sample_walls(),
    });
    decode_wall_reply(&encoded[..encoded.len() - 5]).expect_err("cut dots");
}

#[test]
fn rect_corners_in_drawing_order() {
    assert_eq!(
        rect_dots(0.0, 0.0, 2.0, 1.0),
        vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]
    );
}
