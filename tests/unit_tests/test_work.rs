// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use hex_literal::hex;
use mds_client_rs::codecs::work::{
    RemoteMove, WorkKind, WorkOp, WorkRequest, encode_work_request,
};

#[test]
fn area_clean_request_layout() {
    let body = encode_work_request(
        WorkOp::Start,
        WorkKind::Area,
        &WorkRequest {
            clean_ids: vec![1, 2],
            ..WorkRequest::default()
        },
    );
    let expected = hex!(
        "01 02"          // start, area
        "02000000 0102"  // clean ids
        "00000000"       // custom points
        "00000000"       // cycles
        "00000000"       // clean states
        "00000000"       // extra ids
        "00000000"       // extra poses
        "00 0000 0000 0000" // remote block
        "00000000"       // extra states
    );
    assert_eq!(body.as_ref(), expected);
}

#[test]
fn custom_clean_carries_float_pairs() {
    let body = encode_work_request(
        WorkOp::Start,
        WorkKind::Custom,
        &WorkRequest {
            custom_areas: vec![(1.5, -2.0), (3.0, 4.0)],
            ..WorkRequest::default()
        },
    );
    assert_eq!(body[0], 1);
    assert_eq!(body[1], 3);
    // clean ids empty, then two points
    assert_eq!(&body[2..6], &0u32.to_le_bytes());
    assert_eq!(&body[6..10], &2u32.to_le_bytes());
    assert_eq!(&body[10..14], &1.5f32.to_le_bytes());
    assert_eq!(&body[14..18], &(-2.0f32).to_le_bytes());
    assert_eq!(&body[18..22], &3.0f32.to_le_bytes());
    assert_eq!(&body[22..26], &4.0f32.to_le_bytes());
}

#[test]
fn remote_move_block_is_seven_bytes_signed() {
    let body = encode_work_request(
        WorkOp::Start,
        WorkKind::Remote,
        &WorkRequest {
            remote: RemoteMove {
                move_type: 1,
                last_time: 500,
                velocity: -120,
                angular_velocity: 300,
            },
            ..WorkRequest::default()
        },
    );
    // op, kind, five empty arrays (4 bytes each) and the extra-pose count.
    let remote_at = 2 + 4 * 6;
    let block = &body[remote_at..remote_at + 7];
    assert_eq!(block[0], 1);
    assert_eq!(&block[1..3], &500u16.to_le_bytes());
    assert_eq!(&block[3..5], &(-120i16).to_le_bytes());
    assert_eq!(&block[5..7], &300i16.to_le_bytes());
    // Trailing extra-states array is empty.
    assert_eq!(&body[remote_at + 7..], &0u32.to_le_bytes());
}

#[test]
fn plain_ops_differ_only_in_the_op_byte() {
    let stop = encode_work_request(WorkOp::Stop, WorkKind::Auto, &WorkRequest::default());
    let dock = encode_work_request(WorkOp::Dock, WorkKind::Auto, &WorkRequest::default());
    assert_eq!(stop[0], 4);
    assert_eq!(dock[0], 5);
    assert_eq!(stop[1..], dock[1..]);
}
