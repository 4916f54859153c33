// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::codecs::{
    pose::{Pose, decode_prediction_pose},
    topics::{
        Alert, decode_alerts, decode_battery, decode_charge_state, decode_work_state,
        decode_work_statistic,
    },
};

fn put_header(out: &mut Vec<u8>) {
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
}

fn put_pose(out: &mut Vec<u8>, pose: Pose) {
    put_header(out);
    out.extend_from_slice(&pose.x.to_le_bytes());
    out.extend_from_slice(&pose.y.to_le_bytes());
    out.extend_from_slice(&pose.theta.to_le_bytes());
}

#[test]
fn battery_decodes_and_rejects_short_payloads() {
    let state = decode_battery(&[87, 0]).expect("decode").expect("value");
    assert_eq!(state.level, 87);
    assert!(!state.low_voltage_shutoff);
    assert!(decode_battery(&[87]).expect("short is not an error").is_none());
    assert!(decode_battery(&[]).expect("empty is not an error").is_none());
}

#[test]
fn charge_state_decodes() {
    let state = decode_charge_state(&[1, 3]).expect("decode").expect("value");
    assert!(state.on_charger);
    assert_eq!(state.state, 3);
    assert!(decode_charge_state(&[1]).expect("short").is_none());
}

#[test]
fn work_state_decodes_poses_and_cause() {
    let mut body = vec![2u8, 1];
    body.extend_from_slice(&1u32.to_le_bytes()); // clean ids
    body.push(3);
    body.extend_from_slice(&0u32.to_le_bytes()); // dots
    body.extend_from_slice(&0u32.to_le_bytes()); // cycles
    body.extend_from_slice(&0u32.to_le_bytes()); // clean states
    body.extend_from_slice(&0u32.to_le_bytes()); // extra ids
    body.extend_from_slice(&1u32.to_le_bytes()); // poses
    put_pose(&mut body, Pose { x: 1.5, y: -0.5, theta: 3.0 });
    body.extend_from_slice(&[0u8; 7]); // remote block
    body.extend_from_slice(&0u32.to_le_bytes()); // extra states
    body.push(5); // workcause

    let state = decode_work_state(&body).expect("decode").expect("value");
    assert_eq!(state.work_type, 2);
    assert_eq!(state.state, 1);
    assert_eq!(state.cause, 5);
    assert_eq!(state.poses, vec![Pose { x: 1.5, y: -0.5, theta: 3.0 }]);

    assert!(decode_work_state(&body[..body.len() - 1]).expect("cut").is_none());
    assert!(decode_work_state(&[2]).expect("short").is_none());
}

#[test]
fn alerts_keep_only_triggered_entries() {
    let mut body = Vec::new();
    body.extend_from_slice(&3u32.to_le_bytes());
    body.extend_from_slice(&[7, 1]); // triggered
    body.extend_from_slice(&[8, 0]); // cleared
    body.extend_from_slice(&[9, 1]); // triggered
    let alerts = decode_alerts(&body).expect("decode").expect("value");
    assert_eq!(
        alerts,
        vec![Alert { kind: 7, state: 1 }, Alert { kind: 9, state: 1 }]
    );
    assert!(decode_alerts(&body[..5]).expect("cut").is_none());
}

#[test]
fn prediction_pose_returns_the_second_pose() {
    let mut body = Vec::new();
    put_pose(&mut body, Pose { x: 1.0, y: 1.0, theta: 0.0 });
    put_pose(&mut body, Pose { x: 2.0, y: 3.0, theta: 1.5 });
    body.push(1); // interpolation flag
    let pose = decode_prediction_pose(&body).expect("decode").expect("value");
    assert_eq!(pose, Pose { x: 2.0, y: 3.0, theta: 1.5 });

    assert!(decode_prediction_pose(&body[..body.len() - 1]).expect("no flag").is_none());
}

#[test]
fn work_statistic_is_the_session_record() {
    let mut body = Vec::new();
    body.push(2); // work type
    body.extend_from_slice(&1800u32.to_le_bytes());
    body.extend_from_slice(&2450u32.to_le_bytes());
    body.extend_from_slice(&120u32.to_le_bytes());
    body.push(1); // waterbox
    body.extend_from_slice(&1_700_000_000u32.to_le_bytes());
    let stats = decode_work_statistic(&body).expect("decode").expect("value");
    assert_eq!(stats.work_type, 2);
    assert_eq!(stats.work_time_secs, 1800);
    assert_eq!(stats.area_dm2, 2450);
    assert_eq!(stats.extra_area_dm2, 120);
    assert_eq!(stats.waterbox_type, 1);
    assert_eq!(stats.start_time_secs, 1_700_000_000);

    assert!(decode_work_statistic(&body[..10]).expect("short").is_none());
}
