// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::labels::{LabelError, label_id, label_name};

#[test]
fn ids_round_trip_through_names() {
    for id in 1..=14u8 {
        let name = label_name(id);
        assert_eq!(label_id(&name).expect("known name"), id, "label {name}");
    }
}

#[test]
fn known_names() {
    assert_eq!(label_name(1), "living_room");
    assert_eq!(label_name(14), "gym");
    assert_eq!(label_name(99), "label_99");
}

#[test]
fn input_is_normalized() {
    assert_eq!(label_id("  Living Room  ").expect("folded"), 1);
    assert_eq!(label_id("living-room").expect("hyphens fold"), 1);
    assert_eq!(label_id("KIDS   room").expect("case and runs fold"), 10);
    assert_eq!(label_name(label_id("living-room").expect("id")), "living_room");
}

#[test]
fn digit_input_is_taken_as_the_id() {
    assert_eq!(label_id("7").expect("digits"), 7);
    assert_eq!(label_id("99").expect("digits beyond the table"), 99);
}

#[test]
fn empty_and_unknown_inputs_fail_with_the_listing() {
    assert_eq!(label_id(""), Err(LabelError::Empty));
    assert_eq!(label_id("   "), Err(LabelError::Empty));
    let err = label_id("ballroom").expect_err("unknown");
    let text = err.to_string();
    assert!(text.contains("ballroom"));
    assert!(text.contains("living_room") && text.contains("gym"));
}
