// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::master::client::{normalize_localhost, parse_rosrpc};

#[test]
fn localhost_is_rewritten_to_ipv4() {
    assert_eq!(
        normalize_localhost("http://localhost:11311"),
        "http://127.0.0.1:11311"
    );
}

#[test]
fn normalization_is_idempotent() {
    let once = normalize_localhost("http://localhost:11311");
    assert_eq!(normalize_localhost(&once), once);
    assert_eq!(
        normalize_localhost("http://127.0.0.1:11311"),
        "http://127.0.0.1:11311"
    );
}

#[test]
fn rosrpc_split_at_rightmost_colon() {
    let (host, port) = parse_rosrpc("rosrpc://localhost:40123").expect("parse");
    assert_eq!(host, "127.0.0.1");
    assert_eq!(port, 40123);
}

#[test]
fn rosrpc_rejects_other_schemes_and_bad_ports() {
    parse_rosrpc("http://127.0.0.1:1").expect_err("wrong scheme");
    parse_rosrpc("rosrpc://127.0.0.1").expect_err("no port");
    parse_rosrpc("rosrpc://127.0.0.1:notaport").expect_err("bad port");
}
