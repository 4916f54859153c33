// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use anyhow::Result;
use bytes::Bytes;
use mds_client_rs::{
    master::client::MasterClient,
    service::{ServiceDescriptor, session::ServiceClient},
    transport::socket::FramedSocket,
};

use super::common::{FakeMaster, FakeServicePeer, PeerAction, ok_triple, test_config, xml_string};

const ECHO: ServiceDescriptor = ServiceDescriptor {
    name: "/test/Echo",
    md5: "00112233445566778899aabbccddeeff",
    persistent: true,
};

const ECHO_EPHEMERAL: ServiceDescriptor = ServiceDescriptor {
    name: "/test/Echo",
    md5: "00112233445566778899aabbccddeeff",
    persistent: false,
};

async fn client_for(
    peer: &FakeServicePeer,
    descriptor: ServiceDescriptor,
) -> Result<(ServiceClient, FakeMaster)> {
    let peer_port = peer.addr.port();
    let responder: super::common::Responder = Arc::new(move |method, _body| {
        assert_eq!(method, "lookupService", "only resolution goes to the master");
        // "localhost" on purpose: the client must normalise it.
        ok_triple(xml_string(&format!("rosrpc://localhost:{peer_port}")))
    });
    let master = FakeMaster::spawn(responder).await?;
    let cfg = test_config(master.uri());
    let master_client = Arc::new(MasterClient::new(&cfg)?);
    let client = ServiceClient::new(
        descriptor,
        master_client,
        cfg.timeouts.connect(),
        cfg.timeouts.call(),
    );
    Ok((client, master))
}

#[tokio::test]
async fn call_returns_the_reply_body() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![PeerAction::Reply(vec![0xFE, 0xFF])]).await?;
    let (client, _master) = client_for(&peer, ECHO).await?;

    let reply = client.call(Bytes::from_static(&[0, 1, 2, 3, 4])).await?;
    assert_eq!(reply.as_ref(), &[0xFE, 0xFF]);

    let requests = peer.requests.lock().await;
    assert_eq!(requests.as_slice(), &[vec![0u8, 1, 2, 3, 4]]);
    assert_eq!(peer.connections.load(Ordering::SeqCst), 1);

    client.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn transport_failure_is_retried_once() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![
        PeerAction::CloseAfterRequest,
        PeerAction::Reply(vec![0xAB]),
    ])
    .await?;
    let (client, _master) = client_for(&peer, ECHO).await?;

    let reply = client.call(Bytes::from_static(&[9, 9])).await?;
    assert_eq!(reply.as_ref(), &[0xAB]);

    // Same body transmitted on both attempts, over two connections.
    let requests = peer.requests.lock().await;
    assert_eq!(requests.as_slice(), &[vec![9u8, 9], vec![9u8, 9]]);
    assert_eq!(peer.connections.load(Ordering::SeqCst), 2);

    client.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn calls_are_served_in_submission_order() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![
        PeerAction::Reply(vec![0x0A]),
        PeerAction::Reply(vec![0x0B]),
    ])
    .await?;
    let (client, _master) = client_for(&peer, ECHO).await?;

    let (first, second) = tokio::join!(
        client.call(Bytes::from_static(&[1])),
        client.call(Bytes::from_static(&[2])),
    );
    assert_eq!(first?.as_ref(), &[0x0A]);
    assert_eq!(second?.as_ref(), &[0x0B]);

    let requests = peer.requests.lock().await;
    assert_eq!(requests.as_slice(), &[vec![1u8], vec![2u8]]);
    // One persistent socket served both calls.
    assert_eq!(peer.connections.load(Ordering::SeqCst), 1);

    client.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn service_faults_are_not_retried() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![PeerAction::Fault("nope".to_string())]).await?;
    let (client, _master) = client_for(&peer, ECHO).await?;

    let err = client
        .call(Bytes::from_static(&[1]))
        .await
        .expect_err("fault must surface");
    assert!(format!("{err:#}").contains("service error response: nope"));

    assert_eq!(peer.requests.lock().await.len(), 1, "no second attempt");
    client.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn ephemeral_mode_opens_a_socket_per_call() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![
        PeerAction::Reply(vec![0x01]),
        PeerAction::Reply(vec![0x02]),
    ])
    .await?;
    let (client, _master) = client_for(&peer, ECHO_EPHEMERAL).await?;

    assert_eq!(client.call(Bytes::from_static(&[1])).await?.as_ref(), &[0x01]);
    assert_eq!(client.call(Bytes::from_static(&[2])).await?.as_ref(), &[0x02]);
    assert_eq!(peer.connections.load(Ordering::SeqCst), 2);

    client.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn open_then_close_leaves_nothing_behind() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![]).await?;
    let mut sock =
        FramedSocket::connect("127.0.0.1", peer.addr.port(), Duration::from_secs(1)).await?;
    assert!(sock.is_open());
    sock.close();
    sock.close(); // idempotent
    assert!(!sock.is_open());
    let err = sock
        .read_exact(1, Duration::from_millis(100))
        .await
        .expect_err("reads on a closed socket fail");
    assert!(format!("{err:#}").contains("socket closed"));
    Ok(())
}

#[tokio::test]
async fn calls_after_shutdown_fail_fast() -> Result<()> {
    let peer = FakeServicePeer::spawn(vec![PeerAction::Reply(vec![0x01])]).await?;
    let (client, _master) = client_for(&peer, ECHO).await?;

    client.call(Bytes::from_static(&[1])).await?;
    client.shutdown().await;
    client.shutdown().await; // idempotent

    let err = client
        .call(Bytes::from_static(&[2]))
        .await
        .expect_err("client is gone");
    assert!(format!("{err:#}").contains("shut down"));
    Ok(())
}
