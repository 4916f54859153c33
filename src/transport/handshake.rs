// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Result, bail, ensure};
use bytes::{BufMut, Bytes, BytesMut};

use crate::transport::{cursor::Cursor, socket::FramedSocket};

/// Upper bound on a peer handshake block; anything bigger is garbage.
const MAX_HANDSHAKE_LEN: usize = 1 << 20;

/// Encode a handshake block: outer 4-byte little-endian length, then for
/// each pair a 4-byte little-endian field length followed by `key=value`
/// bytes. Field order is preserved — some firmware parse positionally.
pub fn encode_fields(fields: &[(&str, &str)]) -> Bytes {
    let mut inner = BytesMut::new();
    for (key, value) in fields {
        let field = format!("{key}={value}");
        inner.put_u32_le(field.len() as u32);
        inner.put_slice(field.as_bytes());
    }
    let mut out = BytesMut::with_capacity(4 + inner.len());
    out.put_u32_le(inner.len() as u32);
    out.put_slice(&inner);
    out.freeze()
}

/// The service-session preamble. The trailing apostrophe on the caller id
/// matches observed wire traffic and must not be dropped.
pub fn service_handshake(
    caller_id: &str,
    md5: &str,
    persistent: bool,
    service: &str,
) -> Bytes {
    let caller = format!("{caller_id}'");
    encode_fields(&[
        ("callerid", caller.as_str()),
        ("md5sum", md5),
        ("persistent", if persistent { "1" } else { "0" }),
        ("service", service),
    ])
}

/// The subscriber-session preamble.
pub fn topic_handshake(caller_id: &str, topic: &str, msg_type: &str, md5: &str) -> Bytes {
    encode_fields(&[
        ("callerid", caller_id),
        ("topic", topic),
        ("type", msg_type),
        ("md5sum", md5),
        ("tcp_nodelay", "1"),
    ])
}

/// Decode the inner block (without the outer length) into ordered pairs,
/// keyed by the substring before the first `=`.
pub fn decode_fields(block: &[u8]) -> Result<Vec<(String, String)>> {
    let mut cur = Cursor::new(block);
    let mut fields = Vec::new();
    while cur.remaining() > 0 {
        let raw = cur.read_len_prefixed()?;
        let text = std::str::from_utf8(raw)?;
        match text.split_once('=') {
            Some((key, value)) => fields.push((key.to_string(), value.to_string())),
            None => bail!("malformed handshake field {text:?}"),
        }
    }
    Ok(fields)
}

/// Read the peer's handshake block off the socket and decode it.
pub async fn read_handshake(
    sock: &mut FramedSocket,
    io_timeout: Duration,
) -> Result<Vec<(String, String)>> {
    let head = sock.read_exact(4, io_timeout).await?;
    let len = u32::from_le_bytes([head[0], head[1], head[2], head[3]]) as usize;
    ensure!(len <= MAX_HANDSHAKE_LEN, "malformed handshake: block of {len} bytes");
    let block = sock.read_exact(len, io_timeout).await?;
    decode_fields(&block)
}
