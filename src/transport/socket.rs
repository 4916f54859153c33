// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Instant, timeout, timeout_at},
};
use tracing::debug;

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("connect to {addr} timed out after {timeout_ms} ms")]
    ConnectTimeout { addr: String, timeout_ms: u64 },
    #[error("{op} deadline exceeded after {timeout_ms} ms")]
    Deadline { op: &'static str, timeout_ms: u64 },
    #[error("socket closed")]
    Closed,
    #[error("peer closed connection")]
    PeerClosed,
}

/// A stream socket with an internal read accumulator and per-operation
/// deadlines.
///
/// The firmware frames everything as a 4-byte length followed by a body, so
/// the one read primitive is `read_exact`: wait until the accumulator holds
/// `len` bytes and hand out exactly that prefix. The "at most one pending
/// read" rule is enforced by ownership — `read_exact` borrows the socket
/// mutably, so a second concurrent read cannot be expressed.
#[derive(Debug)]
pub struct FramedSocket {
    stream: Option<TcpStream>,
    acc: BytesMut,
}

impl FramedSocket {
    pub async fn connect(host: &str, port: u16, connect_timeout: Duration) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let stream = timeout(connect_timeout, TcpStream::connect(addr.as_str()))
            .await
            .map_err(|_| SocketError::ConnectTimeout {
                addr: addr.clone(),
                timeout_ms: connect_timeout.as_millis() as u64,
            })?
            .with_context(|| format!("connect to {addr} failed"))?;
        stream.set_nodelay(true)?;
        debug!(%addr, "connected");
        Ok(Self {
            stream: Some(stream),
            acc: BytesMut::with_capacity(4096),
        })
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn write_all(&mut self, bytes: &[u8], io_timeout: Duration) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(SocketError::Closed)?;
        match timeout(io_timeout, stream.write_all(bytes)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.close();
                Err(anyhow::Error::new(e).context("write failed"))
            },
            Err(_) => {
                self.close();
                Err(SocketError::Deadline {
                    op: "write",
                    timeout_ms: io_timeout.as_millis() as u64,
                }
                .into())
            },
        }
    }

    /// Resolve once the accumulator holds `len` bytes; the returned view is
    /// removed from the front of the accumulator. Zero-length reads resolve
    /// immediately.
    pub async fn read_exact(&mut self, len: usize, io_timeout: Duration) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }
        let deadline = Instant::now() + io_timeout;
        while self.acc.len() < len {
            let stream = self.stream.as_mut().ok_or(SocketError::Closed)?;
            self.acc.reserve(len - self.acc.len());
            let read = match timeout_at(deadline, stream.read_buf(&mut self.acc)).await {
                Ok(res) => res.context("read failed")?,
                Err(_) => {
                    return Err(SocketError::Deadline {
                        op: "read",
                        timeout_ms: io_timeout.as_millis() as u64,
                    }
                    .into());
                },
            };
            if read == 0 {
                self.close();
                return Err(SocketError::PeerClosed.into());
            }
        }
        Ok(self.acc.split_to(len).freeze())
    }

    /// Read a 4-byte little-endian length prefix, then that many bytes.
    /// The largest legitimate frame is a compressed map, well under the
    /// cap; anything bigger means the stream lost framing.
    pub async fn read_frame(&mut self, io_timeout: Duration) -> Result<Bytes> {
        const MAX_FRAME: usize = 64 << 20;
        let head = self.read_exact(4, io_timeout).await?;
        let len = u32::from_le_bytes([head[0], head[1], head[2], head[3]]) as usize;
        ensure!(len <= MAX_FRAME, "frame of {len} bytes exceeds the sanity cap");
        self.read_exact(len, io_timeout).await
    }

    /// Idempotent. Drops the underlying stream and any accumulated bytes;
    /// a pending `read_exact` cannot exist across `close` because both
    /// borrow the socket mutably.
    pub fn close(&mut self) {
        self.stream = None;
        self.acc.clear();
    }
}
