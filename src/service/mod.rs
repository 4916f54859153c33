// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod session;

use thiserror::Error;

/// Identity of one firmware service. The md5 travels opaquely in the
/// handshake; it is never verified locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Logical path, e.g. `/map/ManipulateSpotArea`.
    pub name: &'static str,
    /// Hex fingerprint observed on the wire.
    pub md5: &'static str,
    /// Long-lived socket when true, socket-per-call when false.
    pub persistent: bool,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The peer answered with a non-1 status byte; the body is its UTF-8
    /// error text. Never retried.
    #[error("service error response: {0}")]
    Fault(String),
    #[error("service client for {0} is shut down")]
    Closed(&'static str),
}
