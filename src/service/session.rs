// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    master::client::MasterClient,
    service::{ServiceDescriptor, ServiceError},
    transport::{handshake, socket::FramedSocket},
};

struct CallJob {
    body: Bytes,
    reply: oneshot::Sender<Result<Bytes>>,
}

/// Handle to one per-service session. Calls are funneled through a private
/// loop task that owns the socket, so submission order is execution order
/// and at most one call is ever in flight.
#[derive(Debug)]
pub struct ServiceClient {
    descriptor: ServiceDescriptor,
    jobs: mpsc::Sender<CallJob>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ServiceClient {
    pub fn new(
        descriptor: ServiceDescriptor,
        master: Arc<MasterClient>,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let state = SessionLoop {
            descriptor,
            master,
            socket: None,
            resolved: None,
            connect_timeout,
            call_timeout,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(state.run(rx));
        Self {
            descriptor,
            jobs: tx,
            cancel,
            worker: Mutex::new(Some(handle)),
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// Send one request body and await the reply body. Calls on the same
    /// client are served strictly in submission order.
    pub async fn call(&self, body: Bytes) -> Result<Bytes> {
        let (tx, rx) = oneshot::channel();
        self.jobs
            .send(CallJob { body, reply: tx })
            .await
            .map_err(|_| ServiceError::Closed(self.descriptor.name))?;
        rx.await
            .map_err(|_| ServiceError::Closed(self.descriptor.name))?
    }

    /// Idempotent. Stops the loop, closes the held socket, and fails any
    /// queued call.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.lock().await.take() {
            let _ = handle.await;
        }
    }
}

struct SessionLoop {
    descriptor: ServiceDescriptor,
    master: Arc<MasterClient>,
    socket: Option<FramedSocket>,
    /// Endpoint of the last successful resolution, kept for logging.
    resolved: Option<(String, u16)>,
    connect_timeout: Duration,
    call_timeout: Duration,
    cancel: CancellationToken,
}

impl SessionLoop {
    async fn run(mut self, mut jobs: mpsc::Receiver<CallJob>) {
        loop {
            let job = tokio::select! {
                _ = self.cancel.cancelled() => break,
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };
            let result = self.perform(&job.body).await;
            let _ = job.reply.send(result);
        }
        self.teardown();
    }

    /// One logical call: at most two attempts, with a socket teardown in
    /// between. A service-level fault is final — only transport-level
    /// failures are retried.
    async fn perform(&mut self, body: &Bytes) -> Result<Bytes> {
        match self.attempt(body).await {
            Ok(reply) => Ok(reply),
            Err(e) if e.downcast_ref::<ServiceError>().is_some() => {
                self.teardown();
                Err(e)
            },
            Err(first) => {
                warn!(
                    service = self.descriptor.name,
                    endpoint = ?self.resolved,
                    "call attempt failed, reconnecting: {first:#}"
                );
                self.teardown();
                match self.attempt(body).await {
                    Ok(reply) => Ok(reply),
                    Err(e) if e.downcast_ref::<ServiceError>().is_some() => {
                        self.teardown();
                        Err(e)
                    },
                    Err(second) => {
                        self.teardown();
                        Err(second)
                    },
                }
            },
        }
    }

    async fn attempt(&mut self, body: &Bytes) -> Result<Bytes> {
        if !self.descriptor.persistent {
            // Ephemeral mode opens a fresh socket around every attempt.
            self.teardown();
        }
        self.ensure_connected().await?;
        let sock = match self.socket.as_mut() {
            Some(s) => s,
            None => return Err(ServiceError::Closed(self.descriptor.name).into()),
        };

        let mut frame = BytesMut::with_capacity(4 + body.len());
        frame.put_u32_le(body.len() as u32);
        frame.put_slice(body);
        sock.write_all(&frame, self.call_timeout).await?;

        let status = sock.read_exact(1, self.call_timeout).await?[0];
        let reply = sock.read_frame(self.call_timeout).await?;

        if !self.descriptor.persistent {
            self.teardown();
        }

        if status == 1 {
            Ok(reply)
        } else {
            Err(ServiceError::Fault(String::from_utf8_lossy(&reply).into_owned()).into())
        }
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.socket.as_ref().is_some_and(FramedSocket::is_open) {
            return Ok(());
        }
        let (host, port) = self.master.lookup_service(self.descriptor.name).await?;
        debug!(service = self.descriptor.name, %host, port, "resolved service");
        let mut sock = FramedSocket::connect(&host, port, self.connect_timeout).await?;
        sock.write_all(
            &handshake::service_handshake(
                self.master.caller_id(),
                self.descriptor.md5,
                self.descriptor.persistent,
                self.descriptor.name,
            ),
            self.call_timeout,
        )
        .await?;
        handshake::read_handshake(&mut sock, self.call_timeout).await?;
        self.resolved = Some((host, port));
        self.socket = Some(sock);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(mut sock) = self.socket.take() {
            sock.close();
        }
    }
}
