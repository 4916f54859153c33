// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{Instant, sleep},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    master::client::{MasterClient, MasterError, Publisher},
    topic::{ResolverPolicy, TopicDescriptor},
    transport::{handshake, socket::FramedSocket},
};

type Cache<T> = watch::Sender<Option<(T, Instant)>>;

/// Long-running subscriber for one topic. The worker keeps the most recent
/// decoded value plus its arrival instant; readers poll at their own pace
/// and are never guaranteed to observe every message.
pub struct TopicClient<T: Clone + Send + Sync + 'static> {
    descriptor: TopicDescriptor,
    master: Arc<MasterClient>,
    decoder: fn(&[u8]) -> Result<Option<T>>,
    cache: Arc<Cache<T>>,
    latest: watch::Receiver<Option<(T, Instant)>>,
    connect_timeout: Duration,
    read_timeout: Duration,
    reconnect_delay: Duration,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + Sync + 'static> TopicClient<T> {
    pub fn new(
        descriptor: TopicDescriptor,
        master: Arc<MasterClient>,
        decoder: fn(&[u8]) -> Result<Option<T>>,
        connect_timeout: Duration,
        read_timeout: Duration,
        reconnect_delay: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            descriptor,
            master,
            decoder,
            cache: Arc::new(tx),
            latest: rx,
            connect_timeout,
            read_timeout,
            reconnect_delay,
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    pub fn descriptor(&self) -> &TopicDescriptor {
        &self.descriptor
    }

    /// Spawn the worker. A second start while running is a no-op.
    pub async fn start(&self) {
        let mut slot = self.worker.lock().await;
        if slot.is_some() {
            return;
        }
        let worker = Worker {
            descriptor: self.descriptor,
            master: Arc::clone(&self.master),
            decoder: self.decoder,
            cache: Arc::clone(&self.cache),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            reconnect_delay: self.reconnect_delay,
            cancel: self.cancel.clone(),
        };
        *slot = Some(tokio::spawn(worker.run()));
    }

    /// Cooperative stop: clear the running flag, then await worker exit,
    /// swallowing anything it observed during teardown. Idempotent.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// The cached value, or `None` when nothing has arrived yet or the
    /// cached value is older than `stale_after`.
    pub fn get_latest(&self, stale_after: Option<Duration>) -> Option<T> {
        let borrowed = self.latest.borrow();
        let (value, at) = borrowed.as_ref()?;
        if let Some(max_age) = stale_after
            && at.elapsed() > max_age
        {
            return None;
        }
        Some(value.clone())
    }
}

struct Worker<T: Clone + Send + Sync + 'static> {
    descriptor: TopicDescriptor,
    master: Arc<MasterClient>,
    decoder: fn(&[u8]) -> Result<Option<T>>,
    cache: Arc<Cache<T>>,
    connect_timeout: Duration,
    read_timeout: Duration,
    reconnect_delay: Duration,
    cancel: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> Worker<T> {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let session = tokio::select! {
                _ = self.cancel.cancelled() => return,
                res = self.run_session() => res,
            };
            if let Err(e) = session {
                if self.cancel.is_cancelled() {
                    return;
                }
                warn!(topic = self.descriptor.name, "subscriber error: {e:#}");
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(self.reconnect_delay) => {},
            }
        }
    }

    /// One resolve → connect → handshake → message-loop pass. Returns only
    /// on error; the caller applies the backoff and restarts.
    async fn run_session(&self) -> Result<()> {
        let candidates = self.resolve().await?;
        let mut sock = self.connect_any(&candidates).await?;

        sock.write_all(
            &handshake::topic_handshake(
                self.master.caller_id(),
                self.descriptor.name,
                self.descriptor.msg_type,
                self.descriptor.md5,
            ),
            self.read_timeout,
        )
        .await?;
        handshake::read_handshake(&mut sock, self.read_timeout).await?;
        debug!(topic = self.descriptor.name, "subscribed");

        loop {
            let body = sock.read_frame(self.read_timeout).await?;
            if let Some(value) = (self.decoder)(&body)? {
                self.cache.send_replace(Some((value, Instant::now())));
            }
        }
    }

    async fn resolve(&self) -> Result<Vec<Publisher>> {
        let publishers = self.master.get_publishers(self.descriptor.name).await?;
        if !publishers.is_empty() {
            return Ok(publishers);
        }
        if self.descriptor.policy == ResolverPolicy::SystemStateOnly {
            return Err(MasterError::NoPublishers(self.descriptor.name.to_string()).into());
        }
        let publishers = self
            .master
            .register_subscriber(self.descriptor.name, self.descriptor.msg_type)
            .await?;
        if publishers.is_empty() {
            return Err(MasterError::NoPublishers(self.descriptor.name.to_string()).into());
        }
        Ok(publishers)
    }

    /// Try each candidate in order; first stream wins.
    async fn connect_any(&self, candidates: &[Publisher]) -> Result<FramedSocket> {
        for candidate in candidates {
            match self.connect_one(candidate).await {
                Ok(sock) => return Ok(sock),
                Err(e) => {
                    debug!(
                        topic = self.descriptor.name,
                        "publisher {candidate:?} unreachable: {e:#}"
                    );
                },
            }
        }
        bail!("no reachable publisher for {}", self.descriptor.name)
    }

    async fn connect_one(&self, candidate: &Publisher) -> Result<FramedSocket> {
        let slave_uri = match candidate {
            Publisher::Node(name) => self.master.lookup_node(name).await?,
            Publisher::Uri(uri) => uri.clone(),
        };
        let (host, port) = self
            .master
            .request_topic(&slave_uri, self.descriptor.name)
            .await?;
        FramedSocket::connect(&host, port, self.connect_timeout).await
    }
}
