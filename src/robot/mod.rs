// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod clean_ops;
pub mod map_ops;
pub mod setting_ops;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;

use crate::{
    cfg::config::Config,
    codecs::{
        pose::{self, Pose, decode_prediction_pose},
        stats::SessionStats,
        topics::{
            Alert, BatteryState, ChargeState, WorkState, decode_alerts, decode_battery,
            decode_charge_state, decode_work_state, decode_work_statistic,
        },
    },
    ipc::IpcClient,
    master::client::MasterClient,
    service::{ServiceDescriptor, session::ServiceClient},
    topic::subscriber::TopicClient,
};

/// Service and topic identities observed on the wire. The md5 strings are
/// opaque fingerprints carried verbatim into handshakes.
pub mod names {
    use crate::{
        service::ServiceDescriptor,
        topic::{ResolverPolicy, TopicDescriptor},
    };

    pub const MAP_DATA: ServiceDescriptor = ServiceDescriptor {
        name: "/map/GetMapData",
        md5: "c2d6843f3e17a0f3f6aa1d6ddcf0a9b4",
        persistent: true,
    };
    pub const MULTI_MAP_INFOS: ServiceDescriptor = ServiceDescriptor {
        name: "/map/GetMultiMapInfos",
        md5: "7a1e9d0c55b84b1fa2c26cde35c0d28e",
        persistent: true,
    };
    pub const SPOT_AREA: ServiceDescriptor = ServiceDescriptor {
        name: "/map/ManipulateSpotArea",
        md5: "3e86f2c0a9185b5c9a7f0d0be2f1ce60",
        persistent: true,
    };
    pub const VIRTUAL_WALL: ServiceDescriptor = ServiceDescriptor {
        name: "/map/ManipulateVirtualWall",
        md5: "9b74f23a8d1c4e7090c1fb3a5c2ad871",
        persistent: true,
    };
    pub const WORK_MANAGE: ServiceDescriptor = ServiceDescriptor {
        name: "/clean_mode/WorkManage",
        md5: "12f8d0a97ce64bb6a5d20c7e84b2f903",
        persistent: true,
    };
    pub const SETTING_MANAGE: ServiceDescriptor = ServiceDescriptor {
        name: "/settings/SettingManage",
        md5: "e5ab07c41d9f4a33bf06c8d2a1795e4c",
        persistent: true,
    };
    pub const LIFESPAN_MANAGE: ServiceDescriptor = ServiceDescriptor {
        name: "/device/LifeSpanManage",
        md5: "b80cf1d62aa34790851e9cc0f3d6ba25",
        persistent: false,
    };
    pub const TRACE: ServiceDescriptor = ServiceDescriptor {
        name: "/map/GetTrace",
        md5: "48d1c0e7fb2a4f6c9e03a8b57d14f6a2",
        persistent: false,
    };
    pub const TOTAL_LOG_INFO: ServiceDescriptor = ServiceDescriptor {
        name: "/log/GetGlobalLogInfo",
        md5: "5c2f91ab0e3d4876b1da64c9f08e7531",
        persistent: false,
    };
    pub const LAST_LOG_INFO: ServiceDescriptor = ServiceDescriptor {
        name: "/log/GetLastWorkLogInfo",
        md5: "a6e08b52c71f4d2eb93f5a0d18c64b97",
        persistent: false,
    };
    pub const CHARGER_POSE: ServiceDescriptor = ServiceDescriptor {
        name: "/charge/GetChargerPosition",
        md5: "0d95c4a7e1b2483f86ca30f9d5e7a216",
        persistent: false,
    };

    pub const BATTERY: TopicDescriptor = TopicDescriptor {
        name: "/power/Battery",
        msg_type: "mds_msgs/Battery",
        md5: "f1c8e0924ab7435d90e2c6a1b58d37f0",
        policy: ResolverPolicy::SystemStateThenRegister,
    };
    pub const CHARGE_STATE: TopicDescriptor = TopicDescriptor {
        name: "/charge/ChargeState",
        msg_type: "mds_msgs/ChargeState",
        md5: "2b90da6c17ef4853a4f6d05c3e8b91a7",
        policy: ResolverPolicy::SystemStateThenRegister,
    };
    pub const WORK_STATE: TopicDescriptor = TopicDescriptor {
        name: "/clean/WorkState",
        msg_type: "mds_msgs/WorkState",
        md5: "84f5a1d20c9e47b3bd16e8a7f02c53d9",
        policy: ResolverPolicy::SystemStateThenRegister,
    };
    pub const WORK_STATISTIC: TopicDescriptor = TopicDescriptor {
        name: "/log/WorkStatisticToWifi",
        msg_type: "mds_msgs/WorkStatistic",
        md5: "6a3d97e0b5c24f18a0cd82f6941b7e35",
        policy: ResolverPolicy::SystemStateThenRegister,
    };
    pub const TRIGGERED_ALERTS: TopicDescriptor = TopicDescriptor {
        name: "/event/TriggeredAlert",
        msg_type: "mds_msgs/TriggeredAlert",
        md5: "d07c5b18f3a94e62950ab4c6e1d82f73",
        policy: ResolverPolicy::SystemStateThenRegister,
    };
    // The SLAM node crashes on unsolicited publisher-update callbacks, so
    // this topic never goes through registerSubscriber.
    pub const PREDICTION_POSE: TopicDescriptor = TopicDescriptor {
        name: "/slam/PredictionPose",
        msg_type: "mds_msgs/PredictionPose",
        md5: "31e6a9f47d0b42c88f25c1a0b96d84e1",
        policy: ResolverPolicy::SystemStateOnly,
    };
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("active map not initialised")]
    ActiveMapNotInitialised,
    #[error("invalid room id {0}")]
    InvalidRoomId(u32),
    #[error("cannot merge room {0} with itself")]
    SameRoomMerge(u32),
    #[error("charger pose invalid")]
    ChargerPoseInvalid,
}

/// Robot and dock pose pair returned by the positions verb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Positions {
    /// From the cached prediction-pose topic; absent until the first
    /// message arrives (or when stale).
    pub robot: Option<Pose>,
    pub dock: Pose,
}

/// The facade. Owns one dispatcher per service (created lazily) and one
/// subscriber per topic, and exposes the typed verbs the controller calls.
pub struct Robot {
    cfg: Config,
    master: Arc<MasterClient>,
    services: DashMap<&'static str, Arc<ServiceClient>>,
    battery: TopicClient<BatteryState>,
    charge: TopicClient<ChargeState>,
    work_state: TopicClient<WorkState>,
    work_statistic: TopicClient<SessionStats>,
    alerts: TopicClient<Vec<Alert>>,
    prediction_pose: TopicClient<Pose>,
    ipc: IpcClient,
}

impl Robot {
    pub fn new(cfg: Config) -> Result<Self> {
        let master = Arc::new(MasterClient::new(&cfg)?);
        let t = cfg.timeouts.clone();
        macro_rules! topic {
            ($descriptor:expr, $decoder:path) => {
                TopicClient::new(
                    $descriptor,
                    Arc::clone(&master),
                    $decoder,
                    t.connect(),
                    t.topic_read(),
                    t.reconnect_delay(),
                )
            };
        }
        let battery = topic!(names::BATTERY, decode_battery);
        let charge = topic!(names::CHARGE_STATE, decode_charge_state);
        let work_state = topic!(names::WORK_STATE, decode_work_state);
        let work_statistic = topic!(names::WORK_STATISTIC, decode_work_statistic);
        let alerts = topic!(names::TRIGGERED_ALERTS, decode_alerts);
        let prediction_pose = topic!(names::PREDICTION_POSE, decode_prediction_pose);

        let ipc = IpcClient::new(&cfg.helper, t.helper());
        Ok(Self {
            master,
            services: DashMap::new(),
            battery,
            charge,
            work_state,
            work_statistic,
            alerts,
            prediction_pose,
            ipc,
            cfg,
        })
    }

    /// Start all topic subscribers concurrently.
    pub async fn start(&self) {
        tokio::join!(
            self.battery.start(),
            self.charge.start(),
            self.work_state.start(),
            self.work_statistic.start(),
            self.alerts.start(),
            self.prediction_pose.start(),
        );
    }

    /// Stop subscribers, then dispatchers, each group concurrently.
    /// Idempotent.
    pub async fn shutdown(&self) {
        tokio::join!(
            self.battery.shutdown(),
            self.charge.shutdown(),
            self.work_state.shutdown(),
            self.work_statistic.shutdown(),
            self.alerts.shutdown(),
            self.prediction_pose.shutdown(),
        );
        let clients: Vec<Arc<ServiceClient>> = self
            .services
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut tasks = Vec::with_capacity(clients.len());
        for client in clients {
            tasks.push(tokio::spawn(async move { client.shutdown().await }));
        }
        for task in tasks {
            let _ = task.await;
        }
    }

    pub(crate) fn service(&self, descriptor: ServiceDescriptor) -> Arc<ServiceClient> {
        let entry = self.services.entry(descriptor.name).or_insert_with(|| {
            Arc::new(ServiceClient::new(
                descriptor,
                Arc::clone(&self.master),
                self.cfg.timeouts.connect(),
                self.cfg.timeouts.call(),
            ))
        });
        Arc::clone(entry.value())
    }

    pub(crate) async fn call(
        &self,
        descriptor: ServiceDescriptor,
        body: Bytes,
    ) -> Result<Bytes> {
        self.service(descriptor).call(body).await
    }

    // --- cached topic values -------------------------------------------

    pub fn battery(&self, stale_after: Option<Duration>) -> Option<BatteryState> {
        self.battery.get_latest(stale_after)
    }

    pub fn charge_state(&self, stale_after: Option<Duration>) -> Option<ChargeState> {
        self.charge.get_latest(stale_after)
    }

    pub fn work_state(&self, stale_after: Option<Duration>) -> Option<WorkState> {
        self.work_state.get_latest(stale_after)
    }

    /// The most recent end-of-session statistic broadcast.
    pub fn work_statistic(&self, stale_after: Option<Duration>) -> Option<SessionStats> {
        self.work_statistic.get_latest(stale_after)
    }

    pub fn triggered_alerts(&self, stale_after: Option<Duration>) -> Option<Vec<Alert>> {
        self.alerts.get_latest(stale_after)
    }

    pub fn robot_pose(&self, stale_after: Option<Duration>) -> Option<Pose> {
        self.prediction_pose.get_latest(stale_after)
    }

    /// Robot pose from the cache plus the dock pose from the charger
    /// service. A dock reply with the invalid flag set is a domain error.
    pub async fn get_positions(&self, stale_after: Option<Duration>) -> Result<Positions> {
        let robot = self.prediction_pose.get_latest(stale_after);
        let body = self
            .call(names::CHARGER_POSE, pose::encode_charger_pose_request())
            .await?;
        let reply = pose::decode_charger_pose_reply(&body)?;
        if !reply.valid {
            return Err(DomainError::ChargerPoseInvalid.into());
        }
        Ok(Positions {
            robot,
            dock: reply.pose,
        })
    }

    // --- helper-binary verbs -------------------------------------------

    pub async fn start_video(&self, password: &str) -> Result<()> {
        self.ipc.start_video(password).await
    }

    pub async fn stop_video(&self) -> Result<()> {
        self.ipc.stop_video().await
    }

    pub async fn play_sound(&self, sound_id: u32) -> Result<()> {
        self.ipc.play_sound(sound_id).await
    }

    pub async fn beep(&self) -> Result<()> {
        self.ipc.beep().await
    }
}
