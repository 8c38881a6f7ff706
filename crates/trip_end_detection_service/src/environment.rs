/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::sync::Arc;

use crate::{
    common::{
        history::{HistoryStore, InMemoryHistoryStore},
        notifier::TripEndNotifier,
        types::*,
    },
    kafka::producers::KafkaTripEndNotifier,
    redis::types::RedisConnectionPool,
    tools::{error::AppError, logger::*},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub history_store: HistoryStoreKind,
    pub redis_cfg: RedisConfig,
    pub kafka_cfg: KafkaConfig,
    pub trip_end_topic: String,
    pub history_expiry: u32,
    pub session_lock_expiry: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub trip_end_thresholds: TripEndThresholds,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum HistoryStoreKind {
    Redis,
    InMemory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KafkaConfig {
    pub kafka_key: String,
    pub kafka_host: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_pool_size: usize,
    pub redis_partition: usize,
    pub reconnect_max_attempts: u32,
    pub reconnect_delay: u32,
    pub use_legacy_version: bool,
}

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    let config = serde_dhall::from_file(config_path).parse::<AppConfig>();
    match config {
        Ok(config) => Ok(config),
        Err(e) => Err(format!("Error reading config: {}", e)),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub history_store: Arc<dyn HistoryStore>,
    pub notifier: Arc<dyn TripEndNotifier>,
    pub thresholds: TripEndThresholds,
    pub session_lock_expiry: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> Result<AppState, AppError> {
        app_config.trip_end_thresholds.validate()?;

        let history_store: Arc<dyn HistoryStore> = match app_config.history_store {
            HistoryStoreKind::Redis => Arc::new(
                RedisConnectionPool::new(&app_config.redis_cfg, app_config.history_expiry).await?,
            ),
            HistoryStoreKind::InMemory => {
                warn!(
                    tag = "[History Store]",
                    "Using in-memory history, sessions will not survive a restart"
                );
                Arc::new(InMemoryHistoryStore::new(app_config.history_expiry))
            }
        };

        let notifier = Arc::new(KafkaTripEndNotifier::new(
            app_config.kafka_cfg.kafka_key,
            app_config.kafka_cfg.kafka_host,
            app_config.trip_end_topic,
        ));

        Ok(AppState {
            history_store,
            notifier,
            thresholds: app_config.trip_end_thresholds,
            session_lock_expiry: app_config.session_lock_expiry,
            request_timeout: app_config.request_timeout,
            max_allowed_req_size: app_config.max_allowed_req_size,
        })
    }

    /// State over caller provided collaborators, with the service defaults for everything else.
    pub fn with_collaborators(
        history_store: Arc<dyn HistoryStore>,
        notifier: Arc<dyn TripEndNotifier>,
        thresholds: TripEndThresholds,
    ) -> Result<AppState, AppError> {
        thresholds.validate()?;

        Ok(AppState {
            history_store,
            notifier,
            thresholds,
            session_lock_expiry: 60,
            request_timeout: 9000,
            max_allowed_req_size: 512_000,
        })
    }
}
