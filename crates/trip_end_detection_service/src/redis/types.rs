/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::environment::RedisConfig;
use crate::tools::error::AppError;
use fred::prelude::*;
use fred::types::RespVersion;

/// History store backed by redis sorted sets, see `redis::commands` for the layout.
pub struct RedisConnectionPool {
    pub pool: RedisPool,
    /// TTL of the history keys in seconds, refreshed on every write
    pub history_expiry: u32,
}

impl RedisConnectionPool {
    pub async fn new(conf: &RedisConfig, history_expiry: u32) -> Result<Self, AppError> {
        let redis_connection_url = format!(
            "redis://{}:{}/{}", //URI Schema
            conf.redis_host, conf.redis_port, conf.redis_partition
        );

        let mut config = fred::types::RedisConfig::from_url(&redis_connection_url)
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;

        if !conf.use_legacy_version {
            config.version = RespVersion::RESP3;
        }

        let reconnect_policy =
            ReconnectPolicy::new_constant(conf.reconnect_max_attempts, conf.reconnect_delay);

        let pool = Builder::from_config(config)
            .set_policy(reconnect_policy)
            .build_pool(conf.redis_pool_size)
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;

        let _connect_handle = pool
            .init()
            .await
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;

        Ok(Self {
            pool,
            history_expiry,
        })
    }
}
