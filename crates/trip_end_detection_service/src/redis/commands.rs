/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{history::HistoryStore, types::*};
use crate::redis::{keys::*, types::RedisConnectionPool};
use crate::tools::{error::AppError, logger::*};
use async_trait::async_trait;
use fred::prelude::*;
use fred::types::{Expiration, SetOptions};

impl RedisConnectionPool {
    // ZADD, scored by capture time in milliseconds
    #[instrument(level = "DEBUG", skip(self))]
    async fn zadd_sample(&self, key: &str, sample: &LocationSample) -> Result<(), AppError> {
        let member = sample_member(sample)?;

        self.pool
            .zadd::<(), _, _>(
                key,
                None,
                None,
                false,
                false,
                (sample_score(sample), member),
            )
            .await
            .map_err(|err| AppError::ZAddFailed(err.to_string()))?;

        self.pool
            .expire::<(), _>(key, self.history_expiry.into())
            .await
            .map_err(|err| AppError::SetExpiryFailed(err.to_string()))
    }
}

fn sample_score(sample: &LocationSample) -> f64 {
    sample.captured_at_ms() as f64
}

fn sample_member(sample: &LocationSample) -> Result<String, AppError> {
    serde_json::to_string(sample).map_err(|err| AppError::SerializationError(err.to_string()))
}

fn parse_samples(members: Vec<String>) -> Result<Vec<LocationSample>, AppError> {
    members
        .iter()
        .map(|member| {
            serde_json::from_str::<LocationSample>(member)
                .map_err(|err| AppError::DeserializationError(err.to_string()))
        })
        .collect()
}

#[async_trait]
impl HistoryStore for RedisConnectionPool {
    async fn record_raw_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        self.zadd_sample(&raw_location_key(session_id), sample)
            .await
    }

    async fn record_filtered_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        self.zadd_sample(&filtered_location_key(session_id), sample)
            .await
    }

    // ZRANGE key 0 count-1 REV
    #[instrument(level = "DEBUG", skip(self))]
    async fn get_last_filtered_samples(
        &self,
        session_id: &SessionId,
        count: usize,
    ) -> Result<Vec<LocationSample>, AppError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let stop = i64::try_from(count).unwrap_or(i64::MAX) - 1;
        let members = self
            .pool
            .zrange::<Vec<String>, _, _, _>(
                filtered_location_key(session_id),
                0_i64,
                stop,
                None,
                true,
                None,
                false,
            )
            .await
            .map_err(|err| AppError::ZRangeFailed(err.to_string()))?;

        parse_samples(members)
    }

    // ZREVRANGEBYSCORE key to from
    #[instrument(level = "DEBUG", skip(self))]
    async fn get_filtered_samples_in_range(
        &self,
        session_id: &SessionId,
        window: &TimeWindow,
    ) -> Result<Vec<LocationSample>, AppError> {
        let members = self
            .pool
            .zrevrangebyscore::<Vec<String>, _, _, _>(
                filtered_location_key(session_id),
                window.to.as_millis() as f64,
                window.from.as_millis() as f64,
                false,
                None,
            )
            .await
            .map_err(|err| AppError::ZRangeFailed(err.to_string()))?;

        parse_samples(members)
    }

    // SET key NX EX expiry
    #[instrument(level = "DEBUG", skip(self))]
    async fn try_lock_session(
        &self,
        session_id: &SessionId,
        expiry: u32,
    ) -> Result<bool, AppError> {
        let reply = self
            .pool
            .set::<Option<String>, _, _>(
                session_processing_lock_key(session_id),
                true,
                Some(Expiration::EX(expiry.into())),
                Some(SetOptions::NX),
                false,
            )
            .await
            .map_err(|err| AppError::SetFailed(err.to_string()))?;

        Ok(reply.is_some())
    }

    #[instrument(level = "DEBUG", skip(self))]
    async fn unlock_session(&self, session_id: &SessionId) -> Result<(), AppError> {
        self.pool
            .del::<(), _>(session_processing_lock_key(session_id))
            .await
            .map_err(|err| AppError::DeleteFailed(err.to_string()))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.pool
            .set::<(), _, _>(
                health_check_key(),
                "trip-end-detection-service-health-check",
                Some(Expiration::EX(60)),
                None,
                false,
            )
            .await
            .map_err(|err| AppError::SetFailed(err.to_string()))?;

        let health_check_resp = self
            .pool
            .get::<Option<String>, _>(health_check_key())
            .await
            .map_err(|err| AppError::GetFailed(err.to_string()))?;

        if health_check_resp.is_none() {
            return Err(AppError::InternalError(
                "Health check failed as cannot get key from redis".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(millis: i64) -> LocationSample {
        LocationSample::new(
            Point {
                lat: Latitude(12.971_598_7),
                lon: Longitude(77.594_562_3),
            },
            Accuracy(7.5),
            TimeStamp::from_millis(millis).expect("valid timestamp"),
        )
        .expect("valid sample")
    }

    #[test]
    fn sorted_set_member_reads_back_as_the_same_sample() {
        let newer = sample(1_700_000_001_234);
        let older = sample(1_700_000_000_000);

        let members = vec![
            sample_member(&newer).expect("serialize"),
            sample_member(&older).expect("serialize"),
        ];

        assert_eq!(
            parse_samples(members).expect("deserialize"),
            vec![newer, older]
        );
    }

    #[test]
    fn sorted_set_score_is_capture_time_in_millis() {
        assert_eq!(sample_score(&sample(1_700_000_001_234)), 1_700_000_001_234.0);
    }

    #[test]
    fn malformed_member_is_a_deserialization_error() {
        assert!(matches!(
            parse_samples(vec!["{\"location\":".to_string()]),
            Err(AppError::DeserializationError(_))
        ));
    }
}
