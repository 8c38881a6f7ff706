/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::common::{notifier::TripEndNotifier, types::*, utils::get_current_timestamp};
use crate::tools::{error::AppError, logger::*};
use async_trait::async_trait;
use rdkafka::{
    error::KafkaError,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
    ClientConfig,
};
use serde::Serialize;
use std::time::Duration;

pub async fn push_to_kafka<T>(
    producer: &Option<FutureProducer>,
    topic: &str,
    key: &str,
    message: T,
) -> Result<(), AppError>
where
    T: Serialize,
{
    let message = serde_json::to_string(&message)
        .map_err(|err| AppError::SerializationError(err.to_string()))?;

    match producer {
        Some(producer) => {
            producer
                .send(
                    FutureRecord::to(topic).key(key).payload(&message),
                    Timeout::After(Duration::from_secs(1)),
                )
                .await
                .map_err(|(err, _)| AppError::KafkaPushFailed(err.to_string()))?;
            Ok(())
        }
        None => {
            info!(tag = "[Kafka]", "Producer is None, unable to send message");
            Ok(())
        }
    }
}

/// Publishes trip end events on a Kafka topic, keyed by session id.
pub struct KafkaTripEndNotifier {
    producer: Option<FutureProducer>,
    topic: String,
}

impl KafkaTripEndNotifier {
    /// Connection failures are logged, the notifier then drops every event.
    pub fn new(kafka_key: String, kafka_host: String, topic: String) -> Self {
        let result: Result<FutureProducer, KafkaError> = ClientConfig::new()
            .set(kafka_key, kafka_host)
            .set("compression.type", "lz4")
            .create();

        let producer = match result {
            Ok(producer) => Some(producer),
            Err(err) => {
                error!(
                    tag = "[Kafka Connection]",
                    "Error connecting to kafka config: {err}"
                );
                None
            }
        };

        KafkaTripEndNotifier { producer, topic }
    }
}

#[async_trait]
impl TripEndNotifier for KafkaTripEndNotifier {
    async fn notify_trip_ended(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        let SessionId(key) = session_id;
        let message = TripEndedEvent::new(session_id, sample, get_current_timestamp());
        push_to_kafka(&self.producer, &self.topic, key.as_str(), message).await
    }
}
