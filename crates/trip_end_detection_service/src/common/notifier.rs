/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{types::*, utils::get_current_timestamp};
use crate::kafka::types::TripEndedEvent;
use crate::tools::error::AppError;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Announces trip ends to the rest of the system. Fire and forget: callers log failures and
/// carry on.
#[async_trait]
pub trait TripEndNotifier: Send + Sync {
    async fn notify_trip_ended(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError>;
}

/// Keeps every trip end event in memory.
#[derive(Debug, Default)]
pub struct InMemoryTripEndNotifier {
    events: Mutex<Vec<TripEndedEvent>>,
}

impl InMemoryTripEndNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<TripEndedEvent> {
        self.events.lock().await.to_owned()
    }
}

#[async_trait]
impl TripEndNotifier for InMemoryTripEndNotifier {
    async fn notify_trip_ended(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        self.events.lock().await.push(TripEndedEvent::new(
            session_id,
            sample,
            get_current_timestamp(),
        ));
        Ok(())
    }
}
