/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::tools::error::AppError;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::time::Duration;
use tokio::{sync::RwLock, time::Instant};

/// Storage of the raw and filtered sample histories of every session.
///
/// Retention is the store's concern: the windows read back from it are bounded views used for
/// evaluation only. Reads return samples newest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record_raw_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError>;

    async fn record_filtered_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError>;

    async fn get_last_filtered_samples(
        &self,
        session_id: &SessionId,
        count: usize,
    ) -> Result<Vec<LocationSample>, AppError>;

    /// Filtered samples captured within `window`, bounds inclusive.
    async fn get_filtered_samples_in_range(
        &self,
        session_id: &SessionId,
        window: &TimeWindow,
    ) -> Result<Vec<LocationSample>, AppError>;

    /// Takes the processing lock of a session, `false` when someone else holds it.
    async fn try_lock_session(&self, session_id: &SessionId, expiry: u32)
        -> Result<bool, AppError>;

    async fn unlock_session(&self, session_id: &SessionId) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
struct SessionHistory {
    raw: Vec<LocationSample>,
    filtered: Vec<LocationSample>,
    last_written: Instant,
}

impl SessionHistory {
    fn new(now: Instant) -> Self {
        SessionHistory {
            raw: Vec::new(),
            filtered: Vec::new(),
            last_written: now,
        }
    }
}

/// Keeps `samples` sorted by capture time, later arrivals after equal capture times.
fn insert_in_capture_order(samples: &mut Vec<LocationSample>, sample: LocationSample) {
    let idx = samples.partition_point(|s| s.captured_at <= sample.captured_at);
    samples.insert(idx, sample);
}

/// Process local history, for single instance deployments and tests.
///
/// Histories are kept in capture order and a session is dropped once it has not been written
/// to for `history_expiry`. Expired sessions are swept on every write.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<FxHashMap<SessionId, SessionHistory>>,
    locked_sessions: RwLock<FxHashMap<SessionId, Instant>>,
    history_expiry: Duration,
}

impl InMemoryHistoryStore {
    pub fn new(history_expiry: u32) -> Self {
        InMemoryHistoryStore {
            sessions: RwLock::new(FxHashMap::default()),
            locked_sessions: RwLock::new(FxHashMap::default()),
            history_expiry: Duration::from_secs(history_expiry.into()),
        }
    }

    pub async fn get_raw_samples(&self, session_id: &SessionId) -> Vec<LocationSample> {
        self.read_history(session_id, |history| {
            history.raw.iter().rev().copied().collect()
        })
        .await
    }

    fn is_live(&self, history: &SessionHistory, now: Instant) -> bool {
        now.duration_since(history.last_written) < self.history_expiry
    }

    async fn write_history(
        &self,
        session_id: &SessionId,
        write: impl FnOnce(&mut SessionHistory),
    ) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, history| self.is_live(history, now));

        let history = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| SessionHistory::new(now));
        history.last_written = now;
        write(history);
    }

    async fn read_history(
        &self,
        session_id: &SessionId,
        read: impl FnOnce(&SessionHistory) -> Vec<LocationSample>,
    ) -> Vec<LocationSample> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(session_id)
            .filter(|history| self.is_live(history, now))
            .map(read)
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record_raw_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        self.write_history(session_id, |history| {
            insert_in_capture_order(&mut history.raw, *sample)
        })
        .await;
        Ok(())
    }

    async fn record_filtered_sample(
        &self,
        session_id: &SessionId,
        sample: &LocationSample,
    ) -> Result<(), AppError> {
        self.write_history(session_id, |history| {
            insert_in_capture_order(&mut history.filtered, *sample)
        })
        .await;
        Ok(())
    }

    async fn get_last_filtered_samples(
        &self,
        session_id: &SessionId,
        count: usize,
    ) -> Result<Vec<LocationSample>, AppError> {
        Ok(self
            .read_history(session_id, |history| {
                history.filtered.iter().rev().take(count).copied().collect()
            })
            .await)
    }

    async fn get_filtered_samples_in_range(
        &self,
        session_id: &SessionId,
        window: &TimeWindow,
    ) -> Result<Vec<LocationSample>, AppError> {
        Ok(self
            .read_history(session_id, |history| {
                let start = history
                    .filtered
                    .partition_point(|sample| sample.captured_at < window.from);
                let end = history
                    .filtered
                    .partition_point(|sample| sample.captured_at <= window.to);
                history
                    .filtered
                    .get(start..end)
                    .map(|samples| samples.iter().rev().copied().collect())
                    .unwrap_or_default()
            })
            .await)
    }

    async fn try_lock_session(
        &self,
        session_id: &SessionId,
        expiry: u32,
    ) -> Result<bool, AppError> {
        let now = Instant::now();
        let mut locked_sessions = self.locked_sessions.write().await;
        match locked_sessions.get(session_id) {
            Some(expires_at) if *expires_at > now => Ok(false),
            _ => {
                locked_sessions.insert(
                    session_id.to_owned(),
                    now + Duration::from_secs(expiry.into()),
                );
                Ok(true)
            }
        }
    }

    async fn unlock_session(&self, session_id: &SessionId) -> Result<(), AppError> {
        self.locked_sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
