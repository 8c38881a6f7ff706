/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{
    sample_filter::{filter_sample, FilterResult},
    trip_end_detection::is_trip_ended,
    types::*,
};
use crate::domain::types::ui::location::*;
use crate::environment::AppState;
use crate::sample_filter_outcome;
use crate::tools::{
    error::AppError,
    logger::*,
    prometheus::{SAMPLE_FILTER_OUTCOME, TOTAL_LOCATION_EVENTS, TRIP_END_DETECTED},
};

/// Runs a batch of location events of one session through the sample filter and the trip end
/// evaluator.
///
/// Every sample is validated before anything is written, so an invalid sample leaves the
/// histories untouched. Samples are then handled in capture time order while holding the
/// session's processing lock. `now` closes the time window of every evaluation in the batch.
pub async fn process_location_events(
    data: &AppState,
    session_id: SessionId,
    events: Vec<LocationEvent>,
    now: TimeStamp,
) -> Result<LocationUpdateResponse, AppError> {
    let mut outcomes = vec![SampleOutcome::Skipped; events.len()];

    let mut samples = events
        .into_iter()
        .enumerate()
        .filter_map(|(idx, event)| match event {
            LocationEvent::LocationChanged(LocationChangedEvent { pt, acc, ts }) => {
                Some(LocationSample::new(pt, acc, ts).map(|sample| (idx, sample)))
            }
            LocationEvent::LocationAvailability { available } => {
                debug!(tag = "[Location Events]", session_id = ?session_id, available = available, "Skipping availability event");
                None
            }
        })
        .collect::<Result<Vec<(usize, LocationSample)>, AppError>>()?;

    samples.sort_by_key(|(_, sample)| sample.captured_at);

    if !data
        .history_store
        .try_lock_session(&session_id, data.session_lock_expiry)
        .await?
    {
        let SessionId(session_id) = session_id;
        return Err(AppError::UnderProcessing(session_id));
    }

    let result = process_samples(data, &session_id, &samples, now, &mut outcomes).await;

    if let Err(err) = data.history_store.unlock_session(&session_id).await {
        error!(tag = "[Location Events]", session_id = ?session_id, "Failed to release session lock : {}", err.message());
    }

    let trip_ended = result?;

    Ok(LocationUpdateResponse {
        outcomes,
        trip_ended,
    })
}

async fn process_samples(
    data: &AppState,
    session_id: &SessionId,
    samples: &[(usize, LocationSample)],
    now: TimeStamp,
    outcomes: &mut [SampleOutcome],
) -> Result<bool, AppError> {
    let mut trip_ended = false;

    for (idx, sample) in samples {
        TOTAL_LOCATION_EVENTS.inc();

        let outcome = process_sample(data, session_id, sample, now).await?;
        sample_filter_outcome!(outcome.to_string().as_str());

        trip_ended |= outcome == SampleOutcome::TripEnded;
        if let Some(slot) = outcomes.get_mut(*idx) {
            *slot = outcome;
        }
    }

    Ok(trip_ended)
}

#[instrument(level = "DEBUG", skip(data))]
async fn process_sample(
    data: &AppState,
    session_id: &SessionId,
    sample: &LocationSample,
    now: TimeStamp,
) -> Result<SampleOutcome, AppError> {
    data.history_store
        .record_raw_sample(session_id, sample)
        .await?;

    let last_filtered = data
        .history_store
        .get_last_filtered_samples(session_id, 1)
        .await?
        .into_iter()
        .next();

    let admitted = match filter_sample(sample, last_filtered.as_ref(), &data.thresholds) {
        FilterResult::RejectLowAccuracy => {
            debug!(tag = "[Sample Filter]", session_id = ?session_id, accuracy = ?sample.accuracy, "Rejected low accuracy sample");
            return Ok(SampleOutcome::RejectedLowAccuracy);
        }
        FilterResult::RejectDuplicate => {
            debug!(tag = "[Sample Filter]", session_id = ?session_id, "Rejected duplicate sample");
            return Ok(SampleOutcome::RejectedDuplicate);
        }
        FilterResult::Admit(admitted) => admitted,
    };

    data.history_store
        .record_filtered_sample(session_id, &admitted)
        .await?;

    let count_window = data
        .history_store
        .get_last_filtered_samples(session_id, data.thresholds.count_window_size)
        .await?;
    let time_window = data
        .history_store
        .get_filtered_samples_in_range(session_id, &TimeWindow::ending_at(now, &data.thresholds))
        .await?;

    if !is_trip_ended(&count_window, &time_window, &data.thresholds) {
        return Ok(SampleOutcome::Admitted);
    }

    TRIP_END_DETECTED.inc();
    info!(tag = "[Trip End Detection]", session_id = ?session_id, "Trip ended");

    if let Err(err) = data
        .notifier
        .notify_trip_ended(session_id, &admitted)
        .await
    {
        error!(tag = "[Trip End Notification]", session_id = ?session_id, "Failed to notify trip end : {}", err.message());
    }

    Ok(SampleOutcome::TripEnded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{
        history::{HistoryStore, InMemoryHistoryStore},
        notifier::{InMemoryTripEndNotifier, TripEndNotifier},
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    const NOW_MS: i64 = 1_700_000_000_000;

    struct FailingNotifier;

    #[async_trait]
    impl TripEndNotifier for FailingNotifier {
        async fn notify_trip_ended(
            &self,
            _session_id: &SessionId,
            _sample: &LocationSample,
        ) -> Result<(), AppError> {
            Err(AppError::KafkaPushFailed("broker down".to_string()))
        }
    }

    fn changed(meters_north: f64, acc: f64, age_ms: i64) -> LocationEvent {
        LocationEvent::LocationChanged(LocationChangedEvent {
            pt: Point {
                lat: Latitude(12.9716 + meters_north / 111_195.0),
                lon: Longitude(77.5946),
            },
            acc: Accuracy(acc),
            ts: TimeStamp::from_millis(NOW_MS - age_ms).expect("valid timestamp"),
        })
    }

    fn now() -> TimeStamp {
        TimeStamp::from_millis(NOW_MS).expect("valid timestamp")
    }

    fn stationary_events() -> Vec<LocationEvent> {
        (0..10)
            .map(|i| changed(i as f64, 5.0, (10 - i) * 1_000))
            .collect()
    }

    #[tokio::test]
    async fn trip_end_is_evaluated_against_the_given_clock() {
        let notifier = Arc::new(InMemoryTripEndNotifier::new());
        let data = AppState::with_collaborators(
            Arc::new(InMemoryHistoryStore::new(3600)),
            notifier.clone(),
            TripEndThresholds::default(),
        )
        .expect("valid thresholds");

        let resp = process_location_events(
            &data,
            SessionId("session-1".to_string()),
            stationary_events(),
            now(),
        )
        .await
        .expect("processed");

        assert!(resp.trip_ended);
        assert_eq!(resp.outcomes[9], SampleOutcome::TripEnded);

        let events = notifier.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ts.as_millis(), NOW_MS - 1_000);
    }

    #[tokio::test]
    async fn samples_ahead_of_the_clock_are_outside_the_time_window() {
        let data = AppState::with_collaborators(
            Arc::new(InMemoryHistoryStore::new(3600)),
            Arc::new(InMemoryTripEndNotifier::new()),
            TripEndThresholds::default(),
        )
        .expect("valid thresholds");
        let earlier = TimeStamp::from_millis(NOW_MS - 60 * 60 * 1_000).expect("valid timestamp");

        let resp = process_location_events(
            &data,
            SessionId("session-1".to_string()),
            stationary_events(),
            earlier,
        )
        .await
        .expect("processed");

        assert!(!resp.trip_ended);
        assert_eq!(resp.outcomes, vec![SampleOutcome::Admitted; 10]);
    }

    #[tokio::test]
    async fn notifier_failure_does_not_fail_the_update() {
        let store = Arc::new(InMemoryHistoryStore::new(3600));
        let data = AppState::with_collaborators(
            store.clone(),
            Arc::new(FailingNotifier),
            TripEndThresholds::default(),
        )
        .expect("valid thresholds");
        let session_id = SessionId("session-1".to_string());

        let resp = process_location_events(&data, session_id.clone(), stationary_events(), now())
            .await
            .expect("processed");

        assert!(resp.trip_ended);
        assert!(store
            .try_lock_session(&session_id, 10)
            .await
            .expect("lock"));
    }

    #[tokio::test]
    async fn sessions_do_not_share_history() {
        let data = AppState::with_collaborators(
            Arc::new(InMemoryHistoryStore::new(3600)),
            Arc::new(InMemoryTripEndNotifier::new()),
            TripEndThresholds::default(),
        )
        .expect("valid thresholds");

        let first = process_location_events(
            &data,
            SessionId("session-1".to_string()),
            vec![changed(0.0, 5.0, 2_000)],
            now(),
        )
        .await
        .expect("processed");
        let second = process_location_events(
            &data,
            SessionId("session-2".to_string()),
            vec![changed(0.0, 5.0, 1_000)],
            now(),
        )
        .await
        .expect("processed");

        assert_eq!(first.outcomes, vec![SampleOutcome::Admitted]);
        assert_eq!(second.outcomes, vec![SampleOutcome::Admitted]);
    }
}
