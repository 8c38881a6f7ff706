/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::tools::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SessionId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
pub struct Accuracy(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
pub struct Radius(pub f64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(pub DateTime<Utc>);

impl TimeStamp {
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(TimeStamp)
    }

    /// Drops sub-millisecond precision, the resolution history stores index samples at.
    pub fn truncated_to_millis(&self) -> Self {
        Self::from_millis(self.as_millis()).unwrap_or(*self)
    }

    pub fn checked_sub_millis(&self, millis: u64) -> Option<Self> {
        let millis = i64::try_from(millis).ok()?;
        self.0
            .checked_sub_signed(Duration::milliseconds(millis))
            .map(TimeStamp)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lon: Longitude,
}

/// A single positioning fix as reported by the device.
///
/// Samples are built through [`LocationSample::new`], which rejects values that
/// must never reach the filtered history (negative accuracy, non-finite or
/// out-of-range coordinates).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LocationSample {
    pub location: Point,
    pub accuracy: Accuracy,
    pub captured_at: TimeStamp,
}

impl LocationSample {
    pub fn new(location: Point, accuracy: Accuracy, captured_at: TimeStamp) -> Result<Self, AppError> {
        let Latitude(lat) = location.lat;
        let Longitude(lon) = location.lon;
        let Accuracy(acc) = accuracy;

        if !lat.is_finite() || !lon.is_finite() {
            return Err(AppError::InvalidSample(format!(
                "Non finite coordinates : (Lat : {lat}, Lon : {lon})"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::InvalidSample(format!(
                "Coordinates out of range : (Lat : {lat}, Lon : {lon})"
            )));
        }
        if !acc.is_finite() || acc < 0.0 {
            return Err(AppError::InvalidSample(format!("Invalid accuracy : {acc}")));
        }

        Ok(LocationSample {
            location,
            accuracy,
            captured_at: captured_at.truncated_to_millis(),
        })
    }

    pub fn captured_at_ms(&self) -> i64 {
        self.captured_at.as_millis()
    }
}

/// Distances in meters from the newest sample of a window to each older one,
/// ordered by increasing age of the compared sample.
pub type DistanceSeries = Vec<f64>;

/// Closed interval of capture times `[from, to]` used to build the time window.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub from: TimeStamp,
    pub to: TimeStamp,
}

impl TimeWindow {
    /// Trailing window `[now - horizon - slack, now]`.
    pub fn ending_at(now: TimeStamp, thresholds: &TripEndThresholds) -> Self {
        let width = thresholds
            .time_horizon_ms
            .saturating_add(thresholds.time_horizon_slack_ms);
        let from = now
            .checked_sub_millis(width)
            .unwrap_or(TimeStamp(DateTime::<Utc>::MIN_UTC));
        TimeWindow { from, to: now }
    }

    pub fn contains(&self, ts: &TimeStamp) -> bool {
        self.from <= *ts && *ts <= self.to
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TripEndThresholds {
    pub accuracy_threshold: Accuracy,
    pub trip_end_radius: Radius,
    pub count_window_size: usize,
    pub min_count_window_size: usize,
    pub time_horizon_ms: u64,
    pub time_horizon_slack_ms: u64,
}

pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 200.0;
pub const TRIP_EDGE_THRESHOLD_METERS: f64 = 100.0;
pub const DEFAULT_COUNT_WINDOW_SIZE: usize = 10;
pub const DEFAULT_TIME_HORIZON_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_TIME_HORIZON_SLACK_MS: u64 = 10;

impl Default for TripEndThresholds {
    fn default() -> Self {
        Self {
            accuracy_threshold: Accuracy(DEFAULT_ACCURACY_THRESHOLD),
            trip_end_radius: Radius(TRIP_EDGE_THRESHOLD_METERS),
            count_window_size: DEFAULT_COUNT_WINDOW_SIZE,
            min_count_window_size: DEFAULT_COUNT_WINDOW_SIZE,
            time_horizon_ms: DEFAULT_TIME_HORIZON_MS,
            time_horizon_slack_ms: DEFAULT_TIME_HORIZON_SLACK_MS,
        }
    }
}

impl TripEndThresholds {
    pub fn validate(&self) -> Result<(), AppError> {
        let Accuracy(accuracy_threshold) = self.accuracy_threshold;
        let Radius(trip_end_radius) = self.trip_end_radius;

        if !(accuracy_threshold.is_finite() && accuracy_threshold > 0.0) {
            return Err(AppError::InvalidConfiguration(format!(
                "accuracy_threshold must be positive, got {accuracy_threshold}"
            )));
        }
        if !(trip_end_radius.is_finite() && trip_end_radius > 0.0) {
            return Err(AppError::InvalidConfiguration(format!(
                "trip_end_radius must be positive, got {trip_end_radius}"
            )));
        }
        if self.min_count_window_size == 0 {
            return Err(AppError::InvalidConfiguration(
                "min_count_window_size must be at least 1".to_string(),
            ));
        }
        // A count window is never longer than what gets fetched for it.
        if self.min_count_window_size > self.count_window_size {
            return Err(AppError::InvalidConfiguration(format!(
                "min_count_window_size ({}) exceeds count_window_size ({})",
                self.min_count_window_size, self.count_window_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseData {
    pub result: String,
}
