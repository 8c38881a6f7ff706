/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::common::utils::distance_between_samples;
use crate::tools::logger::*;

/// Distances from the newest sample of a window to every older sample of it.
///
/// # Arguments
///
/// * `window` - Samples ordered newest first, `window[0]` being the reference.
///
/// # Returns
///
/// An empty series for windows shorter than two samples, otherwise `window.len() - 1`
/// distances in window order (increasing age of the compared sample).
pub fn distances_from_newest(window: &[LocationSample]) -> DistanceSeries {
    match window.split_first() {
        Some((newest, older)) => older
            .iter()
            .map(|sample| distance_between_samples(newest, sample))
            .collect(),
        None => Vec::new(),
    }
}

/// Whether every distance of the series is strictly within `trip_end_radius`.
///
/// An empty series is never stationary: there is not enough data to decide yet.
pub fn is_stationary(distances: &[f64], Radius(trip_end_radius): Radius) -> bool {
    let Some(max_distance) = distances.iter().copied().reduce(f64::max) else {
        return false;
    };

    debug!(
        tag = "[Trip End Detection]",
        max_distance = max_distance,
        trip_end_radius = trip_end_radius
    );

    max_distance < trip_end_radius
}

/// Decides whether the trip has ended from the count window and the time window.
///
/// # Arguments
///
/// * `count_window` - The newest filtered samples, newest first.
/// * `time_window` - Filtered samples captured within the trailing time horizon, newest first.
/// * `thresholds` - Trip end configuration.
///
/// # Returns
///
/// `true` only when the count window holds at least `min_count_window_size` samples, the time
/// window is not empty, and both windows are independently stationary.
pub fn is_trip_ended(
    count_window: &[LocationSample],
    time_window: &[LocationSample],
    thresholds: &TripEndThresholds,
) -> bool {
    if count_window.len() < thresholds.min_count_window_size || time_window.is_empty() {
        info!(
            tag = "[Trip End Detection]",
            count_window_length = count_window.len(),
            time_window_length = time_window.len(),
            "Not enough points to decide"
        );
        return false;
    }

    let count_window_distances = distances_from_newest(count_window);
    let time_window_distances = distances_from_newest(time_window);

    debug!(
        tag = "[Trip End Detection]",
        "count window distances = {:?}, time window distances = {:?}",
        count_window_distances,
        time_window_distances
    );

    let stopped_moving = is_stationary(&count_window_distances, thresholds.trip_end_radius)
        && is_stationary(&time_window_distances, thresholds.trip_end_radius);

    info!(tag = "[Trip End Detection]", stopped_moving = stopped_moving);

    stopped_moving
}
