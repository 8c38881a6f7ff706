/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::common::utils::distance_between_samples;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    Admit(LocationSample),
    RejectLowAccuracy,
    RejectDuplicate,
}

/// Decides whether a raw sample is admitted into the filtered history used for trip end analysis.
///
/// # Arguments
///
/// * `raw` - The newly observed sample.
/// * `last_filtered` - The most recently *admitted* sample of the session, if any.
/// * `thresholds` - Trip end configuration, only `accuracy_threshold` is used here.
///
/// # Returns
///
/// * `RejectLowAccuracy` when `raw.accuracy >= accuracy_threshold`.
/// * `Admit(raw)` when there is nothing admitted yet, so that duplicates have a baseline.
/// * `RejectDuplicate` when `raw` sits at exactly zero distance from `last_filtered`.
/// * `Admit(raw)` otherwise.
pub fn filter_sample(
    raw: &LocationSample,
    last_filtered: Option<&LocationSample>,
    thresholds: &TripEndThresholds,
) -> FilterResult {
    if raw.accuracy >= thresholds.accuracy_threshold {
        return FilterResult::RejectLowAccuracy;
    }

    match last_filtered {
        None => FilterResult::Admit(*raw),
        Some(last_filtered) => {
            if distance_between_samples(raw, last_filtered) == 0.0 {
                FilterResult::RejectDuplicate
            } else {
                FilterResult::Admit(*raw)
            }
        }
    }
}
