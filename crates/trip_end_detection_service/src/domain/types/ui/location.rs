/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LocationChangedEvent {
    pub pt: Point,
    pub acc: Accuracy,
    pub ts: TimeStamp,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationEvent {
    LocationChanged(LocationChangedEvent),
    LocationAvailability { available: bool },
}

#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, Eq, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleOutcome {
    Admitted,
    RejectedLowAccuracy,
    RejectedDuplicate,
    Skipped,
    TripEnded,
}

/// `outcomes[i]` is the outcome of the i-th event of the request.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateResponse {
    pub outcomes: Vec<SampleOutcome>,
    pub trip_ended: bool,
}
