/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TripEndedEvent {
    pub s_id: SessionId,
    pub pt: Point,
    pub acc: Accuracy,
    pub ts: TimeStamp,
    pub st: TimeStamp,
}

impl TripEndedEvent {
    pub fn new(session_id: &SessionId, sample: &LocationSample, sent_at: TimeStamp) -> Self {
        TripEndedEvent {
            s_id: session_id.to_owned(),
            pt: sample.location,
            acc: sample.accuracy,
            ts: sample.captured_at,
            st: sent_at,
        }
    }
}
