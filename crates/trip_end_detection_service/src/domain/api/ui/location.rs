/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    post,
    web::{Data, Json, Path},
};

use crate::{
    common::{types::*, utils::get_current_timestamp},
    domain::{action::ui::location, types::ui::location::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/ui/session/{sessionId}/location")]
pub async fn update_session_location(
    data: Data<AppState>,
    path: Path<String>,
    param_obj: Json<Vec<LocationEvent>>,
) -> Result<Json<LocationUpdateResponse>, AppError> {
    let session_id = SessionId(path.into_inner());
    let request_body = param_obj.into_inner();

    if request_body.is_empty() {
        return Err(AppError::InvalidRequest(
            "Vec<LocationEvent> is empty".to_string(),
        ));
    }

    Ok(Json(
        location::process_location_events(
            &data,
            session_id,
            request_body,
            get_current_timestamp(),
        )
        .await?,
    ))
}
