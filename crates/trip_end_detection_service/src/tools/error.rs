/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_message: String,
    pub error_code: String,
}

#[derive(Debug, Serialize, thiserror::Error)]
pub enum AppError {
    #[error("INTERNAL_ERROR")]
    InternalError(String),
    #[error("INVALID_REQUEST")]
    InvalidRequest(String),
    #[error("UNPROCESSIBLE_REQUEST")]
    UnprocessibleRequest(String),
    #[error("LARGE_PAYLOAD_SIZE")]
    LargePayloadSize(usize, usize),
    #[error("REQUEST_TIMEOUT")]
    RequestTimeout,
    #[error("INVALID_SAMPLE")]
    InvalidSample(String),
    #[error("UNDER_PROCESSING")]
    UnderProcessing(String),
    #[error("INVALID_CONFIGURATION")]
    InvalidConfiguration(String),
    #[error("SERIALIZATION_ERROR")]
    SerializationError(String),
    #[error("DESERIALIZATION_ERROR")]
    DeserializationError(String),
    #[error("REDIS_CONNECTION_ERROR")]
    RedisConnectionError(String),
    #[error("SET_FAILED")]
    SetFailed(String),
    #[error("GET_FAILED")]
    GetFailed(String),
    #[error("DELETE_FAILED")]
    DeleteFailed(String),
    #[error("SET_EXPIRY_FAILED")]
    SetExpiryFailed(String),
    #[error("Z_ADD_FAILED")]
    ZAddFailed(String),
    #[error("Z_RANGE_FAILED")]
    ZRangeFailed(String),
    #[error("KAFKA_PUSH_FAILED")]
    KafkaPushFailed(String),
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::InvalidSample(err) => format!("Invalid Location Sample : {err}"),
            AppError::UnderProcessing(session_id) => {
                format!("Location update already under processing for session : {session_id}")
            }
            AppError::InvalidConfiguration(err) => format!("Invalid Configuration : {err}"),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::RedisConnectionError(err) => format!("Redis Connection Error : {err}"),
            AppError::SetFailed(err)
            | AppError::GetFailed(err)
            | AppError::DeleteFailed(err)
            | AppError::SetExpiryFailed(err)
            | AppError::ZAddFailed(err)
            | AppError::ZRangeFailed(err) => format!("Redis Error : {err}"),
            AppError::KafkaPushFailed(reason) => format!("Kafka Push Failed : {reason}"),
            AppError::RequestTimeout => "Request Timed Out".to_string(),
        }
    }

    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::InvalidSample(_) => StatusCode::BAD_REQUEST,
            AppError::UnderProcessing(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RedisConnectionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GetFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetExpiryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ZAddFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ZRangeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::KafkaPushFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
