use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::LmsError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 错误对应的 HTTP 状态码
pub fn status_for(err: &LmsError) -> StatusCode {
    match err {
        LmsError::Validation(_) => StatusCode::BAD_REQUEST,
        LmsError::Authentication(_) => StatusCode::UNAUTHORIZED,
        LmsError::Authorization(_) => StatusCode::FORBIDDEN,
        LmsError::NotFound(_) => StatusCode::NOT_FOUND,
        LmsError::Backend(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将业务错误转换为统一响应
pub fn error_response(err: &LmsError) -> HttpResponse {
    error_response_with(ErrorCode::from(err), err)
}

/// 同上，但使用更具体的业务错误码
pub fn error_response_with(code: ErrorCode, err: &LmsError) -> HttpResponse {
    HttpResponse::build(status_for(err))
        .json(ApiResponse::error_empty(code, err.message().to_string()))
}
