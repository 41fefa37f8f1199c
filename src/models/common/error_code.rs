use crate::errors::LmsError;

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1029,

    // 认证
    AuthFailed = 2001,
    SessionExpired = 2002,

    // 评分
    GradeInvalid = 3001,
    PendingGradeMissing = 3002,
    AnswerNotFound = 3004,

    // 系统
    InternalServerError = 5000,
    BackendUnavailable = 5002,
}

impl From<&LmsError> for ErrorCode {
    fn from(err: &LmsError) -> Self {
        match err {
            LmsError::Validation(_) => ErrorCode::BadRequest,
            LmsError::Backend(_) => ErrorCode::BackendUnavailable,
            LmsError::NotFound(_) => ErrorCode::NotFound,
            LmsError::Authentication(_) => ErrorCode::AuthFailed,
            LmsError::Authorization(_) => ErrorCode::Forbidden,
            _ => ErrorCode::InternalServerError,
        }
    }
}
