use crate::models::users::entities::SessionUser;
use serde::Serialize;
use ts_rs::TS;

// 登录响应，access_token 即 CMS 令牌
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: SessionUser,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct UserInfoResponse {
    pub user: SessionUser,
    pub session_opened_at: chrono::DateTime<chrono::Utc>,
}
