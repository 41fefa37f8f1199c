use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::models::auth::responses::UserInfoResponse;
use crate::models::common::response::error_response;
use crate::models::ApiResponse;
use crate::services::current_session;

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match current_session(request) {
        Ok(session) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse {
                user: session.user,
                session_opened_at: session.opened_at,
            },
            "User information retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
