use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::models::ApiResponse;
use crate::models::common::response::error_response;
use crate::services::current_session;

pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let session = current_session(request)?;
        let sessions = service.get_sessions(request)?;
        sessions.close(&session.token).await;
        Ok::<_, crate::errors::LmsError>(())
    }
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Logged out"))),
        Err(e) => Ok(error_response(&e)),
    }
}
