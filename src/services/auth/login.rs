use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::{LmsError, Result};
use crate::models::auth::{requests::LoginRequest, responses::LoginResponse};
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

async fn login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> Result<LoginResponse> {
    let identifier = login_request.identifier.trim();
    if identifier.is_empty() || login_request.password.is_empty() {
        return Err(LmsError::validation("Identifier and password are required"));
    }

    let backend = service.get_backend(request)?;
    let sessions = service.get_sessions(request)?;

    let grant = backend
        .authenticate(identifier, &login_request.password)
        .await?;
    let session = sessions.open(grant.token, grant.user).await?;

    info!(
        "User {} logged in via {} backend",
        session.user.username,
        backend.name()
    );

    Ok(LoginResponse {
        access_token: session.token,
        user: session.user,
        created_at: session.opened_at,
    })
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match login(service, login_request, request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful"))),
        Err(LmsError::Authentication(_)) => Ok(HttpResponse::Unauthorized().json(
            ApiResponse::error_empty(ErrorCode::AuthFailed, "Username or password is incorrect"),
        )),
        Err(e) => Ok(error_response(&e)),
    }
}
