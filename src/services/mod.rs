pub mod auth;
pub mod grading;
pub mod system;

pub use auth::AuthService;
pub use grading::GradingService;
pub use system::SystemService;

use std::sync::Arc;

use actix_web::{HttpRequest, web};

use crate::backend::Backend;
use crate::errors::{LmsError, Result};
use crate::middlewares::RequireSession;
use crate::session::{Session, SessionStore};

pub(crate) fn backend_from_app(request: &HttpRequest) -> Result<Arc<dyn Backend>> {
    request
        .app_data::<web::Data<Arc<dyn Backend>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| LmsError::configuration("Backend not found in app data"))
}

pub(crate) fn sessions_from_app(request: &HttpRequest) -> Result<SessionStore> {
    request
        .app_data::<web::Data<SessionStore>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| LmsError::configuration("Session store not found in app data"))
}

pub(crate) fn current_session(request: &HttpRequest) -> Result<Session> {
    RequireSession::extract_session(request)
        .ok_or_else(|| LmsError::authentication("Authentication required"))
}
