pub mod login;
pub mod logout;
pub mod profile;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::backend::Backend;
use crate::errors::Result;
use crate::session::SessionStore;

pub struct AuthService {
    backend: Option<Arc<dyn Backend>>,
    sessions: Option<SessionStore>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self {
            backend: None,
            sessions: None,
        }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Result<Arc<dyn Backend>> {
        match &self.backend {
            Some(backend) => Ok(backend.clone()),
            None => super::backend_from_app(request),
        }
    }

    pub(crate) fn get_sessions(&self, request: &HttpRequest) -> Result<SessionStore> {
        match &self.sessions {
            Some(sessions) => Ok(sessions.clone()),
            None => super::sessions_from_app(request),
        }
    }

    // 登录，打开会话
    pub async fn login(
        &self,
        login_request: crate::models::auth::requests::LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    // 登出，丢弃未保存的评分
    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(self, request).await
    }

    // 获取当前用户
    pub async fn get_user(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        profile::handle_get_user(self, request).await
    }
}
