/*!
 * 会话中间件
 *
 * 从 `Authorization: Bearer <token>` 解析出 [`Session`] 并放入请求扩展，
 * 之后的处理程序通过 [`RequireSession::extract_session`] 取用并显式传给服务层。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireSession;
 *
 * App::new()
 *     .service(
 *         web::scope("/api/v1/grading")
 *             .wrap(RequireSession)
 *             .route("/{kind}", web::get().to(grade_book_handler))
 *     )
 * ```
 *
 * ## 解析流程
 *
 * 1. 读取 Bearer 令牌，缺失时返回 401
 * 2. 配置了 `backend.cms.jwt_secret` 时先在本地校验签名和过期时间
 * 3. 查会话缓存，未命中时向后端确认用户并回填缓存
 * 4. 后端不可用时返回 502，而不是 401
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

use super::create_error_response;
use crate::backend::Backend;
use crate::errors::{LmsError, Result};
use crate::models::ErrorCode;
use crate::models::common::response::status_for;
use crate::session::{Session, SessionStore};
use crate::utils::jwt::CmsTokenVerifier;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireSession;

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

async fn resolve_session(req: &ServiceRequest, token: &str) -> Result<Session> {
    if let Some(verifier) = req.app_data::<web::Data<CmsTokenVerifier>>() {
        verifier.verify(token)?;
    }

    let store = req
        .app_data::<web::Data<SessionStore>>()
        .ok_or_else(|| LmsError::configuration("Session store not found in app data"))?
        .get_ref()
        .clone();
    let backend = req
        .app_data::<web::Data<Arc<dyn Backend>>>()
        .ok_or_else(|| LmsError::configuration("Backend not found in app data"))?
        .get_ref()
        .clone();

    store.resolve(token, backend.as_ref()).await
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            let Some(token) = bearer_token(&req) else {
                info!("Missing bearer token for request to {}", req.path());
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Missing or invalid Authorization header",
                    )
                    .map_into_right_body(),
                ));
            };

            match resolve_session(&req, &token).await {
                Ok(session) => {
                    debug!(
                        "Session resolved for user {} ({})",
                        session.user_id(),
                        session.role()
                    );
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    let status = status_for(&err);
                    let code = match &err {
                        LmsError::Authentication(_) => ErrorCode::SessionExpired,
                        other => ErrorCode::from(other),
                    };
                    if status == StatusCode::UNAUTHORIZED {
                        info!("Session rejected for request to {}: {}", req.path(), err);
                    } else {
                        warn!("Session lookup failed for request to {}: {}", req.path(), err);
                    }
                    Ok(req.into_response(
                        create_error_response(status, code, err.message()).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取会话信息
impl RequireSession {
    /// 从请求扩展中提取会话
    /// 此函数应该在应用了 RequireSession 中间件的路由处理程序中使用
    pub fn extract_session(req: &HttpRequest) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<Session>().map(Session::user_id)
    }
}
