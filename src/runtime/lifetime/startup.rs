use crate::backend::{Backend, create_backend, register::debug_backend_registry};
use crate::cache::MokaCacheWrapper;
use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::utils::jwt::CmsTokenVerifier;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionStore,
    /// 配置了 CMS 密钥时在本地先行校验令牌
    pub verifier: Option<CmsTokenVerifier>,
}

/// 创建会话存储
fn create_sessions() -> SessionStore {
    let config = AppConfig::get();
    let cache = Arc::new(MokaCacheWrapper::from_config());
    SessionStore::new(cache, config.session.ttl, config.session.max_capacity)
}

/// 准备服务器启动的上下文
/// 包括后端、会话存储和令牌校验器
pub async fn prepare_server_startup() -> StartupContext {
    let config = AppConfig::get();

    if cfg!(debug_assertions) {
        debug_backend_registry();
        debug!("Debug mode: Backend registry is enabled");
    }

    let backend_type = &config.backend.backend_type;
    warn!("Attempting to create {} backend", backend_type);
    let backend = create_backend(backend_type)
        .await
        .expect("Failed to create grading backend");
    warn!("Backend {} initialized", backend.name());

    let sessions = create_sessions();
    warn!(
        "Session store initialized (ttl {}s, capacity {})",
        config.session.ttl, config.session.max_capacity
    );

    // 内存后端用自己的密钥签发令牌
    let verifier = match backend.name() {
        "cms" => CmsTokenVerifier::from_config(),
        _ => None,
    };
    if verifier.is_none() {
        debug!("Local token verification disabled, tokens are checked by the backend only");
    }

    StartupContext {
        backend,
        sessions,
        verifier,
    }
}
