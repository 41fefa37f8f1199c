//! 会话
//!
//! 登录时创建 [`Session`]，由 `RequireSession` 中间件在每个请求中解析后放入请求扩展，
//! 再显式传给服务层和后端；登出时清除会话及其未保存的评分。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::cache::{CacheResult, ObjectCache};
use crate::errors::{LmsError, Result};
use crate::grading::PendingEdits;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::users::entities::{SessionUser, UserRole};

/// 一次登录的上下文
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    pub opened_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
            opened_at: chrono::Utc::now(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// 用于日志的令牌摘要
    pub fn token_hint(&self) -> String {
        token_hint(&self.token)
    }
}

fn token_hint(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{tail}")
}

/// 会话内未保存的评分，测验与考试分开（两者的作答 id 可能重复）
#[derive(Debug, Default)]
pub struct GradingWorkspace {
    quiz: PendingEdits,
    exam: PendingEdits,
}

impl GradingWorkspace {
    pub fn edits(&self, kind: AssessmentKind) -> &PendingEdits {
        match kind {
            AssessmentKind::Quiz => &self.quiz,
            AssessmentKind::Exam => &self.exam,
        }
    }

    pub fn edits_mut(&mut self, kind: AssessmentKind) -> &mut PendingEdits {
        match kind {
            AssessmentKind::Quiz => &mut self.quiz,
            AssessmentKind::Exam => &mut self.exam,
        }
    }
}

pub type SharedWorkspace = Arc<Mutex<GradingWorkspace>>;

/// 会话存储：会话本体走对象缓存，评分工作区按令牌保存在内存中
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn ObjectCache>,
    workspaces: moka::future::Cache<String, SharedWorkspace>,
    ttl: u64,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn ObjectCache>, ttl: u64, max_capacity: u64) -> Self {
        let workspaces = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(Duration::from_secs(ttl))
            .build();
        Self {
            cache,
            workspaces,
            ttl,
        }
    }

    fn cache_key(token: &str) -> String {
        format!("session:{token}")
    }

    fn revoked_key(token: &str) -> String {
        format!("revoked:{token}")
    }

    /// 登录成功后创建会话
    pub async fn open(&self, token: impl Into<String>, user: SessionUser) -> Result<Session> {
        let session = Session::new(token, user);
        // 后端重新签发了同一令牌，视为新的登录
        self.cache.remove(&Self::revoked_key(&session.token)).await;
        self.remember(&session).await?;
        info!(
            "Session opened for user {} ({}) token {}",
            session.user.id,
            session.user.role,
            session.token_hint()
        );
        Ok(session)
    }

    async fn remember(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.cache
            .insert_raw(Self::cache_key(&session.token), json, self.ttl)
            .await;
        Ok(())
    }

    /// 解析令牌：先查缓存，未命中时向后端确认并回填
    pub async fn resolve(&self, token: &str, backend: &dyn Backend) -> Result<Session> {
        let key = Self::cache_key(token);
        match self.cache.get_raw(&key).await {
            CacheResult::Found(json) => match serde_json::from_str::<Session>(&json) {
                Ok(session) => return Ok(session),
                Err(_) => {
                    self.cache.remove(&key).await;
                    debug!("Dropped undecodable session for token {}", token_hint(token));
                }
            },
            CacheResult::NotFound => {
                debug!("Session not cached for token {}", token_hint(token));
            }
        }

        // 已登出的令牌在后端仍然有效，不能借回源重新打开会话
        if let CacheResult::Found(_) = self.cache.get_raw(&Self::revoked_key(token)).await {
            return Err(LmsError::authentication("Session has been closed"));
        }

        let user = backend.current_user(token).await?;
        let session = Session::new(token, user);
        self.remember(&session).await?;
        Ok(session)
    }

    /// 登出：清除会话和未保存的评分，令牌在会话有效期内不再被接受
    pub async fn close(&self, token: &str) {
        self.cache.remove(&Self::cache_key(token)).await;
        self.cache
            .insert_raw(Self::revoked_key(token), String::new(), self.ttl)
            .await;
        self.workspaces.invalidate(token).await;
        info!("Session closed for token {}", token_hint(token));
    }

    /// 获取（必要时创建）会话的评分工作区
    pub async fn workspace(&self, session: &Session) -> SharedWorkspace {
        self.workspaces
            .get_with(session.token.clone(), async {
                Arc::new(Mutex::new(GradingWorkspace::default()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::cache::MokaCacheWrapper;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MokaCacheWrapper::new(100, 60)), 60, 100)
    }

    fn lecturer() -> SessionUser {
        SessionUser {
            id: 5,
            username: "dosen".to_string(),
            email: None,
            role: UserRole::Lecturer,
            nim: None,
            full_name: Some("Dr. Andi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_open_then_resolve_from_cache() {
        let store = store();
        // 空后端无法识别令牌，能解析说明命中了缓存
        let backend = MemoryBackend::default();
        let opened = store.open("tok-1", lecturer()).await.unwrap();
        let resolved = store.resolve("tok-1", &backend).await.unwrap();
        assert_eq!(resolved, opened);
    }

    #[tokio::test]
    async fn test_resolve_unknown_token_fails() {
        let store = store();
        let backend = MemoryBackend::default();
        let err = store.resolve("nope", &backend).await.unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[tokio::test]
    async fn test_close_drops_session_and_pending_edits() {
        let store = store();
        let backend = MemoryBackend::default();
        let session = store.open("tok-2", lecturer()).await.unwrap();

        let workspace = store.workspace(&session).await;
        workspace
            .lock()
            .await
            .edits_mut(AssessmentKind::Quiz)
            .set(1, "80");

        let again = store.workspace(&session).await;
        assert_eq!(again.lock().await.edits(AssessmentKind::Quiz).get(1), Some("80"));
        assert!(again.lock().await.edits(AssessmentKind::Exam).is_empty());

        store.close("tok-2").await;
        assert!(store.resolve("tok-2", &backend).await.is_err());
        let fresh = store.workspace(&session).await;
        assert!(fresh.lock().await.edits(AssessmentKind::Quiz).is_empty());
    }

    #[tokio::test]
    async fn test_closed_token_is_not_reopened_from_backend() {
        use crate::backend::memory::{MemoryData, MemoryUser};

        let mut data = MemoryData::default();
        data.users.push(MemoryUser {
            profile: lecturer(),
            password_hash: crate::utils::password::hash_password("rahasia").unwrap(),
        });
        let backend = MemoryBackend::new(data);
        let grant = backend.authenticate("dosen", "rahasia").await.unwrap();

        let store = store();
        store.open(grant.token.clone(), grant.user.clone()).await.unwrap();
        store.close(&grant.token).await;

        // 后端仍认可该令牌，但会话已关闭
        assert!(backend.current_user(&grant.token).await.is_ok());
        let err = store.resolve(&grant.token, &backend).await.unwrap_err();
        assert_eq!(err.code(), "E004");

        // 重新登录拿到同一令牌时恢复可用
        store.open(grant.token.clone(), grant.user).await.unwrap();
        assert!(store.resolve(&grant.token, &backend).await.is_ok());
    }

    #[test]
    fn test_token_hint_keeps_tail_only() {
        assert_eq!(token_hint("abcdefghijkl"), "…ghijkl");
        assert_eq!(token_hint("abc"), "…abc");
    }
}
