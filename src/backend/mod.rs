//! 后端协作方（无头 CMS）
//!
//! 网关本身不保存任何实体，所有读写都经过 [`Backend`]。
//! 具体实现通过 `backend.type` 在注册表中选择：`cms`（HTTP）或 `memory`（本地数据集）。

use std::sync::Arc;

use crate::errors::Result;
use crate::models::academics::entities::{Course, Meeting};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};
use crate::models::users::entities::SessionUser;
use crate::session::Session;

pub mod cms;
pub mod memory;
pub mod register;

/// 读取范围
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// `None` 不限制课程；`Some(vec![])` 表示没有任何课程
    pub course_ids: Option<Vec<i64>>,
    /// 只取该学生的作答
    pub student_id: Option<i64>,
}

impl Scope {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn courses(course_ids: Vec<i64>) -> Self {
        Self {
            course_ids: Some(course_ids),
            student_id: None,
        }
    }

    pub fn student(student_id: i64) -> Self {
        Self {
            course_ids: None,
            student_id: Some(student_id),
        }
    }

    /// 范围为空时无需请求后端
    pub fn is_nothing(&self) -> bool {
        self.course_ids.as_ref().is_some_and(Vec::is_empty)
    }

    pub fn allows_course(&self, course_id: Option<i64>) -> bool {
        match (&self.course_ids, course_id) {
            (None, _) => true,
            (Some(ids), Some(id)) => ids.contains(&id),
            (Some(_), None) => false,
        }
    }
}

/// 登录成功后后端签发的凭据
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: String,
    pub user: SessionUser,
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// 后端名称（用于日志、状态接口）
    fn name(&self) -> &'static str;

    /// 认证
    // 用户名/邮箱 + 密码换取令牌
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthGrant>;
    // 通过令牌获取当前用户（含角色）
    async fn current_user(&self, token: &str) -> Result<SessionUser>;

    /// 课程结构
    // 列出课程，指定讲师时只返回其任教的课程
    async fn fetch_courses(&self, session: &Session, lecturer_id: Option<i64>)
    -> Result<Vec<Course>>;
    // 列出范围内课程的 meeting
    async fn fetch_meetings(&self, session: &Session, scope: &Scope) -> Result<Vec<Meeting>>;

    /// 测验/考试
    async fn fetch_containers(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Container>>;
    async fn fetch_questions(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Question>>;
    async fn fetch_answers(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Answer>>;

    /// 写入单条作答的评分（部分更新，不会删除重建）
    async fn update_answer_grade(
        &self,
        session: &Session,
        kind: AssessmentKind,
        answer_id: i64,
        grade: f64,
    ) -> Result<Answer>;
}

pub async fn create_backend(backend_type: &str) -> Result<Arc<dyn Backend>> {
    let constructor = register::get_backend_plugin(backend_type).ok_or_else(|| {
        crate::errors::LmsError::backend_plugin_not_found(format!(
            "Backend '{backend_type}' is not registered"
        ))
    })?;
    let backend = constructor().await?;
    Ok(Arc::from(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_course_rules() {
        assert!(Scope::unrestricted().allows_course(None));
        assert!(Scope::courses(vec![1]).allows_course(Some(1)));
        assert!(!Scope::courses(vec![1]).allows_course(Some(2)));
        assert!(!Scope::courses(vec![1]).allows_course(None));
        assert!(Scope::courses(vec![]).is_nothing());
        assert!(!Scope::student(3).is_nothing());
    }
}
