//! 内存后端
//!
//! 从 JSON 数据集加载，行为与 CMS 一致（令牌格式、范围过滤、部分更新），
//! 用于本地开发和测试。

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{AuthGrant, Backend, Scope};
use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use crate::grading::GradingSources;
use crate::models::academics::entities::{Course, Meeting};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};
use crate::models::users::entities::SessionUser;
use crate::session::Session;
use crate::utils::jwt::{CmsTokenVerifier, issue_token};
use crate::utils::password::verify_password;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryUser {
    #[serde(flatten)]
    pub profile: SessionUser,
    /// argon2 哈希
    pub password_hash: String,
}

/// 数据集，字段与 CMS 的集合一一对应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryData {
    pub users: Vec<MemoryUser>,
    pub courses: Vec<Course>,
    pub meetings: Vec<Meeting>,
    pub quizzes: Vec<Container>,
    pub exams: Vec<Container>,
    pub quiz_questions: Vec<Question>,
    pub exam_questions: Vec<Question>,
    pub quiz_answers: Vec<Answer>,
    pub exam_answers: Vec<Answer>,
}

impl MemoryData {
    pub fn from_sources(sources: &GradingSources) -> Self {
        let mut data = Self::default();
        data.absorb(sources);
        data
    }

    /// 合并一份数据，课程和 meeting 按 id 去重
    pub fn absorb(&mut self, sources: &GradingSources) {
        for course in &sources.courses {
            if !self.courses.iter().any(|c| c.id == course.id) {
                self.courses.push(course.clone());
            }
        }
        for meeting in &sources.meetings {
            if !self.meetings.iter().any(|m| m.id == meeting.id) {
                self.meetings.push(meeting.clone());
            }
        }
        let kind = sources.kind;
        self.containers_mut(kind)
            .extend(sources.containers.iter().cloned());
        self.questions_mut(kind)
            .extend(sources.questions.iter().cloned());
        self.answers_mut(kind).extend(sources.answers.iter().cloned());
    }

    fn containers(&self, kind: AssessmentKind) -> &[Container] {
        match kind {
            AssessmentKind::Quiz => &self.quizzes,
            AssessmentKind::Exam => &self.exams,
        }
    }

    fn containers_mut(&mut self, kind: AssessmentKind) -> &mut Vec<Container> {
        match kind {
            AssessmentKind::Quiz => &mut self.quizzes,
            AssessmentKind::Exam => &mut self.exams,
        }
    }

    fn questions(&self, kind: AssessmentKind) -> &[Question] {
        match kind {
            AssessmentKind::Quiz => &self.quiz_questions,
            AssessmentKind::Exam => &self.exam_questions,
        }
    }

    fn questions_mut(&mut self, kind: AssessmentKind) -> &mut Vec<Question> {
        match kind {
            AssessmentKind::Quiz => &mut self.quiz_questions,
            AssessmentKind::Exam => &mut self.exam_questions,
        }
    }

    fn answers(&self, kind: AssessmentKind) -> &[Answer] {
        match kind {
            AssessmentKind::Quiz => &self.quiz_answers,
            AssessmentKind::Exam => &self.exam_answers,
        }
    }

    fn answers_mut(&mut self, kind: AssessmentKind) -> &mut Vec<Answer> {
        match kind {
            AssessmentKind::Quiz => &mut self.quiz_answers,
            AssessmentKind::Exam => &mut self.exam_answers,
        }
    }

    fn container_course(&self, container: &Container) -> Option<i64> {
        let parent_id = container.parent_id?;
        match container.kind {
            AssessmentKind::Quiz => self
                .meetings
                .iter()
                .find(|m| m.id == parent_id)
                .and_then(|m| m.course_id),
            AssessmentKind::Exam => Some(parent_id),
        }
    }

    fn question_course(&self, question: &Question) -> Option<i64> {
        let container_id = question.container_id?;
        self.containers(question.kind)
            .iter()
            .find(|c| c.id == container_id)
            .and_then(|c| self.container_course(c))
    }

    fn answer_course(&self, answer: &Answer) -> Option<i64> {
        let question_id = answer.question_id?;
        self.questions(answer.kind)
            .iter()
            .find(|q| q.id == question_id)
            .and_then(|q| self.question_course(q))
    }
}

pub struct MemoryBackend {
    data: RwLock<MemoryData>,
    token_secret: String,
    token_ttl: chrono::Duration,
    verifier: CmsTokenVerifier,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(MemoryData::default())
    }
}

impl MemoryBackend {
    pub fn new(data: MemoryData) -> Self {
        let defaults = crate::config::MemoryBackendConfig::default();
        Self::with_token_settings(data, &defaults.token_secret, defaults.token_ttl)
    }

    fn with_token_settings(data: MemoryData, secret: &str, ttl_secs: i64) -> Self {
        Self {
            data: RwLock::new(data),
            token_secret: secret.to_string(),
            token_ttl: chrono::Duration::seconds(ttl_secs),
            verifier: CmsTokenVerifier::new(secret),
        }
    }

    pub fn from_config() -> Result<Self> {
        let config = &AppConfig::get().backend.memory;

        let data = if config.fixture_path.is_empty() {
            warn!("No fixture configured for memory backend, starting with an empty dataset");
            MemoryData::default()
        } else {
            let raw = std::fs::read_to_string(&config.fixture_path)?;
            let data: MemoryData = serde_json::from_str(&raw)?;
            info!(
                "Memory backend loaded {}: {} users, {} courses, {} quiz answers, {} exam answers",
                config.fixture_path,
                data.users.len(),
                data.courses.len(),
                data.quiz_answers.len(),
                data.exam_answers.len()
            );
            data
        };

        Ok(Self::with_token_settings(
            data,
            &config.token_secret,
            config.token_ttl,
        ))
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthGrant> {
        let data = self.data.read().await;
        let identifier = identifier.trim();
        let user = data
            .users
            .iter()
            .find(|u| {
                u.profile.username == identifier
                    || u.profile
                        .email
                        .as_deref()
                        .is_some_and(|e| e.eq_ignore_ascii_case(identifier))
            })
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or_else(|| LmsError::authentication("Invalid identifier or password"))?;

        let token = issue_token(&self.token_secret, user.profile.id, self.token_ttl)?;
        Ok(AuthGrant {
            token,
            user: user.profile.clone(),
        })
    }

    async fn current_user(&self, token: &str) -> Result<SessionUser> {
        let claims = self.verifier.verify(token)?;
        let data = self.data.read().await;
        data.users
            .iter()
            .find(|u| u.profile.id == claims.id)
            .map(|u| u.profile.clone())
            .ok_or_else(|| LmsError::authentication("User no longer exists"))
    }

    async fn fetch_courses(
        &self,
        _session: &Session,
        lecturer_id: Option<i64>,
    ) -> Result<Vec<Course>> {
        let data = self.data.read().await;
        Ok(data
            .courses
            .iter()
            .filter(|c| lecturer_id.is_none_or(|id| c.is_taught_by(id)))
            .cloned()
            .collect())
    }

    async fn fetch_meetings(&self, _session: &Session, scope: &Scope) -> Result<Vec<Meeting>> {
        let data = self.data.read().await;
        Ok(data
            .meetings
            .iter()
            .filter(|m| scope.allows_course(m.course_id))
            .cloned()
            .collect())
    }

    async fn fetch_containers(
        &self,
        _session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Container>> {
        let data = self.data.read().await;
        Ok(data
            .containers(kind)
            .iter()
            .filter(|c| scope.allows_course(data.container_course(c)))
            .cloned()
            .collect())
    }

    async fn fetch_questions(
        &self,
        _session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Question>> {
        let data = self.data.read().await;
        Ok(data
            .questions(kind)
            .iter()
            .filter(|q| scope.allows_course(data.question_course(q)))
            .cloned()
            .collect())
    }

    async fn fetch_answers(
        &self,
        _session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Answer>> {
        let data = self.data.read().await;
        let answers: Vec<Answer> = data
            .answers(kind)
            .iter()
            .filter(|a| {
                scope.student_id.is_none_or(|sid| {
                    a.student.as_ref().is_some_and(|student| student.id == sid)
                })
            })
            .filter(|a| scope.allows_course(data.answer_course(a)))
            .cloned()
            .collect();
        debug!("Memory backend returned {} {} answers", answers.len(), kind);
        Ok(answers)
    }

    async fn update_answer_grade(
        &self,
        _session: &Session,
        kind: AssessmentKind,
        answer_id: i64,
        grade: f64,
    ) -> Result<Answer> {
        let mut data = self.data.write().await;
        let answer = data
            .answers_mut(kind)
            .iter_mut()
            .find(|a| a.id == answer_id)
            .ok_or_else(|| LmsError::not_found(format!("{kind} answer {answer_id} not found")))?;
        answer.grade = Some(grade);
        Ok(answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::test_support::{exam_sources, quiz_sources};
    use crate::models::users::entities::UserRole;
    use crate::utils::password::hash_password;

    fn user(id: i64, username: &str, role: UserRole) -> SessionUser {
        SessionUser {
            id,
            username: username.to_string(),
            email: Some(format!("{username}@kampus.ac.id")),
            role,
            nim: None,
            full_name: None,
        }
    }

    fn session(profile: SessionUser) -> Session {
        Session::new("tok", profile)
    }

    fn backend_with_user() -> MemoryBackend {
        let mut data = MemoryData::from_sources(&quiz_sources());
        data.absorb(&exam_sources());
        data.users.push(MemoryUser {
            profile: user(5, "dosen", UserRole::Lecturer),
            password_hash: hash_password("rahasia").unwrap(),
        });
        MemoryBackend::new(data)
    }

    #[tokio::test]
    async fn test_login_then_resolve_token() {
        let backend = backend_with_user();
        let grant = backend.authenticate("DOSEN@kampus.ac.id", "rahasia").await.unwrap();
        assert_eq!(grant.user.id, 5);

        let me = backend.current_user(&grant.token).await.unwrap();
        assert_eq!(me.username, "dosen");
        assert_eq!(me.role, UserRole::Lecturer);
    }

    #[tokio::test]
    async fn test_wrong_password_is_authentication_error() {
        let backend = backend_with_user();
        let err = backend.authenticate("dosen", "salah").await.unwrap_err();
        assert_eq!(err.code(), "E004");
        let err = backend.authenticate("nobody", "rahasia").await.unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[tokio::test]
    async fn test_unknown_token_is_authentication_error() {
        let err = MemoryBackend::default().current_user("abc").await.unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[tokio::test]
    async fn test_course_scope_follows_links() {
        let backend = backend_with_user();
        let s = session(user(5, "dosen", UserRole::Lecturer));
        let scope = Scope::courses(vec![1]);

        let containers = backend
            .fetch_containers(&s, AssessmentKind::Quiz, &scope)
            .await
            .unwrap();
        let ids: Vec<i64> = containers.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11]);

        let answers = backend
            .fetch_answers(&s, AssessmentKind::Exam, &scope)
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].id, 1);

        let courses = backend.fetch_courses(&s, Some(5)).await.unwrap();
        assert_eq!(courses.len(), 1);
    }

    #[tokio::test]
    async fn test_update_grade_is_partial() {
        let backend = backend_with_user();
        let s = session(user(5, "dosen", UserRole::Lecturer));
        let updated = backend
            .update_answer_grade(&s, AssessmentKind::Quiz, 3, 64.0)
            .await
            .unwrap();
        assert_eq!(updated.grade, Some(64.0));
        assert_eq!(updated.text.as_deref(), Some("answer 3"));
        assert_eq!(updated.student.map(|st| st.nim), Some("A02".to_string()));

        let err = backend
            .update_answer_grade(&s, AssessmentKind::Exam, 77, 10.0)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[test]
    fn test_fixture_format() {
        let raw = r#"{
            "users": [{"id": 1, "username": "admin", "email": null, "role": "Admin",
                       "nim": null, "full_name": null, "password_hash": "x"}],
            "courses": [{"id": 1, "name": "Pemrograman Dasar", "code": "IF101"}],
            "exams": [{"id": 20, "kind": "exam", "parent_id": 1, "title": "UTS",
                       "instructions": null, "opens_at": null, "closes_at": null}]
        }"#;
        let data: MemoryData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.users[0].profile.role, UserRole::Admin);
        assert!(data.courses[0].lecturer_ids.is_empty());
        assert_eq!(data.container_course(&data.exams[0]), Some(1));
        assert!(data.quiz_answers.is_empty());
    }
}
