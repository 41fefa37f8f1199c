use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use super::pending::{PendingEdits, parse_grade};
use crate::backend::Backend;
use crate::errors::Result;
use crate::models::assessments::entities::{Answer, AssessmentKind};
use crate::session::Session;

/// 批量保存结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct SaveSummary {
    pub success_count: usize,
    pub error_count: usize,
    /// 输入不合法而未提交的条数
    pub skipped_count: usize,
    pub failed_answer_ids: Vec<i64>,
}

/// 保存单条评分
///
/// 校验失败时不发出任何后端请求；成功后清除该条待保存输入，
/// 后端失败时输入保留，错误原样返回，不重试。
pub async fn save_grade(
    backend: &dyn Backend,
    session: &Session,
    kind: AssessmentKind,
    pending: &mut PendingEdits,
    answer_id: i64,
) -> Result<Answer> {
    let grade = parse_grade(pending.get(answer_id))?;

    let updated = backend
        .update_answer_grade(session, kind, answer_id, grade)
        .await?;
    pending.clear(answer_id);

    info!(
        "Grade {} saved for {} answer {} by user {}",
        grade,
        kind,
        answer_id,
        session.user_id()
    );
    Ok(updated)
}

/// 按给定顺序逐条保存有合法输入的作答，单条失败不影响后续
pub async fn save_all<I>(
    backend: &dyn Backend,
    session: &Session,
    kind: AssessmentKind,
    pending: &mut PendingEdits,
    answer_ids: I,
) -> SaveSummary
where
    I: IntoIterator<Item = i64>,
{
    let mut summary = SaveSummary::default();

    for answer_id in answer_ids {
        match pending.get(answer_id) {
            None => continue,
            Some(value) if value.trim().is_empty() => continue,
            Some(_) if !pending.has_savable(answer_id) => {
                summary.skipped_count += 1;
                continue;
            }
            Some(_) => {}
        }

        match save_grade(backend, session, kind, pending, answer_id).await {
            Ok(_) => summary.success_count += 1,
            Err(e) => {
                warn!("Failed to save grade for {} answer {}: {}", kind, answer_id, e);
                summary.error_count += 1;
                summary.failed_answer_ids.push(answer_id);
            }
        }
    }

    info!(
        "Bulk grade save for {} by user {}: {} saved, {} failed, {} skipped",
        kind,
        session.user_id(),
        summary.success_count,
        summary.error_count,
        summary.skipped_count
    );
    summary
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::backend::memory::{MemoryBackend, MemoryData};
    use crate::backend::{AuthGrant, Scope};
    use crate::errors::LmsError;
    use crate::grading::test_support::quiz_sources;
    use crate::models::academics::entities::{Course, Meeting};
    use crate::models::assessments::entities::{Container, Question};
    use crate::models::users::entities::{SessionUser, UserRole};

    /// 对指定作答的写入返回失败，并记录写入次数
    struct FlakyBackend {
        inner: MemoryBackend,
        failing: HashSet<i64>,
        writes: Mutex<Vec<i64>>,
    }

    impl FlakyBackend {
        fn new(failing: &[i64]) -> Self {
            let sources = quiz_sources();
            Self {
                inner: MemoryBackend::new(MemoryData::from_sources(&sources)),
                failing: failing.iter().copied().collect(),
                writes: Mutex::new(Vec::new()),
            }
        }

        fn writes(&self) -> Vec<i64> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Backend for FlakyBackend {
        fn name(&self) -> &'static str {
            "flaky"
        }
        async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthGrant> {
            self.inner.authenticate(identifier, password).await
        }
        async fn current_user(&self, token: &str) -> Result<SessionUser> {
            self.inner.current_user(token).await
        }
        async fn fetch_courses(
            &self,
            session: &Session,
            lecturer_id: Option<i64>,
        ) -> Result<Vec<Course>> {
            self.inner.fetch_courses(session, lecturer_id).await
        }
        async fn fetch_meetings(&self, session: &Session, scope: &Scope) -> Result<Vec<Meeting>> {
            self.inner.fetch_meetings(session, scope).await
        }
        async fn fetch_containers(
            &self,
            session: &Session,
            kind: AssessmentKind,
            scope: &Scope,
        ) -> Result<Vec<Container>> {
            self.inner.fetch_containers(session, kind, scope).await
        }
        async fn fetch_questions(
            &self,
            session: &Session,
            kind: AssessmentKind,
            scope: &Scope,
        ) -> Result<Vec<Question>> {
            self.inner.fetch_questions(session, kind, scope).await
        }
        async fn fetch_answers(
            &self,
            session: &Session,
            kind: AssessmentKind,
            scope: &Scope,
        ) -> Result<Vec<Answer>> {
            self.inner.fetch_answers(session, kind, scope).await
        }
        async fn update_answer_grade(
            &self,
            session: &Session,
            kind: AssessmentKind,
            answer_id: i64,
            grade: f64,
        ) -> Result<Answer> {
            self.writes.lock().unwrap().push(answer_id);
            if self.failing.contains(&answer_id) {
                return Err(LmsError::backend("PUT returned 500"));
            }
            self.inner
                .update_answer_grade(session, kind, answer_id, grade)
                .await
        }
    }

    fn session() -> Session {
        Session::new(
            "tok",
            SessionUser {
                id: 5,
                username: "dosen".to_string(),
                email: None,
                role: UserRole::Lecturer,
                nim: None,
                full_name: None,
            },
        )
    }

    #[tokio::test]
    async fn test_out_of_range_is_rejected_without_backend_call() {
        let backend = FlakyBackend::new(&[]);
        let mut pending = PendingEdits::new();
        pending.set(1, "150");

        let err = save_grade(&backend, &session(), AssessmentKind::Quiz, &mut pending, 1)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(backend.writes().is_empty());
        assert_eq!(pending.get(1), Some("150"));
    }

    #[tokio::test]
    async fn test_missing_pending_edit_is_validation_error() {
        let backend = FlakyBackend::new(&[]);
        let mut pending = PendingEdits::new();
        let err = save_grade(&backend, &session(), AssessmentKind::Quiz, &mut pending, 1)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(backend.writes().is_empty());
    }

    #[tokio::test]
    async fn test_save_grade_writes_once_and_clears() {
        let backend = FlakyBackend::new(&[]);
        let mut pending = PendingEdits::new();
        pending.set(3, " 77.5 ");

        let updated = save_grade(&backend, &session(), AssessmentKind::Quiz, &mut pending, 3)
            .await
            .unwrap();

        assert_eq!(updated.grade, Some(77.5));
        assert_eq!(backend.writes(), vec![3]);
        assert!(!pending.contains(3));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_and_keeps_edit() {
        let backend = FlakyBackend::new(&[3]);
        let mut pending = PendingEdits::new();
        pending.set(3, "60");

        let err = save_grade(&backend, &session(), AssessmentKind::Quiz, &mut pending, 3)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "E002");
        assert_eq!(pending.get(3), Some("60"));
    }

    #[tokio::test]
    async fn test_saving_same_value_twice_is_idempotent() {
        let backend = FlakyBackend::new(&[]);
        let session = session();
        let mut pending = PendingEdits::new();

        pending.set(1, "90");
        let first = save_grade(&backend, &session, AssessmentKind::Quiz, &mut pending, 1)
            .await
            .unwrap();
        pending.set(1, "90");
        let second = save_grade(&backend, &session, AssessmentKind::Quiz, &mut pending, 1)
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_all_continues_after_failure() {
        let backend = FlakyBackend::new(&[3]);
        let mut pending = PendingEdits::new();
        pending.set(1, "80");
        pending.set(3, "70");
        pending.set(5, "95");

        let summary = save_all(
            &backend,
            &session(),
            AssessmentKind::Quiz,
            &mut pending,
            [1, 3, 5],
        )
        .await;

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.failed_answer_ids, vec![3]);
        // 写入顺序与视图顺序一致
        assert_eq!(backend.writes(), vec![1, 3, 5]);
        assert!(!pending.contains(1));
        assert_eq!(pending.get(3), Some("70"));
        assert!(!pending.contains(5));
    }

    #[tokio::test]
    async fn test_save_all_skips_invalid_and_untouched() {
        let backend = FlakyBackend::new(&[]);
        let mut pending = PendingEdits::new();
        pending.set(1, "abc");
        pending.set(2, "");
        pending.set(4, "100");

        let summary = save_all(
            &backend,
            &session(),
            AssessmentKind::Quiz,
            &mut pending,
            [1, 2, 3, 4, 5],
        )
        .await;

        assert_eq!(
            summary,
            SaveSummary {
                success_count: 1,
                error_count: 0,
                skipped_count: 1,
                failed_answer_ids: vec![],
            }
        );
        assert_eq!(backend.writes(), vec![4]);
        assert_eq!(pending.get(1), Some("abc"));
    }
}
