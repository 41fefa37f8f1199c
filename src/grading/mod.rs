//! 评分汇总与筛选
//!
//! 独立获取的扁平数据（课程、meeting、测验/考试、题目、作答）在内存中关联、筛选，
//! 按学生 NIM 分组，并提供待保存评分的校验与提交。
//!
//! 关联、筛选、分组都是同步的纯函数，每次筛选变化都从头计算。

pub mod filter;
pub mod group;
pub mod join;
pub mod pending;
pub mod save;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use filter::{GradeFilters, filter};
pub use group::{GroupedAnswers, StudentGroup, group_by_student};
pub use join::{
    EnrichedAnswer, GradingSources, JoinOutcome, LinkGap, ParentRef, Resolution, UnresolvedAnswer,
    join, join_all,
};
pub use pending::{PendingEdits, is_valid_grade, parse_grade};
pub use save::{SaveSummary, save_all, save_grade};

use tracing::{debug, warn};

use crate::backend::{Backend, Scope};
use crate::errors::Result;
use crate::models::academics::entities::Course;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::grading::responses::GradeBookResponse;
use crate::models::users::entities::UserRole;
use crate::session::Session;

/// 按会话角色确定课程与读取范围
///
/// - 讲师：只看自己任教的课程
/// - 管理员：全部课程
/// - 学生：全部课程，但只取本人的作答
async fn scope_for(backend: &dyn Backend, session: &Session) -> Result<(Vec<Course>, Scope)> {
    Ok(match session.role() {
        UserRole::Lecturer => {
            let courses = backend
                .fetch_courses(session, Some(session.user_id()))
                .await?;
            let ids = courses.iter().map(|c| c.id).collect();
            (courses, Scope::courses(ids))
        }
        UserRole::Admin => (
            backend.fetch_courses(session, None).await?,
            Scope::unrestricted(),
        ),
        UserRole::Student => (
            backend.fetch_courses(session, None).await?,
            Scope::student(session.user_id()),
        ),
    })
}

/// 获取视图所需的全部数据
pub async fn load_sources(
    backend: &dyn Backend,
    session: &Session,
    kind: AssessmentKind,
) -> Result<GradingSources> {
    let (courses, scope) = scope_for(backend, session).await?;

    let mut sources = GradingSources::empty(kind);
    sources.courses = courses;
    if scope.is_nothing() {
        debug!(
            "User {} has no courses in scope, skipping {} fetch",
            session.user_id(),
            kind
        );
        return Ok(sources);
    }

    // 课程确定后，其余读取互不依赖
    let meetings = async {
        match kind {
            AssessmentKind::Quiz => backend.fetch_meetings(session, &scope).await,
            AssessmentKind::Exam => Ok(Vec::new()),
        }
    };
    let (meetings, containers, questions, answers) = tokio::try_join!(
        meetings,
        backend.fetch_containers(session, kind, &scope),
        backend.fetch_questions(session, kind, &scope),
        backend.fetch_answers(session, kind, &scope),
    )?;

    debug!(
        "Loaded {} sources: {} courses, {} meetings, {} containers, {} questions, {} answers",
        kind,
        sources.courses.len(),
        meetings.len(),
        containers.len(),
        questions.len(),
        answers.len()
    );

    sources.meetings = meetings;
    sources.containers = containers;
    sources.questions = questions;
    sources.answers = answers;
    Ok(sources)
}

/// 作答是否在会话的可见范围内，只读取作答集合
pub async fn answer_in_scope(
    backend: &dyn Backend,
    session: &Session,
    kind: AssessmentKind,
    answer_id: i64,
) -> Result<bool> {
    let scope = match session.role() {
        UserRole::Lecturer => scope_for(backend, session).await?.1,
        UserRole::Admin => Scope::unrestricted(),
        UserRole::Student => Scope::student(session.user_id()),
    };
    if scope.is_nothing() {
        return Ok(false);
    }
    let answers = backend.fetch_answers(session, kind, &scope).await?;
    Ok(answers.iter().any(|a| a.id == answer_id))
}

fn report_gaps(kind: AssessmentKind, unresolved: &[UnresolvedAnswer]) {
    if unresolved.is_empty() {
        return;
    }
    warn!(
        "{} {} answers could not be linked and are excluded from the view",
        unresolved.len(),
        kind
    );
    for gap in unresolved {
        debug!("{} answer {}: {}", kind, gap.answer_id, gap.gap);
    }
}

/// 关联 → 筛选 → 分组 → 视图
pub fn grade_book(
    sources: &GradingSources,
    filters: &GradeFilters,
    pending: &PendingEdits,
) -> GradeBookResponse {
    let index = sources.index();
    let outcome = join_all(&index, &sources.answers);
    report_gaps(sources.kind, &outcome.unresolved);

    let grouped = group_by_student(filter(outcome.resolved, filters));
    view::build_grade_book(sources.kind, &grouped, pending, outcome.unresolved)
}

/// 当前筛选下的作答 id，顺序与视图一致
pub fn visible_answer_ids(sources: &GradingSources, filters: &GradeFilters) -> Vec<i64> {
    let index = sources.index();
    let outcome = join_all(&index, &sources.answers);
    group_by_student(filter(outcome.resolved, filters))
        .answers()
        .map(|e| e.answer_id())
        .collect()
}
