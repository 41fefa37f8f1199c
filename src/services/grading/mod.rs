pub mod my;
pub mod pending;
pub mod save;
pub mod view;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::backend::Backend;
use crate::errors::Result;
use crate::grading::{GradingSources, load_sources};
use crate::models::assessments::entities::AssessmentKind;
use crate::models::grading::requests::{GradeFilterQuery, SetPendingGradeRequest};
use crate::session::{Session, SessionStore};

pub struct GradingService {
    backend: Option<Arc<dyn Backend>>,
    sessions: Option<SessionStore>,
}

/// 一次评分请求的上下文
pub(crate) struct GradingContext {
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionStore,
    pub session: Session,
}

impl GradingContext {
    pub async fn sources(&self, kind: AssessmentKind) -> Result<GradingSources> {
        load_sources(self.backend.as_ref(), &self.session, kind).await
    }
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self {
            backend: None,
            sessions: None,
        }
    }

    pub(crate) fn context(&self, request: &HttpRequest) -> Result<GradingContext> {
        let backend = match &self.backend {
            Some(backend) => backend.clone(),
            None => super::backend_from_app(request)?,
        };
        let sessions = match &self.sessions {
            Some(sessions) => sessions.clone(),
            None => super::sessions_from_app(request)?,
        };
        Ok(GradingContext {
            backend,
            sessions,
            session: super::current_session(request)?,
        })
    }

    // 评分视图
    pub async fn grade_book(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
        query: GradeFilterQuery,
    ) -> ActixResult<HttpResponse> {
        view::grade_book(self, request, kind, query).await
    }

    // 筛选选项
    pub async fn filter_options(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
    ) -> ActixResult<HttpResponse> {
        view::filter_options(self, request, kind).await
    }

    // 记录待保存评分
    pub async fn set_pending(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
        answer_id: i64,
        body: SetPendingGradeRequest,
    ) -> ActixResult<HttpResponse> {
        pending::set_pending(self, request, kind, answer_id, body).await
    }

    // 丢弃待保存评分
    pub async fn discard_pending(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
        answer_id: i64,
    ) -> ActixResult<HttpResponse> {
        pending::discard_pending(self, request, kind, answer_id).await
    }

    // 保存单条评分
    pub async fn save_grade(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
        answer_id: i64,
    ) -> ActixResult<HttpResponse> {
        save::save_grade(self, request, kind, answer_id).await
    }

    // 批量保存当前视图中的评分
    pub async fn save_all(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
        query: GradeFilterQuery,
    ) -> ActixResult<HttpResponse> {
        save::save_all(self, request, kind, query).await
    }

    // 学生查看自己的成绩
    pub async fn my_grades(
        &self,
        request: &HttpRequest,
        kind: AssessmentKind,
    ) -> ActixResult<HttpResponse> {
        my::my_grades(self, request, kind).await
    }
}
