use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::GradingService;
use crate::errors::{LmsError, Result};
use crate::grading::{self, SaveSummary, visible_answer_ids};
use crate::models::ApiResponse;
use crate::models::ErrorCode;
use crate::models::assessments::entities::{Answer, AssessmentKind};
use crate::models::common::response::{error_response, error_response_with};
use crate::models::grading::requests::GradeFilterQuery;

enum SaveFailure {
    Missing(LmsError),
    Invalid(LmsError),
    Other(LmsError),
}

impl From<LmsError> for SaveFailure {
    fn from(err: LmsError) -> Self {
        SaveFailure::Other(err)
    }
}

async fn save_one(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    answer_id: i64,
) -> std::result::Result<Answer, SaveFailure> {
    let ctx = service.context(request)?;

    // 只能保存自己可见范围内的作答
    if !grading::answer_in_scope(ctx.backend.as_ref(), &ctx.session, kind, answer_id).await? {
        warn!(
            "User {} tried to grade {} answer {} outside their scope",
            ctx.session.user_id(),
            kind,
            answer_id
        );
        return Err(SaveFailure::Other(LmsError::not_found(format!(
            "{kind} answer {answer_id} not found"
        ))));
    }

    let workspace = ctx.sessions.workspace(&ctx.session).await;
    let mut workspace = workspace.lock().await;
    let pending = workspace.edits_mut(kind);

    match pending.get(answer_id) {
        None => {
            return Err(SaveFailure::Missing(LmsError::validation(format!(
                "No pending grade for {kind} answer {answer_id}"
            ))));
        }
        Some(value) if value.trim().is_empty() => {
            return Err(SaveFailure::Missing(LmsError::validation(format!(
                "No pending grade for {kind} answer {answer_id}"
            ))));
        }
        Some(_) => {}
    }

    grading::save_grade(ctx.backend.as_ref(), &ctx.session, kind, pending, answer_id)
        .await
        .map_err(|e| {
            if e.is_validation() {
                SaveFailure::Invalid(e)
            } else {
                SaveFailure::Other(e)
            }
        })
}

pub async fn save_grade(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    answer_id: i64,
) -> ActixResult<HttpResponse> {
    match save_one(service, request, kind, answer_id).await {
        Ok(answer) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            answer,
            "Grade saved successfully",
        ))),
        Err(SaveFailure::Missing(e)) => {
            Ok(error_response_with(ErrorCode::PendingGradeMissing, &e))
        }
        Err(SaveFailure::Invalid(e)) => Ok(error_response_with(ErrorCode::GradeInvalid, &e)),
        Err(SaveFailure::Other(e)) if matches!(e, LmsError::NotFound(_)) => {
            Ok(error_response_with(ErrorCode::AnswerNotFound, &e))
        }
        Err(SaveFailure::Other(e)) => Ok(error_response(&e)),
    }
}

async fn save_visible(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    query: GradeFilterQuery,
) -> Result<SaveSummary> {
    let filters = query.into_filters()?;
    let ctx = service.context(request)?;
    let sources = ctx.sources(kind).await?;
    let answer_ids = visible_answer_ids(&sources, &filters);

    let workspace = ctx.sessions.workspace(&ctx.session).await;
    let mut workspace = workspace.lock().await;
    Ok(grading::save_all(
        ctx.backend.as_ref(),
        &ctx.session,
        kind,
        workspace.edits_mut(kind),
        answer_ids,
    )
    .await)
}

pub async fn save_all(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    query: GradeFilterQuery,
) -> ActixResult<HttpResponse> {
    match save_visible(service, request, kind, query).await {
        Ok(summary) => {
            let message = format!(
                "{} saved, {} failed, {} skipped",
                summary.success_count, summary.error_count, summary.skipped_count
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(summary, message)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
