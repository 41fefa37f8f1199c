use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::GradingService;
use crate::errors::Result;
use crate::grading::is_valid_grade;
use crate::models::ApiResponse;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::common::response::error_response;
use crate::models::grading::requests::SetPendingGradeRequest;
use crate::models::grading::responses::PendingGradeResponse;

// 只记录输入，校验在保存时进行；返回的 valid 供前端即时提示
async fn record(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    answer_id: i64,
    body: SetPendingGradeRequest,
) -> Result<PendingGradeResponse> {
    let ctx = service.context(request)?;
    let value = body.value.into_raw();

    let workspace = ctx.sessions.workspace(&ctx.session).await;
    workspace.lock().await.edits_mut(kind).set(answer_id, value.clone());
    debug!(
        "Pending {} grade for answer {} set by user {}",
        kind,
        answer_id,
        ctx.session.user_id()
    );

    Ok(PendingGradeResponse {
        answer_id,
        valid: is_valid_grade(&value),
        value,
    })
}

pub async fn set_pending(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    answer_id: i64,
    body: SetPendingGradeRequest,
) -> ActixResult<HttpResponse> {
    match record(service, request, kind, answer_id, body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Pending grade recorded",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn discard_pending(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    answer_id: i64,
) -> ActixResult<HttpResponse> {
    let ctx = match service.context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(error_response(&e)),
    };

    let workspace = ctx.sessions.workspace(&ctx.session).await;
    workspace.lock().await.edits_mut(kind).clear(answer_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Pending grade discarded")))
}
