use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::errors::Result;
use crate::grading::{self, view::build_filter_options};
use crate::models::ApiResponse;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::common::response::error_response;
use crate::models::grading::requests::GradeFilterQuery;
use crate::models::grading::responses::{FilterOptionsResponse, GradeBookResponse};

async fn load_grade_book(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    query: GradeFilterQuery,
) -> Result<GradeBookResponse> {
    let filters = query.into_filters()?;
    let ctx = service.context(request)?;
    let sources = ctx.sources(kind).await?;

    let workspace = ctx.sessions.workspace(&ctx.session).await;
    let workspace = workspace.lock().await;
    Ok(grading::grade_book(&sources, &filters, workspace.edits(kind)))
}

pub async fn grade_book(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
    query: GradeFilterQuery,
) -> ActixResult<HttpResponse> {
    match load_grade_book(service, request, kind, query).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            book,
            "Grade book retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn load_filter_options(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
) -> Result<FilterOptionsResponse> {
    let ctx = service.context(request)?;
    let sources = ctx.sources(kind).await?;
    Ok(build_filter_options(&sources))
}

pub async fn filter_options(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
) -> ActixResult<HttpResponse> {
    match load_filter_options(service, request, kind).await {
        Ok(options) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            options,
            "Filter options retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
