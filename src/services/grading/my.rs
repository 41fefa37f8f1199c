use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::errors::Result;
use crate::grading::{self, GradeFilters, PendingEdits};
use crate::models::ApiResponse;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::common::response::error_response;
use crate::models::grading::responses::GradeBookResponse;

// 学生只读：不带筛选，也没有待保存输入
async fn load_own(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
) -> Result<GradeBookResponse> {
    let ctx = service.context(request)?;
    let sources = ctx.sources(kind).await?;
    Ok(grading::grade_book(
        &sources,
        &GradeFilters::default(),
        &PendingEdits::new(),
    ))
}

pub async fn my_grades(
    service: &GradingService,
    request: &HttpRequest,
    kind: AssessmentKind,
) -> ActixResult<HttpResponse> {
    match load_own(service, request, kind).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            book,
            "Grades retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
