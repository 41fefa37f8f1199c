use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::assessments::entities::AssessmentKind;
use crate::models::grading::requests::{GradeFilterQuery, SetPendingGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::GradingService;

// 懒加载的全局 GradingService 实例
static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

// 评分视图
pub async fn grade_book(
    req: HttpRequest,
    path: web::Path<AssessmentKind>,
    query: web::Query<GradeFilterQuery>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .grade_book(&req, path.into_inner(), query.into_inner())
        .await
}

// 筛选选项
pub async fn filter_options(
    req: HttpRequest,
    path: web::Path<AssessmentKind>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.filter_options(&req, path.into_inner()).await
}

// 记录待保存评分
pub async fn set_pending(
    req: HttpRequest,
    path: web::Path<(AssessmentKind, i64)>,
    body: web::Json<SetPendingGradeRequest>,
) -> ActixResult<HttpResponse> {
    let (kind, answer_id) = path.into_inner();
    GRADING_SERVICE
        .set_pending(&req, kind, answer_id, body.into_inner())
        .await
}

// 丢弃待保存评分
pub async fn discard_pending(
    req: HttpRequest,
    path: web::Path<(AssessmentKind, i64)>,
) -> ActixResult<HttpResponse> {
    let (kind, answer_id) = path.into_inner();
    GRADING_SERVICE.discard_pending(&req, kind, answer_id).await
}

// 保存单条评分
pub async fn save_grade(
    req: HttpRequest,
    path: web::Path<(AssessmentKind, i64)>,
) -> ActixResult<HttpResponse> {
    let (kind, answer_id) = path.into_inner();
    GRADING_SERVICE.save_grade(&req, kind, answer_id).await
}

// 保存当前筛选下的全部评分
pub async fn save_all(
    req: HttpRequest,
    path: web::Path<AssessmentKind>,
    query: web::Query<GradeFilterQuery>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .save_all(&req, path.into_inner(), query.into_inner())
        .await
}

// 学生成绩
pub async fn my_grades(
    req: HttpRequest,
    path: web::Path<AssessmentKind>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.my_grades(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading/{kind}")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles()))
                    .route("", web::get().to(grade_book))
                    .route("/options", web::get().to(filter_options))
                    .route("/pending/{answer_id}", web::put().to(set_pending))
                    .route("/pending/{answer_id}", web::delete().to(discard_pending))
                    .service(
                        web::resource("/answers/{answer_id}/grade")
                            .wrap(RateLimit::grade_write())
                            .route(web::post().to(save_grade)),
                    )
                    .route("/save-all", web::post().to(save_all)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/grades/my")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route("/{kind}", web::get().to(my_grades)),
            ),
    );
}
