//! 无头 CMS 后端（Strapi v4 风格 REST）

pub mod mapping;
pub mod payload;
pub mod query;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use self::payload::{
    AnswerAttributes, AuthResponse, CmsUser, ContainerAttributes, CourseAttributes, Entry,
    ErrorEnvelope, ListEnvelope, MeetingAttributes, QuestionAttributes, SingleEnvelope,
};
use self::query::{CollectionQuery, answer_course_path, container_course_path, question_course_path};
use super::{AuthGrant, Backend, Scope};
use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use crate::models::academics::entities::{Course, Meeting};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};
use crate::models::users::entities::SessionUser;
use crate::session::Session;

pub struct CmsBackend {
    client: Client,
    api_base: Url,
    page_size: u32,
}

impl CmsBackend {
    pub fn new(base_url: &str, api_prefix: &str, timeout_ms: u64, page_size: u32) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let prefix = api_prefix.trim_matches('/');
        let api_base = if prefix.is_empty() {
            base
        } else {
            base.join(&format!("{prefix}/"))?
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_base,
            page_size: page_size.max(1),
        })
    }

    pub fn from_config() -> Result<Self> {
        let config = &AppConfig::get().backend.cms;
        let backend = Self::new(
            &config.base_url,
            &config.api_prefix,
            config.request_timeout_ms,
            config.page_size,
        )?;
        info!("CMS backend targeting {}", backend.api_base);
        Ok(backend)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_base.join(path)?)
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.bearer_auth(&session.token)
    }

    /// 检查状态码并解析响应体
    async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED => LmsError::authentication(message),
            StatusCode::FORBIDDEN => LmsError::authorization(message),
            // 其余状态（包括 404）一律视为后端故障
            _ => LmsError::backend(format!("CMS responded {status}: {message}")),
        })
    }

    /// 逐页读取整个集合
    async fn fetch_all<A>(
        &self,
        session: &Session,
        collection: &str,
        query: &CollectionQuery,
    ) -> Result<Vec<Entry<A>>>
    where
        A: DeserializeOwned + Default,
    {
        let url = self.endpoint(collection)?;
        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let request = self
                .client
                .get(url.clone())
                .query(&query.page(page, self.page_size));
            let response = self.authorized(request, session).send().await?;
            let envelope: ListEnvelope<A> = Self::read(response).await?;
            entries.extend(envelope.data);

            let page_count = envelope
                .meta
                .pagination
                .map(|p| p.page_count)
                .unwrap_or(1);
            if page >= page_count {
                break;
            }
            page += 1;
        }

        debug!(
            "Fetched {} entries from {} ({} pages)",
            entries.len(),
            collection,
            page
        );
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl Backend for CmsBackend {
    fn name(&self) -> &'static str {
        "cms"
    }

    async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthGrant> {
        let response = self
            .client
            .post(self.endpoint("auth/local")?)
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;

        // CMS 对错误凭据返回 400
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(LmsError::authentication("Invalid identifier or password"));
        }
        let auth: AuthResponse = Self::read(response).await?;

        // 登录响应不含角色，需再取一次
        let user = self.current_user(&auth.jwt).await?;
        Ok(AuthGrant {
            token: auth.jwt,
            user,
        })
    }

    async fn current_user(&self, token: &str) -> Result<SessionUser> {
        let response = self
            .client
            .get(self.endpoint("users/me")?)
            .query(&[("populate", "role")])
            .bearer_auth(token)
            .send()
            .await?;
        let user: CmsUser = Self::read(response).await?;
        mapping::session_user(user)
    }

    async fn fetch_courses(
        &self,
        session: &Session,
        lecturer_id: Option<i64>,
    ) -> Result<Vec<Course>> {
        let mut query = CollectionQuery::new().populate(&["lecturers", "meetings"]);
        if let Some(id) = lecturer_id {
            query = query.filter_eq(&["lecturers", "id"], id);
        }
        let entries = self
            .fetch_all::<CourseAttributes>(session, "courses", &query)
            .await?;
        Ok(entries.into_iter().map(mapping::course).collect())
    }

    async fn fetch_meetings(&self, session: &Session, scope: &Scope) -> Result<Vec<Meeting>> {
        if scope.is_nothing() {
            return Ok(Vec::new());
        }
        let query = CollectionQuery::new()
            .populate(&["course"])
            .scoped(scope, &["course"]);
        let entries = self
            .fetch_all::<MeetingAttributes>(session, "meetings", &query)
            .await?;
        Ok(entries.into_iter().map(mapping::meeting).collect())
    }

    async fn fetch_containers(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Container>> {
        if scope.is_nothing() {
            return Ok(Vec::new());
        }
        let query = CollectionQuery::new()
            .populate(&[kind.parent_field()])
            .scoped(scope, &container_course_path(kind));
        let entries = self
            .fetch_all::<ContainerAttributes>(session, kind.containers_collection(), &query)
            .await?;
        Ok(entries
            .into_iter()
            .map(|e| mapping::container(kind, e))
            .collect())
    }

    async fn fetch_questions(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Question>> {
        if scope.is_nothing() {
            return Ok(Vec::new());
        }
        let query = CollectionQuery::new()
            .populate(&[kind.container_field()])
            .scoped(scope, &question_course_path(kind));
        let entries = self
            .fetch_all::<QuestionAttributes>(session, kind.questions_collection(), &query)
            .await?;
        Ok(entries
            .into_iter()
            .map(|e| mapping::question(kind, e))
            .collect())
    }

    async fn fetch_answers(
        &self,
        session: &Session,
        kind: AssessmentKind,
        scope: &Scope,
    ) -> Result<Vec<Answer>> {
        if scope.is_nothing() {
            return Ok(Vec::new());
        }
        let mut query = CollectionQuery::new()
            .populate(&["student", kind.question_field()])
            .scoped(scope, &answer_course_path(kind));
        if let Some(student_id) = scope.student_id {
            query = query.filter_eq(&["student", "id"], student_id);
        }
        let entries = self
            .fetch_all::<AnswerAttributes>(session, kind.answers_collection(), &query)
            .await?;
        Ok(entries
            .into_iter()
            .map(|e| mapping::answer(kind, e))
            .collect())
    }

    async fn update_answer_grade(
        &self,
        session: &Session,
        kind: AssessmentKind,
        answer_id: i64,
        grade: f64,
    ) -> Result<Answer> {
        let url = self.endpoint(&format!("{}/{}", kind.answers_collection(), answer_id))?;
        let populate = CollectionQuery::new().populate(&["student", kind.question_field()]);
        let request = self
            .client
            .put(url)
            .query(populate.params())
            .json(&json!({ "data": { "grade": grade } }));

        let response = self.authorized(request, session).send().await?;
        let envelope: SingleEnvelope<AnswerAttributes> = Self::read(response).await?;
        Ok(mapping::answer(kind, envelope.data))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use serde_json::Value;

    use super::*;
    use crate::models::users::entities::UserRole;

    fn session() -> Session {
        Session::new(
            "cms-token",
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

    fn page_of(page: u32, ids: &[i64]) -> Value {
        let data: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "attributes": {
                        "answer": format!("answer {id}"),
                        "grade": null,
                        "student": {"data": {"id": 201, "attributes": {"nim": "A01", "full_name": "Siti"}}},
                        "quiz_question": {"data": {"id": 100}}
                    }
                })
            })
            .collect();
        json!({
            "data": data,
            "meta": {"pagination": {"page": page, "pageSize": 2, "pageCount": 2, "total": 3}}
        })
    }

    async fn answers_handler(req: HttpRequest, hits: web::Data<AtomicUsize>) -> HttpResponse {
        hits.fetch_add(1, Ordering::SeqCst);
        if req.headers().get("authorization").and_then(|h| h.to_str().ok())
            != Some("Bearer cms-token")
        {
            return HttpResponse::Unauthorized()
                .json(json!({"data": null, "error": {"status": 401, "message": "Missing token"}}));
        }
        if req.query_string().contains("pagination%5Bpage%5D=2")
            || req.query_string().contains("pagination[page]=2")
        {
            HttpResponse::Ok().json(page_of(2, &[33]))
        } else {
            HttpResponse::Ok().json(page_of(1, &[31, 32]))
        }
    }

    async fn update_handler(path: web::Path<i64>, body: web::Json<Value>) -> HttpResponse {
        let id = path.into_inner();
        if id == 404 {
            return HttpResponse::NotFound()
                .json(json!({"data": null, "error": {"status": 404, "message": "Not Found"}}));
        }
        HttpResponse::Ok().json(json!({
            "data": {
                "id": id,
                "attributes": {
                    "answer": "kept",
                    "grade": body["data"]["grade"],
                    "student": {"data": {"id": 201, "attributes": {"nim": "A01"}}},
                    "quiz_question": {"data": {"id": 100}}
                }
            }
        }))
    }

    async fn login_handler(body: web::Json<Value>) -> HttpResponse {
        if body["password"] != "rahasia" {
            return HttpResponse::BadRequest().json(
                json!({"data": null, "error": {"status": 400, "message": "Invalid identifier or password"}}),
            );
        }
        HttpResponse::Ok().json(json!({
            "jwt": "cms-token",
            "user": {"id": 5, "username": "dosen", "email": "dosen@kampus.ac.id"}
        }))
    }

    async fn me_handler(req: HttpRequest) -> HttpResponse {
        if req.headers().get("authorization").and_then(|h| h.to_str().ok())
            != Some("Bearer cms-token")
        {
            return HttpResponse::Unauthorized().finish();
        }
        HttpResponse::Ok().json(json!({
            "id": 5,
            "username": "dosen",
            "email": "dosen@kampus.ac.id",
            "role": {"id": 3, "name": "Lecturer", "type": "lecturer"}
        }))
    }

    fn start_fake_cms() -> (String, Arc<AtomicUsize>) {
        let hits = web::Data::new(AtomicUsize::new(0));
        let counter = hits.clone().into_inner();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(hits.clone())
                .route("/api/auth/local", web::post().to(login_handler))
                .route("/api/users/me", web::get().to(me_handler))
                .route("/api/quiz-answers", web::get().to(answers_handler))
                .route("/api/quiz-answers/{id}", web::put().to(update_handler))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        (format!("http://{addr}"), counter)
    }

    #[test]
    fn test_api_base_joins_prefix() {
        let backend = CmsBackend::new("http://cms.local:1337", "/api", 1000, 50).unwrap();
        assert_eq!(
            backend.endpoint("quiz-answers/3").unwrap().as_str(),
            "http://cms.local:1337/api/quiz-answers/3"
        );
        let nested = CmsBackend::new("http://host/cms", "api", 1000, 50).unwrap();
        assert_eq!(
            nested.endpoint("users/me").unwrap().as_str(),
            "http://host/cms/api/users/me"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = CmsBackend::new("not a url", "/api", 1000, 50).err().unwrap();
        assert_eq!(err.code(), "E007");
    }

    #[actix_web::test]
    async fn test_fetch_answers_follows_pagination() {
        let (base, hits) = start_fake_cms();
        let backend = CmsBackend::new(&base, "/api", 5000, 2).unwrap();

        let answers = backend
            .fetch_answers(&session(), AssessmentKind::Quiz, &Scope::courses(vec![1]))
            .await
            .unwrap();

        let ids: Vec<i64> = answers.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![31, 32, 33]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(answers[0].question_id, Some(100));
    }

    #[actix_web::test]
    async fn test_update_grade_sends_partial_put() {
        let (base, _) = start_fake_cms();
        let backend = CmsBackend::new(&base, "/api", 5000, 2).unwrap();

        let updated = backend
            .update_answer_grade(&session(), AssessmentKind::Quiz, 31, 88.5)
            .await
            .unwrap();
        assert_eq!(updated.id, 31);
        assert_eq!(updated.grade, Some(88.5));
        assert_eq!(updated.text.as_deref(), Some("kept"));

        let err = backend
            .update_answer_grade(&session(), AssessmentKind::Quiz, 404, 10.0)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E002");
    }

    #[actix_web::test]
    async fn test_login_resolves_role() {
        let (base, _) = start_fake_cms();
        let backend = CmsBackend::new(&base, "/api", 5000, 2).unwrap();

        let grant = backend.authenticate("dosen", "rahasia").await.unwrap();
        assert_eq!(grant.token, "cms-token");
        assert_eq!(grant.user.role, UserRole::Lecturer);

        let err = backend.authenticate("dosen", "salah").await.unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[actix_web::test]
    async fn test_rejected_token_is_authentication_error() {
        let (base, _) = start_fake_cms();
        let backend = CmsBackend::new(&base, "/api", 5000, 2).unwrap();
        let mut stale = session();
        stale.token = "expired".to_string();

        let err = backend
            .fetch_answers(&stale, AssessmentKind::Quiz, &Scope::unrestricted())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E004");
        assert_eq!(err.message(), "Missing token");
    }
}
