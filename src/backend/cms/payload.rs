//! CMS 响应载荷
//!
//! 集合接口返回 `{ data: [{ id, attributes }], meta: { pagination } }`，
//! 关联字段为 `{ data: {...} | [...] | null }`。

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Entry<A> {
    pub id: i64,
    #[serde(default)]
    pub attributes: A,
}

/// 只关心 id 的关联
#[derive(Debug, Default, Deserialize)]
pub struct NoAttributes {}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct One<A> {
    pub data: Option<Entry<A>>,
}

impl<A> Default for One<A> {
    fn default() -> Self {
        Self { data: None }
    }
}

impl<A> One<A> {
    pub fn id(&self) -> Option<i64> {
        self.data.as_ref().map(|e| e.id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Many<A> {
    pub data: Option<Vec<Entry<A>>>,
}

impl<A> Default for Many<A> {
    fn default() -> Self {
        Self { data: None }
    }
}

impl<A> Many<A> {
    pub fn ids(&self) -> Vec<i64> {
        self.data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|e| e.id)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct ListEnvelope<A> {
    pub data: Vec<Entry<A>>,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct SingleEnvelope<A> {
    pub data: Entry<A>,
}

// 错误响应 { data: null, error: { status, name, message } }
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub status: Option<u16>,
    pub name: Option<String>,
    pub message: String,
}

/// 认证相关接口返回的是扁平的用户对象
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: CmsUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<CmsRole>,
    pub nim: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsRole {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub role_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CourseAttributes {
    pub name: Option<String>,
    pub code: Option<String>,
    pub lecturers: Many<NoAttributes>,
    pub meetings: Many<NoAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeetingAttributes {
    pub number: Option<i64>,
    pub topic: Option<String>,
    pub course: One<NoAttributes>,
}

/// 测验和考试共用，上级关联字段按类型取 `meeting` 或 `course`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContainerAttributes {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub opens_at: Option<DateTime<Utc>>,
    pub closes_at: Option<DateTime<Utc>>,
    pub meeting: One<NoAttributes>,
    pub course: One<NoAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuestionAttributes {
    #[serde(alias = "question_text")]
    pub question: Option<String>,
    pub weight: Option<f64>,
    pub quiz: One<NoAttributes>,
    pub exam: One<NoAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentAttributes {
    pub nim: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnswerAttributes {
    #[serde(alias = "answer_text")]
    pub answer: Option<String>,
    pub grade: Option<f64>,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    pub student: One<StudentAttributes>,
    pub quiz_question: One<NoAttributes>,
    pub exam_question: One<NoAttributes>,
}
