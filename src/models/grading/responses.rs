use serde::Serialize;
use ts_rs::TS;

use crate::grading::UnresolvedAnswer;
use crate::models::assessments::entities::AssessmentKind;

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct CourseView {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct QuestionView {
    pub id: i64,
    pub text: Option<String>,
    pub weight: Option<f64>,
    /// 分值为空时为 "N/A"
    pub weight_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ContainerView {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ParentView {
    /// "meeting" 或 "course"
    pub kind: String,
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AnswerGradeView {
    pub answer_id: i64,
    pub answer_text: Option<String>,
    pub grade: Option<f64>,
    pub pending_grade: Option<String>,
    pub pending_valid: bool,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub question: QuestionView,
    pub container: ContainerView,
    pub parent: ParentView,
    pub course: Option<CourseView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct StudentGradesView {
    pub student_id: i64,
    pub nim: String,
    pub name: String,
    pub graded_count: usize,
    /// 已评分作答的平均分
    pub average_grade: Option<f64>,
    pub answers: Vec<AnswerGradeView>,
}

// 评分视图
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradeBookResponse {
    pub kind: AssessmentKind,
    pub students: Vec<StudentGradesView>,
    pub total_answers: usize,
    pub pending_count: usize,
    pub unresolved: Vec<UnresolvedAnswer>,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ContainerOptionView {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub course_id: Option<i64>,
}

// 筛选下拉选项
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct FilterOptionsResponse {
    pub kind: AssessmentKind,
    pub courses: Vec<CourseView>,
    pub containers: Vec<ContainerOptionView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct PendingGradeResponse {
    pub answer_id: i64,
    pub value: String,
    /// 仅供前端即时提示，保存时会重新校验
    pub valid: bool,
}
