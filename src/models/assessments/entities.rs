use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::academics::entities::Student;

/// 评估类型：测验挂在 meeting 上，考试挂在 course 上
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum AssessmentKind {
    Quiz,
    Exam,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz",
            AssessmentKind::Exam => "exam",
        }
    }

    /// 容器集合名
    pub fn containers_collection(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quizzes",
            AssessmentKind::Exam => "exams",
        }
    }

    /// 题目集合名
    pub fn questions_collection(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz-questions",
            AssessmentKind::Exam => "exam-questions",
        }
    }

    /// 作答集合名
    pub fn answers_collection(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz-answers",
            AssessmentKind::Exam => "exam-answers",
        }
    }

    /// 作答指向题目的关系字段
    pub fn question_field(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz_question",
            AssessmentKind::Exam => "exam_question",
        }
    }

    /// 题目指向容器的关系字段
    pub fn container_field(&self) -> &'static str {
        self.as_str()
    }

    /// 容器指向上级的关系字段
    pub fn parent_field(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "meeting",
            AssessmentKind::Exam => "course",
        }
    }
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 测验或考试
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Container {
    pub id: i64,
    pub kind: AssessmentKind,
    /// 测验为 meeting id，考试为 course id
    pub parent_id: Option<i64>,
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub opens_at: Option<chrono::DateTime<chrono::Utc>>,
    pub closes_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Container {
    pub fn label(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} #{}", self.kind, self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Question {
    pub id: i64,
    pub kind: AssessmentKind,
    pub container_id: Option<i64>,
    pub text: Option<String>,
    /// 为空时显示 "N/A"，不会补默认分值
    pub weight: Option<f64>,
}

/// 学生对某题的作答
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Answer {
    pub id: i64,
    pub kind: AssessmentKind,
    pub question_id: Option<i64>,
    pub student: Option<Student>,
    pub text: Option<String>,
    /// 0-100，未批改时为空
    pub grade: Option<f64>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_collections() {
        assert_eq!(AssessmentKind::Quiz.answers_collection(), "quiz-answers");
        assert_eq!(AssessmentKind::Exam.containers_collection(), "exams");
        assert_eq!(AssessmentKind::Exam.question_field(), "exam_question");
        assert_eq!(AssessmentKind::Quiz.parent_field(), "meeting");
    }

    #[test]
    fn test_kind_path_value() {
        let kind: AssessmentKind = serde_json::from_str("\"exam\"").unwrap();
        assert_eq!(kind, AssessmentKind::Exam);
        assert!(serde_json::from_str::<AssessmentKind>("\"assignment\"").is_err());
    }
}
