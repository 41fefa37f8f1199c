use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/academics.ts")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    #[serde(default)]
    pub lecturer_ids: Vec<i64>,
    #[serde(default)]
    pub meeting_ids: Vec<i64>,
}

impl Course {
    pub fn is_taught_by(&self, lecturer_id: i64) -> bool {
        self.lecturer_ids.contains(&lecturer_id)
    }
}

// 课程下的一次课（测验挂在 meeting 上）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/academics.ts")]
pub struct Meeting {
    pub id: i64,
    pub number: Option<i64>,
    pub topic: Option<String>,
    pub course_id: Option<i64>,
}

impl Meeting {
    /// 列表中显示的标签，如 "Meeting 3 - Ownership"
    pub fn label(&self) -> String {
        match (self.number, self.topic.as_deref()) {
            (Some(n), Some(topic)) => format!("Meeting {n} - {topic}"),
            (Some(n), None) => format!("Meeting {n}"),
            (None, Some(topic)) => topic.to_string(),
            (None, None) => format!("Meeting #{}", self.id),
        }
    }
}

// 学生，NIM 为学号
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/academics.ts")]
pub struct Student {
    pub id: i64,
    pub nim: String,
    pub name: String,
}
