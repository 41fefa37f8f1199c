use std::collections::BTreeSet;

use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{LmsError, Result};
use crate::grading::GradeFilters;

/// 评分视图查询参数
///
/// `course_ids` 为逗号分隔的课程 id，如 `course_ids=1,4`
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradeFilterQuery {
    pub course_ids: Option<String>,
    pub container_id: Option<i64>,
    pub search: Option<String>,
}

impl GradeFilterQuery {
    pub fn into_filters(self) -> Result<GradeFilters> {
        let course_ids: BTreeSet<i64> = match self.course_ids.as_deref().map(str::trim) {
            None | Some("") => BTreeSet::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<i64>()
                        .map_err(|_| LmsError::validation(format!("Invalid course id '{s}'")))
                })
                .collect::<Result<_>>()?,
        };

        Ok(GradeFilters {
            course_ids,
            container_id: self.container_id,
            search_text: self.search,
        })
    }
}

/// 前端可能传字符串或数字，统一按字符串原样保存
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum GradeInput {
    Text(String),
    Number(f64),
}

impl GradeInput {
    pub fn into_raw(self) -> String {
        match self {
            GradeInput::Text(s) => s,
            GradeInput::Number(n) => n.to_string(),
        }
    }
}

// 设置待保存评分
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct SetPendingGradeRequest {
    pub value: GradeInput,
}
