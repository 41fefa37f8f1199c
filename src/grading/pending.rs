use std::collections::HashMap;

use crate::errors::{LmsError, Result};

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;

/// 未保存的评分输入，按作答 id 保存原始字符串
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingEdits {
    edits: HashMap<i64, String>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原样保存，不做校验
    pub fn set(&mut self, answer_id: i64, value: impl Into<String>) {
        self.edits.insert(answer_id, value.into());
    }

    pub fn get(&self, answer_id: i64) -> Option<&str> {
        self.edits.get(&answer_id).map(String::as_str)
    }

    pub fn clear(&mut self, answer_id: i64) -> Option<String> {
        self.edits.remove(&answer_id)
    }

    pub fn contains(&self, answer_id: i64) -> bool {
        self.edits.contains_key(&answer_id)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// 是否有可保存的输入（非空且合法）
    pub fn has_savable(&self, answer_id: i64) -> bool {
        self.get(answer_id)
            .is_some_and(|v| !v.trim().is_empty() && is_valid_grade(v))
    }
}

/// 空字符串视为"未修改"，其余必须是 [0, 100] 内的有限数
pub fn is_valid_grade(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || parse_number(value).is_some()
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(n))
}

/// 解析待保存的评分；缺失、空、非数字或越界都返回校验错误
pub fn parse_grade(value: Option<&str>) -> Result<f64> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LmsError::validation("Grade is required"))?;

    match value.parse::<f64>() {
        Ok(n) if !n.is_finite() => Err(LmsError::validation(format!(
            "Grade must be a finite number, got '{value}'"
        ))),
        Ok(n) if !(MIN_GRADE..=MAX_GRADE).contains(&n) => Err(LmsError::validation(format!(
            "Grade must be between {MIN_GRADE} and {MAX_GRADE}, got {n}"
        ))),
        Ok(n) => Ok(n),
        Err(_) => Err(LmsError::validation(format!(
            "Grade must be numeric, got '{value}'"
        ))),
    }
}
