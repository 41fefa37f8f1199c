//! 集合查询参数（`filters[...]`、`populate[...]`、`pagination[...]`）

use crate::backend::Scope;
use crate::models::assessments::entities::AssessmentKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionQuery {
    params: Vec<(String, String)>,
}

fn bracketed(root: &str, path: &[&str]) -> String {
    path.iter().fold(root.to_string(), |mut acc, segment| {
        acc.push('[');
        acc.push_str(segment);
        acc.push(']');
        acc
    })
}

impl CollectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate(mut self, fields: &[&str]) -> Self {
        for (i, field) in fields.iter().enumerate() {
            self.params
                .push((format!("populate[{i}]"), (*field).to_string()));
        }
        self
    }

    /// `filters[a][b][$eq]=value`
    pub fn filter_eq(mut self, path: &[&str], value: i64) -> Self {
        let mut key = bracketed("filters", path);
        key.push_str("[$eq]");
        self.params.push((key, value.to_string()));
        self
    }

    /// `filters[a][b][$in][0]=v0&filters[a][b][$in][1]=v1`
    pub fn filter_in(mut self, path: &[&str], values: &[i64]) -> Self {
        let base = bracketed("filters", path);
        for (i, value) in values.iter().enumerate() {
            self.params
                .push((format!("{base}[$in][{i}]"), value.to_string()));
        }
        self
    }

    /// 按范围追加课程过滤，`course_path` 为从当前集合到课程的关联路径
    pub fn scoped(self, scope: &Scope, course_path: &[&str]) -> Self {
        match &scope.course_ids {
            Some(ids) => {
                let mut path = course_path.to_vec();
                path.push("id");
                self.filter_in(&path, ids)
            }
            None => self,
        }
    }

    pub fn page(&self, page: u32, page_size: u32) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        params.push(("pagination[page]".to_string(), page.to_string()));
        params.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        params
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// 测验/考试到课程的关联路径
pub fn container_course_path(kind: AssessmentKind) -> Vec<&'static str> {
    match kind {
        AssessmentKind::Quiz => vec!["meeting", "course"],
        AssessmentKind::Exam => vec!["course"],
    }
}

pub fn question_course_path(kind: AssessmentKind) -> Vec<&'static str> {
    let mut path = vec![kind.container_field()];
    path.extend(container_course_path(kind));
    path
}

pub fn answer_course_path(kind: AssessmentKind) -> Vec<&'static str> {
    let mut path = vec![kind.question_field()];
    path.extend(question_course_path(kind));
    path
}
