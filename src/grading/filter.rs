use std::collections::BTreeSet;

use super::join::EnrichedAnswer;

/// 用户选择的筛选条件，全部为空时不做任何收窄
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeFilters {
    /// 为空表示不按课程筛选
    pub course_ids: BTreeSet<i64>,
    pub container_id: Option<i64>,
    /// 学生姓名或 NIM 的子串，大小写不敏感
    pub search_text: Option<String>,
}

impl GradeFilters {
    pub fn is_empty(&self) -> bool {
        self.course_ids.is_empty() && self.container_id.is_none() && self.search_needle().is_none()
    }

    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, enriched: &EnrichedAnswer<'_>) -> bool {
        self.matches_with(enriched, self.search_needle().as_deref())
    }

    fn matches_with(&self, enriched: &EnrichedAnswer<'_>, needle: Option<&str>) -> bool {
        let course_ok = self.course_ids.is_empty()
            || enriched
                .course_id()
                .is_some_and(|id| self.course_ids.contains(&id));

        let container_ok = self
            .container_id
            .is_none_or(|id| id == enriched.container.id);

        let search_ok = needle.is_none_or(|needle| {
            enriched.student.name.to_lowercase().contains(needle)
                || enriched.student.nim.to_lowercase().contains(needle)
        });

        course_ok && container_ok && search_ok
    }
}

/// 按条件筛选，保持输入顺序
pub fn filter<'a>(
    enriched: Vec<EnrichedAnswer<'a>>,
    filters: &GradeFilters,
) -> Vec<EnrichedAnswer<'a>> {
    let needle = filters.search_needle();
    enriched
        .into_iter()
        .filter(|e| filters.matches_with(e, needle.as_deref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::join::join_all;
    use crate::grading::test_support::quiz_sources;

    fn ids(answers: &[EnrichedAnswer<'_>]) -> Vec<i64> {
        answers.iter().map(|e| e.answer_id()).collect()
    }

    #[test]
    fn test_empty_filters_keep_all_resolvable() {
        let mut sources = quiz_sources();
        sources.answers[3].question_id = Some(404);
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filtered = filter(outcome.resolved, &GradeFilters::default());

        assert!(GradeFilters::default().is_empty());
        assert_eq!(ids(&filtered), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let sources = quiz_sources();
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filters = GradeFilters {
            search_text: Some("siti".to_string()),
            ..Default::default()
        };
        let filtered = filter(outcome.resolved, &filters);

        assert_eq!(ids(&filtered), vec![1, 2]);
        assert!(filtered.iter().all(|e| e.student.name == "Siti Aminah"));
    }

    #[test]
    fn test_search_matches_nim() {
        let sources = quiz_sources();
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filters = GradeFilters {
            search_text: Some("a03".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(outcome.resolved, &filters)), vec![4]);
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let filters = GradeFilters {
            search_text: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filters.is_empty());
    }

    #[test]
    fn test_course_and_container_filters() {
        let sources = quiz_sources();
        let index = sources.index();

        let by_course = GradeFilters {
            course_ids: BTreeSet::from([2]),
            ..Default::default()
        };
        let outcome = join_all(&index, &sources.answers);
        assert_eq!(ids(&filter(outcome.resolved, &by_course)), vec![4]);

        let by_container = GradeFilters {
            course_ids: BTreeSet::from([1, 2]),
            container_id: Some(11),
            ..Default::default()
        };
        let outcome = join_all(&index, &sources.answers);
        assert_eq!(ids(&filter(outcome.resolved, &by_container)), vec![2, 5]);
    }

    #[test]
    fn test_meeting_without_course_fails_course_filter() {
        let mut sources = quiz_sources();
        sources.meetings[0].course_id = None;
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filters = GradeFilters {
            course_ids: BTreeSet::from([1]),
            ..Default::default()
        };
        // meeting 1 不再属于任何课程，容器 10 下的作答被排除
        assert_eq!(ids(&filter(outcome.resolved, &filters)), vec![2, 5]);
    }
}
