use std::collections::HashMap;

use super::join::EnrichedAnswer;
use crate::models::academics::entities::Student;

/// 某个学生在当前筛选下的全部作答
#[derive(Debug, Clone)]
pub struct StudentGroup<'a> {
    pub student: &'a Student,
    pub answers: Vec<EnrichedAnswer<'a>>,
}

/// 按 NIM 分组后的结果，遍历顺序为首次出现的顺序
#[derive(Debug, Default)]
pub struct GroupedAnswers<'a> {
    groups: Vec<StudentGroup<'a>>,
    by_nim: HashMap<&'a str, usize>,
}

impl<'a> GroupedAnswers<'a> {
    pub fn get(&self, nim: &str) -> Option<&StudentGroup<'a>> {
        self.by_nim.get(nim).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentGroup<'a>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 所有分组中的作答总数
    pub fn answer_count(&self) -> usize {
        self.groups.iter().map(|g| g.answers.len()).sum()
    }

    /// 按视图顺序展开的作答
    pub fn answers(&self) -> impl Iterator<Item = &EnrichedAnswer<'a>> {
        self.groups.iter().flat_map(|g| g.answers.iter())
    }
}

impl<'a> IntoIterator for GroupedAnswers<'a> {
    type Item = StudentGroup<'a>;
    type IntoIter = std::vec::IntoIter<StudentGroup<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// 按学生 NIM 分组；分组是筛选结果的一个划分，不会丢失或重复作答
pub fn group_by_student<'a>(filtered: Vec<EnrichedAnswer<'a>>) -> GroupedAnswers<'a> {
    let mut grouped = GroupedAnswers::default();
    for enriched in filtered {
        let student: &'a Student = enriched.student;
        let nim: &'a str = student.nim.as_str();
        match grouped.by_nim.get(nim) {
            Some(&i) => grouped.groups[i].answers.push(enriched),
            None => {
                grouped.by_nim.insert(nim, grouped.groups.len());
                grouped.groups.push(StudentGroup {
                    student,
                    answers: vec![enriched],
                });
            }
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::grading::filter::{GradeFilters, filter};
    use crate::grading::join::join_all;
    use crate::grading::test_support::{answer, quiz_sources, siti};
    use crate::models::assessments::entities::AssessmentKind;

    #[test]
    fn test_same_nim_grouped_together() {
        let mut sources = quiz_sources();
        sources.answers = vec![
            answer(1, AssessmentKind::Quiz, 100, siti(), None),
            answer(2, AssessmentKind::Quiz, 101, siti(), Some(85.0)),
        ];
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let grouped = group_by_student(filter(outcome.resolved, &GradeFilters::default()));

        assert_eq!(grouped.len(), 1);
        let group = grouped.get("A01").expect("A01 should be grouped");
        let ids: Vec<i64> = group.answers.iter().map(|e| e.answer_id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_grouping_is_partition_in_first_seen_order() {
        let sources = quiz_sources();
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filtered = filter(outcome.resolved, &GradeFilters::default());
        let input: HashSet<i64> = filtered.iter().map(|e| e.answer_id()).collect();
        let total = filtered.len();

        let grouped = group_by_student(filtered);
        let nims: Vec<&str> = grouped.iter().map(|g| g.student.nim.as_str()).collect();
        assert_eq!(nims, vec!["A01", "A02", "A03"]);

        let output: Vec<i64> = grouped.answers().map(|e| e.answer_id()).collect();
        assert_eq!(output.len(), total);
        assert_eq!(output.iter().copied().collect::<HashSet<_>>(), input);
        assert_eq!(grouped.answer_count(), total);
    }

    #[test]
    fn test_students_without_matches_are_omitted() {
        let sources = quiz_sources();
        let index = sources.index();
        let outcome = join_all(&index, &sources.answers);
        let filters = GradeFilters {
            container_id: Some(12),
            ..Default::default()
        };
        let grouped = group_by_student(filter(outcome.resolved, &filters));

        assert_eq!(grouped.len(), 1);
        assert!(grouped.get("A01").is_none());
        assert!(grouped.get("A03").is_some());
    }
}
