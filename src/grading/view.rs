//! 把分组结果转换成返回给前端的视图

use super::group::GroupedAnswers;
use super::join::{EnrichedAnswer, GradingSources, ParentRef, UnresolvedAnswer};
use super::pending::{PendingEdits, is_valid_grade};
use crate::models::academics::entities::Course;
use crate::models::assessments::entities::AssessmentKind;
use crate::models::grading::responses::{
    AnswerGradeView, ContainerOptionView, ContainerView, CourseView, FilterOptionsResponse,
    GradeBookResponse, ParentView, QuestionView, StudentGradesView,
};

pub const MISSING_WEIGHT_LABEL: &str = "N/A";

/// 分值显示文本，不会为缺失的分值补默认值
pub fn weight_label(weight: Option<f64>) -> String {
    match weight {
        Some(w) => w.to_string(),
        None => MISSING_WEIGHT_LABEL.to_string(),
    }
}

fn course_view(course: &Course) -> CourseView {
    CourseView {
        id: course.id,
        name: course.name.clone(),
        code: course.code.clone(),
    }
}

fn answer_view(enriched: &EnrichedAnswer<'_>, pending: &PendingEdits) -> AnswerGradeView {
    let pending_grade = pending.get(enriched.answer.id).map(str::to_string);
    let pending_valid = pending_grade.as_deref().is_some_and(is_valid_grade);

    let parent = match enriched.parent {
        ParentRef::Meeting(meeting) => ParentView {
            kind: "meeting".to_string(),
            id: meeting.id,
            label: meeting.label(),
        },
        ParentRef::Course(course) => ParentView {
            kind: "course".to_string(),
            id: course.id,
            label: course.name.clone(),
        },
    };

    AnswerGradeView {
        answer_id: enriched.answer.id,
        answer_text: enriched.answer.text.clone(),
        grade: enriched.answer.grade,
        pending_grade,
        pending_valid,
        submitted_at: enriched.answer.submitted_at,
        question: QuestionView {
            id: enriched.question.id,
            text: enriched.question.text.clone(),
            weight: enriched.question.weight,
            weight_label: weight_label(enriched.question.weight),
        },
        container: ContainerView {
            id: enriched.container.id,
            title: enriched.container.label(),
        },
        parent,
        course: enriched.course.map(course_view),
    }
}

pub fn build_grade_book(
    kind: AssessmentKind,
    grouped: &GroupedAnswers<'_>,
    pending: &PendingEdits,
    unresolved: Vec<UnresolvedAnswer>,
) -> GradeBookResponse {
    let students: Vec<StudentGradesView> = grouped
        .iter()
        .map(|group| {
            let answers: Vec<AnswerGradeView> = group
                .answers
                .iter()
                .map(|e| answer_view(e, pending))
                .collect();
            let grades: Vec<f64> = answers.iter().filter_map(|a| a.grade).collect();
            let average_grade = if grades.is_empty() {
                None
            } else {
                Some(grades.iter().sum::<f64>() / grades.len() as f64)
            };

            StudentGradesView {
                student_id: group.student.id,
                nim: group.student.nim.clone(),
                name: group.student.name.clone(),
                graded_count: grades.len(),
                average_grade,
                answers,
            }
        })
        .collect();

    let pending_count = grouped
        .answers()
        .filter(|e| pending.contains(e.answer_id()))
        .count();

    GradeBookResponse {
        kind,
        students,
        total_answers: grouped.answer_count(),
        pending_count,
        unresolved,
    }
}

pub fn build_filter_options(sources: &GradingSources) -> FilterOptionsResponse {
    let index = sources.index();
    let meeting_course = |meeting_id: i64| {
        sources
            .meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .and_then(|m| m.course_id)
    };

    let containers = sources
        .containers
        .iter()
        .map(|c| ContainerOptionView {
            id: c.id,
            title: c.label(),
            parent_id: c.parent_id,
            course_id: match sources.kind {
                AssessmentKind::Quiz => c.parent_id.and_then(meeting_course),
                AssessmentKind::Exam => c
                    .parent_id
                    .and_then(|id| index.course(id))
                    .map(|course| course.id),
            },
        })
        .collect();

    FilterOptionsResponse {
        kind: sources.kind,
        courses: sources.courses.iter().map(course_view).collect(),
        containers,
    }
}
