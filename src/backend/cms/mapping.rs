use super::payload::{
    AnswerAttributes, CmsUser, ContainerAttributes, CourseAttributes, Entry, MeetingAttributes,
    QuestionAttributes, StudentAttributes,
};
use crate::errors::{LmsError, Result};
use crate::models::academics::entities::{Course, Meeting, Student};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};
use crate::models::users::entities::{SessionUser, UserRole};

pub fn session_user(user: CmsUser) -> Result<SessionUser> {
    let role = user
        .role
        .as_ref()
        .ok_or_else(|| LmsError::authorization(format!("User {} has no role", user.id)))?
        .role_type
        .parse::<UserRole>()
        .map_err(LmsError::authorization)?;

    Ok(SessionUser {
        id: user.id,
        username: user.username,
        email: user.email,
        role,
        nim: user.nim.filter(|n| !n.trim().is_empty()),
        full_name: user.full_name,
    })
}

pub fn course(entry: Entry<CourseAttributes>) -> Course {
    let attrs = entry.attributes;
    Course {
        id: entry.id,
        name: attrs
            .name
            .or_else(|| attrs.code.clone())
            .unwrap_or_else(|| format!("Course #{}", entry.id)),
        code: attrs.code,
        lecturer_ids: attrs.lecturers.ids(),
        meeting_ids: attrs.meetings.ids(),
    }
}

pub fn meeting(entry: Entry<MeetingAttributes>) -> Meeting {
    Meeting {
        id: entry.id,
        number: entry.attributes.number,
        topic: entry.attributes.topic,
        course_id: entry.attributes.course.id(),
    }
}

pub fn container(kind: AssessmentKind, entry: Entry<ContainerAttributes>) -> Container {
    let attrs = entry.attributes;
    let parent_id = match kind {
        AssessmentKind::Quiz => attrs.meeting.id(),
        AssessmentKind::Exam => attrs.course.id(),
    };
    Container {
        id: entry.id,
        kind,
        parent_id,
        title: attrs.title,
        instructions: attrs.instructions,
        opens_at: attrs.opens_at,
        closes_at: attrs.closes_at,
    }
}

pub fn question(kind: AssessmentKind, entry: Entry<QuestionAttributes>) -> Question {
    let attrs = entry.attributes;
    let container_id = match kind {
        AssessmentKind::Quiz => attrs.quiz.id(),
        AssessmentKind::Exam => attrs.exam.id(),
    };
    Question {
        id: entry.id,
        kind,
        container_id,
        text: attrs.question,
        weight: attrs.weight,
    }
}

// 没有 NIM 的学生视为缺失，无法分组
fn student(entry: Entry<StudentAttributes>) -> Option<Student> {
    let attrs = entry.attributes;
    let nim = attrs.nim.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
    let name = attrs
        .full_name
        .or(attrs.username)
        .unwrap_or_else(|| nim.clone());
    Some(Student {
        id: entry.id,
        nim,
        name,
    })
}

pub fn answer(kind: AssessmentKind, entry: Entry<AnswerAttributes>) -> Answer {
    let attrs = entry.attributes;
    let question_id = match kind {
        AssessmentKind::Quiz => attrs.quiz_question.id(),
        AssessmentKind::Exam => attrs.exam_question.id(),
    };
    Answer {
        id: entry.id,
        kind,
        question_id,
        student: attrs.student.data.and_then(student),
        text: attrs.answer,
        grade: attrs.grade,
        submitted_at: attrs.submitted_at.or(attrs.created_at),
    }
}
