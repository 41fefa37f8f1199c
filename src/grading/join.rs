//! 作答关联解析
//!
//! answer → question → container → parent（测验为 meeting，考试为 course）。
//! 任何一环缺失时返回 [`Resolution::Unresolvable`]，由调用方决定如何呈现，不会报错。

use std::collections::HashMap;

use serde::Serialize;
use ts_rs::TS;

use crate::models::academics::entities::{Course, Meeting, Student};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};

/// 一次视图计算所需的全部扁平数据
#[derive(Debug, Clone)]
pub struct GradingSources {
    pub kind: AssessmentKind,
    pub answers: Vec<Answer>,
    pub questions: Vec<Question>,
    pub containers: Vec<Container>,
    pub meetings: Vec<Meeting>,
    pub courses: Vec<Course>,
}

impl GradingSources {
    pub fn empty(kind: AssessmentKind) -> Self {
        Self {
            kind,
            answers: Vec::new(),
            questions: Vec::new(),
            containers: Vec::new(),
            meetings: Vec::new(),
            courses: Vec::new(),
        }
    }

    /// 建立按 id 的查找表
    pub fn index(&self) -> SourceIndex<'_> {
        SourceIndex {
            kind: self.kind,
            questions: self.questions.iter().map(|q| (q.id, q)).collect(),
            containers: self.containers.iter().map(|c| (c.id, c)).collect(),
            meetings: self.meetings.iter().map(|m| (m.id, m)).collect(),
            courses: self.courses.iter().map(|c| (c.id, c)).collect(),
        }
    }
}

pub struct SourceIndex<'a> {
    kind: AssessmentKind,
    questions: HashMap<i64, &'a Question>,
    containers: HashMap<i64, &'a Container>,
    meetings: HashMap<i64, &'a Meeting>,
    courses: HashMap<i64, &'a Course>,
}

impl<'a> SourceIndex<'a> {
    pub fn course(&self, id: i64) -> Option<&'a Course> {
        self.courses.get(&id).copied()
    }
}

/// 容器的上级
#[derive(Debug, Clone, Copy)]
pub enum ParentRef<'a> {
    Meeting(&'a Meeting),
    Course(&'a Course),
}

impl<'a> ParentRef<'a> {
    /// 上级所属课程 id；meeting 未关联课程时为空
    pub fn course_id(&self) -> Option<i64> {
        match self {
            ParentRef::Meeting(meeting) => meeting.course_id,
            ParentRef::Course(course) => Some(course.id),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ParentRef::Meeting(meeting) => meeting.id,
            ParentRef::Course(course) => course.id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ParentRef::Meeting(meeting) => meeting.label(),
            ParentRef::Course(course) => course.name.clone(),
        }
    }
}

/// 关联完整的作答
#[derive(Debug, Clone, Copy)]
pub struct EnrichedAnswer<'a> {
    pub answer: &'a Answer,
    pub student: &'a Student,
    pub question: &'a Question,
    pub container: &'a Container,
    pub parent: ParentRef<'a>,
    /// 课程信息，测验的 meeting 指向的课程不在范围内时为空
    pub course: Option<&'a Course>,
}

impl<'a> EnrichedAnswer<'a> {
    pub fn answer_id(&self) -> i64 {
        self.answer.id
    }

    pub fn course_id(&self) -> Option<i64> {
        self.parent.course_id()
    }
}

/// 关联断点
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "reason", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum LinkGap {
    MissingStudent,
    MissingQuestionRef,
    QuestionNotFound { question_id: i64 },
    MissingContainerRef { question_id: i64 },
    ContainerNotFound { container_id: i64 },
    MissingParentRef { container_id: i64 },
    ParentNotFound { parent_id: i64 },
}

impl std::fmt::Display for LinkGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkGap::MissingStudent => write!(f, "answer has no student"),
            LinkGap::MissingQuestionRef => write!(f, "answer has no question"),
            LinkGap::QuestionNotFound { question_id } => {
                write!(f, "question {question_id} not found")
            }
            LinkGap::MissingContainerRef { question_id } => {
                write!(f, "question {question_id} has no container")
            }
            LinkGap::ContainerNotFound { container_id } => {
                write!(f, "container {container_id} not found")
            }
            LinkGap::MissingParentRef { container_id } => {
                write!(f, "container {container_id} has no parent")
            }
            LinkGap::ParentNotFound { parent_id } => write!(f, "parent {parent_id} not found"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Resolved(EnrichedAnswer<'a>),
    Unresolvable { answer_id: i64, gap: LinkGap },
}

/// 未能关联的作答
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct UnresolvedAnswer {
    pub answer_id: i64,
    pub gap: LinkGap,
}

/// 批量关联结果，`resolved` 保持输入顺序
#[derive(Debug, Default)]
pub struct JoinOutcome<'a> {
    pub resolved: Vec<EnrichedAnswer<'a>>,
    pub unresolved: Vec<UnresolvedAnswer>,
}

pub fn join<'a>(index: &SourceIndex<'a>, answer: &'a Answer) -> Resolution<'a> {
    match resolve(index, answer) {
        Ok(enriched) => Resolution::Resolved(enriched),
        Err(gap) => Resolution::Unresolvable {
            answer_id: answer.id,
            gap,
        },
    }
}

fn resolve<'a>(
    index: &SourceIndex<'a>,
    answer: &'a Answer,
) -> Result<EnrichedAnswer<'a>, LinkGap> {
    let student = answer.student.as_ref().ok_or(LinkGap::MissingStudent)?;

    let question_id = answer.question_id.ok_or(LinkGap::MissingQuestionRef)?;
    let question = *index
        .questions
        .get(&question_id)
        .ok_or(LinkGap::QuestionNotFound { question_id })?;

    let container_id = question
        .container_id
        .ok_or(LinkGap::MissingContainerRef { question_id })?;
    let container = *index
        .containers
        .get(&container_id)
        .ok_or(LinkGap::ContainerNotFound { container_id })?;

    let parent_id = container
        .parent_id
        .ok_or(LinkGap::MissingParentRef { container_id })?;
    let parent = match index.kind {
        AssessmentKind::Quiz => index.meetings.get(&parent_id).copied().map(ParentRef::Meeting),
        AssessmentKind::Exam => index.courses.get(&parent_id).copied().map(ParentRef::Course),
    }
    .ok_or(LinkGap::ParentNotFound { parent_id })?;

    let course = parent.course_id().and_then(|id| index.course(id));

    Ok(EnrichedAnswer {
        answer,
        student,
        question,
        container,
        parent,
        course,
    })
}

pub fn join_all<'a>(index: &SourceIndex<'a>, answers: &'a [Answer]) -> JoinOutcome<'a> {
    let mut outcome = JoinOutcome::default();
    for answer in answers {
        match join(index, answer) {
            Resolution::Resolved(enriched) => outcome.resolved.push(enriched),
            Resolution::Unresolvable { answer_id, gap } => {
                outcome.unresolved.push(UnresolvedAnswer { answer_id, gap })
            }
        }
    }
    outcome
}
