//! 单元测试共用的数据

use crate::grading::GradingSources;
use crate::models::academics::entities::{Course, Meeting, Student};
use crate::models::assessments::entities::{Answer, AssessmentKind, Container, Question};

pub fn student(id: i64, nim: &str, name: &str) -> Student {
    Student {
        id,
        nim: nim.to_string(),
        name: name.to_string(),
    }
}

pub fn siti() -> Student {
    student(201, "A01", "Siti Aminah")
}

pub fn budi() -> Student {
    student(202, "A02", "Budi")
}

pub fn rina() -> Student {
    student(203, "A03", "Rina Kartika")
}

pub fn courses() -> Vec<Course> {
    vec![
        Course {
            id: 1,
            name: "Pemrograman Dasar".to_string(),
            code: Some("IF101".to_string()),
            lecturer_ids: vec![5],
            meeting_ids: vec![1, 2],
        },
        Course {
            id: 2,
            name: "Basis Data".to_string(),
            code: Some("IF202".to_string()),
            lecturer_ids: vec![6],
            meeting_ids: vec![3],
        },
    ]
}

pub fn meetings() -> Vec<Meeting> {
    vec![
        Meeting {
            id: 1,
            number: Some(1),
            topic: Some("Variabel".to_string()),
            course_id: Some(1),
        },
        Meeting {
            id: 2,
            number: Some(2),
            topic: Some("Percabangan".to_string()),
            course_id: Some(1),
        },
        Meeting {
            id: 3,
            number: Some(1),
            topic: Some("Normalisasi".to_string()),
            course_id: Some(2),
        },
    ]
}

fn container(id: i64, kind: AssessmentKind, parent_id: i64, title: &str) -> Container {
    Container {
        id,
        kind,
        parent_id: Some(parent_id),
        title: Some(title.to_string()),
        instructions: None,
        opens_at: None,
        closes_at: None,
    }
}

fn question(id: i64, kind: AssessmentKind, container_id: i64, weight: Option<f64>) -> Question {
    Question {
        id,
        kind,
        container_id: Some(container_id),
        text: Some(format!("Question {id}")),
        weight,
    }
}

pub fn answer(
    id: i64,
    kind: AssessmentKind,
    question_id: i64,
    student: Student,
    grade: Option<f64>,
) -> Answer {
    Answer {
        id,
        kind,
        question_id: Some(question_id),
        student: Some(student),
        text: Some(format!("answer {id}")),
        grade,
        submitted_at: None,
    }
}

/// 测验数据：课程 1 有 meeting 1、2，课程 2 有 meeting 3
pub fn quiz_sources() -> GradingSources {
    let kind = AssessmentKind::Quiz;
    GradingSources {
        kind,
        answers: vec![
            answer(1, kind, 100, siti(), None),
            answer(2, kind, 101, siti(), Some(85.0)),
            answer(3, kind, 100, budi(), None),
            answer(4, kind, 102, rina(), Some(70.0)),
            answer(5, kind, 101, budi(), None),
        ],
        questions: vec![
            question(100, kind, 10, Some(10.0)),
            question(101, kind, 11, None),
            question(102, kind, 12, Some(20.0)),
        ],
        containers: vec![
            container(10, kind, 1, "Kuis Variabel"),
            container(11, kind, 2, "Kuis Percabangan"),
            container(12, kind, 3, "Kuis Normalisasi"),
        ],
        meetings: meetings(),
        courses: courses(),
    }
}

/// 考试数据：考试 20 属于课程 1，考试 21 属于课程 2
pub fn exam_sources() -> GradingSources {
    let kind = AssessmentKind::Exam;
    GradingSources {
        kind,
        answers: vec![
            answer(1, kind, 300, siti(), None),
            answer(2, kind, 301, rina(), Some(90.0)),
        ],
        questions: vec![
            question(300, kind, 20, Some(50.0)),
            question(301, kind, 21, Some(50.0)),
        ],
        containers: vec![
            container(20, kind, 1, "UTS Pemrograman Dasar"),
            container(21, kind, 2, "UTS Basis Data"),
        ],
        meetings: Vec::new(),
        courses: courses(),
    }
}
