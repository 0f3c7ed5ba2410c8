use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 学生基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// 考试信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    /// 考试类型，例如 midterm / final / unit_test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
}

/// 学校信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
}

/// 单科成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMark {
    pub student_id: String,
    pub subject_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
}

impl SubjectMark {
    pub fn new(
        student_id: impl Into<String>,
        subject_name: impl Into<String>,
        marks_obtained: f64,
        total_marks: f64,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            subject_name: subject_name.into(),
            marks_obtained,
            total_marks,
        }
    }
}

/// 单个学生的完整数据包（只读，由数据源每次请求时重新组装）
#[derive(Debug, Clone, PartialEq)]
pub struct StudentContext {
    pub student: Student,
    pub exam: Exam,
    pub marks: Vec<SubjectMark>,
    pub school: School,
}
