//! 基于内存数据集的数据源，数据集可从 TOML 文件加载

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::datasource::DataSource;
use crate::error::{AppError, AppResult, DataError};
use crate::models::student::{Exam, School, Student, StudentContext, SubjectMark};

/// 数据集中的一条成绩记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRecord {
    pub student_id: String,
    pub exam_id: String,
    pub subject_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
}

impl MarkRecord {
    fn to_subject_mark(&self) -> SubjectMark {
        SubjectMark::new(
            self.student_id.clone(),
            self.subject_name.clone(),
            self.marks_obtained,
            self.total_marks,
        )
    }
}

/// 完整数据集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub school: School,
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub marks: Vec<MarkRecord>,
}

/// 内存数据源
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    data: DataSet,
}

impl InMemoryDataSource {
    pub fn new(data: DataSet) -> Self {
        Self { data }
    }

    /// 从 TOML 数据集文件加载
    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file(&display, e))?;
        let data: DataSet = toml::from_str(&content).map_err(|e| AppError::toml(&display, e))?;

        info!(
            "✓ 数据集已加载: {} 名学生, {} 场考试, {} 条成绩",
            data.students.len(),
            data.exams.len(),
            data.marks.len()
        );
        Ok(Self::new(data))
    }

    /// 数据集中全部学生 ID（按数据集顺序）
    pub fn student_ids(&self) -> Vec<String> {
        self.data.students.iter().map(|s| s.id.clone()).collect()
    }

    pub fn exam(&self, exam_id: &str) -> Option<&Exam> {
        self.data.exams.iter().find(|e| e.id == exam_id)
    }

    fn assemble(&self, student_id: &str, exam_id: &str) -> Result<StudentContext, DataError> {
        let student = self
            .data
            .students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| DataError::StudentNotFound {
                student_id: student_id.to_string(),
            })?;

        if student.name.trim().is_empty() {
            return Err(DataError::Malformed {
                student_id: student_id.to_string(),
                reason: "学生姓名为空".to_string(),
            });
        }

        let exam = self.exam(exam_id).ok_or_else(|| DataError::ExamNotFound {
            exam_id: exam_id.to_string(),
        })?;

        let marks: Vec<SubjectMark> = self
            .data
            .marks
            .iter()
            .filter(|m| m.student_id == student_id && m.exam_id == exam_id)
            .map(MarkRecord::to_subject_mark)
            .collect();

        if marks.is_empty() {
            return Err(DataError::MarksNotFound {
                student_id: student_id.to_string(),
                exam_id: exam_id.to_string(),
            });
        }

        let mut subjects = HashSet::new();
        if let Some(dup) = marks.iter().find(|m| !subjects.insert(m.subject_name.as_str())) {
            return Err(DataError::Malformed {
                student_id: student_id.to_string(),
                reason: format!("科目 {} 重复", dup.subject_name),
            });
        }

        Ok(StudentContext {
            student: student.clone(),
            exam: exam.clone(),
            marks,
            school: self.data.school.clone(),
        })
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn get_student_context(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<StudentContext, DataError> {
        debug!("获取学生数据: {} / {}", student_id, exam_id);
        self.assemble(student_id, exam_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"
        [school]
        name = "Green Valley Public School"
        address = "Sector 21, Pune"

        [[exams]]
        id = "E1"
        name = "Half Yearly"
        examType = "midterm"
        date = "2026-02-10"

        [[students]]
        id = "S1"
        name = "Aarav Sharma"
        rollNumber = "1"
        dateOfBirth = "2012-07-04"

        [[students]]
        id = "S2"
        name = "Diya Patel"

        [[students]]
        id = "S3"
        name = "Kabir Singh"

        [[marks]]
        studentId = "S1"
        examId = "E1"
        subjectName = "Maths"
        marksObtained = 85
        totalMarks = 100

        [[marks]]
        studentId = "S1"
        examId = "E1"
        subjectName = "Science"
        marksObtained = 90.5
        totalMarks = 100

        [[marks]]
        studentId = "S3"
        examId = "E1"
        subjectName = "Maths"
        marksObtained = 40
        totalMarks = 100

        [[marks]]
        studentId = "S3"
        examId = "E1"
        subjectName = "Maths"
        marksObtained = 45
        totalMarks = 100
    "#;

    fn source() -> InMemoryDataSource {
        InMemoryDataSource::new(toml::from_str(DATA).unwrap())
    }

    #[tokio::test]
    async fn test_assembles_context() {
        let ctx = source().get_student_context("S1", "E1").await.unwrap();
        assert_eq!(ctx.student.name, "Aarav Sharma");
        assert_eq!(ctx.exam.name, "Half Yearly");
        assert_eq!(ctx.marks.len(), 2);
        assert_eq!(ctx.marks[0].subject_name, "Maths");
        assert_eq!(ctx.marks[1].marks_obtained, 90.5);
        assert_eq!(ctx.school.name, "Green Valley Public School");
    }

    #[tokio::test]
    async fn test_not_found_cases() {
        let source = source();
        assert_eq!(
            source.get_student_context("S404", "E1").await,
            Err(DataError::StudentNotFound {
                student_id: "S404".into()
            })
        );
        assert_eq!(
            source.get_student_context("S1", "E404").await,
            Err(DataError::ExamNotFound {
                exam_id: "E404".into()
            })
        );
        assert_eq!(
            source.get_student_context("S2", "E1").await,
            Err(DataError::MarksNotFound {
                student_id: "S2".into(),
                exam_id: "E1".into()
            })
        );
    }

    #[tokio::test]
    async fn test_duplicate_subject_is_malformed() {
        let err = source().get_student_context("S3", "E1").await.unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }

    #[test]
    fn test_student_ids_in_order() {
        assert_eq!(source().student_ids(), vec!["S1", "S2", "S3"]);
    }
}
