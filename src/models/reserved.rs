//! 保留的计算键
//!
//! 这些键由上下文构建器填充，模板变量不能使用同名键。

use phf::phf_set;

pub const SCHOOL_NAME: &str = "schoolName";
pub const SCHOOL_ADDRESS: &str = "schoolAddress";
pub const SCHOOL_PHONE: &str = "schoolPhone";
pub const SCHOOL_EMAIL: &str = "schoolEmail";
pub const PRINCIPAL_NAME: &str = "principalName";

pub const STUDENT_ID: &str = "studentId";
pub const STUDENT_NAME: &str = "studentName";
pub const ROLL_NUMBER: &str = "rollNumber";
pub const CLASS_NAME: &str = "className";
pub const SECTION: &str = "section";
pub const GUARDIAN_NAME: &str = "guardianName";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";

pub const EXAM_NAME: &str = "examName";
pub const EXAM_TYPE: &str = "examType";
pub const EXAM_DATE: &str = "examDate";
pub const ACADEMIC_YEAR: &str = "academicYear";

pub const MARKS_OBTAINED: &str = "marksObtained";
pub const TOTAL_MARKS: &str = "totalMarks";
pub const PERCENTAGE: &str = "percentage";
pub const GRADE: &str = "grade";
pub const STATUS: &str = "status";
pub const SUBJECT_BREAKDOWN_TABLE: &str = "subjectBreakdownTable";
pub const SUBJECT_COUNT: &str = "subjectCount";

pub const CURRENT_DATE: &str = "currentDate";
pub const ISSUE_DATE: &str = "issueDate";

static RESERVED_KEYS: phf::Set<&'static str> = phf_set! {
    "schoolName",
    "schoolAddress",
    "schoolPhone",
    "schoolEmail",
    "principalName",
    "studentId",
    "studentName",
    "rollNumber",
    "className",
    "section",
    "guardianName",
    "dateOfBirth",
    "examName",
    "examType",
    "examDate",
    "academicYear",
    "marksObtained",
    "totalMarks",
    "percentage",
    "grade",
    "status",
    "subjectBreakdownTable",
    "subjectCount",
    "currentDate",
    "issueDate",
};

/// 判断是否为保留键
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(key)
}

/// 全部保留键
pub fn all() -> impl Iterator<Item = &'static str> {
    RESERVED_KEYS.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_reserved() {
        for key in [
            SCHOOL_NAME,
            STUDENT_NAME,
            EXAM_DATE,
            SUBJECT_BREAKDOWN_TABLE,
            CURRENT_DATE,
            ISSUE_DATE,
        ] {
            assert!(is_reserved(key), "{} 应为保留键", key);
        }
        assert!(!is_reserved("remarks"));
        assert_eq!(all().count(), 25);
    }
}
