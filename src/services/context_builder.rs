//! 上下文构建 - 业务能力层
//!
//! 把学生、考试、学校和派生指标展开成 键 → 字符串 的映射。
//! 所有值在这里转换为字符串，格式固定，保证重复渲染结果一致：
//!
//! - 日期：`%d %B %Y`，例如 `05 March 2026`
//! - 数字：整数不带小数，否则最多两位小数
//! - 缺失的可选字段：`N/A`

use chrono::NaiveDate;

use crate::models::report::DerivedMetrics;
use crate::models::reserved;
use crate::models::student::StudentContext;
use crate::services::metrics::format_number;
use crate::services::renderer::RenderContext;

/// 缺失字段的占位文本
pub const FALLBACK: &str = "N/A";

/// 上下文中日期的输出格式
pub const DATE_FORMAT: &str = "%d %B %Y";

/// 生成时间信息，由调用方显式传入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationDates {
    /// `currentDate`
    pub generated_on: NaiveDate,
    /// `issueDate`
    pub issue_date: NaiveDate,
}

impl GenerationDates {
    /// 签发日期与生成日期相同
    pub fn on(date: NaiveDate) -> Self {
        Self {
            generated_on: date,
            issue_date: date,
        }
    }

    pub fn with_issue_date(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = issue_date;
        self
    }

    /// 以本地日期为准
    pub fn today() -> Self {
        Self::on(chrono::Local::now().date_naive())
    }
}

/// 构建单个学生的渲染上下文
pub fn build_context(
    data: &StudentContext,
    metrics: &DerivedMetrics,
    dates: GenerationDates,
) -> RenderContext {
    let StudentContext {
        student,
        exam,
        marks,
        school,
    } = data;

    let mut ctx = RenderContext::new();
    let mut put = |key: &str, value: String| {
        ctx.insert(key.to_string(), value);
    };

    put(reserved::SCHOOL_NAME, or_fallback(Some(&school.name)));
    put(reserved::SCHOOL_ADDRESS, or_fallback(school.address.as_ref()));
    put(reserved::SCHOOL_PHONE, or_fallback(school.phone.as_ref()));
    put(reserved::SCHOOL_EMAIL, or_fallback(school.email.as_ref()));
    put(
        reserved::PRINCIPAL_NAME,
        or_fallback(school.principal_name.as_ref()),
    );

    put(reserved::STUDENT_ID, student.id.clone());
    put(reserved::STUDENT_NAME, or_fallback(Some(&student.name)));
    put(reserved::ROLL_NUMBER, or_fallback(student.roll_number.as_ref()));
    put(reserved::CLASS_NAME, or_fallback(student.class_name.as_ref()));
    put(reserved::SECTION, or_fallback(student.section.as_ref()));
    put(
        reserved::GUARDIAN_NAME,
        or_fallback(student.guardian_name.as_ref()),
    );
    put(reserved::DATE_OF_BIRTH, format_date(student.date_of_birth));

    put(reserved::EXAM_NAME, or_fallback(Some(&exam.name)));
    put(reserved::EXAM_TYPE, or_fallback(exam.exam_type.as_ref()));
    put(reserved::EXAM_DATE, format_date(exam.date));
    put(
        reserved::ACADEMIC_YEAR,
        or_fallback(exam.academic_year.as_ref()),
    );

    put(reserved::MARKS_OBTAINED, format_number(metrics.marks_obtained));
    put(reserved::TOTAL_MARKS, format_number(metrics.total_marks));
    put(reserved::PERCENTAGE, metrics.percentage.to_string());
    put(reserved::GRADE, metrics.grade.label().to_string());
    put(reserved::STATUS, metrics.status.clone());
    put(
        reserved::SUBJECT_BREAKDOWN_TABLE,
        metrics.subject_breakdown_table.clone(),
    );
    put(reserved::SUBJECT_COUNT, marks.len().to_string());

    put(reserved::CURRENT_DATE, format_date(Some(dates.generated_on)));
    put(reserved::ISSUE_DATE, format_date(Some(dates.issue_date)));

    ctx
}

fn or_fallback(value: Option<&String>) -> String {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => FALLBACK.to_string(),
    }
}

/// 按固定格式输出日期，缺失时为 `N/A`
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| FALLBACK.to_string())
}
