//! 成绩指标计算 - 业务能力层
//!
//! 纯函数：总分、百分比、等级、评价以及分科成绩表。
//!
//! 百分比为整数，按 `得分 * 100 / 满分` 四舍五入（.5 一律进位），
//! 等级由四舍五入后的百分比决定。

use crate::error::MetricsError;
use crate::models::grade::Grade;
use crate::models::report::DerivedMetrics;
use crate::models::student::SubjectMark;
use crate::models::variable::Variable;
use crate::services::renderer::{self, RenderContext};

const TABLE_HEADER: &str = "<table class=\"subject-breakdown\">\
<thead><tr><th>Subject</th><th>Marks Obtained</th><th>Total Marks</th><th>Percentage</th><th>Grade</th></tr></thead>\
<tbody>";

const TABLE_FOOTER: &str = "</tbody></table>";

/// 分科成绩表的行模板
const ROW_TEMPLATE: &str = "<tr><td>{{subjectName}}</td><td>{{marksObtained}}</td>\
<td>{{totalMarks}}</td><td>{{percentage}}%</td><td>{{grade}}</td></tr>";

const ROW_KEYS: [&str; 5] = [
    "subjectName",
    "marksObtained",
    "totalMarks",
    "percentage",
    "grade",
];

/// 计算单个学生的派生指标
pub fn compute_metrics(marks: &[SubjectMark]) -> Result<DerivedMetrics, MetricsError> {
    let total_marks: f64 = marks.iter().map(|m| m.total_marks).sum();
    let marks_obtained: f64 = marks.iter().map(|m| m.marks_obtained).sum();

    if total_marks == 0.0 {
        return Err(MetricsError::DivisionByZero);
    }

    for mark in marks {
        validate_mark(mark)?;
    }

    let percentage = percentage_of(marks_obtained, total_marks);
    let grade = Grade::from_percentage(percentage);

    Ok(DerivedMetrics {
        marks_obtained,
        total_marks,
        percentage,
        grade,
        status: grade.status().to_string(),
        subject_breakdown_table: render_breakdown_table(marks)?,
    })
}

/// 四舍五入后的整数百分比，调用方保证 `total > 0`
pub fn percentage_of(obtained: f64, total: f64) -> u32 {
    round_half_up(obtained * 100.0 / total)
}

fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

fn validate_mark(mark: &SubjectMark) -> Result<(), MetricsError> {
    let valid = mark.marks_obtained.is_finite()
        && mark.total_marks.is_finite()
        && mark.marks_obtained >= 0.0
        && mark.total_marks > 0.0
        && mark.marks_obtained <= mark.total_marks;

    if valid {
        Ok(())
    } else {
        Err(MetricsError::InvalidMark {
            subject: mark.subject_name.clone(),
            obtained: mark.marks_obtained,
            total: mark.total_marks,
        })
    }
}

/// 渲染分科成绩表，行顺序与输入一致
fn render_breakdown_table(marks: &[SubjectMark]) -> Result<String, MetricsError> {
    let row_variables: Vec<Variable> = ROW_KEYS
        .iter()
        .map(|key| Variable::new(*key, *key).required())
        .collect();

    let mut table = String::from(TABLE_HEADER);
    for mark in marks {
        let subject_percentage = percentage_of(mark.marks_obtained, mark.total_marks);
        let row: RenderContext = [
            ("subjectName", mark.subject_name.clone()),
            ("marksObtained", format_number(mark.marks_obtained)),
            ("totalMarks", format_number(mark.total_marks)),
            ("percentage", subject_percentage.to_string()),
            (
                "grade",
                Grade::from_percentage(subject_percentage).label().to_string(),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        table.push_str(&renderer::render_content(ROW_TEMPLATE, &row_variables, &row)?);
    }
    table.push_str(TABLE_FOOTER);

    Ok(table)
}

/// 数字格式：整数不带小数，否则最多两位小数并去掉末尾的 0
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
