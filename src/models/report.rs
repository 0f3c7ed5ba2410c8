use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::GenerationError;
use crate::models::grade::Grade;

/// 派生成绩指标（每个学生计算一次，之后不再修改）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub marks_obtained: f64,
    pub total_marks: f64,
    /// 四舍五入（.5 进位）后的整数百分比
    pub percentage: u32,
    pub grade: Grade,
    pub status: String,
    /// 已渲染的分科成绩表
    pub subject_breakdown_table: String,
}

/// 生成成功的报告
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub student_id: String,
    pub student_name: String,
    pub exam_name: String,
    pub rendered_content: String,
    pub template_name: String,
}

/// 单个学生的失败记录
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub student_id: String,
    /// 序列化为可读的原因文本
    #[serde(serialize_with = "serialize_display")]
    pub reason: GenerationError,
}

/// 按 `Display` 输出序列化
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// 一次批量生成的结果
///
/// `reports.len() + failures.len()` 始终等于请求的学生数。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub reports: Vec<GeneratedReport>,
    pub failures: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// 查找某个学生的失败原因
    pub fn failure_for(&self, student_id: &str) -> Option<&GenerationError> {
        self.failures
            .iter()
            .find(|f| f.student_id == student_id)
            .map(|f| &f.reason)
    }
}
