use serde::{Deserialize, Serialize};

/// 一次生成请求：选中的模板、考试和学生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub template_id: String,
    pub exam_id: String,
    /// 为空时表示数据集中的全部学生
    #[serde(default)]
    pub student_ids: Vec<String>,
    /// 覆盖报告上的签发日期（YYYY-MM-DD）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<chrono::NaiveDate>,
}
