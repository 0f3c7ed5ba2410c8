use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::reserved;
use crate::models::variable::Variable;

/// 占位符 `{{key}}`，允许花括号内两侧空白
pub(crate) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("占位符正则非法")
});

/// 模板分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    StudentReport,
    ClassReport,
    ExamSummary,
}

impl TemplateType {
    pub fn name(self) -> &'static str {
        match self {
            TemplateType::StudentReport => "student_report",
            TemplateType::ClassReport => "class_report",
            TemplateType::ExamSummary => "exam_summary",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 报告模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_type: TemplateType,
    /// HTML 类文本，包含 `{{key}}` 占位符
    pub content: String,
    /// 变量声明（有序）
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub is_default: bool,
}

/// 模板摘要（用于列表展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub template_type: TemplateType,
    pub is_default: bool,
    pub built_in: bool,
}

impl Template {
    /// 按键查找变量声明
    pub fn variable(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    /// 模板中出现的占位符键（去重，按首次出现顺序）
    pub fn placeholders(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        PLACEHOLDER
            .captures_iter(&self.content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }

    /// 既未声明也不是保留键的占位符
    pub fn unresolved_placeholders(&self) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|key| self.variable(key).is_none() && !reserved::is_reserved(key))
            .collect()
    }

    pub fn summary(&self, built_in: bool) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            template_type: self.template_type,
            is_default: self.is_default,
            built_in,
        }
    }
}
