use serde::{Deserialize, Serialize};
use std::fmt;

/// 模板变量类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Text,
    Number,
    Date,
    Boolean,
    Image,
    /// 不支持的类型，保留原始名称以便校验时报告
    #[serde(untagged)]
    Unsupported(String),
}

impl VariableType {
    /// 获取类型名称
    pub fn name(&self) -> &str {
        match self {
            VariableType::Text => "text",
            VariableType::Number => "number",
            VariableType::Date => "date",
            VariableType::Boolean => "boolean",
            VariableType::Image => "image",
            VariableType::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, VariableType::Unsupported(_))
    }
}

impl Default for VariableType {
    fn default() -> Self {
        VariableType::Text
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 模板变量声明
///
/// 生成报告时，声明变量只能从 `default_value` 取值（上下文只包含保留变量）。
/// `required = true` 且没有默认值的变量会让批次中每个学生都失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// 占位符键，模板内唯一
    pub key: String,
    /// 显示名称
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Variable {
    /// 创建可选的文本变量
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            var_type: VariableType::Text,
            required: false,
            default_value: None,
        }
    }

    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.var_type = var_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}
