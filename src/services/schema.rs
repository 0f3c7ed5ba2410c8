//! 变量声明校验 - 业务能力层
//!
//! 校验不会因为单个变量出错而中断，所有问题一起返回，
//! 由调用方决定是否阻止保存或生成。

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use crate::error::AppError;
use crate::models::reserved;
use crate::models::template::Template;
use crate::models::variable::{Variable, VariableType};

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("变量键正则非法"));

/// 日期类型默认值的格式
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// 模板校验问题
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaIssue {
    /// 键不符合 `[A-Za-z0-9_.]+`
    #[error("变量键不合法: '{key}'")]
    InvalidKey { key: String },
    /// 键重复
    #[error("变量键重复: {key}")]
    DuplicateKey { key: String },
    /// 与保留的计算键冲突
    #[error("变量键 {key} 与保留键冲突")]
    ReservedKey { key: String },
    /// 不支持的类型
    #[error("变量 {key} 的类型 '{type_name}' 不受支持")]
    UnsupportedType { key: String, type_name: String },
    /// 默认值与类型不匹配
    #[error("变量 {key} 的默认值 '{value}' 不是合法的 {var_type}")]
    IncompatibleDefault {
        key: String,
        var_type: VariableType,
        value: String,
    },
    /// 必填变量带默认值，必填约束永远不会触发
    #[error("变量 {key} 为必填但带有默认值")]
    RequiredWithDefault { key: String },
    /// 占位符既未声明也不是保留键
    #[error("占位符 {{{{{key}}}}} 未声明")]
    UnresolvedPlaceholder { key: String },
}

impl SchemaIssue {
    /// 是否为阻断性问题（不考虑严格模式）
    pub fn is_blocking(&self) -> bool {
        !matches!(self, SchemaIssue::RequiredWithDefault { .. })
    }
}

/// 校验变量声明列表
pub fn validate_variables(variables: &[Variable]) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for var in variables {
        if !KEY_PATTERN.is_match(&var.key) {
            issues.push(SchemaIssue::InvalidKey {
                key: var.key.clone(),
            });
        } else if reserved::is_reserved(&var.key) {
            issues.push(SchemaIssue::ReservedKey {
                key: var.key.clone(),
            });
        }

        if !seen.insert(var.key.as_str()) {
            issues.push(SchemaIssue::DuplicateKey {
                key: var.key.clone(),
            });
        }

        if !var.var_type.is_supported() {
            issues.push(SchemaIssue::UnsupportedType {
                key: var.key.clone(),
                type_name: var.var_type.name().to_string(),
            });
            continue;
        }

        if let Some(value) = &var.default_value {
            if !is_compatible(&var.var_type, value) {
                issues.push(SchemaIssue::IncompatibleDefault {
                    key: var.key.clone(),
                    var_type: var.var_type.clone(),
                    value: value.clone(),
                });
            }
            if var.required {
                issues.push(SchemaIssue::RequiredWithDefault {
                    key: var.key.clone(),
                });
            }
        }
    }

    issues
}

/// 校验整个模板：变量声明 + 未声明的占位符
pub fn validate_template(template: &Template) -> Vec<SchemaIssue> {
    let mut issues = validate_variables(&template.variables);
    issues.extend(
        template
            .unresolved_placeholders()
            .into_iter()
            .map(|key| SchemaIssue::UnresolvedPlaceholder { key }),
    );
    issues
}

/// 生成前检查（每批一次）
///
/// 有阻断性问题时返回 `AppError::Schema`；否则返回非阻断的警告。
/// 未声明的占位符仅在 `strict` 为 true 时阻断。
pub fn check_for_generation(template: &Template, strict: bool) -> Result<Vec<SchemaIssue>, AppError> {
    let (blocking, warnings): (Vec<_>, Vec<_>) =
        validate_template(template).into_iter().partition(|issue| match issue {
            SchemaIssue::UnresolvedPlaceholder { .. } => strict,
            other => other.is_blocking(),
        });

    if blocking.is_empty() {
        Ok(warnings)
    } else {
        Err(AppError::Schema(blocking))
    }
}

fn is_compatible(var_type: &VariableType, value: &str) -> bool {
    match var_type {
        VariableType::Text => true,
        VariableType::Number => value
            .trim()
            .parse::<f64>()
            .map(|n| n.is_finite())
            .unwrap_or(false),
        VariableType::Date => NaiveDate::parse_from_str(value.trim(), DATE_INPUT_FORMAT).is_ok(),
        VariableType::Boolean => matches!(value.trim(), "true" | "false"),
        VariableType::Image => !value.is_empty() && !value.chars().any(char::is_whitespace),
        VariableType::Unsupported(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TemplateType;

    fn template(content: &str, variables: Vec<Variable>) -> Template {
        Template {
            id: "t".to_string(),
            name: "t".to_string(),
            description: String::new(),
            template_type: TemplateType::StudentReport,
            content: content.to_string(),
            variables,
            is_default: false,
        }
    }

    #[test]
    fn test_valid_schema_has_no_issues() {
        let vars = vec![
            Variable::new("remarks", "评语").with_default("Keep it up"),
            Variable::new("attendance", "出勤")
                .with_type(VariableType::Number)
                .with_default("96.5"),
            Variable::new("ptm.date", "家长会")
                .with_type(VariableType::Date)
                .with_default("2026-04-12"),
            Variable::new("promoted", "升级")
                .with_type(VariableType::Boolean)
                .with_default("true"),
            Variable::new("logo", "校徽")
                .with_type(VariableType::Image)
                .with_default("https://example.org/logo.png"),
        ];
        assert!(validate_variables(&vars).is_empty());
    }

    #[test]
    fn test_reports_every_issue_without_stopping() {
        let vars = vec![
            Variable::new("bad key", "x"),
            Variable::new("remarks", "x"),
            Variable::new("remarks", "x"),
            Variable::new("grade", "x"),
            Variable::new("sig", "x").with_type(VariableType::Unsupported("signature".into())),
            Variable::new("n", "x")
                .with_type(VariableType::Number)
                .with_default("ninety"),
            Variable::new("d", "x")
                .with_type(VariableType::Date)
                .with_default("31/03/2026"),
            Variable::new("b", "x")
                .with_type(VariableType::Boolean)
                .with_default("yes"),
        ];
        let issues = validate_variables(&vars);
        assert_eq!(issues.len(), 7);
        assert!(issues.contains(&SchemaIssue::InvalidKey {
            key: "bad key".into()
        }));
        assert!(issues.contains(&SchemaIssue::DuplicateKey {
            key: "remarks".into()
        }));
        assert!(issues.contains(&SchemaIssue::ReservedKey { key: "grade".into() }));
        assert!(issues.contains(&SchemaIssue::UnsupportedType {
            key: "sig".into(),
            type_name: "signature".into()
        }));
    }

    #[test]
    fn test_required_with_default_is_warning_only() {
        let t = template(
            "{{remarks}}",
            vec![Variable::new("remarks", "评语").required().with_default("ok")],
        );
        let warnings = check_for_generation(&t, true).unwrap();
        assert_eq!(
            warnings,
            vec![SchemaIssue::RequiredWithDefault {
                key: "remarks".into()
            }]
        );
    }

    #[test]
    fn test_unresolved_placeholder_blocks_only_in_strict_mode() {
        let t = template("{{studentName}} {{mystery}}", vec![]);

        match check_for_generation(&t, true) {
            Err(AppError::Schema(issues)) => assert_eq!(
                issues,
                vec![SchemaIssue::UnresolvedPlaceholder {
                    key: "mystery".into()
                }]
            ),
            other => panic!("应当阻断: {:?}", other),
        }

        let warnings = check_for_generation(&t, false).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_issue_display() {
        let issue = SchemaIssue::UnresolvedPlaceholder {
            key: "mystery".into(),
        };
        assert_eq!(issue.to_string(), "占位符 {{mystery}} 未声明");
    }
}
