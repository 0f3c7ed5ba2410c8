//! 占位符替换引擎 - 业务能力层
//!
//! 只负责"把上下文填进模板"，不关心数据从哪里来。
//!
//! 每个 `{{key}}` 的取值规则：
//! 1. 上下文中有该键 → 使用上下文值
//! 2. 已声明且有默认值 → 使用默认值
//! 3. 已声明、必填、无默认值 → 整体失败 `MissingRequiredVariable`
//! 4. 已声明、可选、无默认值 → 空字符串
//! 5. 未声明且不在上下文中 → 原样保留
//!
//! 替换只扫描一遍，替换进去的值不会再被扫描。
//! 替换进去的值中的 `{` `}` 会转成 HTML 字符引用（`&#123;` `&#125;`），
//! 因此数据里的 `{{key}}` 不会在输出中形成占位符，重复渲染结果不变。
//!
//! 声明变量的取值只有默认值：上下文由保留变量构成，调用方无法按学生
//! 提供声明变量的值。必填且无默认值的变量会让每个学生都失败，
//! 模板作者应为这类变量提供默认值。

use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

use crate::error::RenderError;
use crate::models::template::{Template, PLACEHOLDER};
use crate::models::variable::Variable;

/// 渲染上下文：键 → 字符串值
pub type RenderContext = HashMap<String, String>;

/// 渲染模板
pub fn render(template: &Template, context: &RenderContext) -> Result<String, RenderError> {
    render_content(&template.content, &template.variables, context)
}

/// 按给定的变量声明渲染任意内容
pub fn render_content(
    content: &str,
    variables: &[Variable],
    context: &RenderContext,
) -> Result<String, RenderError> {
    let mut output = String::with_capacity(content.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(content) {
        let (Some(token), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        output.push_str(&content[last..token.start()]);
        match resolve(key.as_str(), variables, context)? {
            Some(value) => output.push_str(&neutralize(value)),
            None => {
                debug!("未声明的占位符保留原样: {}", token.as_str());
                output.push_str(token.as_str());
            }
        }
        last = token.end();
    }

    output.push_str(&content[last..]);
    Ok(output)
}

/// 把值中的花括号转成字符引用，使其无法组成占位符
fn neutralize(value: &str) -> Cow<'_, str> {
    if value.contains(['{', '}']) {
        Cow::Owned(value.replace('{', "&#123;").replace('}', "&#125;"))
    } else {
        Cow::Borrowed(value)
    }
}

/// 解析单个键；`None` 表示保留原样
fn resolve<'a>(
    key: &str,
    variables: &'a [Variable],
    context: &'a RenderContext,
) -> Result<Option<&'a str>, RenderError> {
    if let Some(value) = context.get(key) {
        return Ok(Some(value.as_str()));
    }

    let Some(var) = variables.iter().find(|v| v.key == key) else {
        return Ok(None);
    };

    match &var.default_value {
        Some(default) => Ok(Some(default.as_str())),
        None if var.required => Err(RenderError::MissingRequiredVariable(key.to_string())),
        None => Ok(Some("")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TemplateType;

    fn scenario_template() -> Template {
        Template {
            id: "scenario".to_string(),
            name: "scenario".to_string(),
            description: String::new(),
            template_type: TemplateType::StudentReport,
            content: "{{studentName}}: {{remarks}}".to_string(),
            variables: vec![
                Variable::new("studentName", "学生姓名").required(),
                Variable::new("remarks", "评语").with_default("Keep it up"),
            ],
            is_default: false,
        }
    }

    fn ctx(pairs: &[(&str, &str)]) -> RenderContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_fills_missing_optional() {
        let out = render(&scenario_template(), &ctx(&[("studentName", "Aarav Sharma")])).unwrap();
        assert_eq!(out, "Aarav Sharma: Keep it up");
    }

    #[test]
    fn test_missing_required_fails_whole_render() {
        let err = render(&scenario_template(), &RenderContext::new()).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingRequiredVariable("studentName".to_string())
        );
    }

    #[test]
    fn test_context_wins_over_default() {
        let out = render(
            &scenario_template(),
            &ctx(&[("studentName", "Aarav Sharma"), ("remarks", "Excellent work")]),
        )
        .unwrap();
        assert_eq!(out, "Aarav Sharma: Excellent work");
    }

    #[test]
    fn test_optional_without_default_becomes_empty() {
        let vars = vec![Variable::new("note", "备注")];
        let out = render_content("[{{note}}]", &vars, &RenderContext::new()).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_repeated_keys_get_identical_value() {
        let out = render_content(
            "{{grade}}-{{ grade }}-{{grade}}",
            &[],
            &ctx(&[("grade", "A+")]),
        )
        .unwrap();
        assert_eq!(out, "A+-A+-A+");
    }

    #[test]
    fn test_unknown_tokens_left_verbatim() {
        let out = render_content(
            "<p>{{studentName}} {{unknownThing}} {{ spaced }}</p>",
            &[],
            &ctx(&[("studentName", "Riya")]),
        )
        .unwrap();
        assert_eq!(out, "<p>Riya {{unknownThing}} {{ spaced }}</p>");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let out = render_content(
            "{{a}}",
            &[],
            &ctx(&[("a", "{{b}}"), ("b", "nested")]),
        )
        .unwrap();
        assert_eq!(out, "&#123;&#123;b&#125;&#125;");
    }

    #[test]
    fn test_value_containing_declared_token_stays_inert() {
        let template = scenario_template();
        let context = ctx(&[("studentName", "Eve {{remarks}}")]);

        let once = render(&template, &context).unwrap();
        assert_eq!(once, "Eve &#123;&#123;remarks&#125;&#125;: Keep it up");
        assert!(!once.contains("{{remarks}}"));

        let rendered = Template {
            content: once.clone(),
            ..template
        };
        assert_eq!(render(&rendered, &context).unwrap(), once);
    }

    #[test]
    fn test_render_is_idempotent() {
        let template = scenario_template();
        let context = ctx(&[("studentName", "Aarav Sharma")]);
        let once = render(&template, &context).unwrap();

        let rendered = Template {
            content: once.clone(),
            ..template
        };
        let twice = render(&rendered, &context).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_declared_placeholders_remain() {
        let template = scenario_template();
        let out = render(&template, &ctx(&[("studentName", "Kabir")])).unwrap();
        for var in &template.variables {
            assert!(!out.contains(&format!("{{{{{}}}}}", var.key)));
        }
    }
}
