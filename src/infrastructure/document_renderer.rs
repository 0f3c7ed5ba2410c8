//! 文档转换器 - 基础设施层
//!
//! 把渲染好的 HTML 字符串转换为二进制产物，不认识学生或模板。

use async_trait::async_trait;

/// 转换失败的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTML → 二进制产物
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// 产物文件扩展名（不含点）
    fn extension(&self) -> &'static str;

    /// 转换单个文档
    async fn render(&self, html: &str) -> Result<Vec<u8>, BoxError>;
}

/// 把报告片段包装成完整的 HTML 文档
pub fn wrap_html(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        BASE_STYLE, body
    )
}

const BASE_STYLE: &str = "body{font-family:sans-serif;margin:24px;}\
table.subject-breakdown{border-collapse:collapse;width:100%;}\
table.subject-breakdown th,table.subject-breakdown td{border:1px solid #999;padding:4px 8px;text-align:left;}";

/// 直接输出 HTML 文档
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentRenderer;

#[async_trait]
impl DocumentRenderer for HtmlDocumentRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    async fn render(&self, html: &str) -> Result<Vec<u8>, BoxError> {
        Ok(wrap_html(html).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_html_renderer_wraps_body() {
        let bytes = HtmlDocumentRenderer.render("<p>Riya</p>").await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(text.contains("<body>\n<p>Riya</p>\n</body>"));
        assert_eq!(HtmlDocumentRenderer.extension(), "html");
    }
}
