//! 基础设施层：持有稀缺资源（浏览器），只暴露"转换文档"的能力

pub mod document_renderer;
pub mod pdf_renderer;

pub use document_renderer::{DocumentRenderer, HtmlDocumentRenderer};
pub use pdf_renderer::ChromePdfRenderer;
