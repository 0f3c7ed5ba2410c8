//! # Report Forge
//!
//! 一个用于批量生成学生成绩报告的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据模型（Models）
//! - `models/` - 变量、模板、学生/考试/成绩、派生指标、批量结果
//! - `models/loaders` - 从 TOML 加载模板和任务
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器），只暴露"HTML → 产物"能力
//! - `ChromePdfRenderer` - 无头浏览器 PDF 转换
//! - `HtmlDocumentRenderer` - 直接输出 HTML
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 纯同步的能力，只处理单个学生
//! - `schema` - 变量与模板校验
//! - `metrics` - 总分、百分比、等级、分科成绩表
//! - `context_builder` - 保留变量上下文
//! - `renderer` - 占位符替换
//! - `template_catalog` - 内置模板 + 用户模板
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个学生"的完整处理流程
//! - `StudentCtx` - 上下文封装（student_id + exam_id + 序号）
//! - `StudentFlow` - 流程编排（取数 → 计算 → 构建上下文 → 渲染）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_generator` - 批量生成，管理并发和取消
//! - `orchestrator/artifact_exporter` - 逐个导出产物
//! - `orchestrator/app` - 应用入口
//!
//! 数据来自 `datasource::DataSource`，这是整个流程中唯一的 I/O 边界。
//!
//! ## 模块结构

pub mod config;
pub mod datasource;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ExportFormat};
pub use datasource::{DataSet, DataSource, InMemoryDataSource};
pub use error::{AppError, AppResult, GenerationError};
pub use infrastructure::{ChromePdfRenderer, DocumentRenderer, HtmlDocumentRenderer};
pub use models::{
    BatchFailure, BatchResult, GeneratedReport, GenerationJob, Template, Variable, VariableType,
};
pub use orchestrator::{App, ArtifactExporter, BatchGenerator};
pub use services::{render, TemplateCatalog, TemplateSource};
pub use workflow::{StudentCtx, StudentFlow};
