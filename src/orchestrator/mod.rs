//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_generator` - 批量报告生成器
//! - 每批校验一次模板
//! - 控制并发数量（Semaphore）
//! - 每个学生一个任务，结果汇总为 `BatchResult`
//! - 支持取消（CancellationToken）
//!
//! ### `artifact_exporter` - 产物导出器
//! - 逐个把报告转换为 PDF / HTML
//! - 每个导出带超时，导出之间有间隔
//! - 确定性的文件命名
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、统计）
//! - 只在导出阶段持有浏览器
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! batch_generator (处理 Vec<学生>)       artifact_exporter (处理 Vec<报告>)
//!     ↓                                      ↓
//! workflow::StudentFlow (处理单个学生)    infrastructure (DocumentRenderer)
//!     ↓
//! services (能力层：metrics / context / renderer / schema)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_generator 管生成，artifact_exporter 管导出
//! 2. **资源隔离**：只有编排层持有浏览器
//! 3. **向下依赖**：编排层 → workflow → services → models
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;
pub mod artifact_exporter;
pub mod batch_generator;

// 重新导出主要类型
pub use app::{App, RunSummary};
pub use artifact_exporter::{Artifact, ArtifactExporter, ExportFailure, ExportSummary};
pub use batch_generator::BatchGenerator;
