//! 学生报告生成流程 - 流程层
//!
//! 核心职责：定义"一个学生"的完整处理流程
//!
//! 流程顺序：
//! 1. 数据源获取 StudentContext
//! 2. 计算派生指标
//! 3. 构建上下文
//! 4. 渲染模板
//!
//! 任何一步失败都只影响当前学生，由上层记录到失败列表。

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::datasource::DataSource;
use crate::error::GenerationError;
use crate::models::report::GeneratedReport;
use crate::models::template::Template;
use crate::services::context_builder::{build_context, GenerationDates};
use crate::services::metrics::compute_metrics;
use crate::services::renderer;
use crate::utils::logging::truncate_text;
use crate::workflow::student_ctx::StudentCtx;

/// 单个学生的报告生成流程
///
/// - 不持有任何可变状态，可在多个任务间共享
/// - 只依赖数据源和业务能力（services）
#[derive(Clone)]
pub struct StudentFlow {
    data_source: Arc<dyn DataSource>,
    dates: GenerationDates,
}

impl StudentFlow {
    /// 创建新的学生流程
    pub fn new(data_source: Arc<dyn DataSource>, dates: GenerationDates) -> Self {
        Self { data_source, dates }
    }

    pub async fn run(
        &self,
        template: &Template,
        ctx: &StudentCtx,
    ) -> Result<GeneratedReport, GenerationError> {
        // ========== 步骤 1: 获取数据 ==========
        let data = self
            .data_source
            .get_student_context(&ctx.student_id, &ctx.exam_id)
            .await
            .map_err(|e| {
                warn!("{} ⚠️ 获取数据失败: {}", ctx, e);
                GenerationError::from(e)
            })?;

        debug!("{} 共 {} 科成绩", ctx, data.marks.len());

        // ========== 步骤 2: 计算指标 ==========
        let metrics = compute_metrics(&data.marks).map_err(|e| {
            warn!("{} ⚠️ 成绩计算失败: {}", ctx, e);
            GenerationError::from(e)
        })?;

        // ========== 步骤 3: 构建上下文并渲染 ==========
        let context = build_context(&data, &metrics, self.dates);
        let rendered_content = renderer::render(template, &context).map_err(|e| {
            warn!("{} ⚠️ 渲染失败: {}", ctx, e);
            GenerationError::from(e)
        })?;

        info!(
            "{} ✓ {} 生成完成: {}% {} | {}",
            ctx,
            data.student.name,
            metrics.percentage,
            metrics.grade,
            truncate_text(&template.name, 40)
        );

        Ok(GeneratedReport {
            student_id: data.student.id.clone(),
            student_name: data.student.name.clone(),
            exam_name: data.exam.name.clone(),
            rendered_content,
            template_name: template.name.clone(),
        })
    }
}
