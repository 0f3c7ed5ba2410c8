//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 把各层组装成一次完整的运行：
//!
//! 1. **应用初始化**：校验配置、初始化日志文件、加载模板目录和数据集
//! 2. **批量生成**：委托 `BatchGenerator`，Ctrl+C 触发取消
//! 3. **导出产物**：按配置选择 PDF（无头浏览器）或 HTML，委托 `ArtifactExporter`
//! 4. **落盘与统计**：写出产物和 `batch_result.json`，输出全局统计
//!
//! 生成完成后，导出或落盘失败只记录为逐份报告的 `ExportFailure`，不会丢弃批次结果。
//!
//! 浏览器只在导出阶段启动，导出结束立即关闭。

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, ExportFormat};
use crate::error::ExportError;
use crate::datasource::InMemoryDataSource;
use crate::infrastructure::{ChromePdfRenderer, DocumentRenderer, HtmlDocumentRenderer};
use crate::models::job::GenerationJob;
use crate::models::report::{BatchFailure, BatchResult, GeneratedReport};
use crate::orchestrator::artifact_exporter::{self, ArtifactExporter, ExportFailure, ExportSummary};
use crate::orchestrator::batch_generator::BatchGenerator;
use crate::services::context_builder::GenerationDates;
use crate::services::template_catalog::{TemplateCatalog, TemplateSource};
use crate::utils::logging;

/// 运行记录文件名（写在输出目录下）
pub const RESULT_FILE: &str = "batch_result.json";

/// 应用主结构
pub struct App {
    config: Config,
    catalog: TemplateCatalog,
    data_source: Arc<InMemoryDataSource>,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunSummary {
    pub batch: BatchResult,
    pub written: Vec<PathBuf>,
    pub export_failures: Vec<ExportFailure>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRecord<'a> {
    template_id: &'a str,
    exam_id: &'a str,
    generated_on: NaiveDate,
    reports: Vec<&'a str>,
    failures: &'a [BatchFailure],
    artifacts: Vec<String>,
    export_failures: &'a [ExportFailure],
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.max_concurrent_students, &config.export_format.to_string());

        info!("\n📁 正在加载模板目录: {}", config.template_folder);
        let catalog = TemplateCatalog::load(&config.template_folder).await?;

        info!("📁 正在加载数据集: {}", config.data_file);
        let data_source = InMemoryDataSource::from_toml_file(Path::new(&config.data_file))
            .await
            .with_context(|| format!("加载数据集失败: {}", config.data_file))?;

        Ok(Self {
            config,
            catalog,
            data_source: Arc::new(data_source),
        })
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// 运行一次生成任务
    pub async fn run(&self, job: GenerationJob) -> Result<RunSummary> {
        let template = self.catalog.get_template(&job.template_id)?;

        let student_ids = if job.student_ids.is_empty() {
            info!("💡 未指定学生，选择数据集中的全部学生");
            self.data_source.student_ids()
        } else {
            job.student_ids.clone()
        };

        if student_ids.is_empty() {
            warn!("⚠️ 没有需要生成报告的学生，程序结束");
            return Ok(RunSummary {
                batch: BatchResult::default(),
                written: Vec::new(),
                export_failures: Vec::new(),
            });
        }

        let exam_name = match self.data_source.exam(&job.exam_id) {
            Some(exam) => exam.name.clone(),
            None => {
                warn!("⚠️ 数据集中没有考试 {}，所有学生都将失败", job.exam_id);
                job.exam_id.clone()
            }
        };

        let mut dates = GenerationDates::today();
        if let Some(issue_date) = job.issue_date {
            dates = dates.with_issue_date(issue_date);
        }

        logging::log_batch_start(&template.name, &exam_name, student_ids.len());

        // ========== 批量生成（Ctrl+C 取消） ==========
        let cancel = CancellationToken::new();
        let listener = spawn_ctrl_c_listener(cancel.clone());

        let generator = BatchGenerator::new(self.data_source.clone(), &self.config, dates);
        let batch = generator
            .generate_batch_with_cancel(&template, &job.exam_id, &student_ids, cancel)
            .await;
        listener.abort();
        let batch = batch?;

        logging::log_batch_complete(batch.reports.len(), batch.total());
        for failure in &batch.failures {
            error!("[学生 {}] ❌ {}", failure.student_id, failure.reason);
        }
        if !batch.failures.is_empty() {
            if let Err(e) = logging::append_failures(&self.config.output_log_file, &batch.failures) {
                warn!("⚠️ 写入失败列表到日志文件失败: {:#}", e);
            }
        }

        // ========== 导出（单个失败不影响批次结果） ==========
        let mut export = self.export(&batch.reports).await;

        let output_dir = Path::new(&self.config.output_dir);
        let (written, write_failures) =
            artifact_exporter::write_all(&export.artifacts, output_dir).await;
        export.failures.extend(write_failures);

        let record = RunRecord {
            template_id: &template.id,
            exam_id: &job.exam_id,
            generated_on: dates.generated_on,
            reports: batch.reports.iter().map(|r| r.student_id.as_str()).collect(),
            failures: &batch.failures,
            artifacts: written
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .collect(),
            export_failures: &export.failures,
        };
        if let Err(e) = write_record(&record, output_dir).await {
            error!("❌ 写入运行记录失败: {:#}", e);
        }

        logging::print_final_stats(
            batch.reports.len(),
            written.len(),
            batch.total(),
            &self.config.output_log_file,
        );

        Ok(RunSummary {
            batch,
            written,
            export_failures: export.failures,
        })
    }

    async fn export(&self, reports: &[GeneratedReport]) -> ExportSummary {
        if reports.is_empty() {
            return ExportSummary::default();
        }

        info!("\n📄 开始导出 {} 份报告 ({})", reports.len(), self.config.export_format);

        let summary = match self.config.export_format {
            ExportFormat::Html => export_with(HtmlDocumentRenderer, &self.config, reports).await.0,
            ExportFormat::Pdf => {
                let chrome = self.config.chrome_executable.as_deref().map(Path::new);
                match ChromePdfRenderer::launch(chrome).await {
                    Ok(renderer) => {
                        let (summary, renderer) = export_with(renderer, &self.config, reports).await;
                        renderer.close().await;
                        summary
                    }
                    Err(ExportError::BrowserUnavailable(reason)) => {
                        artifact_exporter::unavailable(reports, "pdf", &reason)
                    }
                    Err(e) => artifact_exporter::unavailable(reports, "pdf", &e.to_string()),
                }
            }
        };

        if !summary.failures.is_empty() {
            warn!("⚠️ {} 份报告导出失败", summary.failures.len());
        }
        summary
    }
}

async fn write_record(record: &RunRecord<'_>, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;
    let record_path = output_dir.join(RESULT_FILE);
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(&record_path, json)
        .await
        .with_context(|| format!("写入运行记录失败: {}", record_path.display()))?;
    Ok(record_path)
}

async fn export_with<R: DocumentRenderer>(
    renderer: R,
    config: &Config,
    reports: &[GeneratedReport],
) -> (ExportSummary, R) {
    let exporter = ArtifactExporter::new(renderer, config);
    let summary = exporter.export_all(reports).await;
    (summary, exporter.into_inner())
}

fn spawn_ctrl_c_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到 Ctrl+C，正在取消剩余学生...");
            cancel.cancel();
        }
    })
}
