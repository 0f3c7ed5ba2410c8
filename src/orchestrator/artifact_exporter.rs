//! 产物导出器 - 编排层
//!
//! 把生成成功的报告逐个转换为二进制产物。
//!
//! - 同一时间只有一个导出在进行，每两个导出之间暂停一小段时间
//! - 单个导出超时或失败只记录在该报告上，不影响其他报告
//! - 文件名由 (考试名, 学生名) 确定

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::ExportError;
use crate::infrastructure::DocumentRenderer;
use crate::models::report::{serialize_display, GeneratedReport};

/// 导出的产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub student_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 单个导出失败
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFailure {
    pub student_id: String,
    pub file_name: String,
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub error: ExportError,
}

/// 批量导出结果
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<ExportFailure>,
}

/// 产物导出器
pub struct ArtifactExporter<R: DocumentRenderer> {
    renderer: R,
    delay: Duration,
    timeout: Duration,
}

impl<R: DocumentRenderer> ArtifactExporter<R> {
    pub fn new(renderer: R, config: &Config) -> Self {
        Self {
            renderer,
            delay: Duration::from_millis(config.export_delay_ms),
            timeout: Duration::from_secs(config.export_timeout_secs),
        }
    }

    pub fn with_timing(renderer: R, delay: Duration, timeout: Duration) -> Self {
        Self {
            renderer,
            delay,
            timeout,
        }
    }

    /// 取回底层转换器（例如用于关闭浏览器）
    pub fn into_inner(self) -> R {
        self.renderer
    }

    /// 导出单个报告
    pub async fn export_artifact(&self, report: &GeneratedReport) -> Result<Artifact, ExportError> {
        let file_name = artifact_name(
            &report.exam_name,
            &report.student_name,
            self.renderer.extension(),
        );
        self.export_as(report, file_name).await
    }

    async fn export_as(
        &self,
        report: &GeneratedReport,
        file_name: String,
    ) -> Result<Artifact, ExportError> {
        debug!("[学生 {}] 正在导出 {}", report.student_id, file_name);

        let bytes = match timeout(self.timeout, self.renderer.render(&report.rendered_content)).await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(source)) => {
                return Err(ExportError::RenderFailed {
                    name: file_name,
                    source,
                })
            }
            Err(_) => {
                return Err(ExportError::Timeout {
                    name: file_name,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        Ok(Artifact {
            student_id: report.student_id.clone(),
            file_name,
            bytes,
        })
    }

    /// 逐个导出全部报告
    ///
    /// 重名的文件会追加学生 ID（仍重名时再追加序号）以免覆盖。
    pub async fn export_all(&self, reports: &[GeneratedReport]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        let mut used_names = HashSet::new();
        let total = reports.len();

        for (idx, report) in reports.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }

            let file_name = unique_name(&mut used_names, report, self.renderer.extension());

            match self.export_as(report, file_name.clone()).await {
                Ok(artifact) => {
                    info!("[导出 {}/{}] ✓ {}", idx + 1, total, artifact.file_name);
                    summary.artifacts.push(artifact);
                }
                Err(error) => {
                    error!("[导出 {}/{}] ❌ {}", idx + 1, total, error);
                    summary.failures.push(ExportFailure {
                        student_id: report.student_id.clone(),
                        file_name,
                        error,
                    });
                }
            }
        }

        summary
    }
}

/// 转换器不可用时，每份报告记一条失败
pub fn unavailable(reports: &[GeneratedReport], extension: &str, reason: &str) -> ExportSummary {
    let mut used_names = HashSet::new();
    let failures = reports
        .iter()
        .map(|report| ExportFailure {
            student_id: report.student_id.clone(),
            file_name: unique_name(&mut used_names, report, extension),
            error: ExportError::BrowserUnavailable(reason.to_string()),
        })
        .collect();

    ExportSummary {
        artifacts: Vec::new(),
        failures,
    }
}

/// 把产物写入目录
///
/// 返回写入成功的路径和写入失败的产物；单个文件失败不影响其他文件。
pub async fn write_all(
    artifacts: &[Artifact],
    output_dir: &Path,
) -> (Vec<PathBuf>, Vec<ExportFailure>) {
    let mut written = Vec::with_capacity(artifacts.len());
    let mut failures = Vec::new();

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!("❌ 无法创建输出目录 {}: {}", output_dir.display(), e);
        for artifact in artifacts {
            failures.push(ExportFailure {
                student_id: artifact.student_id.clone(),
                file_name: artifact.file_name.clone(),
                error: ExportError::WriteFailed {
                    path: output_dir.display().to_string(),
                    source: std::io::Error::new(e.kind(), e.to_string()),
                },
            });
        }
        return (written, failures);
    }

    for artifact in artifacts {
        let path = output_dir.join(&artifact.file_name);
        match fs::write(&path, &artifact.bytes).await {
            Ok(()) => written.push(path),
            Err(source) => {
                error!("[学生 {}] ❌ 写入 {} 失败: {}", artifact.student_id, path.display(), source);
                failures.push(ExportFailure {
                    student_id: artifact.student_id.clone(),
                    file_name: artifact.file_name.clone(),
                    error: ExportError::WriteFailed {
                        path: path.display().to_string(),
                        source,
                    },
                });
            }
        }
    }

    (written, failures)
}

/// 在本批中唯一的文件名
fn unique_name(used: &mut HashSet<String>, report: &GeneratedReport, extension: &str) -> String {
    let mut name = artifact_name(&report.exam_name, &report.student_name, extension);
    if used.contains(&name) {
        let stem = format!("{}_{}", report.student_name, report.student_id);
        name = artifact_name(&report.exam_name, &stem, extension);
        let mut n = 2;
        while used.contains(&name) {
            name = artifact_name(&report.exam_name, &format!("{}_{}", stem, n), extension);
            n += 1;
        }
    }
    used.insert(name.clone());
    name
}

/// 产物文件名：`<考试名>_<学生名>.<扩展名>`
///
/// 字母数字（含中文等）保留，其余字符替换为 `_`，连续的 `_` 合并。
pub fn artifact_name(exam_name: &str, student_name: &str, extension: &str) -> String {
    let exam = sanitize(exam_name);
    let student = sanitize(student_name);
    let stem = match (exam.is_empty(), student.is_empty()) {
        (false, false) => format!("{}_{}", exam, student),
        (false, true) => exam,
        (true, false) => student,
        (true, true) => "report".to_string(),
    };
    format!("{}.{}", stem, extension)
}

fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
