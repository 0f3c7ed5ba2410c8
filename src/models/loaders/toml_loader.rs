use crate::error::ConfigError;
use crate::models::job::GenerationJob;
use crate::models::template::Template;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载单个模板
pub async fn load_template(toml_file_path: &Path) -> Result<Template> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取模板文件: {}", toml_file_path.display()))?;

    let template: Template = toml::from_str(&content)
        .with_context(|| format!("无法解析模板文件: {}", toml_file_path.display()))?;

    Ok(template)
}

/// 从文件夹中加载所有模板
///
/// 文件夹不存在时返回空列表；单个文件解析失败只记录警告。
pub async fn load_all_templates(folder_path: &str) -> Result<Vec<Template>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        tracing::warn!("模板文件夹不存在，仅使用内置模板: {}", folder_path);
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    // read_dir 顺序不确定
    paths.sort();

    let mut templates = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载模板: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_template(&path).await {
            Ok(template) => {
                tracing::info!(
                    "成功加载模板 {} ({} 个变量)",
                    template.id,
                    template.variables.len()
                );
                templates.push(template);
            }
            Err(e) => {
                tracing::warn!("加载模板失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(templates)
}

/// 加载生成任务文件
pub async fn load_job(toml_file_path: &Path) -> Result<GenerationJob> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取任务文件: {}", toml_file_path.display()))?;

    let job: GenerationJob = toml::from_str(&content)
        .with_context(|| format!("无法解析任务文件: {}", toml_file_path.display()))?;

    let invalid = |reason: &str| ConfigError::InvalidJob {
        path: toml_file_path.display().to_string(),
        reason: reason.to_string(),
    };
    if job.template_id.trim().is_empty() {
        return Err(invalid("templateId 不能为空").into());
    }
    if job.exam_id.trim().is_empty() {
        return Err(invalid("examId 不能为空").into());
    }

    Ok(job)
}
