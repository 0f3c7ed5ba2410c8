/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::report::BatchFailure;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n报告生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    std::fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件 {}", log_file_path))?;
    Ok(())
}

/// 把失败列表追加到日志文件
pub fn append_failures(log_file_path: &str, failures: &[BatchFailure]) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件 {}", log_file_path))?;

    writeln!(file, "失败学生: {}", failures.len())?;
    for failure in failures {
        writeln!(file, "[学生 {}] {}", failure.student_id, failure.reason)?;
    }
    writeln!(file)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize, export_format: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量报告生成模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("📄 导出格式: {}", export_format);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `template_name`: 模板名称
/// - `exam_name`: 考试名称
/// - `total`: 学生总数
pub fn log_batch_start(template_name: &str, exam_name: &str, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始生成: {}", truncate_text(template_name, 40));
    info!("📝 考试: {} | 共 {} 名学生", exam_name, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `success`: 成功数量
/// - `total`: 学生总数
pub fn log_batch_complete(success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 报告生成完成: 成功 {}/{}", success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `generated`: 生成成功数量
/// - `exported`: 导出成功数量
/// - `total`: 学生总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(generated: usize, exported: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 生成成功: {}/{}", generated, total);
    info!("📄 导出成功: {}/{}", exported, generated);
    info!("❌ 生成失败: {}", total - generated);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
