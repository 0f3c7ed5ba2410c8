use anyhow::Result;
use report_forge::models::load_job;
use report_forge::utils::logging;
use report_forge::{App, Config};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 任务文件：第一个命令行参数，默认 job.toml
    let job_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("job.toml"));
    let job = load_job(&job_path).await?;

    // 初始化并运行应用
    let summary = App::initialize(config).await?.run(job).await?;

    if !summary.batch.failures.is_empty() || !summary.export_failures.is_empty() {
        std::process::exit(2);
    }

    Ok(())
}
