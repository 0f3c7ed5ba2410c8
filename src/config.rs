use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 产物导出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Html,
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            other => Err(ConfigError::InvalidValue {
                name: "EXPORT_FORMAT".to_string(),
                reason: format!("不支持的导出格式 '{}'（可选 pdf / html）", other),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时生成报告的学生数量
    pub max_concurrent_students: usize,
    /// 模板中出现未声明的占位符时是否拒绝生成
    pub strict_placeholders: bool,
    /// 两次导出之间的间隔（毫秒）
    pub export_delay_ms: u64,
    /// 单个导出的超时时间（秒）
    pub export_timeout_secs: u64,
    /// 导出格式
    pub export_format: ExportFormat,
    /// 浏览器路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 用户模板目录
    pub template_folder: String,
    /// 数据集文件
    pub data_file: String,
    /// 产物输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_students: 8,
            strict_placeholders: true,
            export_delay_ms: 300,
            export_timeout_secs: 30,
            export_format: ExportFormat::Pdf,
            chrome_executable: None,
            template_folder: "templates".to_string(),
            data_file: "data/school.toml".to_string(),
            output_dir: "output".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_students: std::env::var("MAX_CONCURRENT_STUDENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_students),
            strict_placeholders: std::env::var("STRICT_PLACEHOLDERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.strict_placeholders),
            export_delay_ms: std::env::var("EXPORT_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.export_delay_ms),
            export_timeout_secs: std::env::var("EXPORT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.export_timeout_secs),
            export_format: std::env::var("EXPORT_FORMAT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.export_format),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().filter(|v| !v.trim().is_empty()),
            template_folder: std::env::var("TEMPLATE_FOLDER").unwrap_or(default.template_folder),
            data_file: std::env::var("DATA_FILE").unwrap_or(default.data_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_students == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_CONCURRENT_STUDENTS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.export_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EXPORT_TIMEOUT_SECS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "OUTPUT_DIR".to_string(),
                reason: "不能为空".to_string(),
            });
        }
        Ok(())
    }
}
