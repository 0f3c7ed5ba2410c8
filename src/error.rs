use thiserror::Error;

use crate::services::schema::SchemaIssue;

/// 应用程序错误类型
///
/// 只有会阻断整个操作的错误才出现在这里；
/// 单个学生的失败使用 [`GenerationError`]，被收集进 `BatchResult.failures`。
#[derive(Debug, Error)]
pub enum AppError {
    /// 模板本身有问题（每批只检查一次）
    #[error("模板校验失败: {}", format_issues(.0))]
    Schema(Vec<SchemaIssue>),
    /// 模板查找错误
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 数据源错误（加载数据集失败等）
    #[error("数据错误: {0}")]
    Data(#[from] DataError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写失败
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 模板来源错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// 模板不存在
    #[error("模板不存在: {id}")]
    NotFound { id: String },
    /// 模板 ID 重复
    #[error("模板 ID 重复: {id}")]
    DuplicateId { id: String },
    /// 用户模板试图覆盖内置模板
    #[error("模板 ID {id} 与内置模板冲突")]
    ShadowsBuiltin { id: String },
}

/// 数据源错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// 学生不存在
    #[error("学生不存在: {student_id}")]
    StudentNotFound { student_id: String },
    /// 考试不存在
    #[error("考试不存在: {exam_id}")]
    ExamNotFound { exam_id: String },
    /// 该学生在该考试下没有成绩记录
    #[error("学生 {student_id} 在考试 {exam_id} 中没有成绩记录")]
    MarksNotFound { student_id: String, exam_id: String },
    /// 数据格式不正确
    #[error("学生 {student_id} 的数据格式不正确: {reason}")]
    Malformed { student_id: String, reason: String },
}

/// 成绩计算错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// 满分总和为 0，无法计算百分比
    #[error("满分总和为 0，无法计算百分比")]
    DivisionByZero,
    /// 单科成绩不合法（不做截断，直接报告）
    #[error("科目 {subject} 成绩不合法: 得分 {obtained} / 满分 {total}")]
    InvalidMark {
        subject: String,
        obtained: f64,
        total: f64,
    },
    /// 分科成绩表渲染失败
    #[error("分科成绩表渲染失败: {0}")]
    Breakdown(#[from] RenderError),
}

/// 渲染错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// 必填变量既没有上下文值也没有默认值
    #[error("缺少必填变量: {0}")]
    MissingRequiredVariable(String),
}

/// 单个学生生成失败的原因
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// 学生、考试或成绩缺失
    #[error("缺少数据: {0}")]
    MissingData(DataError),
    /// 没有可计分的成绩
    #[error("满分总和为 0，无法计算百分比")]
    DivisionByZero,
    /// 成绩不合法
    #[error("科目 {subject} 成绩不合法: 得分 {obtained} / 满分 {total}")]
    InvalidMark {
        subject: String,
        obtained: f64,
        total: f64,
    },
    /// 模板缺少必填数据
    #[error("缺少必填变量: {0}")]
    MissingRequiredVariable(String),
    /// 批次被取消，未处理该学生
    #[error("批次已取消")]
    Cancelled,
    /// 处理任务异常退出
    #[error("任务执行失败: {0}")]
    TaskPanicked(String),
}

impl From<DataError> for GenerationError {
    fn from(err: DataError) -> Self {
        GenerationError::MissingData(err)
    }
}

impl From<MetricsError> for GenerationError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::DivisionByZero => GenerationError::DivisionByZero,
            MetricsError::InvalidMark {
                subject,
                obtained,
                total,
            } => GenerationError::InvalidMark {
                subject,
                obtained,
                total,
            },
            MetricsError::Breakdown(err) => err.into(),
        }
    }
}

impl From<RenderError> for GenerationError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingRequiredVariable(key) => {
                GenerationError::MissingRequiredVariable(key)
            }
        }
    }
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 文档转换失败
    #[error("导出 {name} 失败: {source}")]
    RenderFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 单个导出超时
    #[error("导出 {name} 超时 ({secs} 秒)")]
    Timeout { name: String, secs: u64 },
    /// 浏览器不可用
    #[error("无法启动浏览器: {0}")]
    BrowserUnavailable(String),
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
    /// 任务文件不合法
    #[error("任务文件 {path} 不合法: {reason}")]
    InvalidJob { path: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建 TOML 解析错误
    pub fn toml(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::TomlParse {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_error_maps_to_generation_error() {
        let err: GenerationError = MetricsError::DivisionByZero.into();
        assert_eq!(err, GenerationError::DivisionByZero);
    }

    #[test]
    fn test_render_error_keeps_key() {
        let err: GenerationError =
            RenderError::MissingRequiredVariable("studentName".to_string()).into();
        assert_eq!(
            err,
            GenerationError::MissingRequiredVariable("studentName".to_string())
        );
        assert!(err.to_string().contains("studentName"));
    }

    #[test]
    fn test_missing_data_display() {
        let err: GenerationError = DataError::StudentNotFound {
            student_id: "S9".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "缺少数据: 学生不存在: S9");
    }
}
