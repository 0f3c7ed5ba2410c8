//! 数据源 - 外部协作者边界
//!
//! 批量生成只通过 [`DataSource`] 获取学生数据，这是唯一的挂起点（I/O）。
//! 每次调用都重新组装 `StudentContext`，不跨请求缓存。

pub mod in_memory;

use async_trait::async_trait;

use crate::error::DataError;
use crate::models::student::StudentContext;

pub use in_memory::{DataSet, InMemoryDataSource, MarkRecord};

/// 学生数据来源
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 获取某学生在某次考试下的完整数据
    async fn get_student_context(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<StudentContext, DataError>;
}
