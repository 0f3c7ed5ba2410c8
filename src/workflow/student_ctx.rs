//! 学生处理上下文
//!
//! 封装"我正在为哪次考试处理第几个学生"这一信息

use std::fmt::Display;

/// 学生处理上下文
#[derive(Debug, Clone)]
pub struct StudentCtx {
    /// 学生ID
    pub student_id: String,

    /// 考试ID
    pub exam_id: String,

    /// 学生在本批中的序号（从1开始，仅用于日志显示）
    pub student_index: usize,

    /// 本批学生总数
    pub total: usize,
}

impl StudentCtx {
    /// 创建新的学生上下文
    pub fn new(student_id: String, exam_id: String, student_index: usize, total: usize) -> Self {
        Self {
            student_id,
            exam_id,
            student_index,
            total,
        }
    }
}

impl Display for StudentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[学生 {} ({}/{}) 考试#{}]",
            self.student_id, self.student_index, self.total, self.exam_id
        )
    }
}
