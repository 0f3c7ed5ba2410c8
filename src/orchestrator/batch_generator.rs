//! 批量报告生成器 - 编排层
//!
//! ## 职责
//!
//! 对一组学生执行 StudentFlow，并把每个学生的结果汇总成 `BatchResult`。
//!
//! ## 核心功能
//!
//! 1. **模板预检**：每批只校验一次模板，模板有问题时整批不执行
//! 2. **并发控制**：使用 Semaphore 限制同时处理的学生数量
//! 3. **失败隔离**：每个学生独立的任务、独立的结果，互不影响
//! 4. **取消**：取消后未完成的学生记为 `Cancelled`，已完成的结果保留
//!
//! 每个请求的学生 ID 恰好出现在 `reports` 或 `failures` 之一中，
//! `reports` 保持请求顺序。

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::datasource::DataSource;
use crate::error::{AppResult, GenerationError};
use crate::models::report::{BatchFailure, BatchResult, GeneratedReport};
use crate::models::template::Template;
use crate::services::context_builder::GenerationDates;
use crate::services::schema::check_for_generation;
use crate::workflow::{StudentCtx, StudentFlow};

type StudentOutcome = Result<GeneratedReport, GenerationError>;

/// 批量生成器
pub struct BatchGenerator {
    flow: StudentFlow,
    max_concurrent: usize,
    strict_placeholders: bool,
}

impl BatchGenerator {
    /// 创建批量生成器
    pub fn new(data_source: Arc<dyn DataSource>, config: &Config, dates: GenerationDates) -> Self {
        Self {
            flow: StudentFlow::new(data_source, dates),
            max_concurrent: config.max_concurrent_students.max(1),
            strict_placeholders: config.strict_placeholders,
        }
    }

    /// 生成一批报告
    pub async fn generate_batch(
        &self,
        template: &Template,
        exam_id: &str,
        student_ids: &[String],
    ) -> AppResult<BatchResult> {
        self.generate_batch_with_cancel(template, exam_id, student_ids, CancellationToken::new())
            .await
    }

    /// 生成一批报告（可取消）
    ///
    /// 只有模板校验失败会返回错误，其余失败都记录在 `BatchResult.failures` 中。
    pub async fn generate_batch_with_cancel(
        &self,
        template: &Template,
        exam_id: &str,
        student_ids: &[String],
        cancel: CancellationToken,
    ) -> AppResult<BatchResult> {
        // ========== 模板预检（每批一次） ==========
        let warnings = check_for_generation(template, self.strict_placeholders).map_err(|e| {
            error!("❌ 模板 {} 校验失败，终止本批: {}", template.id, e);
            e
        })?;
        for warning in &warnings {
            warn!("⚠️ 模板 {}: {}", template.id, warning);
        }

        let total = student_ids.len();
        info!(
            "📦 开始生成: 模板 {} | 考试 {} | 共 {} 名学生 | 并发 {}",
            template.id, exam_id, total, self.max_concurrent
        );

        let template = Arc::new(template.clone());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(total);
        let mut cancelled_from = None;

        // ========== 为每个学生创建任务 ==========
        for (idx, student_id) in student_ids.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                cancelled_from = Some(idx);
                break;
            };

            let ctx = StudentCtx::new(student_id.clone(), exam_id.to_string(), idx + 1, total);
            let flow = self.flow.clone();
            let template = template.clone();
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(GenerationError::Cancelled),
                    outcome = flow.run(&template, &ctx) => outcome,
                }
            });
            handles.push((student_id.clone(), handle));
        }

        // ========== 汇总结果 ==========
        let mut result = BatchResult::default();

        for (student_id, handle) in handles {
            let outcome: StudentOutcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[学生 {}] 任务执行失败: {}", student_id, e);
                    Err(GenerationError::TaskPanicked(e.to_string()))
                }
            };
            match outcome {
                Ok(report) => result.reports.push(report),
                Err(reason) => result.failures.push(BatchFailure { student_id, reason }),
            }
        }

        if let Some(start) = cancelled_from {
            warn!("⚠️ 批次已取消，剩余 {} 名学生未处理", total - start);
            result
                .failures
                .extend(student_ids[start..].iter().map(|student_id| BatchFailure {
                    student_id: student_id.clone(),
                    reason: GenerationError::Cancelled,
                }));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{DataSet, InMemoryDataSource, MarkRecord};
    use crate::error::{AppError, DataError};
    use crate::models::student::{Exam, StudentContext, Student};
    use crate::models::template::TemplateType;
    use crate::models::variable::Variable;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            roll_number: None,
            class_name: None,
            section: None,
            guardian_name: None,
            date_of_birth: None,
        }
    }

    fn mark(student_id: &str, subject: &str, obtained: f64, total: f64) -> MarkRecord {
        MarkRecord {
            student_id: student_id.to_string(),
            exam_id: "E1".to_string(),
            subject_name: subject.to_string(),
            marks_obtained: obtained,
            total_marks: total,
        }
    }

    fn data_set() -> DataSet {
        DataSet {
            school: Default::default(),
            exams: vec![Exam {
                id: "E1".to_string(),
                name: "Annual Exam".to_string(),
                exam_type: None,
                date: None,
                academic_year: None,
            }],
            students: vec![
                student("S1", "Aarav Sharma"),
                student("S2", "Diya Patel"),
                student("S3", "Kabir Singh"),
            ],
            marks: vec![
                mark("S1", "Maths", 85.0, 100.0),
                mark("S1", "Science", 90.0, 100.0),
                mark("S2", "Maths", 0.0, 0.0),
                mark("S3", "Maths", 39.0, 100.0),
            ],
        }
    }

    fn template(content: &str, variables: Vec<Variable>) -> Template {
        Template {
            id: "t".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            template_type: TemplateType::StudentReport,
            content: content.to_string(),
            variables,
            is_default: false,
        }
    }

    fn generator(source: Arc<dyn DataSource>, max_concurrent: usize) -> BatchGenerator {
        let config = Config {
            max_concurrent_students: max_concurrent,
            ..Config::default()
        };
        let dates = GenerationDates::on(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        BatchGenerator::new(source, &config, dates)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_division_by_zero_isolated() {
        let generator = generator(Arc::new(InMemoryDataSource::new(data_set())), 2);
        let t = template("{{studentName}}: {{percentage}}% {{grade}}", vec![]);

        let result = generator
            .generate_batch(&t, "E1", &ids(&["S1", "S2", "S3"]))
            .await
            .unwrap();

        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].student_id, "S2");
        assert_eq!(result.failures[0].reason, GenerationError::DivisionByZero);

        assert_eq!(result.reports[0].rendered_content, "Aarav Sharma: 88% A");
        assert_eq!(result.reports[1].rendered_content, "Kabir Singh: 39% F");
        assert_eq!(result.reports[1].exam_name, "Annual Exam");
    }

    #[tokio::test]
    async fn test_missing_data_does_not_abort() {
        let generator = generator(Arc::new(InMemoryDataSource::new(data_set())), 4);
        let t = template("{{studentName}}", vec![]);
        let requested = ids(&["S404", "S1", "S3"]);

        let result = generator.generate_batch(&t, "E1", &requested).await.unwrap();

        assert_eq!(result.total(), requested.len());
        assert_eq!(result.reports.len(), 2);
        assert_eq!(
            result.failure_for("S404"),
            Some(&GenerationError::MissingData(DataError::StudentNotFound {
                student_id: "S404".into()
            }))
        );
    }

    #[tokio::test]
    async fn test_missing_required_variable_recorded_per_student() {
        let generator = generator(Arc::new(InMemoryDataSource::new(data_set())), 1);
        let t = template(
            "{{studentName}} {{remarks}}",
            vec![Variable::new("remarks", "评语").required()],
        );

        let result = generator
            .generate_batch(&t, "E1", &ids(&["S1", "S3"]))
            .await
            .unwrap();

        assert!(result.reports.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert!(result
            .failures
            .iter()
            .all(|f| f.reason == GenerationError::MissingRequiredVariable("remarks".into())));
    }

    #[tokio::test]
    async fn test_bad_template_blocks_whole_batch() {
        let generator = generator(Arc::new(InMemoryDataSource::new(data_set())), 2);
        let t = template("{{grade}}", vec![Variable::new("grade", "等级")]);

        let err = generator
            .generate_batch(&t, "E1", &ids(&["S1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let generator = generator(Arc::new(InMemoryDataSource::new(data_set())), 2);
        let result = generator
            .generate_batch(&template("{{studentName}}", vec![]), "E1", &[])
            .await
            .unwrap();
        assert_eq!(result.total(), 0);
    }

    /// 第一个学生立即返回，其余学生一直挂起
    struct SlowSource {
        inner: InMemoryDataSource,
    }

    #[async_trait]
    impl DataSource for SlowSource {
        async fn get_student_context(
            &self,
            student_id: &str,
            exam_id: &str,
        ) -> Result<StudentContext, DataError> {
            if student_id != "S1" {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.get_student_context(student_id, exam_id).await
        }
    }

    #[tokio::test]
    async fn test_cancellation_keeps_completed_reports() {
        let source = Arc::new(SlowSource {
            inner: InMemoryDataSource::new(data_set()),
        });
        let generator = generator(source, 2);
        let t = template("{{studentName}}", vec![]);
        let requested = ids(&["S1", "S2", "S3"]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = generator
            .generate_batch_with_cancel(&t, "E1", &requested, cancel)
            .await
            .unwrap();

        assert_eq!(result.total(), 3);
        assert_eq!(result.reports.len(), 1);
        assert_eq!(result.reports[0].student_id, "S1");
        assert_eq!(result.failure_for("S2"), Some(&GenerationError::Cancelled));
        assert_eq!(result.failure_for("S3"), Some(&GenerationError::Cancelled));
    }

    /// 每个学生都一直挂起
    struct HangingSource;

    #[async_trait]
    impl DataSource for HangingSource {
        async fn get_student_context(
            &self,
            _student_id: &str,
            _exam_id: &str,
        ) -> Result<StudentContext, DataError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(DataError::ExamNotFound {
                exam_id: "unreachable".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_permit_records_unspawned_students() {
        let generator = generator(Arc::new(HangingSource), 1);
        let t = template("{{studentName}}", vec![]);
        let requested = ids(&["S1", "S2", "S3"]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = generator
            .generate_batch_with_cancel(&t, "E1", &requested, cancel)
            .await
            .unwrap();

        assert_eq!(result.total(), 3);
        assert!(result.reports.is_empty());
        for id in &requested {
            assert_eq!(result.failure_for(id), Some(&GenerationError::Cancelled));
        }
    }
}
