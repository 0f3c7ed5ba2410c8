//! 模板目录 - 业务能力层
//!
//! 内置模板与用户模板放在同一个目录中，按 ID 查找。
//! 用户模板不能覆盖内置模板的 ID。

use tracing::{info, warn};

use crate::error::TemplateError;
use crate::models::loaders;
use crate::models::template::{Template, TemplateSummary, TemplateType};
use crate::models::variable::{Variable, VariableType};

/// 模板来源
pub trait TemplateSource: Send + Sync {
    /// 按 ID 获取模板
    fn get_template(&self, id: &str) -> Result<Template, TemplateError>;

    /// 列出所有模板
    fn list(&self) -> Vec<TemplateSummary>;
}

pub const REPORT_CARD_ID: &str = "builtin-report-card";
pub const PROGRESS_REPORT_ID: &str = "builtin-progress-report";
pub const RESULT_SLIP_ID: &str = "builtin-result-slip";

const REPORT_CARD_CONTENT: &str = r#"<div class="report-card">
  <header>
    <h1>{{schoolName}}</h1>
    <p>{{schoolAddress}} | {{schoolPhone}} | {{schoolEmail}}</p>
    <h2>{{examName}} ({{academicYear}})</h2>
  </header>
  <section class="student">
    <p>Name: {{studentName}}</p>
    <p>Roll No: {{rollNumber}} | Class: {{className}} - {{section}}</p>
    <p>Guardian: {{guardianName}} | Date of Birth: {{dateOfBirth}}</p>
  </section>
  <section class="marks">
    {{subjectBreakdownTable}}
  </section>
  <section class="summary">
    <p>Total: {{marksObtained}} / {{totalMarks}}</p>
    <p>Percentage: {{percentage}}%</p>
    <p>Grade: {{grade}} ({{status}})</p>
    <p>Attendance: {{attendance}}</p>
  </section>
  <section class="remarks">
    <p>{{remarks}}</p>
  </section>
  <footer>
    <p>Class Teacher: {{classTeacherName}}</p>
    <p>Principal: {{principalName}}</p>
    <p>Issued on {{issueDate}}</p>
  </footer>
</div>"#;

const PROGRESS_REPORT_CONTENT: &str = r#"<div class="progress-report">
  <h2>{{studentName}} - {{examName}}</h2>
  <p>{{percentage}}% | Grade {{grade}} | {{status}}</p>
  {{subjectBreakdownTable}}
  <p>{{remarks}}</p>
  <p class="generated">Generated on {{currentDate}}</p>
</div>"#;

const RESULT_SLIP_CONTENT: &str = r#"<div class="result-slip">
  <h3>{{schoolName}}</h3>
  <p>{{examName}} ({{examType}}) held on {{examDate}}</p>
  <p>{{rollNumber}} {{studentName}}: {{marksObtained}}/{{totalMarks}} ({{percentage}}%) {{grade}}</p>
  <p>Subjects: {{subjectCount}}</p>
</div>"#;

/// 内置模板
pub fn built_in_templates() -> Vec<Template> {
    vec![
        Template {
            id: REPORT_CARD_ID.to_string(),
            name: "Standard Report Card".to_string(),
            description: "Full report card with school header, subject table and remarks"
                .to_string(),
            template_type: TemplateType::StudentReport,
            content: REPORT_CARD_CONTENT.to_string(),
            variables: vec![
                Variable::new("remarks", "Remarks").with_default("Keep up the good work!"),
                Variable::new("attendance", "Attendance (%)").with_type(VariableType::Number),
                Variable::new("classTeacherName", "Class Teacher"),
            ],
            is_default: true,
        },
        Template {
            id: PROGRESS_REPORT_ID.to_string(),
            name: "Compact Progress Report".to_string(),
            description: "One-page summary of a student's exam performance".to_string(),
            template_type: TemplateType::StudentReport,
            content: PROGRESS_REPORT_CONTENT.to_string(),
            variables: vec![Variable::new("remarks", "Remarks")],
            is_default: false,
        },
        Template {
            id: RESULT_SLIP_ID.to_string(),
            name: "Exam Result Slip".to_string(),
            description: "Short result slip for a single exam".to_string(),
            template_type: TemplateType::ExamSummary,
            content: RESULT_SLIP_CONTENT.to_string(),
            variables: Vec::new(),
            is_default: true,
        },
    ]
}

/// 模板目录
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    built_in: Vec<Template>,
    user: Vec<Template>,
}

impl TemplateCatalog {
    /// 只包含内置模板
    pub fn new() -> Self {
        Self {
            built_in: built_in_templates(),
            user: Vec::new(),
        }
    }

    /// 从文件夹加载用户模板
    ///
    /// ID 冲突的模板会被跳过并记录警告。
    pub async fn load(folder_path: &str) -> anyhow::Result<Self> {
        let mut catalog = Self::new();
        for template in loaders::load_all_templates(folder_path).await? {
            let id = template.id.clone();
            if let Err(e) = catalog.add_user_template(template) {
                warn!("⚠️ 跳过模板 {}: {}", id, e);
            }
        }
        info!(
            "✓ 模板目录就绪: {} 个内置, {} 个用户模板",
            catalog.built_in.len(),
            catalog.user.len()
        );
        Ok(catalog)
    }

    /// 添加用户模板
    pub fn add_user_template(&mut self, template: Template) -> Result<(), TemplateError> {
        if self.built_in.iter().any(|t| t.id == template.id) {
            return Err(TemplateError::ShadowsBuiltin { id: template.id });
        }
        if self.user.iter().any(|t| t.id == template.id) {
            return Err(TemplateError::DuplicateId { id: template.id });
        }
        self.user.push(template);
        Ok(())
    }

    /// 某类模板的默认模板（用户模板优先）
    pub fn default_template(&self, template_type: TemplateType) -> Option<&Template> {
        self.user
            .iter()
            .chain(self.built_in.iter())
            .find(|t| t.template_type == template_type && t.is_default)
    }

    fn find(&self, id: &str) -> Option<&Template> {
        self.built_in
            .iter()
            .chain(self.user.iter())
            .find(|t| t.id == id)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSource for TemplateCatalog {
    fn get_template(&self, id: &str) -> Result<Template, TemplateError> {
        self.find(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })
    }

    fn list(&self) -> Vec<TemplateSummary> {
        self.built_in
            .iter()
            .map(|t| t.summary(true))
            .chain(self.user.iter().map(|t| t.summary(false)))
            .collect()
    }
}
