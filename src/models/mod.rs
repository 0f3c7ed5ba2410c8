pub mod grade;
pub mod job;
pub mod loaders;
pub mod report;
pub mod reserved;
pub mod student;
pub mod template;
pub mod variable;

pub use grade::Grade;
pub use job::GenerationJob;
pub use loaders::{load_all_templates, load_job, load_template};
pub use report::{BatchFailure, BatchResult, DerivedMetrics, GeneratedReport};
pub use student::{Exam, School, Student, StudentContext, SubjectMark};
pub use template::{Template, TemplateSummary, TemplateType};
pub use variable::{Variable, VariableType};
