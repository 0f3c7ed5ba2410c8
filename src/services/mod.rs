pub mod context_builder;
pub mod metrics;
pub mod renderer;
pub mod schema;
pub mod template_catalog;

pub use context_builder::{build_context, GenerationDates};
pub use metrics::compute_metrics;
pub use renderer::{render, RenderContext};
pub use schema::{check_for_generation, validate_template, validate_variables, SchemaIssue};
pub use template_catalog::{TemplateCatalog, TemplateSource};
