pub mod handlers;
mod model;
mod routes;

pub use model::{
    apply_template, CreateTemplate, FindTemplatesResponse, Template, TemplateSnapshot, TemplateSummary,
};
pub use routes::router;
