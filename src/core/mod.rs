pub mod csrf;
pub mod engine;
pub mod origin;
pub mod registry;
pub mod substitution;
pub mod template;
pub mod template_strings;

pub use crate::domain::model::{Context, ContextValue, SafeString};
pub use crate::domain::ports::{CsrfTokenSource, RenderTemplate, TemplateBackend};
pub use crate::utils::error::Result;
