pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{EngineParams, FileCharset, Settings};
pub use core::{
    csrf::Request,
    origin::{Origin, TemplateDoesNotExist},
    registry::Engines,
    substitution::StringTemplate,
    template::Template,
    template_strings::TemplateStrings,
};
pub use domain::model::{Context, ContextValue, SafeString};
pub use domain::ports::{CsrfTokenSource, RenderTemplate, TemplateBackend};
pub use utils::error::{Result, TemplateError};
