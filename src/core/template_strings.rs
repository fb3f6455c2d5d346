use crate::config::{EngineParams, Settings};
use crate::core::engine::BaseEngine;
use crate::core::origin::{Origin, TemplateDoesNotExist};
use crate::core::template::Template;
use crate::domain::ports::TemplateBackend;
use crate::utils::error::{Result, TemplateError};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Backend with no template language: `$name` substitution only.
#[derive(Debug, Clone)]
pub struct TemplateStrings {
    base: BaseEngine,
}

impl TemplateStrings {
    /// Subdirectory searched inside installed apps when `APP_DIRS` is set.
    pub const APP_DIRNAME: &'static str = "template_strings";

    pub fn template_dirs(&self) -> Vec<PathBuf> {
        self.base.template_dirs(Self::APP_DIRNAME)
    }
}

impl TemplateBackend for TemplateStrings {
    type Template = Template;

    const BACKEND_ID: &'static str = "template_strings";

    fn new(params: EngineParams, settings: &Settings) -> Result<Self> {
        // 此後端不接受任何 OPTIONS
        if !params.options.is_empty() {
            let keys: Vec<&str> = params.options.keys().map(String::as_str).collect();
            return Err(TemplateError::improperly_configured(format!(
                "Unknown options: {}",
                keys.join(", ")
            )));
        }

        let base = BaseEngine::new(&params, settings, Self::BACKEND_ID)?;
        tracing::info!(
            "Template engine '{}' ready, searching {:?}",
            base.name(),
            base.template_dirs(Self::APP_DIRNAME)
        );

        Ok(Self { base })
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn from_string(&self, template_code: &str) -> Result<Template> {
        Ok(Template::new(template_code))
    }

    fn get_template(&self, template_name: &str) -> Result<Template> {
        let charset = self.base.charset();
        let mut tried = Vec::new();

        for template_file in self
            .base
            .iter_template_filenames(template_name, Self::APP_DIRNAME)
        {
            let bytes = match std::fs::read(&template_file) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Tried {}: source does not exist", template_file.display());
                    tried.push((
                        Origin::new(&template_file, template_name, self.name()),
                        "Source does not exist".to_string(),
                    ));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let template_code = charset.decode(bytes).ok_or_else(|| TemplateError::Decode {
                path: template_file.clone(),
                charset: charset.to_string(),
            })?;

            tracing::debug!("Loaded '{}' from {}", template_name, template_file.display());
            return Ok(Template::new(template_code));
        }

        Err(TemplateDoesNotExist::new(template_name)
            .with_tried(tried)
            .with_backend(self.name())
            .into())
    }
}
