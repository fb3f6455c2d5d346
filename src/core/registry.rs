use crate::config::Settings;
use crate::core::origin::TemplateDoesNotExist;
use crate::core::template_strings::TemplateStrings;
use crate::domain::model::Context;
use crate::domain::ports::{CsrfTokenSource, RenderTemplate, TemplateBackend};
use crate::utils::error::{Result, TemplateError};
use std::collections::BTreeSet;

/// Every engine configured in `TEMPLATES`, in declaration order.
pub struct Engines<B: TemplateBackend = TemplateStrings> {
    engines: Vec<B>,
}

impl<B: TemplateBackend> Engines<B> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for params in &settings.templates {
            let alias = params.name.as_deref().unwrap_or(B::BACKEND_ID);
            if !seen.insert(alias) {
                duplicates.insert(alias);
            }
        }
        if !duplicates.is_empty() {
            let names: Vec<&str> = duplicates.into_iter().collect();
            return Err(TemplateError::improperly_configured(format!(
                "Template engine aliases aren't unique, duplicates: {}. \
                 Set a unique NAME for each engine in settings.TEMPLATES.",
                names.join(", ")
            )));
        }

        let mut engines = Vec::with_capacity(settings.templates.len());
        for params in &settings.templates {
            if params.backend != B::BACKEND_ID {
                return Err(TemplateError::improperly_configured(format!(
                    "Unknown template BACKEND '{}'. Valid backends: {}",
                    params.backend,
                    B::BACKEND_ID
                )));
            }
            engines.push(B::new(params.clone(), settings)?);
        }

        tracing::debug!("Configured {} template engine(s)", engines.len());
        Ok(Self { engines })
    }

    pub fn get(&self, alias: &str) -> Result<&B> {
        self.engines
            .iter()
            .find(|engine| engine.name() == alias)
            .ok_or_else(|| TemplateError::InvalidTemplateEngine {
                alias: alias.to_string(),
            })
    }

    pub fn all(&self) -> &[B] {
        &self.engines
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// First engine that finds `template_name` wins; misses are chained for diagnostics.
    pub fn get_template(&self, template_name: &str) -> Result<B::Template> {
        let mut chain = Vec::new();

        for engine in &self.engines {
            match engine.get_template(template_name) {
                Ok(template) => return Ok(template),
                Err(TemplateError::TemplateDoesNotExist(e)) => chain.push(e),
                Err(e) => return Err(e),
            }
        }

        Err(TemplateDoesNotExist::new(template_name)
            .with_chain(chain)
            .into())
    }

    /// Try each name in order and return the first template found.
    pub fn select_template(&self, template_names: &[&str]) -> Result<B::Template> {
        if template_names.is_empty() {
            return Err(TemplateDoesNotExist::new("No template names provided").into());
        }

        let mut chain = Vec::new();
        for name in template_names {
            match self.get_template(name) {
                Ok(template) => return Ok(template),
                Err(TemplateError::TemplateDoesNotExist(e)) => chain.push(e),
                Err(e) => return Err(e),
            }
        }

        Err(TemplateDoesNotExist::new(template_names.join(", "))
            .with_chain(chain)
            .into())
    }

    pub fn render_to_string(
        &self,
        template_name: &str,
        context: Option<&Context>,
        request: Option<&dyn CsrfTokenSource>,
    ) -> Result<String> {
        let template = self.get_template(template_name)?;
        Ok(template.render(context, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineParams;

    fn settings(templates: Vec<EngineParams>) -> Settings {
        Settings {
            templates,
            ..Settings::default()
        }
    }

    #[test]
    fn test_duplicate_aliases_rejected() {
        let err = Engines::<TemplateStrings>::from_settings(&settings(vec![
            EngineParams::new("template_strings"),
            EngineParams::new("template_strings"),
        ]))
        .err()
        .unwrap();
        assert!(err
            .to_string()
            .contains("duplicates: template_strings"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Engines::<TemplateStrings>::from_settings(&settings(vec![EngineParams::new(
            "jinja2",
        )]))
        .err()
        .unwrap();
        assert!(err.to_string().contains("Unknown template BACKEND 'jinja2'"));
    }

    #[test]
    fn test_get_by_alias() {
        let engines: Engines = Engines::from_settings(&settings(vec![
            EngineParams::new("template_strings").with_name("first"),
            EngineParams::new("template_strings").with_name("second"),
        ]))
        .unwrap();

        assert_eq!(engines.all().len(), 2);
        assert_eq!(engines.get("second").unwrap().name(), "second");
        assert!(matches!(
            engines.get("third"),
            Err(TemplateError::InvalidTemplateEngine { .. })
        ));
    }

    #[test]
    fn test_select_template_empty() {
        let engines: Engines = Engines::from_settings(&Settings::default()).unwrap();
        assert!(engines.is_empty());
        match engines.select_template(&[]) {
            Err(TemplateError::TemplateDoesNotExist(e)) => {
                assert_eq!(e.name(), "No template names provided")
            }
            _ => panic!("expected TemplateDoesNotExist"),
        }
    }
}
