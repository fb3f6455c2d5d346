use crate::config::{EngineParams, Settings};
use crate::domain::model::Context;
use crate::utils::error::Result;

/// Anything that can hand out the CSRF token of the current request.
pub trait CsrfTokenSource {
    fn csrf_token(&self) -> Option<String>;
}

/// Template object contract exposed to the host.
pub trait RenderTemplate {
    fn render(&self, context: Option<&Context>, request: Option<&dyn CsrfTokenSource>) -> String;

    fn stream<'a>(
        &'a self,
        context: Option<&'a Context>,
        request: Option<&'a dyn CsrfTokenSource>,
    ) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// Pluggable template engine contract.
pub trait TemplateBackend: Sized {
    type Template: RenderTemplate;

    /// Value of `BACKEND` selecting this implementation.
    const BACKEND_ID: &'static str;

    fn new(params: EngineParams, settings: &Settings) -> Result<Self>;

    fn name(&self) -> &str;

    fn from_string(&self, template_code: &str) -> Result<Self::Template>;

    fn get_template(&self, template_name: &str) -> Result<Self::Template>;
}
