use crate::core::csrf::{csrf_input_lazy, csrf_token_lazy, LazyText};
use crate::core::substitution::StringTemplate;
use crate::domain::model::{Context, SafeString};
use crate::domain::ports::{CsrfTokenSource, RenderTemplate};
use crate::utils::error::Result;
use crate::utils::html::conditional_escape;
use std::collections::BTreeMap;
use std::fmt;

/// A value ready for substitution.
#[derive(Debug)]
pub enum RenderValue<'a> {
    Escaped(SafeString),
    Lazy(LazyText<'a>),
}

impl fmt::Display for RenderValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderValue::Escaped(value) => fmt::Display::fmt(value, f),
            RenderValue::Lazy(value) => fmt::Display::fmt(value, f),
        }
    }
}

pub type RenderContext<'a> = BTreeMap<String, RenderValue<'a>>;

/// Template produced by the `template_strings` backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    inner: StringTemplate,
}

impl Template {
    pub fn new(template_code: impl Into<String>) -> Self {
        Self {
            inner: StringTemplate::new(template_code),
        }
    }

    pub fn source(&self) -> &str {
        self.inner.source()
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.inner.identifiers()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    /// Escape the caller's values into a fresh mapping and add the CSRF entries.
    pub fn prepare_context<'a>(
        context: Option<&Context>,
        request: Option<&'a dyn CsrfTokenSource>,
    ) -> RenderContext<'a> {
        let mut prepared: RenderContext<'a> = context
            .map(|ctx| {
                ctx.iter()
                    .map(|(k, v)| (k.clone(), RenderValue::Escaped(conditional_escape(v))))
                    .collect::<RenderContext<'a>>()
            })
            .unwrap_or_default();

        if let Some(request) = request {
            prepared.insert(
                "csrf_input".to_string(),
                RenderValue::Lazy(csrf_input_lazy(request)),
            );
            prepared.insert(
                "csrf_token".to_string(),
                RenderValue::Lazy(csrf_token_lazy(request)),
            );
        }

        prepared
    }

    /// Like `render`, but missing values and stray `$` are errors.
    pub fn render_strict(
        &self,
        context: Option<&Context>,
        request: Option<&dyn CsrfTokenSource>,
    ) -> Result<String> {
        let prepared = Self::prepare_context(context, request);
        self.inner.substitute(&prepared)
    }
}

impl RenderTemplate for Template {
    fn render(&self, context: Option<&Context>, request: Option<&dyn CsrfTokenSource>) -> String {
        self.stream(context, request).collect()
    }

    fn stream<'a>(
        &'a self,
        context: Option<&'a Context>,
        request: Option<&'a dyn CsrfTokenSource>,
    ) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(std::iter::once_with(move || {
            let prepared = Self::prepare_context(context, request);
            self.inner.safe_substitute(&prepared)
        }))
    }
}
