use crate::domain::ports::CsrfTokenSource;
use crate::utils::html::escape;
use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_FIELD_NAME: &str = "csrfmiddlewaretoken";
pub const CSRF_NOT_PROVIDED: &str = "NOTPROVIDED";

/// The slice of an HTTP request the template layer needs.
#[derive(Debug, Default)]
pub struct Request {
    cookies: HashMap<String, String>,
    csrf_cookie_used: Cell<bool>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Whether the CSRF token was read, i.e. the response must set the cookie.
    pub fn csrf_cookie_used(&self) -> bool {
        self.csrf_cookie_used.get()
    }
}

impl CsrfTokenSource for Request {
    fn csrf_token(&self) -> Option<String> {
        self.csrf_cookie_used.set(true);
        self.cookie(CSRF_COOKIE_NAME).map(str::to_string)
    }
}

/// Text computed on first display, at most once.
pub struct LazyText<'a> {
    value: OnceCell<String>,
    init: Box<dyn Fn() -> String + 'a>,
}

impl<'a> LazyText<'a> {
    pub fn new(init: impl Fn() -> String + 'a) -> Self {
        Self {
            value: OnceCell::new(),
            init: Box::new(init),
        }
    }

    pub fn force(&self) -> &str {
        self.value.get_or_init(|| (self.init)())
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Display for LazyText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.force())
    }
}

impl fmt::Debug for LazyText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("LazyText").field(value).finish(),
            None => f.write_str("LazyText(<unevaluated>)"),
        }
    }
}

pub fn csrf_token_lazy(request: &dyn CsrfTokenSource) -> LazyText<'_> {
    LazyText::new(move || {
        request
            .csrf_token()
            .unwrap_or_else(|| CSRF_NOT_PROVIDED.to_string())
    })
}

/// Hidden form field carrying the token; empty when the request has none.
pub fn csrf_input_lazy(request: &dyn CsrfTokenSource) -> LazyText<'_> {
    LazyText::new(move || match request.csrf_token() {
        Some(token) => format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            CSRF_FIELD_NAME,
            escape(&token)
        ),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl CsrfTokenSource for CountingSource {
        fn csrf_token(&self) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            Some(format!("tok{}", self.calls.get()))
        }
    }

    #[test]
    fn test_lazy_token_computed_once() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let token = csrf_token_lazy(&source);
        assert_eq!(source.calls.get(), 0);
        assert!(!token.is_evaluated());

        assert_eq!(token.to_string(), "tok1");
        assert_eq!(token.to_string(), "tok1");
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_token_not_provided() {
        let request = Request::new();
        assert_eq!(csrf_token_lazy(&request).to_string(), CSRF_NOT_PROVIDED);
        assert_eq!(csrf_input_lazy(&request).to_string(), "");
        assert!(request.csrf_cookie_used());
    }

    #[test]
    fn test_input_markup_escapes_token() {
        let request = Request::new().with_cookie(CSRF_COOKIE_NAME, "a\"b");
        assert!(!request.csrf_cookie_used());
        assert_eq!(
            csrf_input_lazy(&request).to_string(),
            r#"<input type="hidden" name="csrfmiddlewaretoken" value="a&quot;b">"#
        );
    }
}
