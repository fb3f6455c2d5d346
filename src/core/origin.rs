use std::fmt;
use std::path::{Path, PathBuf};

/// Which file was tried for which template name, and by which engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub name: PathBuf,
    pub template_name: String,
    pub backend: String,
}

impl Origin {
    pub fn new(name: impl Into<PathBuf>, template_name: impl Into<String>, backend: &str) -> Self {
        Self {
            name: name.into(),
            template_name: template_name.into(),
            backend: backend.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.name
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.display())
    }
}

/// Raised when no candidate yields the requested template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateDoesNotExist {
    name: String,
    tried: Vec<(Origin, String)>,
    backend: Option<String>,
    chain: Vec<TemplateDoesNotExist>,
}

impl TemplateDoesNotExist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tried(mut self, tried: Vec<(Origin, String)>) -> Self {
        self.tried = tried;
        self
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn with_chain(mut self, chain: Vec<TemplateDoesNotExist>) -> Self {
        self.chain = chain;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tried(&self) -> &[(Origin, String)] {
        &self.tried
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    pub fn chain(&self) -> &[TemplateDoesNotExist] {
        &self.chain
    }

    /// Every attempt across this error and its chain, in order.
    pub fn all_tried(&self) -> Vec<&(Origin, String)> {
        let mut all: Vec<&(Origin, String)> = self.tried.iter().collect();
        for error in &self.chain {
            all.extend(error.all_tried());
        }
        all
    }

    /// Multi-line report suitable for logs or a debug page.
    pub fn diagnostic(&self) -> String {
        let mut lines = vec![format!("Template '{}' does not exist", self.name)];
        self.push_attempts(&mut lines);
        lines.join("\n")
    }

    fn push_attempts(&self, lines: &mut Vec<String>) {
        if let Some(backend) = &self.backend {
            lines.push(format!("  Using engine {}:", backend));
        }
        for (origin, reason) in &self.tried {
            lines.push(format!("    {} ({})", origin, reason));
        }
        for error in &self.chain {
            error.push_attempts(lines);
        }
    }
}

impl fmt::Display for TemplateDoesNotExist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::error::Error for TemplateDoesNotExist {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_lists_chain() {
        let first = TemplateDoesNotExist::new("page.txt")
            .with_backend("strings")
            .with_tried(vec![(
                Origin::new("/a/page.txt", "page.txt", "strings"),
                "Source does not exist".to_string(),
            )]);
        let second = TemplateDoesNotExist::new("page.txt")
            .with_backend("other")
            .with_tried(vec![(
                Origin::new("/b/page.txt", "page.txt", "other"),
                "Source does not exist".to_string(),
            )]);

        let combined = TemplateDoesNotExist::new("page.txt").with_chain(vec![first, second]);

        assert_eq!(combined.to_string(), "page.txt");
        assert_eq!(combined.all_tried().len(), 2);

        let report = combined.diagnostic();
        assert!(report.contains("Using engine strings:"));
        assert!(report.contains("/a/page.txt (Source does not exist)"));
        assert!(report.contains("Using engine other:"));
    }

    #[test]
    fn test_diagnostic_walks_nested_chain() {
        let engine_miss = TemplateDoesNotExist::new("x.txt")
            .with_backend("strings")
            .with_tried(vec![(
                Origin::new("/t/x.txt", "x.txt", "strings"),
                "Source does not exist".to_string(),
            )]);
        let name_miss = TemplateDoesNotExist::new("x.txt").with_chain(vec![engine_miss]);
        let outer = TemplateDoesNotExist::new("x.txt, y.txt").with_chain(vec![name_miss]);

        assert_eq!(outer.all_tried().len(), 1);
        let report = outer.diagnostic();
        assert!(report.starts_with("Template 'x.txt, y.txt' does not exist"));
        assert!(report.contains("Using engine strings:"));
        assert!(report.contains("/t/x.txt (Source does not exist)"));
    }
}
