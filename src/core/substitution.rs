//! `$`-placeholder substitution.
//!
//! Placeholders are `$name` or `${name}` where `name` matches
//! `[_A-Za-z][_A-Za-z0-9]*`. `$$` renders a single `$`. Any other `$` is an
//! invalid placeholder: left as is by [`StringTemplate::safe_substitute`],
//! rejected by [`StringTemplate::substitute`].

use crate::utils::error::{Result, TemplateError};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\}|(?P<invalid>))",
    )
    .expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Dollar,
    Placeholder { name: String, raw: String },
    Invalid { line: usize, col: usize },
}

/// Lookup used during substitution.
pub trait Mapping {
    type Value: fmt::Display;

    fn lookup(&self, key: &str) -> Option<&Self::Value>;
}

impl<V: fmt::Display> Mapping for BTreeMap<String, V> {
    type Value = V;

    fn lookup(&self, key: &str) -> Option<&V> {
        self.get(key)
    }
}

/// Immutable template text, scanned once on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl StringTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = scan(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute known keys; unknown placeholders and stray `$` stay literal.
    pub fn safe_substitute<M: Mapping + ?Sized>(&self, mapping: &M) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Dollar | Segment::Invalid { .. } => out.push('$'),
                Segment::Placeholder { name, raw } => match mapping.lookup(name) {
                    Some(value) => {
                        let _ = write!(out, "{}", value);
                    }
                    None => out.push_str(raw),
                },
            }
        }
        out
    }

    /// Strict substitution: every placeholder must resolve and no stray `$` may appear.
    pub fn substitute<M: Mapping + ?Sized>(&self, mapping: &M) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Dollar => out.push('$'),
                Segment::Invalid { line, col } => {
                    return Err(TemplateError::InvalidPlaceholder {
                        line: *line,
                        col: *col,
                    })
                }
                Segment::Placeholder { name, .. } => {
                    let value = mapping
                        .lookup(name)
                        .ok_or_else(|| TemplateError::MissingKey { key: name.clone() })?;
                    let _ = write!(out, "{}", value);
                }
            }
        }
        Ok(out)
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { name, .. } = segment {
                if !ids.contains(&name.as_str()) {
                    ids.push(name);
                }
            }
        }
        ids
    }

    pub fn is_valid(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Invalid { .. }))
    }
}

fn scan(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Literal(source[last..whole.start()].to_string()));
        }
        last = whole.end();

        if caps.name("escaped").is_some() {
            segments.push(Segment::Dollar);
        } else if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
            segments.push(Segment::Placeholder {
                name: name.as_str().to_string(),
                raw: whole.as_str().to_string(),
            });
        } else {
            let (line, col) = position(&source[..whole.end()]);
            segments.push(Segment::Invalid { line, col });
        }
    }

    if last < source.len() {
        segments.push(Segment::Literal(source[last..].to_string()));
    }

    segments
}

// prefix 一定以 '$' 結尾；col 為該行到 '$' 為止的字元數
fn position(prefix: &str) -> (usize, usize) {
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = prefix[line_start..].chars().count();
    (line, col)
}
