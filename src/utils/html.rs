use crate::domain::model::{ContextValue, SafeString};

/// Escape `& < > " '` for HTML output.
pub fn escape(text: &str) -> SafeString {
    SafeString::new(html_escape::encode_quoted_attribute(text).into_owned())
}

/// 已標記為 safe 的值原樣通過，其餘一律跳脫
pub fn conditional_escape(value: &ContextValue) -> SafeString {
    match value {
        ContextValue::Safe(safe) => safe.clone(),
        ContextValue::Text(text) => escape(text),
    }
}
