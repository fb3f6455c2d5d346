use proptest::prelude::*;
use std::collections::BTreeMap;
use strings_template::core::csrf::CSRF_COOKIE_NAME;
use strings_template::{Context, RenderTemplate, Request, SafeString, StringTemplate, Template};

proptest! {
    /// 沒有 '$' 的文字原樣輸出
    #[test]
    fn prop_literal_text_renders_unchanged(text in "[^$]*", key in "[a-z]{1,8}", value in ".*") {
        let template = Template::new(text.clone());
        let context = Context::new().with(key, value);
        prop_assert_eq!(template.render(Some(&context), None), text);
    }

    #[test]
    fn prop_values_are_escaped(value in ".*") {
        let template = Template::new("[$v]");
        let context = Context::new().with("v", value);
        let output = template.render(Some(&context), None);
        let inner = &output[1..output.len() - 1];
        prop_assert!(!inner.contains('<'));
        prop_assert!(!inner.contains('>'));
        prop_assert!(!inner.contains('"'));
    }

    #[test]
    fn prop_safe_values_pass_through(value in ".*") {
        let template = Template::new("$v");
        let context = Context::new().with("v", SafeString::new(value.clone()));
        prop_assert_eq!(template.render(Some(&context), None), value);
    }

    /// 空 mapping 下 safe_substitute 只會把 "$$" 收合成 "$"
    #[test]
    fn prop_safe_substitute_never_loses_text(text in ".*") {
        let template = StringTemplate::new(text.clone());
        let empty: BTreeMap<String, String> = BTreeMap::new();
        prop_assert_eq!(template.safe_substitute(&empty), text.replace("$$", "$"));
    }
}

#[test]
fn test_escaping_property_examples() {
    let template = Template::new("$v");
    let context = Context::new().with("v", "a < b && c > d");
    assert_eq!(
        template.render(Some(&context), None),
        "a &lt; b &amp;&amp; c &gt; d"
    );
}

#[test]
fn test_values_are_not_evaluated_as_templates() {
    let template = Template::new("$a");
    let context = Context::new().with("a", "${b} $$ $b");
    assert_eq!(template.render(Some(&context), None), "${b} $$ $b");
}

#[test]
fn test_missing_key_left_literal() {
    let template = Template::new("Dear $title ${surname},");
    let context = Context::new().with("surname", "Smith");
    assert_eq!(
        template.render(Some(&context), None),
        "Dear $title Smith,"
    );
}

#[test]
fn test_csrf_values_distinct_per_request() {
    let template = Template::new("$csrf_token");
    let first = Request::new().with_cookie(CSRF_COOKIE_NAME, "one");
    let second = Request::new().with_cookie(CSRF_COOKIE_NAME, "two");

    assert_eq!(template.render(None, Some(&first)), "one");
    assert_eq!(template.render(None, Some(&second)), "two");
}

#[test]
fn test_context_value_cannot_shadow_csrf() {
    let template = Template::new("$csrf_token");
    let context = Context::new().with("csrf_token", "forged");
    let request = Request::new().with_cookie(CSRF_COOKIE_NAME, "real");
    assert_eq!(template.render(Some(&context), Some(&request)), "real");
}
