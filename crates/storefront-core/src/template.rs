//! Template variable substitution engine
//!
//! Provides ${variable} style substitution for page templates:
//! - Fields of the data context (`${title}`, `${content}`)
//! - Dotted paths into nested objects (`${store.name}`)
//! - Escape mechanism ($${variable} → ${variable})
//! - Missing variables are left untouched
//!
//! Substituted values are HTML-escaped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Matches `${name}`, `${a.b}` and the escaped form `$${name}`
static TEMPLATE_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\$?)\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\}").unwrap()
});

/// Look up a dotted path in the context
fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(context, |value, segment| value.as_object()?.get(segment))
}

/// Render a context value as text
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitute template variables in a string
///
/// Replaces ${variable} with the HTML-escaped value from the context.
/// Escaped variables $${variable} become ${variable} (literal).
/// Missing variables are kept as-is and logged at debug level.
pub fn substitute_string(template: &str, context: &Value) -> String {
    TEMPLATE_VAR_REGEX
        .replace_all(template, |caps: &Captures| {
            let var_name = &caps[2];
            if !caps[1].is_empty() {
                return format!("${{{}}}", var_name);
            }

            match lookup(context, var_name) {
                Some(value) => escape_html(&value_to_text(value)),
                None => {
                    tracing::debug!(
                        "Template variable not found, keeping as-is: ${{{}}}",
                        var_name
                    );
                    format!("${{{}}}", var_name)
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_context() -> Value {
        json!({
            "name": "home",
            "title": "Welcome",
            "content": "Hello <b>world</b>",
            "position": 3,
            "is_default": true,
            "description": null,
            "store": { "name": "Acme" }
        })
    }

    #[test]
    fn test_substitute_simple_variable() {
        let result = substitute_string("<h1>${title}</h1>", &test_context());
        assert_eq!(result, "<h1>Welcome</h1>");
    }

    #[test]
    fn test_substitute_multiple_variables() {
        let result = substitute_string("${name}:${title} [${position}]", &test_context());
        assert_eq!(result, "home:Welcome [3]");
    }

    #[test]
    fn test_substitute_escapes_html() {
        let result = substitute_string("${content}", &test_context());
        assert_eq!(result, "Hello &lt;b&gt;world&lt;/b&gt;");
    }

    #[test]
    fn test_substitute_nested_path() {
        let result = substitute_string("Shop: ${store.name}", &test_context());
        assert_eq!(result, "Shop: Acme");
    }

    #[test]
    fn test_substitute_null_and_bool() {
        let ctx = test_context();
        assert_eq!(substitute_string("[${description}]", &ctx), "[]");
        assert_eq!(substitute_string("${is_default}", &ctx), "true");
    }

    #[test]
    fn test_substitute_escaped_variable() {
        let result = substitute_string("Literal: $${title}", &test_context());
        assert_eq!(result, "Literal: ${title}");
    }

    #[test]
    fn test_substitute_mixed_escaped_and_real() {
        let result = substitute_string("Real: ${title}, Literal: $${not_real}", &test_context());
        assert_eq!(result, "Real: Welcome, Literal: ${not_real}");
    }

    #[test]
    fn test_substitute_unknown_variable() {
        let ctx = test_context();
        assert_eq!(substitute_string("${unknown_var}", &ctx), "${unknown_var}");
        assert_eq!(substitute_string("${store.missing}", &ctx), "${store.missing}");
    }

    #[test]
    fn test_substitute_no_variables() {
        let ctx = test_context();
        assert_eq!(substitute_string("", &ctx), "");
        assert_eq!(substitute_string("Plain text $ {x}", &ctx), "Plain text $ {x}");
    }
}
