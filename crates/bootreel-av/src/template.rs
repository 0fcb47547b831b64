//! Variable substitution for text templates.

use std::collections::HashMap;

/// Variable substitution context.
///
/// Replaces `{name}` with the value registered for `name`. Placeholders
/// with no registered value, or with inner spaces such as `{ part0 }`, are
/// left untouched, which is how device templates keep their own literal
/// markers.
///
/// # Example
///
/// ```
/// use bootreel_av::TemplateContext;
///
/// let ctx = TemplateContext::new()
///     .with_var("fps", 12)
///     .with_var("width", 480);
///
/// assert_eq!(ctx.substitute("{width}@{fps}"), "480@12");
/// assert_eq!(ctx.substitute("{ part0 }"), "{ part0 }");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with_var(mut self, key: &str, value: impl ToString) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Substitute variables in a string.
    pub fn substitute(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.vars {
            result = result.replace(&format!("{{{}}}", key), value);
        }
        result
    }
}
