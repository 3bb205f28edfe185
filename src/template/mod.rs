//! Template rendering for HTML mail bodies.
//!
//! Rendering is delegated to handlebars; this module only adapts file
//! paths and JSON data to the mail error model.

use std::path::Path;

use handlebars::Handlebars;
use serde_json::Value;

use crate::errors::{MailError, MailResult};

/// Renders a template file with JSON data into a body string.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template at `path` with `data`.
    fn render_file(&self, path: &Path, data: &Value) -> MailResult<String>;
}

/// Handlebars-backed template renderer.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Creates a new renderer with a default registry.
    pub fn new() -> Self {
        Self {
            registry: Handlebars::new(),
        }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render_file(&self, path: &Path, data: &Value) -> MailResult<String> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            MailError::template(format!("cannot read template {}", path.display())).with_cause(e)
        })?;

        self.registry.render_template(&source, data).map_err(|e| {
            MailError::template(format!("cannot render template {}", path.display())).with_cause(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MailErrorKind;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_render_file_with_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<h1>Hello {{{{name}}}}</h1>").unwrap();

        let renderer = HandlebarsRenderer::new();
        let rendered = renderer
            .render_file(file.path(), &json!({"name": "World"}))
            .unwrap();
        assert_eq!(rendered, "<h1>Hello World</h1>");
    }

    #[test]
    fn test_missing_template_is_template_error() {
        let renderer = HandlebarsRenderer::new();
        let err = renderer
            .render_file(Path::new("/nonexistent/welcome.hbs"), &Value::Null)
            .unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::Template);
    }

    #[test]
    fn test_malformed_template_is_template_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{{{#if}}}}broken").unwrap();

        let renderer = HandlebarsRenderer::new();
        let err = renderer.render_file(file.path(), &Value::Null).unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::Template);
    }
}
