//! Template rendering

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use storefront_core::{Error, Result, template::substitute_string};

/// Rendered response body with its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: StatusCode,
    pub body: String,
}

/// Renders a named template against a JSON context
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `template_name` with `context`.
    ///
    /// # Errors
    /// - `Error::Template` if the template is missing or the name is invalid
    /// - `Error::Io` if the template can't be read
    async fn render(&self, status: StatusCode, template_name: &str, context: &Value)
    -> Result<Rendered>;
}

/// Renderer reading `${var}` templates from a directory
#[derive(Debug, Clone)]
pub struct FileRenderer {
    root: PathBuf,
}

impl FileRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn template_path(&self, template_name: &str) -> Result<PathBuf> {
        let relative = Path::new(template_name);
        let is_plain = !template_name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(Error::Template(format!(
                "invalid template name: {:?}",
                template_name
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Renderer for FileRenderer {
    async fn render(
        &self,
        status: StatusCode,
        template_name: &str,
        context: &Value,
    ) -> Result<Rendered> {
        let path = self.template_path(template_name)?;

        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Template(format!(
                    "template {:?} not found",
                    template_name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Rendering template {:?}", path);

        Ok(Rendered {
            status,
            body: substitute_string(&source, context),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_render_substitutes_context() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("home.html"),
            "<title>${title}</title><p>${content}</p>",
        )
        .unwrap();

        let renderer = FileRenderer::new(temp_dir.path());
        let rendered = renderer
            .render(
                StatusCode::OK,
                "home.html",
                &json!({"title": "Welcome", "content": "Hi"}),
            )
            .await
            .unwrap();

        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.body, "<title>Welcome</title><p>Hi</p>");
    }

    #[tokio::test]
    async fn test_render_nested_template_name() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("layouts")).unwrap();
        std::fs::write(temp_dir.path().join("layouts/page.html"), "${name}").unwrap();

        let renderer = FileRenderer::new(temp_dir.path());
        let rendered = renderer
            .render(StatusCode::OK, "layouts/page.html", &json!({"name": "about"}))
            .await
            .unwrap();
        assert_eq!(rendered.body, "about");
    }

    #[tokio::test]
    async fn test_render_missing_template() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = FileRenderer::new(temp_dir.path());

        let err = renderer
            .render(StatusCode::OK, "nope.html", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[tokio::test]
    async fn test_render_rejects_escaping_names() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = FileRenderer::new(temp_dir.path());

        for name in ["../secret.html", "/etc/passwd", ""] {
            let err = renderer
                .render(StatusCode::OK, name, &json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Template(_)), "{name}");
        }
    }
}
