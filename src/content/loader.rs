//! Content loader - reads the posts document from disk

use std::fs;
use std::path::Path;

use super::{parse_blog_posts, MarkdownRenderer, Post, RenderOptions};
use crate::error::{BuildError, Result};

/// Loads posts from the source document
pub struct ContentLoader {
    renderer: MarkdownRenderer,
    options: RenderOptions,
}

impl ContentLoader {
    /// Create a new content loader highlighting code with `theme`
    pub fn new(theme: &str) -> Self {
        Self {
            renderer: MarkdownRenderer::with_theme(theme),
            options: RenderOptions::default(),
        }
    }

    /// Replace the rendering strategies
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The renderer posts are rendered with
    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Read and parse every post in `path`
    pub fn load_posts(&self, path: &Path) -> Result<Vec<Post>> {
        if !path.is_file() {
            return Err(BuildError::missing("posts source", path));
        }

        let source = fs::read_to_string(path).map_err(BuildError::fs(path))?;
        tracing::debug!("Read {} bytes from {:?}", source.len(), path);

        parse_blog_posts(&source, &self.renderer, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Image;
    use tempfile::TempDir;

    #[test]
    fn test_load_posts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.md");
        fs::write(
            &path,
            "Drafts and notes up here.\n\n# First\n\n2023-05-01\nHello.\n\n# Second\n\n2023-05-02\nWorld.\n",
        )
        .unwrap();

        let posts = ContentLoader::new("base16-ocean.dark")
            .load_posts(&path)
            .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].slug, "second");
    }

    #[test]
    fn test_load_posts_with_options() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.md");
        fs::write(
            &path,
            "# Custom\n\n2023-05-01\n## Section\n\n![alt](a.png)\n",
        )
        .unwrap();

        fn upper_id(text: &str) -> String {
            text.to_uppercase()
        }
        fn bare_image(image: &Image) -> String {
            format!("<img src=\"{}\">", image.src)
        }

        let options = RenderOptions {
            heading_id: upper_id,
            anchor_depth: 2,
            image: bare_image,
        };
        let posts = ContentLoader::new("base16-ocean.dark")
            .with_options(options)
            .load_posts(&path)
            .unwrap();

        // the post slug does not go through the heading strategy
        assert_eq!(posts[0].slug, "custom");
        assert!(posts[0].html_content.contains(r#"<h2 id="SECTION">Section</h2>"#));
        assert!(posts[0].html_content.contains(r#"<img src="a.png">"#));
        assert!(!posts[0].html_content.contains("<figure>"));
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = ContentLoader::new("base16-ocean.dark")
            .load_posts(&dir.path().join("nope.md"))
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingFile { .. }));
    }
}
