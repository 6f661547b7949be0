//! Generator module - renders the site artifacts and writes them out

pub mod feed;
pub mod html;
pub mod sitemap;

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::{BuildError, Result};

pub use feed::render_rss;
pub use html::{render_index, render_not_found};
pub use sitemap::render_sitemap;

/// Writes the generated pages into the output directory
pub struct Generator<'a> {
    config: &'a SiteConfig,
    public_dir: PathBuf,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new<P: AsRef<Path>>(config: &'a SiteConfig, public_dir: P) -> Self {
        Self {
            config,
            public_dir: public_dir.as_ref().to_path_buf(),
        }
    }

    /// Generate `index.html`, `rss.xml`, `sitemap.xml` and `404.html`
    pub fn generate(&self, posts: &[Post], now: DateTime<Utc>) -> Result<()> {
        self.write("index.html", &render_index(self.config, posts))?;
        self.write("rss.xml", &render_rss(self.config, posts, now))?;
        self.write(
            "sitemap.xml",
            &render_sitemap(self.config, posts, now.date_naive()),
        )?;
        self.write("404.html", &render_not_found(self.config))?;
        Ok(())
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        let output_path = self.public_dir.join(name);
        fs::write(&output_path, contents).map_err(BuildError::fs(&output_path))?;
        tracing::info!("Generated {}", name);
        Ok(())
    }
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
pub(crate) fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

/// Absolute link to a post's anchor on the home page
pub(crate) fn post_link(config: &SiteConfig, post: &Post) -> String {
    format!("{}#{}", config.base_url(), post.slug)
}
