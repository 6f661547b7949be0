//! Site configuration (_config.yml)

use anyhow::Result;
use chrono::Datelike;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
///
/// Defaults are compiled in; `_config.yml` only overrides the keys it sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    /// Footer copyright line; derived from `author` when unset
    pub copyright: Option<String>,
    /// Open Graph image, relative to `url`
    pub image: String,

    // URL
    pub url: String,

    /// Contact label -> URL (or e-mail address), in display order
    pub contacts: IndexMap<String, String>,

    // Paths, relative to the base directory
    pub source: String,
    pub static_dir: String,
    pub public_dir: String,
    pub robots: String,
    /// Main stylesheet, relative to the copied static directory
    pub stylesheet: String,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut contacts = IndexMap::new();
        contacts.insert(
            "github.com/ww9".to_string(),
            "https://github.com/ww9".to_string(),
        );
        contacts.insert(
            "x.com/brunocassol".to_string(),
            "https://x.com/brunocassol".to_string(),
        );
        contacts.insert(
            "instagram.com/brunocassol".to_string(),
            "https://instagram.com/brunocassol".to_string(),
        );
        contacts.insert(
            "brunocassol+web@gmail.com".to_string(),
            "brunocassol+web@gmail.com".to_string(),
        );

        Self {
            title: "Bruno Cassol".to_string(),
            description: "notes from a software engineer".to_string(),
            author: "Bruno Cassol".to_string(),
            copyright: None,
            image: "/static/bruno-cassol.png".to_string(),

            url: "https://brunocassol.com".to_string(),

            contacts,

            source: "posts.md".to_string(),
            static_dir: "static".to_string(),
            public_dir: "dist".to_string(),
            robots: "robots.txt".to_string(),
            stylesheet: "style.css".to_string(),

            highlight: HighlightConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Footer copyright line
    pub fn copyright(&self) -> String {
        match &self.copyright {
            Some(line) => line.clone(),
            None => format!(
                "© {} {}. All rights reserved.",
                chrono::Local::now().year(),
                self.author
            ),
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme used for the appended stylesheet
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Notebook export publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub export_dir: String,
    pub docs_dir: String,
    pub resources_dir: String,
    pub plugin_assets: String,
    /// Written to docs/CNAME
    pub domain: String,
    /// Export directories whose pages are published ("/" is the export root)
    pub allowed_dirs: Vec<String>,
    pub blog_dir: String,
    pub home_title: String,
    pub blog_title: String,
    pub title_suffix: String,
    pub list_placeholder: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            export_dir: "export".to_string(),
            docs_dir: "docs".to_string(),
            resources_dir: "_resources".to_string(),
            plugin_assets: "pluginAssets".to_string(),
            domain: "brunocassol.com".to_string(),
            allowed_dirs: vec!["/".to_string(), "/blog".to_string()],
            blog_dir: "blog".to_string(),
            home_title: "Bruno Cassol".to_string(),
            blog_title: "Blog".to_string(),
            title_suffix: " - Bruno Cassol".to_string(),
            list_placeholder: "LIST_LINKED_BLOG_POSTS_TITLES_HERE".to_string(),
        }
    }
}
