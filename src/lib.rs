//! postbook: a static site generator for a single markdown file of posts
//!
//! The posts document is split into posts, rendered with pulldown-cmark and
//! syntect, and written out as one home page, an RSS feed, a sitemap and a
//! 404 page next to the site's static assets.

pub mod assets;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod publish;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// The posts document
    pub source_file: PathBuf,
    /// Static assets copied to `<public>/static`
    pub static_dir: PathBuf,
    /// robots.txt copied to the output root
    pub robots_file: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when the directory has one
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading configuration from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();

        Self {
            source_file: base_dir.join(&config.source),
            static_dir: base_dir.join(&config.static_dir),
            robots_file: base_dir.join(&config.robots),
            public_dir: base_dir.join(&config.public_dir),
            config,
            base_dir,
        }
    }

    /// Build the static site
    pub fn build(&self) -> Result<commands::build::BuildReport> {
        commands::build::run(self)
    }

    /// Remove the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Publish the notebook export into the docs tree
    pub fn publish(&self) -> Result<Option<commands::publish::PublishReport>> {
        commands::publish::run(self)
    }
}
