//! Build the static site

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::assets;
use crate::content::{duplicate_slugs, ContentLoader, MarkdownRenderer};
use crate::error::BuildError;
use crate::generator::Generator;
use crate::Site;

/// What a build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub static_files: usize,
    /// Whether the highlight stylesheet made it into the main stylesheet
    pub stylesheet_appended: bool,
}

/// Build the site into its public directory
pub fn run(site: &Site) -> Result<BuildReport> {
    run_at(site, Utc::now())
}

/// Build with an explicit clock (feed build date, sitemap root lastmod)
pub fn run_at(site: &Site, now: DateTime<Utc>) -> Result<BuildReport> {
    let start = std::time::Instant::now();
    tracing::info!("Building site into {:?}", site.public_dir);

    fs::create_dir_all(&site.public_dir)
        .map_err(BuildError::fs(&site.public_dir))
        .context("Failed to create the output directory")?;

    let loader = ContentLoader::new(&site.config.highlight.theme);
    let posts = loader.load_posts(&site.source_file)?;
    tracing::info!("Found {} posts", posts.len());

    for slug in duplicate_slugs(&posts) {
        tracing::warn!("Several posts share the anchor #{}", slug);
    }

    Generator::new(&site.config, &site.public_dir).generate(&posts, now)?;

    let static_out = site.public_dir.join("static");
    let static_files = assets::copy_dir(&site.static_dir, &static_out)
        .context("Failed to copy the static directory")?;
    tracing::info!("Copied static directory ({} files)", static_files);

    let stylesheet_appended =
        append_highlight_css(loader.renderer(), &static_out.join(&site.config.stylesheet))?;

    assets::copy_file(
        &site.robots_file,
        &site.public_dir.join("robots.txt"),
        "robots.txt",
    )?;
    tracing::info!("Copied robots.txt");

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(BuildReport {
        posts: posts.len(),
        static_files,
        stylesheet_appended,
    })
}

/// Append the code highlighting CSS to the copied main stylesheet.
///
/// A missing stylesheet or an unknown theme only warns.
fn append_highlight_css(renderer: &MarkdownRenderer, stylesheet: &Path) -> Result<bool> {
    let css = match renderer.highlight_stylesheet() {
        Some(css) => css,
        None => {
            tracing::warn!(
                "Unknown highlight theme {:?}, not appending highlight CSS",
                renderer.theme_name()
            );
            return Ok(false);
        }
    };

    if !stylesheet.is_file() {
        tracing::warn!(
            "Could not find {:?} to append highlight CSS to",
            stylesheet
        );
        return Ok(false);
    }

    let section = format!(
        "\n\n/* syntax highlighting: {} */\n{}",
        renderer.theme_name(),
        css
    );
    assets::append_to_file(stylesheet, &section)?;
    tracing::info!("Appended highlight CSS to {:?}", stylesheet);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const POSTS: &str = "Notes to self, not published.\n\n\
# Hello World\n\n2023-01-01 Sunday\nFirst post with ![a cat](/static/cat.png).\n\n\
# Code\n\n2023-02-02\n```rust\nfn main() {}\n```\n";

    fn scaffold() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::write(base.join("posts.md"), POSTS).unwrap();
        fs::create_dir_all(base.join("static/favicons")).unwrap();
        fs::write(base.join("static/style.css"), "body { margin: 0; }").unwrap();
        fs::write(base.join("static/favicons/favicon.ico"), "ico").unwrap();
        fs::write(base.join("robots.txt"), "User-agent: *\nAllow: /\n").unwrap();
        dir
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_full_build() {
        let dir = scaffold();
        let site = Site::with_config(dir.path(), SiteConfig::default());

        let report = run_at(&site, now()).unwrap();
        assert_eq!(report.posts, 2);
        assert_eq!(report.static_files, 2);
        assert!(report.stylesheet_appended);

        let out = dir.path().join("dist");
        for name in ["index.html", "rss.xml", "sitemap.xml", "404.html", "robots.txt"] {
            assert!(out.join(name).is_file(), "{} missing", name);
        }
        assert!(out.join("static/favicons/favicon.ico").is_file());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains(r#"<article id="hello_world" class="post">"#));
        assert!(index.contains("<figure>"));
        assert!(index.contains(r#"class="hljs language-rust""#));

        let css = fs::read_to_string(out.join("static/style.css")).unwrap();
        assert!(css.starts_with("body { margin: 0; }"));
        assert!(css.contains("/* syntax highlighting: base16-ocean.dark */"));
        // the source stylesheet is left alone
        let original = fs::read_to_string(dir.path().join("static/style.css")).unwrap();
        assert_eq!(original, "body { margin: 0; }");
    }

    #[test]
    fn test_missing_stylesheet_only_warns() {
        let dir = scaffold();
        fs::remove_file(dir.path().join("static/style.css")).unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());

        let report = run_at(&site, now()).unwrap();
        assert!(!report.stylesheet_appended);
        assert!(dir.path().join("dist/robots.txt").is_file());
    }

    #[test]
    fn test_unknown_theme_only_warns() {
        let dir = scaffold();
        let mut config = SiteConfig::default();
        config.highlight.theme = "no-such-theme".to_string();
        let site = Site::with_config(dir.path(), config);

        let report = run_at(&site, now()).unwrap();
        assert!(!report.stylesheet_appended);
    }

    #[test]
    fn test_bad_date_aborts() {
        let dir = scaffold();
        fs::write(dir.path().join("posts.md"), "# Oops\n\nsomeday\nbody").unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());

        let err = run_at(&site, now()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::DateFormat(_))
        ));
        assert!(!dir.path().join("dist/index.html").exists());
    }

    #[test]
    fn test_missing_inputs_abort() {
        let dir = scaffold();
        fs::remove_dir_all(dir.path().join("static")).unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        assert!(run_at(&site, now()).is_err());

        let dir = scaffold();
        fs::remove_file(dir.path().join("robots.txt")).unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        let err = run_at(&site, now()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingFile { .. })
        ));

        let dir = scaffold();
        fs::remove_file(dir.path().join("posts.md")).unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        assert!(run_at(&site, now()).is_err());
    }
}
