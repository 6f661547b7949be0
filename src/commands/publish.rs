//! Publish a notebook HTML export into the docs tree

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets;
use crate::error::BuildError;
use crate::publish::{blog_list_html, ExportPage};
use crate::Site;

const EXPORT_GITIGNORE: &str = "# Ignore everything in this directory
*
# Except this file
!.gitignore";

const GITKEEP: &str =
    "# Please don't delete this file. It keeps this directory in git even if there are no files";

const NOJEKYLL: &str =
    "Without this file GitHub Pages ignores directories starting with an underscore, such as _resources.";

/// What a publish run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub pages: usize,
    pub blog_posts: usize,
    pub docs_dir: PathBuf,
}

/// Publish the export directory.
///
/// Returns `None` when there was no export directory yet; it is created
/// (empty, git-ignored) so the notebook app has somewhere to export into.
pub fn run(site: &Site) -> Result<Option<PublishReport>> {
    let config = &site.config.publish;
    let export_dir = site.base_dir.join(&config.export_dir);
    let docs_dir = site.base_dir.join(&config.docs_dir);
    let resources_dir = site.base_dir.join(&config.resources_dir);

    if !export_dir.exists() {
        create_export_dir(&export_dir)?;
        tracing::info!(
            "Created {:?} and a .gitignore in it. Nothing to publish yet.",
            export_dir
        );
        return Ok(None);
    }

    let files = exported_pages(&export_dir)?;
    if files.is_empty() {
        return Err(BuildError::missing("exported .html pages", &export_dir).into());
    }
    tracing::info!("Found {} exported pages", files.len());

    // start from a blank docs tree
    if docs_dir.exists() {
        fs::remove_dir_all(&docs_dir).map_err(BuildError::fs(&docs_dir))?;
    }
    fs::create_dir_all(&docs_dir).map_err(BuildError::fs(&docs_dir))?;

    copy_optional_dir(&resources_dir, &docs_dir.join(&config.resources_dir))?;
    copy_optional_dir(
        &export_dir.join(&config.plugin_assets),
        &docs_dir.join(&config.plugin_assets),
    )?;
    write(&docs_dir.join(".gitkeep"), GITKEEP)?;
    write(&docs_dir.join("CNAME"), &config.domain)?;
    write(&docs_dir.join(".nojekyll"), NOJEKYLL)?;

    let mut pages = Vec::new();
    for file in &files {
        let relative = relative_path(file, &export_dir);
        let html = fs::read_to_string(file).map_err(BuildError::fs(file))?;
        let page = ExportPage::parse(&relative, html, config);

        if page.is_published(config) {
            pages.push(page);
        } else {
            tracing::debug!("Skipping unpublished page {}", relative);
        }
    }

    let blog_list = blog_list_html(&pages, config);

    for (index, page) in pages.iter().enumerate() {
        let html = page
            .rewrite(index, config, &blog_list)
            .with_context(|| format!("Failed to rewrite {}", page.file_path))?;
        let dest = docs_dir.join(&page.file_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(BuildError::fs(parent))?;
        }
        write(&dest, &html)?;
        tracing::info!("Published {}", page.file_path);
    }

    // hand the export directory back empty
    fs::remove_dir_all(&export_dir).map_err(BuildError::fs(&export_dir))?;
    if resources_dir.exists() {
        fs::remove_dir_all(&resources_dir).map_err(BuildError::fs(&resources_dir))?;
    }
    create_export_dir(&export_dir)?;

    Ok(Some(PublishReport {
        pages: pages.len(),
        blog_posts: pages.iter().filter(|p| p.is_blog_post).count(),
        docs_dir,
    }))
}

fn create_export_dir(export_dir: &Path) -> Result<()> {
    fs::create_dir_all(export_dir).map_err(BuildError::fs(export_dir))?;
    write(&export_dir.join(".gitignore"), EXPORT_GITIGNORE)
}

fn exported_pages(export_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*.html",
        glob::Pattern::escape(&export_dir.to_string_lossy())
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(BuildError::Filesystem {
                    path,
                    source: e.into_error(),
                }
                .into());
            }
        }
    }
    files.sort();
    Ok(files)
}

fn copy_optional_dir(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        assets::copy_dir(src, dest)?;
    } else {
        tracing::warn!("No {:?} to copy, skipping", src);
    }
    Ok(())
}

/// `/`-separated path of `file` below `root`
fn relative_path(file: &Path, root: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(BuildError::fs(path))?;
    Ok(())
}
