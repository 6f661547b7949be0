//! sitemap.xml (sitemaps.org 0.9)

use chrono::NaiveDate;

use super::{escape_xml, post_link};
use crate::config::SiteConfig;
use crate::content::Post;

/// Render the sitemap: the site root first, then one entry per post
pub fn render_sitemap(config: &SiteConfig, posts: &[Post], today: NaiveDate) -> String {
    let urls = posts
        .iter()
        .map(|post| {
            format!(
                r#"
  <url>
    <loc>{}</loc>
    <lastmod>{}</lastmod>
  </url>
  "#,
                escape_xml(&post_link(config, post)),
                post.date.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{}</loc>
    <lastmod>{}</lastmod>
    <priority>1.0</priority>
  </url>
  {}
</urlset>"#,
        escape_xml(config.base_url()),
        today.format("%Y-%m-%d"),
        urls
    )
}
