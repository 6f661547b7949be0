//! Post model and the single-file post parser

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::date::parse_date;
use super::markdown::{MarkdownRenderer, RenderOptions};
use super::slug::generate_slug;
use crate::error::{BuildError, Result};

lazy_static! {
    /// A top-level `# ` heading at the start of a line starts a new post
    static ref POST_DELIMITER: Regex = Regex::new(r"(?m)^# ").unwrap();
}

/// A blog post
#[derive(Debug, Clone)]
pub struct Post {
    /// Post title (plain text)
    pub title: String,

    /// Anchor id derived from the title
    pub slug: String,

    /// Publication date
    pub date: NaiveDate,

    /// Date line as written in the source
    pub date_string: String,

    /// Raw markdown body
    pub content: String,

    /// Rendered HTML body
    pub html_content: String,
}

/// Split a posts document into posts, in document order.
///
/// Each post is a `# Title` line, one blank line, a date line and the body:
///
/// ```text
/// # Title
///
/// 2023-01-01 Sunday
/// Body markdown...
/// ```
///
/// Anything before the first `# ` line is ignored.
pub fn parse_blog_posts(
    source: &str,
    renderer: &MarkdownRenderer,
    options: &RenderOptions,
) -> Result<Vec<Post>> {
    POST_DELIMITER
        .split(source)
        .skip(1)
        .enumerate()
        .map(|(i, section)| parse_post(i + 1, section, renderer, options))
        .collect()
}

fn parse_post(
    index: usize,
    section: &str,
    renderer: &MarkdownRenderer,
    options: &RenderOptions,
) -> Result<Post> {
    let lines: Vec<&str> = section.trim_end().lines().collect();
    let title = lines.first().map(|l| l.trim()).unwrap_or_default();

    let malformed = |reason: &str| BuildError::MalformedPost {
        index,
        title: title.to_string(),
        reason: reason.to_string(),
    };

    if title.is_empty() {
        return Err(malformed("empty title line"));
    }
    if lines.len() < 3 {
        return Err(malformed(
            "expected a title line, a blank line and a date line",
        ));
    }
    if !lines[1].trim().is_empty() {
        return Err(malformed("the line after the title must be blank"));
    }

    let date_string = lines[2].trim();
    if date_string.is_empty() {
        return Err(malformed("missing date line"));
    }
    let date = parse_date(date_string)?;

    let content = lines[3..].join("\n").trim().to_string();
    let html_content = renderer.render(&content, options);

    Ok(Post {
        title: title.to_string(),
        slug: generate_slug(title),
        date,
        date_string: date_string.to_string(),
        content,
        html_content,
    })
}

/// Slugs shared by more than one post, in first-seen order
pub fn duplicate_slugs(posts: &[Post]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for post in posts {
        let count = counts.entry(post.slug.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(post.slug.clone());
        }
    }

    duplicates
}
