//! Notebook export pages
//!
//! The notebook app exports every note as a standalone HTML page. Pages are
//! read with `scraper` to pull out their metadata and to find the attribute
//! values that point at export-relative assets; the rewrite then touches only
//! those attributes, the `<title>`, the exported title block and the post list
//! placeholder.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::collections::BTreeSet;

use crate::config::PublishConfig;
use crate::content::escape_html;
use crate::error::{BuildError, Result};

/// Navigation prepended to every published page
pub const NAV_HTML: &str = r#"<nav><a href="/">Home</a> | <a href="/blog.html">Blog</a></nav>"#;

lazy_static! {
    static ref EXPORTED_TITLE: Selector = Selector::parse(".exported-note-title").unwrap();
    static ref FIRST_H1: Selector = Selector::parse("h1").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref LINKED: Selector = Selector::parse("[src], [href]").unwrap();
    static ref EXPORTED_TITLE_BLOCK: Regex =
        Regex::new(r#"(?s)<div[^>]*\bclass="exported-note-title"[^>]*>.*?</div>"#).unwrap();
    static ref TITLE_ELEMENT: Regex = Regex::new(r"(?is)<title>.*?</title>").unwrap();
    static ref RENDERED_MD: Regex = Regex::new(r#"<div[^>]*\bid="rendered-md"[^>]*>"#).unwrap();
    static ref DATE_PREFIX: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap();
    static ref START_TAG: Regex =
        Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9-]*)(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();
}

/// Export-relative asset prefixes and what they become once published
const ASSET_PREFIXES: [(&str, &str); 2] = [
    ("pluginAssets/", "/pluginAssets/"),
    ("../../_resources/", "/_resources/"),
];

/// One exported page
#[derive(Debug, Clone)]
pub struct ExportPage {
    /// Path relative to the export directory, `/`-separated
    pub file_path: String,
    /// Directory of the page: `/` for the export root, `/blog` and so on
    pub file_dir: String,
    pub file_name: String,
    /// Note title as exported (`.exported-note-title`)
    pub exported_note_title: String,
    /// Text of the first `<h1>`
    pub first_h1: String,
    /// Whether the page lives in the blog directory
    pub is_blog_post: bool,
    /// `YYYY-MM-DD` prefix of the file name
    pub post_date: Option<String>,
    html: String,
}

impl ExportPage {
    /// Read the metadata of an exported page
    pub fn parse(file_path: &str, html: String, config: &PublishConfig) -> Self {
        let document = Html::parse_document(&html);

        let exported_note_title: String = document
            .select(&EXPORTED_TITLE)
            .flat_map(|el| el.text())
            .collect();
        let first_h1 = document
            .select(&FIRST_H1)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let (file_dir, file_name) = match file_path.rsplit_once('/') {
            Some((dir, name)) => (format!("/{}", dir), name.to_string()),
            None => ("/".to_string(), file_path.to_string()),
        };

        let post_date = DATE_PREFIX
            .captures(&file_name)
            .map(|caps| caps[1].to_string());

        Self {
            is_blog_post: file_path.starts_with(&format!("{}/", config.blog_dir)),
            file_path: file_path.to_string(),
            file_dir,
            file_name,
            exported_note_title,
            first_h1,
            post_date,
            html,
        }
    }

    /// Pages outside the allowed directories, and notes whose title starts
    /// with `_`, stay unpublished
    pub fn is_published(&self, config: &PublishConfig) -> bool {
        config.allowed_dirs.iter().any(|dir| *dir == self.file_dir)
            && !self.exported_note_title.trim_start().starts_with('_')
    }

    /// Produce the published HTML of this page
    pub fn rewrite(&self, index: usize, config: &PublishConfig, blog_list: &str) -> Result<String> {
        let document = Html::parse_document(&self.html);
        let title = self.published_title(index, config, &document)?;
        let targets = asset_targets(&document);

        let mut html = EXPORTED_TITLE_BLOCK.replace_all(&self.html, "").into_owned();

        html = RENDERED_MD
            .replacen(&html, 1, |caps: &Captures| format!("{}{}", &caps[0], NAV_HTML))
            .into_owned();

        if let Some(title) = title {
            let element = format!("<title>{}</title>", escape_html(&title));
            html = TITLE_ELEMENT
                .replacen(&html, 1, regex::NoExpand(&element))
                .into_owned();
        }

        let rewrites = attribute_rewrites(&targets);
        if !rewrites.is_empty() {
            html = rewrite_start_tags(&html, |tag| {
                rewrites.iter().fold(tag.to_string(), |tag, (pattern, published)| {
                    pattern
                        .replace_all(&tag, |caps: &Captures| {
                            format!("{}\"{}\"", &caps[1], escape_attr(published))
                        })
                        .into_owned()
                })
            });
        }

        if self.file_name == "index.html" || self.file_name == "blog.html" {
            html = html.replacen(&config.list_placeholder, blog_list, 1);
        }

        Ok(html)
    }

    /// Title the published page should carry, if it changes
    fn published_title(
        &self,
        index: usize,
        config: &PublishConfig,
        document: &Html,
    ) -> Result<Option<String>> {
        let base = if self.is_blog_post {
            if self.first_h1.is_empty() {
                return Err(BuildError::MalformedPost {
                    index,
                    title: self.file_path.clone(),
                    reason: "blog pages need an <h1> title".to_string(),
                });
            }
            self.first_h1.clone()
        } else if self.file_path == "index.html" {
            config.home_title.clone()
        } else if self.file_path == "blog.html" {
            config.blog_title.clone()
        } else {
            match document.select(&TITLE).next() {
                Some(el) => el.text().collect(),
                None => return Ok(None),
            }
        };

        if self.file_path == "index.html" {
            Ok(Some(base))
        } else {
            Ok(Some(format!("{}{}", base, config.title_suffix)))
        }
    }
}

/// `(attribute, value, published value)` for every `src`/`href` pointing at
/// export-relative assets
fn asset_targets(document: &Html) -> BTreeSet<(&'static str, String, String)> {
    let mut targets = BTreeSet::new();

    for element in document.select(&LINKED) {
        for attr in ["src", "href"] {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            for (prefix, replacement) in ASSET_PREFIXES {
                if let Some(rest) = value.strip_prefix(prefix) {
                    targets.insert((attr, value.to_string(), format!("{}{}", replacement, rest)));
                }
            }
        }
    }

    targets
}

/// One `attr="value"` pattern per serialized form of each target
fn attribute_rewrites(
    targets: &BTreeSet<(&'static str, String, String)>,
) -> Vec<(Regex, String)> {
    let mut rewrites = Vec::new();
    for (attr, value, published) in targets {
        // the serialized form may entity-encode `&`
        let mut forms = vec![value.clone()];
        if value.contains('&') {
            forms.push(value.replace('&', "&amp;"));
        }
        for form in forms {
            let pattern = format!(r#"(\s{}\s*=\s*)"{}""#, attr, regex::escape(&form));
            if let Ok(re) = Regex::new(&pattern) {
                rewrites.push((re, published.clone()));
            }
        }
    }
    rewrites
}

/// Apply `rewrite` to every start tag of `html`.
///
/// Text, comments and the bodies of `<script>`/`<style>` are copied as is.
fn rewrite_start_tags(html: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |i| i + 3);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let Some(caps) = START_TAG.captures(rest) else {
            out.push('<');
            rest = &rest[1..];
            continue;
        };
        let name = caps[1].to_ascii_lowercase();
        out.push_str(&rewrite(&caps[0]));
        rest = &rest[caps[0].len()..];

        if name == "script" || name == "style" {
            let close = format!("</{}", name);
            let end = rest
                .to_ascii_lowercase()
                .find(&close)
                .unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
        }
    }

    out.push_str(rest);
    out
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Linked list of blog posts, newest first
pub fn blog_list_html(pages: &[ExportPage], config: &PublishConfig) -> String {
    let mut posts: Vec<&ExportPage> = pages.iter().filter(|p| p.is_blog_post).collect();
    posts.sort_by(|a, b| b.post_date.cmp(&a.post_date));

    posts
        .iter()
        .map(|page| {
            format!(
                r#"<b>{}</b> <a href="/{}/{}"> {}</a>"#,
                page.post_date.as_deref().unwrap_or_default(),
                config.blog_dir,
                escape_attr(&page.file_name),
                escape_html(&page.first_h1)
            )
        })
        .collect::<Vec<_>>()
        .join("\n<br>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_html(note_title: &str, h1: &str, body: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{note_title}</title>
<link rel="stylesheet" href="pluginAssets/katex/katex.css">
</head>
<body>
<div class="exported-note"><div class="exported-note-title">{note_title}</div>
<div id="rendered-md"><h1>{h1}</h1>
{body}
</div></div>
</body>
</html>"#
        )
    }

    fn config() -> PublishConfig {
        PublishConfig::default()
    }

    #[test]
    fn test_parse_metadata() {
        let page = ExportPage::parse(
            "blog/2023-02-07-Debugging-slow-MySQL.html",
            page_html("Debugging slow MySQL", "Debugging slow MySQL", "<p>x</p>"),
            &config(),
        );
        assert_eq!(page.file_dir, "/blog");
        assert_eq!(page.file_name, "2023-02-07-Debugging-slow-MySQL.html");
        assert_eq!(page.exported_note_title, "Debugging slow MySQL");
        assert_eq!(page.first_h1, "Debugging slow MySQL");
        assert!(page.is_blog_post);
        assert_eq!(page.post_date.as_deref(), Some("2023-02-07"));

        let home = ExportPage::parse("index.html", page_html("Home", "Hi", ""), &config());
        assert_eq!(home.file_dir, "/");
        assert!(!home.is_blog_post);
        assert_eq!(home.post_date, None);
    }

    #[test]
    fn test_publish_filter() {
        let cfg = config();
        let draft = ExportPage::parse("blog/x.html", page_html("_draft", "x", ""), &cfg);
        let hidden = ExportPage::parse("misc/x.html", page_html("Misc", "x", ""), &cfg);
        let nested = ExportPage::parse("blog/old/x.html", page_html("Old", "x", ""), &cfg);
        let post = ExportPage::parse("blog/x.html", page_html("Post", "x", ""), &cfg);
        assert!(!draft.is_published(&cfg));
        assert!(!hidden.is_published(&cfg));
        assert!(!nested.is_published(&cfg));
        assert!(post.is_published(&cfg));
    }

    #[test]
    fn test_rewrite_blog_post() {
        let body = r#"<p>See <img src="../../_resources/abc.png"> and <a href="pluginAssets/x.js">x</a>.</p>
<p>Text mentioning "pluginAssets/ and "../../_resources/ stays.</p>
<img data-src="pluginAssets/lazy.png">"#;
        let page = ExportPage::parse(
            "blog/2023-02-08-How-I-blog.html",
            page_html("How I blog", "How I blog", body),
            &config(),
        );

        let html = page.rewrite(0, &config(), "").unwrap();
        assert!(html.contains("<title>How I blog - Bruno Cassol</title>"));
        assert!(!html.contains("exported-note-title"));
        assert!(html.contains(&format!(r#"<div id="rendered-md">{}<h1>"#, NAV_HTML)));
        assert!(html.contains(r#"href="/pluginAssets/katex/katex.css""#));
        assert!(html.contains(r#"<img src="/_resources/abc.png">"#));
        assert!(html.contains(r#"<a href="/pluginAssets/x.js">"#));
        assert!(html.contains(r#"Text mentioning "pluginAssets/ and "../../_resources/ stays."#));
        assert!(html.contains(r#"data-src="pluginAssets/lazy.png""#));
    }

    #[test]
    fn test_rewrite_only_touches_tags() {
        let body = r#"<img src="pluginAssets/a.png">
<!-- old: <img src="pluginAssets/a.png"> -->
<script>const tpl = '<img src="pluginAssets/a.png">';</script>
<script src="pluginAssets/app.js"></script>
<style>.x { background: url("pluginAssets/a.png"); }</style>
<p>done</p>"#;
        let page = ExportPage::parse("about.html", page_html("About", "About", body), &config());

        let html = page.rewrite(0, &config(), "").unwrap();
        assert!(html.contains("<img src=\"/pluginAssets/a.png\">\n<!--"));
        assert!(html.contains(r#"<!-- old: <img src="pluginAssets/a.png"> -->"#));
        assert!(html.contains(r#"const tpl = '<img src="pluginAssets/a.png">';"#));
        assert!(html.contains(r#"<script src="/pluginAssets/app.js"></script>"#));
        assert!(html.contains(r#"url("pluginAssets/a.png")"#));
        assert_eq!(html.matches("/pluginAssets/a.png").count(), 1);
    }

    #[test]
    fn test_rewrite_start_tags() {
        let html = r#"<!DOCTYPE html><p title="a > b">x</p><!-- <p> --><SCRIPT>if (a<b) {}</script></p>"#;
        let tags = std::cell::RefCell::new(Vec::new());
        let out = rewrite_start_tags(html, |tag| {
            tags.borrow_mut().push(tag.to_string());
            tag.to_string()
        });
        assert_eq!(out, html);
        assert_eq!(
            tags.into_inner(),
            vec![r#"<p title="a > b">"#.to_string(), "<SCRIPT>".to_string()]
        );
    }

    #[test]
    fn test_rewrite_titles() {
        let cfg = config();
        let home = ExportPage::parse(
            "index.html",
            page_html("Welcome", "Hi", "<p>LIST_LINKED_BLOG_POSTS_TITLES_HERE</p>"),
            &cfg,
        );
        let html = home.rewrite(0, &cfg, "<b>LIST</b>").unwrap();
        assert!(html.contains("<title>Bruno Cassol</title>"));
        assert!(html.contains("<p><b>LIST</b></p>"));

        let blog = ExportPage::parse("blog.html", page_html("Blog index", "Posts", ""), &cfg);
        let html = blog.rewrite(1, &cfg, "").unwrap();
        assert!(html.contains("<title>Blog - Bruno Cassol</title>"));

        let about = ExportPage::parse("about.html", page_html("About me", "About", ""), &cfg);
        let html = about.rewrite(2, &cfg, "<b>LIST</b>").unwrap();
        assert!(html.contains("<title>About me - Bruno Cassol</title>"));
    }

    #[test]
    fn test_blog_post_needs_h1() {
        let cfg = config();
        let html = page_html("No heading", "", "").replace("<h1></h1>", "");
        let page = ExportPage::parse("blog/2023-01-01-x.html", html, &cfg);
        let err = page.rewrite(3, &cfg, "").unwrap_err();
        assert!(matches!(err, BuildError::MalformedPost { index: 3, .. }));
    }

    #[test]
    fn test_blog_list_newest_first() {
        let cfg = config();
        let pages = vec![
            ExportPage::parse("blog/2023-01-01-a.html", page_html("A", "Alpha", ""), &cfg),
            ExportPage::parse("index.html", page_html("Home", "Home", ""), &cfg),
            ExportPage::parse("blog/2023-03-01-c.html", page_html("C", "Gamma & co", ""), &cfg),
            ExportPage::parse("blog/2023-02-01-b.html", page_html("B", "Beta", ""), &cfg),
        ];

        let list = blog_list_html(&pages, &cfg);
        assert_eq!(
            list,
            "<b>2023-03-01</b> <a href=\"/blog/2023-03-01-c.html\"> Gamma &amp; co</a>\n<br>\n\
             <b>2023-02-01</b> <a href=\"/blog/2023-02-01-b.html\"> Beta</a>\n<br>\n\
             <b>2023-01-01</b> <a href=\"/blog/2023-01-01-a.html\"> Alpha</a>"
        );
    }
}
