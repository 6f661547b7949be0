//! Home page and 404 page

use crate::config::SiteConfig;
use crate::content::{escape_html, Post};

/// Contact links joined with ` | `
///
/// Addresses containing `@` become `mailto:` links that stay in the current
/// tab; everything else opens in a new one without a referrer.
fn contacts_html(config: &SiteConfig) -> String {
    config
        .contacts
        .iter()
        .map(|(label, url)| {
            if url.contains('@') {
                format!(
                    r#"<a href="mailto:{}">{}</a>"#,
                    escape_html(url),
                    escape_html(label)
                )
            } else {
                format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    escape_html(url),
                    escape_html(label)
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn branding_html(config: &SiteConfig) -> String {
    format!(
        r#"<div class="branding">
        <h1>{}</h1>
        <p>{}</p>
      </div>"#,
        escape_html(&config.title),
        escape_html(&config.description)
    )
}

fn article_html(post: &Post) -> String {
    format!(
        r#"
    <article id="{slug}" class="post">
      <h1>{title}</h1>
      <p class="date">{date}</p>
      <div class="content">
        {content}
      </div>
    </article>
  "#,
        slug = escape_html(&post.slug),
        title = escape_html(&post.title),
        date = escape_html(&post.date_string),
        content = post.html_content
    )
}

/// Render the home page with every post, in the order given
pub fn render_index(config: &SiteConfig, posts: &[Post]) -> String {
    let posts_html = posts
        .iter()
        .map(article_html)
        .collect::<Vec<_>>()
        .join("\n");
    let contacts = contacts_html(config);
    let branding = branding_html(config);
    let title = escape_html(&config.title);
    let description = escape_html(&config.description);
    let base_url = escape_html(config.base_url());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width">
  <title>{title} - {description}</title>
  <meta name="description" content="{description}">

  <!-- Open Graph Meta Tags -->
  <meta property="og:title" content="{title} - {description}">
  <meta property="og:description" content="{description}">
  <meta property="og:type" content="website">
  <meta property="og:url" content="{base_url}">
  <meta property="og:image" content="{base_url}{image}">

  <link rel="stylesheet" href="/static/{stylesheet}">
  <link rel="alternate" type="application/rss+xml" title="{title}" href="/rss.xml">

  <link rel="icon" href="/static/favicons/favicon.ico">
  <link rel="icon" type="image/png" sizes="16x16" href="/static/favicons/favicon-16x16.png">
  <link rel="icon" type="image/png" sizes="32x32" href="/static/favicons/favicon-32x32.png">
  <link rel="apple-touch-icon" sizes="180x180" href="/static/favicons/apple-touch-icon.png">
  <link rel="icon" type="image/png" sizes="192x192" href="/static/favicons/android-chrome-192x192.png">
  <link rel="icon" type="image/png" sizes="512x512" href="/static/favicons/android-chrome-512x512.png">
</head>
<body>
  <header>
    <div class="header-content">
      {branding}
      <nav class="contacts">
        {contacts}
      </nav>
    </div>
  </header>

  <main>
    {posts_html}
  </main>

  <footer>
    <div class="footer-content">
      {branding}
      <nav class="contacts">
        {contacts}
      </nav>
    </div>
    <p class="copyright">{copyright}</p>
  </footer>
</body>
</html>"#,
        image = escape_html(&config.image),
        stylesheet = escape_html(&config.stylesheet),
        copyright = escape_html(&config.copyright()),
    )
}

/// Render the not-found page
pub fn render_not_found(config: &SiteConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>404 - Page Not Found | {title}</title>
  <link rel="stylesheet" href="/static/{stylesheet}">
  <link rel="icon" href="/static/favicons/favicon.ico">
</head>
<body>
  <header>
    <div class="header-content">
      {branding}
    </div>
  </header>

  <main class="error-page">
    <h1>404</h1>
    <h2>Page Not Found</h2>
    <p>The page you are looking for doesn't exist or has been moved.</p>
    <a href="/">Go back to homepage</a>
  </main>

  <footer>
    <div class="footer-content">
      {branding}
    </div>
    <p class="copyright">{copyright}</p>
  </footer>
</body>
</html>"#,
        title = escape_html(&config.title),
        stylesheet = escape_html(&config.stylesheet),
        branding = branding_html(config),
        copyright = escape_html(&config.copyright()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_blog_posts, MarkdownRenderer, RenderOptions};
    use indexmap::IndexMap;

    fn posts(source: &str) -> Vec<Post> {
        parse_blog_posts(source, &MarkdownRenderer::new(), &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_articles_in_given_order() {
        let posts = posts("# Zeta\n\n2020-01-01\nz\n# Alpha\n\n2024-01-01\na");
        let html = render_index(&SiteConfig::default(), &posts);

        let zeta = html.find(r#"<article id="zeta" class="post">"#).unwrap();
        let alpha = html.find(r#"<article id="alpha" class="post">"#).unwrap();
        assert!(zeta < alpha);
        assert_eq!(html.matches("<article ").count(), 2);
        assert!(html.contains(r#"<p class="date">2024-01-01</p>"#));
    }

    #[test]
    fn test_title_is_escaped() {
        let posts = posts("# Vec<T> & friends\n\n2020-01-01\nbody");
        let html = render_index(&SiteConfig::default(), &posts);
        assert!(html.contains("<h1>Vec&lt;T&gt; &amp; friends</h1>"));
        assert!(html.contains(r#"<article id="vect_friends""#));
    }

    #[test]
    fn test_contacts() {
        let mut contacts = IndexMap::new();
        contacts.insert("gh".to_string(), "https://github.com/me".to_string());
        contacts.insert("mail".to_string(), "me@example.org".to_string());
        let config = SiteConfig {
            contacts,
            ..SiteConfig::default()
        };

        let html = render_index(&config, &[]);
        assert!(html.contains(
            r#"<a href="https://github.com/me" target="_blank" rel="noopener noreferrer">gh</a> | <a href="mailto:me@example.org">mail</a>"#
        ));
        // header and footer
        assert_eq!(html.matches("mailto:me@example.org").count(), 2);
        assert!(!html.contains(r#"mailto:me@example.org" target"#));
    }

    #[test]
    fn test_site_metadata() {
        let config = SiteConfig {
            url: "https://example.org/".to_string(),
            copyright: Some("(c) me".to_string()),
            ..SiteConfig::default()
        };
        let html = render_index(&config, &[]);
        assert!(html.contains(r#"<meta property="og:url" content="https://example.org">"#));
        assert!(html.contains(
            r#"<meta property="og:image" content="https://example.org/static/bruno-cassol.png">"#
        ));
        assert!(html.contains(r#"<p class="copyright">(c) me</p>"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/static/style.css">"#));
    }

    #[test]
    fn test_not_found_page() {
        let html = render_not_found(&SiteConfig::default());
        assert!(html.contains("<title>404 - Page Not Found | Bruno Cassol</title>"));
        assert!(html.contains(r#"<a href="/">Go back to homepage</a>"#));
        assert!(!html.contains("<article"));
    }
}
