//! RSS 2.0 feed

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{escape_xml, post_link, strip_invalid_xml_chars};
use crate::config::SiteConfig;
use crate::content::Post;

/// RFC 1123 date, as used by `pubDate` and `lastBuildDate`
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Publish date of a post: midnight UTC of its date
pub fn pub_date(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).format(RFC1123).to_string()
}

/// Wrap HTML in a CDATA section, splitting any `]]>` it contains
fn cdata(html: &str) -> String {
    let clean = strip_invalid_xml_chars(html);
    format!("<![CDATA[{}]]>", clean.replace("]]>", "]]]]><![CDATA[>"))
}

/// Render the RSS feed with one item per post
pub fn render_rss(config: &SiteConfig, posts: &[Post], build_time: DateTime<Utc>) -> String {
    let items = posts
        .iter()
        .map(|post| {
            let link = escape_xml(&post_link(config, post));
            format!(
                r#"
    <item>
      <title>{}</title>
      <link>{}</link>
      <description>{}</description>
      <pubDate>{}</pubDate>
      <guid>{}</guid>
    </item>
  "#,
                escape_xml(&post.title),
                link,
                cdata(&post.html_content),
                pub_date(post.date),
                link
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let base_url = escape_xml(config.base_url());

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
<channel>
  <title>{title}</title>
  <description>{description}</description>
  <link>{base_url}</link>
  <atom:link href="{base_url}/rss.xml" rel="self" type="application/rss+xml" />
  <lastBuildDate>{last_build}</lastBuildDate>
  {items}
</channel>
</rss>"#,
        title = escape_xml(&config.title),
        description = escape_xml(&config.description),
        last_build = build_time.format(RFC1123),
    )
}
