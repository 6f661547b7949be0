//! Content module - slugs, dates, markdown and the posts document

mod date;
pub mod loader;
mod markdown;
mod post;
mod slug;

pub use date::parse_date;
pub use loader::ContentLoader;
pub use markdown::{escape_html, render_figure, Image, MarkdownRenderer, RenderOptions};
pub use post::{duplicate_slugs, parse_blog_posts, Post};
pub use slug::generate_slug;
