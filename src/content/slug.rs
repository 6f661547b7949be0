//! Anchor/URL slugs for post titles and headings

/// Turn a human readable title into an anchor id.
///
/// Punctuation is dropped (not turned into a separator), accents are
/// stripped, and every run of whitespace, `-` or `_` becomes a single `_`,
/// including runs at either end.
///
/// ```
/// use postbook::content::generate_slug;
/// assert_eq!(generate_slug("Hello World!"), "hello_world");
/// assert_eq!(generate_slug("Crème brûlée -- v2"), "creme_brulee_v2");
/// assert_eq!(generate_slug("_private"), "_private");
/// ```
pub fn generate_slug(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '_')
        .collect();

    let is_separator = |c: char| c.is_whitespace() || c == '-' || c == '_';
    let core = ::slug::slugify(&kept).replace('-', "_");
    if core.is_empty() {
        return if kept.contains(is_separator) {
            "_".to_string()
        } else {
            String::new()
        };
    }

    // slugify trims separators at the ends; keep one of each
    let mut slug = String::with_capacity(core.len() + 2);
    if kept.starts_with(is_separator) {
        slug.push('_');
    }
    slug.push_str(&core);
    if kept.ends_with(is_separator) {
        slug.push('_');
    }
    slug
}
