//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::slug::generate_slug;

/// Class names emitted for highlighted tokens (and matched by the stylesheet)
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// An image reference as written in markdown
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    pub src: &'a str,
    pub title: &'a str,
    pub alt: &'a str,
}

/// Per-call rendering strategies
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Builds the `id` of an anchored heading from its plain text
    pub heading_id: fn(&str) -> String,
    /// Deepest heading level that gets an `id`
    pub anchor_depth: u8,
    /// Renders an image reference to HTML
    pub image: fn(&Image) -> String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_id: generate_slug,
            anchor_depth: 3,
            image: render_figure,
        }
    }
}

/// Linked image, wrapped in a captioned `<figure>` when it has alt text
pub fn render_figure(image: &Image) -> String {
    let src = escape_html(image.src);
    let alt = escape_html(image.alt);
    let hint = if image.title.is_empty() {
        alt.clone()
    } else {
        escape_html(image.title)
    };

    let img = format!(
        r#"<img src="{}" alt="{}" title="{} (click to open image in new tab)">"#,
        src, alt, hint
    );
    let link = format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        src, img
    );

    if image.alt.trim().is_empty() {
        return link;
    }

    format!(
        r#"<figure>{}<figcaption>{} (<a href="{}" target="_blank" rel="noopener noreferrer">click to open image in new tab</a>)</figcaption></figure>"#,
        link, alt, src
    )
}

struct HeadingCapture<'a> {
    level: HeadingLevel,
    events: Vec<Event<'a>>,
    text: String,
}

struct ImageCapture {
    src: String,
    title: String,
    alt: String,
    /// Images nested inside this image's alt text
    depth: usize,
}

struct CodeCapture {
    lang: Option<String>,
    source: String,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific highlighting theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str, options: &RenderOptions) -> String {
        let extensions = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, extensions);

        let mut events: Vec<Event> = Vec::new();
        let mut heading: Option<HeadingCapture> = None;
        let mut image: Option<ImageCapture> = None;
        let mut code: Option<CodeCapture> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split(|c: char| c.is_whitespace() || c == ',')
                            .next()
                            .filter(|lang| !lang.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some(CodeCapture {
                        lang,
                        source: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code.take() {
                        let highlighted = self.highlight_code(&block.source, block.lang.as_deref());
                        emit(&mut events, &mut heading, Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some(block) = code.as_mut() {
                        block.source.push_str(&text);
                    }
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => match image.as_mut() {
                    Some(outer) => outer.depth += 1,
                    None => {
                        image = Some(ImageCapture {
                            src: dest_url.to_string(),
                            title: title.to_string(),
                            alt: String::new(),
                            depth: 0,
                        })
                    }
                },
                Event::End(TagEnd::Image) => {
                    let finished = match image.as_mut() {
                        Some(outer) if outer.depth > 0 => {
                            outer.depth -= 1;
                            false
                        }
                        Some(_) => true,
                        None => false,
                    };
                    if finished {
                        if let Some(img) = image.take() {
                            let html = (options.image)(&Image {
                                src: &img.src,
                                title: &img.title,
                                alt: &img.alt,
                            });
                            emit(&mut events, &mut heading, Event::Html(CowStr::from(html)));
                        }
                    }
                }
                Event::Text(text) | Event::Code(text) if image.is_some() => {
                    if let Some(img) = image.as_mut() {
                        img.alt.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak if image.is_some() => {
                    if let Some(img) = image.as_mut() {
                        img.alt.push(' ');
                    }
                }
                _ if image.is_some() => {}

                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some(HeadingCapture {
                        level,
                        events: Vec::new(),
                        text: String::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(h) = heading.take() {
                        let html = render_heading(h, options);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }

                event => {
                    if let (Some(h), Event::Text(text) | Event::Code(text)) = (heading.as_mut(), &event) {
                        h.text.push_str(text);
                    }
                    emit(&mut events, &mut heading, event);
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Stylesheet matching the classes emitted for highlighted code
    ///
    /// `None` when the configured theme is not one of syntect's defaults.
    pub fn highlight_stylesheet(&self) -> Option<String> {
        let theme = self.theme_set.themes.get(&self.theme_name)?;
        match css_for_theme_with_class_style(theme, CLASS_STYLE) {
            Ok(css) => Some(css),
            Err(e) => {
                tracing::debug!("Failed to build CSS for theme {}: {}", self.theme_name, e);
                None
            }
        }
    }

    /// Theme used by `highlight_stylesheet`
    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("plaintext");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!("Highlighting failed for {} block: {}", lang, e);
                return format!(
                    "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
                    escape_html(lang),
                    escape_html(code)
                );
            }
        }

        format!(
            "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
            escape_html(lang),
            generator.finalize()
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Push an event into the open heading if there is one
fn emit<'a>(events: &mut Vec<Event<'a>>, heading: &mut Option<HeadingCapture<'a>>, event: Event<'a>) {
    match heading {
        Some(h) => h.events.push(event),
        None => events.push(event),
    }
}

fn render_heading(heading: HeadingCapture, options: &RenderOptions) -> String {
    let level = heading.level as u8;
    let mut inner = String::new();
    html::push_html(&mut inner, heading.events.into_iter());

    if level <= options.anchor_depth {
        let id = (options.heading_id)(&heading.text);
        format!("<h{} id=\"{}\">{}</h{}>\n", level, escape_html(&id), inner, level)
    } else {
        format!("<h{}>{}</h{}>\n", level, inner, level)
    }
}

/// Simple HTML escaping
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
