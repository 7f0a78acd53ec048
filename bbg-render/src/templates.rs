//! Askama template definitions and name-based dispatch.

use askama::Template;
use thiserror::Error;

/// Home page listing every post
pub const INDEX: &str = "index.html";
/// Single post page
pub const POST: &str = "post.html";
/// Standalone page
pub const PAGE: &str = "page.html";
/// Theme-aware site stylesheet
pub const STYLESHEET: &str = "main.css";
/// RSS 2.0 feed
pub const FEED: &str = "rss.xml";

const TEMPLATE_NAMES: &[&str] = &[INDEX, POST, PAGE, STYLESHEET, FEED];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template {template} requires `{field}` in its context")]
    MissingField {
        template: &'static str,
        field: &'static str,
    },

    #[error("Failed to render {template}: {source}")]
    Engine {
        template: &'static str,
        #[source]
        source: askama::Error,
    },
}

impl RenderError {
    /// Name of the template that failed to render
    pub fn template(&self) -> &str {
        match self {
            RenderError::NotFound(name) => name,
            RenderError::MissingField { template, .. } => template,
            RenderError::Engine { template, .. } => template,
        }
    }
}

/// A navigation link shown in the site header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub name: String,
    pub url: String,
}

/// The seven colors that make up one theme mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: String,
    pub text: String,
    pub link: String,
    pub code_bg: String,
    pub border: String,
    pub code_border_left: String,
    pub secondary_text: String,
}

/// Site-wide values merged into every render
#[derive(Debug, Clone)]
pub struct BaseContext {
    pub site_title: String,
    pub tagline: String,
    pub site_url: String,
    /// Always starts and ends with `/`
    pub base_path: String,
    pub links: Vec<NavLink>,
    pub footer: String,
    /// `auto`, `light` or `dark`
    pub default_theme: String,
    pub light: Palette,
    pub dark: Palette,
}

impl BaseContext {
    /// Theme to pin on the root element, `None` when following the OS preference
    pub fn forced_theme(&self) -> Option<&str> {
        match self.default_theme.as_str() {
            "light" | "dark" => Some(self.default_theme.as_str()),
            _ => None,
        }
    }
}

/// A post as seen by the index and post templates
#[derive(Debug, Clone)]
pub struct PostView {
    pub title: String,
    /// RFC 3339 timestamp
    pub date: String,
    /// `YYYY-MM-DD`
    pub formatted_date: String,
    /// Relative to the base path, e.g. `posts/2023-01-hello.html`
    pub url: String,
    /// Rendered HTML body
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    /// Absolute URL
    pub link: String,
    /// RFC 822 date
    pub pub_date: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FeedView {
    /// RFC 822 date
    pub build_date: String,
    pub items: Vec<FeedItem>,
}

/// Render input: the base context plus whichever step-specific fields the
/// template needs.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub base: &'a BaseContext,
    pub post: Option<&'a PostView>,
    pub page: Option<&'a PageView>,
    pub posts: Option<&'a [PostView]>,
    pub feed: Option<&'a FeedView>,
}

impl<'a> Context<'a> {
    pub fn new(base: &'a BaseContext) -> Self {
        Self {
            base,
            post: None,
            page: None,
            posts: None,
            feed: None,
        }
    }

    pub fn with_post(mut self, post: &'a PostView) -> Self {
        self.post = Some(post);
        self
    }

    pub fn with_page(mut self, page: &'a PageView) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_posts(mut self, posts: &'a [PostView]) -> Self {
        self.posts = Some(posts);
        self
    }

    pub fn with_feed(mut self, feed: &'a FeedView) -> Self {
        self.feed = Some(feed);
        self
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    base: &'a BaseContext,
    posts: &'a [PostView],
}

#[derive(Template)]
#[template(path = "post.html")]
struct PostTemplate<'a> {
    base: &'a BaseContext,
    post: &'a PostView,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    base: &'a BaseContext,
    page: &'a PageView,
}

#[derive(Template)]
#[template(path = "main.css", escape = "none")]
struct StylesheetTemplate<'a> {
    base: &'a BaseContext,
}

#[derive(Template)]
#[template(path = "rss.xml", escape = "html")]
struct FeedTemplate<'a> {
    base: &'a BaseContext,
    feed: &'a FeedView,
}

/// Renders the built-in templates by name.
///
/// The engine is a plain value owned by whoever renders; it holds no global
/// state and can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    _private: (),
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all templates this engine knows about
    pub fn template_names(&self) -> &'static [&'static str] {
        TEMPLATE_NAMES
    }

    pub fn has_template(&self, name: &str) -> bool {
        TEMPLATE_NAMES.contains(&name)
    }

    /// Render the template called `name` with `context`.
    pub fn render(&self, name: &str, context: &Context<'_>) -> Result<String, RenderError> {
        let base = context.base;
        match name {
            INDEX => {
                let posts = require(INDEX, "posts", context.posts)?;
                finish(INDEX, IndexTemplate { base, posts }.render())
            }
            POST => {
                let post = require(POST, "post", context.post)?;
                finish(POST, PostTemplate { base, post }.render())
            }
            PAGE => {
                let page = require(PAGE, "page", context.page)?;
                finish(PAGE, PageTemplate { base, page }.render())
            }
            STYLESHEET => finish(STYLESHEET, StylesheetTemplate { base }.render()),
            FEED => {
                let feed = require(FEED, "feed", context.feed)?;
                finish(FEED, FeedTemplate { base, feed }.render())
            }
            other => Err(RenderError::NotFound(other.to_string())),
        }
    }
}

fn require<T>(
    template: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, RenderError> {
    value.ok_or(RenderError::MissingField { template, field })
}

fn finish(template: &'static str, result: askama::Result<String>) -> Result<String, RenderError> {
    result.map_err(|source| RenderError::Engine { template, source })
}
