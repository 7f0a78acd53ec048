//! # bbg-render
//!
//! Template rendering library for bbg.
//!
//! Templates are compiled with Askama and looked up by file name through
//! [`TemplateEngine`]. Every render receives a [`Context`]: the site-wide
//! [`BaseContext`] merged with the fields a particular page needs.

pub mod templates;

pub use templates::{
    BaseContext, Context, FeedItem, FeedView, NavLink, PageView, Palette, PostView, RenderError,
    TemplateEngine, FEED, INDEX, PAGE, POST, STYLESHEET,
};
