//! # bbg-core
//!
//! Core library for the bbg static site generator.
//!
//! This crate turns a directory of Markdown sources into a rendered site and
//! keeps it in sync with source edits: document parsing, site configuration,
//! the build pipeline, and the directory monitor that drives rebuilds.

pub mod builder;
pub mod config;
pub mod document;
pub mod frontmatter;
pub mod markdown;
pub mod metadata;
pub mod monitor;
pub mod rebuild;
pub mod slug;

pub use builder::{BuildError, BuildReport, SiteBuilder};
pub use config::{Config, ConfigError, Link, ThemeColors, ThemeConfig};
pub use document::{Document, DocumentError, PostLayout};
pub use frontmatter::split_front_matter;
pub use metadata::{DatePolicy, DocumentMetadata, MetadataError};
pub use monitor::{ChangeEvent, ChangeKind, DirectoryMonitor, MonitorError};
pub use rebuild::RebuildLoop;
pub use slug::slugify;
