//! Site configuration loaded from `config.yml`.

use crate::document::PostLayout;
use crate::metadata::DatePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub title: String,
    pub tag_line: String,

    /// Source root holding `posts/`, `pages/` and `static/`
    pub src_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Absolute site URL; its path part becomes the base path
    pub site_url: String,

    pub links: Vec<Link>,
    pub footer: String,
    pub theme: ThemeConfig,

    /// `auto`, `light` or `dark`
    pub default_theme: String,

    pub permalinks: PostLayout,
    pub missing_date: DatePolicy,

    /// Path to the config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            tag_line: String::new(),
            src_dir: PathBuf::from("www"),
            output_dir: PathBuf::from("build"),
            site_url: String::new(),
            links: Vec::new(),
            footer: String::new(),
            theme: ThemeConfig::default(),
            default_theme: "auto".to_string(),
            permalinks: PostLayout::default(),
            missing_date: DatePolicy::default(),
            config_path: None,
        }
    }
}

/// A header navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// Colors for one theme mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: String,
    pub text: String,
    pub link: String,
    pub code_bg: String,
    pub border: String,
    pub code_border_left: String,
    pub secondary_text: String,
}

impl ThemeColors {
    pub fn light() -> Self {
        Self {
            background: "#FAFAFA".to_string(),
            text: "#24292f".to_string(),
            link: "#0969da".to_string(),
            code_bg: "#f6f8fa".to_string(),
            border: "#d0d7de".to_string(),
            code_border_left: "#2b2b2b".to_string(),
            secondary_text: "#57606a".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#0d1117".to_string(),
            text: "#e6edf3".to_string(),
            link: "#58a6ff".to_string(),
            code_bg: "#161b22".to_string(),
            border: "#30363d".to_string(),
            code_border_left: "#6e7681".to_string(),
            secondary_text: "#8b949e".to_string(),
        }
    }

    // Unset fields fall back to the mode's default, one field at a time.
    fn merged(raw: Option<RawThemeColors>, defaults: Self) -> Self {
        let Some(raw) = raw else {
            return defaults;
        };
        Self {
            background: raw.background.unwrap_or(defaults.background),
            text: raw.text.unwrap_or(defaults.text),
            link: raw.link.unwrap_or(defaults.link),
            code_bg: raw.code_bg.unwrap_or(defaults.code_bg),
            border: raw.border.unwrap_or(defaults.border),
            code_border_left: raw.code_border_left.unwrap_or(defaults.code_border_left),
            secondary_text: raw.secondary_text.unwrap_or(defaults.secondary_text),
        }
    }
}

/// Light and dark palettes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawThemeConfig")]
pub struct ThemeConfig {
    pub light: ThemeColors,
    pub dark: ThemeColors,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            light: ThemeColors::light(),
            dark: ThemeColors::dark(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawThemeConfig {
    light: Option<RawThemeColors>,
    dark: Option<RawThemeColors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawThemeColors {
    background: Option<String>,
    text: Option<String>,
    link: Option<String>,
    code_bg: Option<String>,
    border: Option<String>,
    code_border_left: Option<String>,
    secondary_text: Option<String>,
}

impl From<RawThemeConfig> for ThemeConfig {
    fn from(raw: RawThemeConfig) -> Self {
        Self {
            light: ThemeColors::merged(raw.light, ThemeColors::light()),
            dark: ThemeColors::merged(raw.dark, ThemeColors::dark()),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    /// or malformed.
    ///
    /// Relative directories still resolve against the config file's
    /// location in the fallback case.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration ({:?}: {})", path, e);
                Self {
                    config_path: Some(path.to_path_buf()),
                    ..Self::default()
                }
            }
        }
    }

    /// Replace the site URL (the dev server points it at itself)
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    /// Get the source directory, resolved relative to the config file
    pub fn source_dir(&self) -> PathBuf {
        self.resolve_path(&self.src_dir)
    }

    /// Get the output directory, resolved relative to the config file
    pub fn build_dir(&self) -> PathBuf {
        self.resolve_path(&self.output_dir)
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir().join("posts")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.source_dir().join("pages")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.source_dir().join("static")
    }

    /// Normalized theme mode; unknown values mean `auto`
    pub fn theme_mode(&self) -> &str {
        match self.default_theme.trim() {
            "light" => "light",
            "dark" => "dark",
            _ => "auto",
        }
    }

    /// Path prefix every site link starts with, e.g. `/blog/`.
    ///
    /// Taken from the path of `siteUrl`; a bare `/path` is accepted as-is and
    /// anything unparseable means the site lives at `/`.
    pub fn base_path(&self) -> String {
        let raw = self.site_url.trim();
        let path = match Url::parse(raw) {
            Ok(url) => url.path().to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
                raw.to_string()
            }
            Err(_) => String::new(),
        };
        normalize_base_url(&path)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

/// Normalize a base path so it always starts and ends with `/`
pub fn normalize_base_url(raw: &str) -> String {
    if raw.is_empty() {
        return "/".to_string();
    }

    let mut s = raw.trim().to_string();
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    if !s.ends_with('/') {
        s.push('/');
    }

    // Collapse duplicate slashes (but keep leading)
    while s.contains("//") {
        s = s.replace("//", "/");
    }

    s
}
