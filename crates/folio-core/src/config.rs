//! Content configuration management.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content collections, one per directory.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Markdown settings.
    #[serde(default)]
    pub markdown: MarkdownConfig,

    /// Directory relative source paths resolve against.
    ///
    /// Set from the config file location on load.
    #[serde(skip)]
    pub root: PathBuf,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Site description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A named content collection rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Collection name, attached to every file loaded from `path`.
    pub name: String,

    /// Collection root directory.
    pub path: PathBuf,
}

/// Markdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// File extensions treated as Markdown sources.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Syntax highlighting theme name.
    #[serde(default = "default_syntax_theme")]
    pub syntax_theme: String,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string(), "mdx".to_string()]
}

fn default_syntax_theme() -> String {
    "base16-ocean.dark".to_string()
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            syntax_theme: default_syntax_theme(),
        }
    }
}

impl MarkdownConfig {
    /// Whether a file extension marks a Markdown source (case-insensitive).
    pub fn is_markdown(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.root = config_root(path);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FOLIO__*` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.root = config_root(path);
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.sources.is_empty() {
            return Err(CoreError::config("at least one [[sources]] entry is required"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(CoreError::config("sources.name cannot be empty"));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(CoreError::config(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
        }

        if self.markdown.extensions.is_empty() {
            return Err(CoreError::config("markdown.extensions cannot be empty"));
        }

        for ext in &self.markdown.extensions {
            if ext.starts_with('.') {
                tracing::warn!(ext = %ext, "markdown.extensions entries should not have a leading dot");
            }
        }

        Ok(())
    }

    /// Absolute (or root-relative) directory of a collection.
    pub fn source_dir(&self, source: &SourceConfig) -> PathBuf {
        if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.root.join(&source.path)
        }
    }

    /// Find a collection by name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

fn config_root(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Test Site"
description = "Posts and people"

[[sources]]
name = "posts"
path = "content/posts"

[[sources]]
name = "persons"
path = "/srv/persons"

[markdown]
extensions = ["md"]
syntax_theme = "InspiredGitHub"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.description.as_deref(), Some("Posts and people"));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name, "posts");
        assert_eq!(config.markdown.extensions, vec!["md"]);
        assert_eq!(config.markdown.syntax_theme, "InspiredGitHub");
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_source_dir_resolution() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load(&config_path).expect("load config");

        let posts = config.source("posts").expect("posts");
        assert_eq!(config.source_dir(posts), dir.path().join("content/posts"));

        let persons = config.source("persons").expect("persons");
        assert_eq!(config.source_dir(persons), PathBuf::from("/srv/persons"));
        assert!(config.source("images").is_none());
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let minimal_config = r#"
[site]
title = "Minimal Site"

[[sources]]
name = "posts"
path = "posts"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.markdown.extensions, vec!["md", "markdown", "mdx"]);
        assert_eq!(config.markdown.syntax_theme, "base16-ocean.dark");
        assert!(config.markdown.is_markdown("MD"));
        assert!(!config.markdown.is_markdown("png"));
    }

    #[test]
    fn test_config_validation_empty_title() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let config_content = r#"
[site]
title = ""

[[sources]]
name = "posts"
path = "posts"
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let result = Config::load(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_no_sources() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, "[site]\ntitle = \"Empty\"\n").expect("write");

        let result = Config::load(&config_path);
        assert!(result.unwrap_err().to_string().contains("[[sources]]"));
    }

    #[test]
    fn test_config_validation_duplicate_source() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let config_content = r#"
[site]
title = "Dupes"

[[sources]]
name = "posts"
path = "a"

[[sources]]
name = "posts"
path = "b"
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let result = Config::load(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("duplicate source name: posts")
        );
    }

    #[test]
    fn test_load_with_env() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/folio.toml"));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
