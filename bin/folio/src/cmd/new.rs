//! New command - create new content from template

use std::{fs, path::Path};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use folio_core::Config;

/// Kind of content file to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContentKind {
    /// A blog post in the `posts` collection.
    Post,
    /// An author bio in the `persons` collection.
    Person,
}

impl ContentKind {
    /// Collection the file is created in.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Person => "persons",
        }
    }
}

/// Run the new command.
///
/// Creates `<collection dir>/<slug>.md` with boilerplate front matter.
pub fn run(config_path: &Path, kind: ContentKind, slug: &str) -> Result<()> {
    tracing::info!(?config_path, ?kind, slug, "Creating new content");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let source = config
        .source(kind.collection())
        .ok_or_else(|| eyre!("No [[sources]] entry named {}", kind.collection()))?;

    let file_path = config.source_dir(source).join(format!("{slug}.md"));
    if file_path.exists() {
        bail!("{} already exists", file_path.display());
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }

    let content = match kind {
        ContentKind::Post => generate_post(slug),
        ContentKind::Person => generate_person(slug),
    };
    fs::write(&file_path, content).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new content file");
    println!("Created: {}", file_path.display());

    Ok(())
}

fn title_from_slug(slug: &str) -> String {
    slug.rsplit('/').next().unwrap_or(slug).replace('-', " ")
}

/// Escape text for a YAML double-quoted scalar.
fn yaml_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn generate_post(slug: &str) -> String {
    let title = yaml_escape(&title_from_slug(slug));
    let date = Utc::now().format("%Y-%m-%d").to_string();

    format!(
        r#"---
title: "{title}"
date: {date}
authors: []
---

Write your content here.
"#
    )
}

fn generate_person(slug: &str) -> String {
    let name = yaml_escape(&title_from_slug(slug));

    format!(
        r#"---
name: "{name}"
email: ""
---

Write a short bio here.
"#
    )
}
