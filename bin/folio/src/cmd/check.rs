//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, frontmatter::parse_frontmatter};
use folio_graph::{ContentGraph, FilesystemLoader};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration, front matter of every Markdown file, and the
/// derived graph (titles, author references, person emails).
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(config) = config {
        println!("\nChecking collections...");
        check_collections(&config, &mut result);

        println!("\nChecking content files...");
        let loader = FilesystemLoader::new(config.clone(), Default::default());
        validate_content_files(&loader, &mut result);

        println!("\nChecking content graph...");
        check_graph(config, &mut result);
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check that every collection directory exists.
fn check_collections(config: &Config, result: &mut ValidationResult) {
    for source in &config.sources {
        let dir = config.source_dir(source);
        if dir.is_dir() {
            println!("  ✓ {} ({})", source.name, dir.display());
        } else {
            result.add_warning(format!(
                "Collection {} directory missing: {}",
                source.name,
                dir.display()
            ));
            println!("  ⚠ {} ({}) missing", source.name, dir.display());
        }
    }
}

/// Parse the front matter of every Markdown file in every collection.
fn validate_content_files(loader: &FilesystemLoader, result: &mut ValidationResult) {
    let discovered = match loader.discover() {
        Ok(files) => files,
        Err(e) => {
            result.add_error(format!("Failed to walk collections: {e}"));
            return;
        }
    };

    let mut checked = 0;
    let mut failed = 0;

    for (_, path) in discovered {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !loader.config().markdown.is_markdown(ext) {
            continue;
        }

        checked += 1;

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                result.add_error(format!("{}: Failed to read file: {e}", path.display()));
                failed += 1;
                continue;
            }
        };

        if let Err(e) = parse_frontmatter(&content, &path) {
            result.add_error(format!("{}: {e}", path.display()));
            failed += 1;
        }
    }

    if failed == 0 {
        println!("  ✓ All {checked} content files valid");
    } else {
        println!("  ✗ {failed}/{checked} content files have errors");
    }
}

/// Ingest and report content diagnostics as warnings.
fn check_graph(config: Config, result: &mut ValidationResult) {
    let graph = ContentGraph::new(config);
    let stats = match graph.ingest() {
        Ok(stats) => stats,
        Err(e) => {
            result.add_error(format!("Ingestion failed: {e}"));
            return;
        }
    };
    println!("  ✓ {} posts, {} persons", stats.posts, stats.persons);

    let diagnostics = graph.lint();
    if diagnostics.is_empty() {
        println!("  ✓ No content warnings");
    }
    for diagnostic in diagnostics {
        println!("  ⚠ {diagnostic}");
        result.add_warning(diagnostic.to_string());
    }
}
