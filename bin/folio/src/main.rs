//! Folio CLI
//!
//! Loads Markdown collections into a typed content graph and queries it.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use folio::cmd::new::ContentKind;

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "A typed content graph for Markdown posts and authors"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Ingest all collections and print node statistics
    Build,
    /// Run a selection query and print the JSON result
    Query {
        /// Object type to query (Post, Person)
        type_name: String,
        /// Selection set, e.g. "{ title authors { name } }"
        selection: String,
        /// Resolve a single node by id
        #[arg(long)]
        id: Option<String>,
    },
    /// Validate configuration and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Create new content from template
    New {
        /// Kind of content (post, person)
        #[arg(value_enum)]
        kind: ContentKind,
        /// File name without extension (e.g., my-article)
        slug: String,
    },
    /// Watch collections and re-derive nodes on change
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build => {
            folio::cmd::build::run(&cli.config)?;
        }
        Commands::Query {
            type_name,
            selection,
            id,
        } => {
            folio::cmd::query::run(&cli.config, &type_name, &selection, id.as_deref())?;
        }
        Commands::Check { strict } => {
            folio::cmd::check::run(&cli.config, strict)?;
        }
        Commands::New { kind, slug } => {
            folio::cmd::new::run(&cli.config, kind, &slug)?;
        }
        Commands::Watch => {
            folio::cmd::watch::run(&cli.config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let cli = Cli::parse_from(["folio", "build"]);

        assert_eq!(cli.config, std::path::PathBuf::from("folio.toml"));
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Commands::Build));
    }

    #[test]
    fn test_cli_query_command_parsing() {
        let args = ["folio", "query", "Post", "{ title authors { name } }"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Query {
                type_name,
                selection,
                id,
            } => {
                assert_eq!(type_name, "Post");
                assert_eq!(selection, "{ title authors { name } }");
                assert!(id.is_none());
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_query_with_id() {
        let args = ["folio", "query", "Person", "{ name }", "--id", "abc"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Query { id, .. } => assert_eq!(id.as_deref(), Some("abc")),
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let cli = Cli::parse_from(["folio", "check", "--strict"]);

        match cli.command {
            Commands::Check { strict } => assert!(strict),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_new_command_parsing() {
        let cli = Cli::parse_from(["folio", "new", "person", "ada-lovelace"]);

        match cli.command {
            Commands::New { kind, slug } => {
                assert_eq!(kind, ContentKind::Person);
                assert_eq!(slug, "ada-lovelace");
            }
            _ => panic!("Expected New command"),
        }
    }

    #[test]
    fn test_cli_new_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["folio", "new", "image", "cat"]).is_err());
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::parse_from(["folio", "-vvv", "watch"]);
        assert_eq!(cli.verbose, 3);
        assert!(matches!(cli.command, Commands::Watch));
    }

    #[test]
    fn test_cli_custom_config_path() {
        let cli = Cli::parse_from(["folio", "--config", "site.toml", "build"]);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
