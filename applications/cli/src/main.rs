//! coverfix - normalize album cover art across a music library
use clap::{Parser, Subcommand};
use coverfix_cli::{commands, config::AppConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "coverfix", version)]
#[command(about = "Extract and normalize album cover art in a music library", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Library root to fix. A directory named like a subcommand must be
    /// given with a path prefix, e.g. `./sync`
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror SOURCE onto TARGET with rsync, then fix covers on TARGET
    Sync {
        /// Library to copy from
        source: PathBuf,
        /// Destination (player or SD card)
        target: PathBuf,
    },
    /// Move loose audio files in ROOT into one folder per album tag
    Organize {
        /// Directory holding the loose files
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverfix=info,coverfix_library=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match (cli.command, cli.root) {
        (Some(_), Some(root)) => {
            anyhow::bail!("unexpected library root {} before a subcommand", root.display());
        }
        (Some(Commands::Sync { source, target }), None) => {
            commands::sync(&config, &source, &target).await?;
        }
        (Some(Commands::Organize { root }), None) => {
            commands::organize(root).await?;
        }
        (None, Some(root)) => {
            commands::fix(&config, root).await?;
        }
        (None, None) => anyhow::bail!("a library root directory is required"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_root_runs_fix() {
        let cli = Cli::try_parse_from(["coverfix", "/music"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/music")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn root_named_like_a_subcommand_needs_a_prefix() {
        let cli = Cli::try_parse_from(["coverfix", "./sync"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("./sync")));
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["coverfix", "./organize"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("./organize")));

        // the bare word is the subcommand, which then lacks its arguments
        assert!(Cli::try_parse_from(["coverfix", "sync"]).is_err());
    }

    #[test]
    fn sync_subcommand() {
        let cli = Cli::try_parse_from(["coverfix", "--config", "c.toml", "sync", "/src", "/dst"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Some(Commands::Sync { source, target }) => {
                assert_eq!(source, PathBuf::from("/src"));
                assert_eq!(target, PathBuf::from("/dst"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn organize_subcommand() {
        let cli = Cli::try_parse_from(["coverfix", "organize", "/music"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Organize { .. })));
    }

    #[test]
    fn no_arguments_is_an_error() {
        assert!(Cli::try_parse_from(["coverfix"]).is_err());
    }
}
