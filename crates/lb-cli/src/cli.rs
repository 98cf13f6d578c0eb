use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for the `npmlb` binary.
#[derive(Debug, Parser)]
#[command(
    name = "npmlb",
    version,
    about = "npm leaderboard - enrich packages with registry metadata and download trends"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (no progress bar or batch lines)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags { quiet: self.quiet }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GlobalFlags {
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Enrich and insert names from a list that are not stored yet
    Ingest(InputRunArgs),
    /// Re-enrich every stored package in place
    Refresh(RunArgs),
    /// Ingest new names, refresh the rest, then record the sync time
    Sync(InputRunArgs),
    /// Show stored package count and last sync time
    Status(StatusArgs),
    /// Print the JSON Schema of a persisted document type
    Schema(SchemaArgs),
}

/// Overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Units per sequential batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum units holding an upstream slot at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args)]
pub struct InputRunArgs {
    /// JSON file holding an array of package names
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Document type
    #[arg(value_enum)]
    pub kind: SchemaKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaKind {
    /// A stored package record
    Record,
    /// An entry of the failure artifact
    Failure,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, SchemaKind};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ingest_takes_input_and_overrides() {
        let cli = Cli::try_parse_from([
            "npmlb",
            "ingest",
            "--input",
            "data/package_names.json",
            "--batch-size",
            "50",
            "--concurrency",
            "5",
        ])
        .expect("cli should parse");

        let Commands::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.input.to_str(), Some("data/package_names.json"));
        assert_eq!(args.run.batch_size, Some(50));
        assert_eq!(args.run.concurrency, Some(5));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["npmlb", "refresh", "--quiet"]).expect("cli should parse");
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Refresh(_)));
    }

    #[test]
    fn ingest_requires_input() {
        assert!(Cli::try_parse_from(["npmlb", "ingest"]).is_err());
    }

    #[test]
    fn schema_kind_is_a_value_enum() {
        let cli = Cli::try_parse_from(["npmlb", "schema", "failure"]).expect("cli should parse");
        let Commands::Schema(args) = cli.command else {
            panic!("expected schema");
        };
        assert_eq!(args.kind, SchemaKind::Failure);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["npmlb", "-q", "-v", "status"]).is_err());
    }
}
