use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sarc",
    about = "Create, modify and extract sarc archives.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Create a new archive")]
    Create(CreateArgs),

    #[command(visible_alias = "a", about = "Add files to an existing archive")]
    Append(AppendArgs),

    #[command(
        visible_alias = "u",
        about = "Replace files in an archive, adding any that are missing"
    )]
    Update(UpdateArgs),

    #[command(visible_alias = "d", about = "Delete entries from an archive")]
    Delete(DeleteArgs),

    #[command(visible_alias = "x", about = "Extract entries from an archive")]
    Extract(ExtractArgs),

    #[command(visible_aliases = ["l", "ls"], about = "List entries in an archive")]
    List(ListArgs),

    #[command(about = "Show the on-disk layout of an archive")]
    Info(InfoArgs),
}

#[derive(Debug, clap::Args)]
#[command(after_help = "\
\x1b[1m\x1b[4mExamples:\x1b[0m
  sarc create assets.sarc hero.png level1.bin
  sarc create --align 4096 textures.sarc *.ktx")]
pub struct CreateArgs {
    /// Output archive path (must not exist)
    pub archive: PathBuf,

    /// Byte alignment for entry bodies (power of two)
    #[arg(long = "align", default_value_t = 8)]
    pub alignment: u32,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Files to add; each entry is named after its file name
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct AppendArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,

    /// Byte alignment for new entry bodies (power of two)
    #[arg(long = "align", default_value_t = 8)]
    pub alignment: u32,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Files to add; none of their names may exist in the archive yet
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct UpdateArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,

    /// Byte alignment for entries that are created (power of two)
    #[arg(long = "align", default_value_t = 8)]
    pub alignment: u32,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Files whose contents replace the entries of the same name
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,

    /// Entry names to delete
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct ExtractArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,

    /// Output directory (defaults to current directory)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Overwrite files that already exist in the output directory
    #[arg(long)]
    pub overwrite: bool,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Entries to extract (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,

    /// Output as JSON
    #[arg(short = 'j', long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct InfoArgs {
    /// Path to the .sarc archive
    pub archive: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_and_flags() {
        let cli = Cli::try_parse_from(["sarc", "x", "-o", "out", "--overwrite", "a.sarc", "one"])
            .unwrap();
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert!(args.overwrite);
                assert_eq!(args.names, ["one"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["sarc", "ls", "-j", "a.sarc"]).unwrap();
        assert!(matches!(cli.command, Commands::List(ListArgs { json: true, .. })));

        let cli = Cli::try_parse_from(["sarc", "c", "--align", "16", "a.sarc", "f"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Create(CreateArgs { alignment: 16, .. })
        ));
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["sarc", "create", "a.sarc"]).is_err());
        assert!(Cli::try_parse_from(["sarc", "delete", "a.sarc"]).is_err());
        assert!(Cli::try_parse_from(["sarc", "extract", "a.sarc"]).is_ok());
    }
}
