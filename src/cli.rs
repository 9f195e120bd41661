use crate::index::SortOrder;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "dirlens")]
#[command(about = "Browse file-tree manifests from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Human
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    /// Directories first, then by name
    Kind,
    /// By name only
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Kind => SortOrder::KindThenName,
            SortArg::Name => SortOrder::NameThenKind,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Browse a manifest interactively (TUI)")]
    Browse {
        source: Option<String>,
    },
    #[command(about = "List one directory of a manifest")]
    Ls {
        source: Option<String>,
        #[arg(short, long, default_value = "/")]
        path: String,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<SortArg>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(short = 'F', long, default_value = "human")]
        format: OutputFormat,
        #[arg(short, long)]
        out: Option<String>,
    },
    #[command(about = "Show totals for a manifest")]
    Stats {
        source: Option<String>,
        #[arg(short = 'F', long, default_value = "human")]
        format: OutputFormat,
    },
    #[command(about = "Write a manifest for a local directory tree")]
    Generate {
        root: String,
        #[arg(short, long)]
        out: String,
        #[arg(long, help = "Records per part file (0 writes a single files.json)")]
        part_size: Option<usize>,
        #[arg(long)]
        gzip: bool,
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,
    },
    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
    #[command(about = "Run as MCP server (for AI integration)")]
    Mcp {
        source: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigActions {
    #[command(about = "Show current configuration")]
    Show,
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        value: String,
    },
    #[command(about = "Add a generator exclude pattern")]
    AddExclude {
        #[arg(short, long)]
        pattern: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ls_arguments() {
        let cli = Cli::try_parse_from([
            "dirlens", "ls", "./out", "-p", "docs", "-s", "pdf", "--sort", "name", "--page", "2",
            "-F", "json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ls {
                source,
                path,
                search,
                sort,
                page,
                format,
                ..
            }) => {
                assert_eq!(source.as_deref(), Some("./out"));
                assert_eq!(path, "docs");
                assert_eq!(search.as_deref(), Some("pdf"));
                assert_eq!(sort.map(SortOrder::from), Some(SortOrder::NameThenKind));
                assert_eq!(page, Some(2));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected ls"),
        }
    }

    #[test]
    fn test_generate_collects_excludes() {
        let cli = Cli::try_parse_from([
            "dirlens", "generate", "/data", "-o", "out", "-x", "*.tmp", "-x", ".git", "--gzip",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate { exclude, gzip, part_size, .. }) => {
                assert_eq!(exclude, vec!["*.tmp", ".git"]);
                assert!(gzip);
                assert!(part_size.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["dirlens"]).unwrap();
        assert!(cli.command.is_none());
    }
}
