use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ghostfile", version)]
#[command(
    about = "Mirror a directory's structure using empty placeholder files",
    long_about = None
)]
pub struct Cli {
    /// Print engine diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count the files and directories under SOURCE and print its tree
    Scan {
        /// Directory to scan (defaults to current directory)
        source: Option<PathBuf>,

        /// Skip entries whose name matches (pipe-separated, `*` and `?` wildcards)
        #[arg(short = 'I', long, value_name = "PATTERN")]
        exclude: Option<String>,

        /// Sort entries by name instead of listing order
        #[arg(long)]
        sort: bool,

        /// Print only the counts
        #[arg(long)]
        no_tree: bool,
    },

    /// Recreate SOURCE's directories under DESTINATION with empty files
    Mirror {
        source: PathBuf,

        destination: PathBuf,

        /// Skip entries whose name matches (pipe-separated, `*` and `?` wildcards)
        #[arg(short = 'I', long, value_name = "PATTERN")]
        exclude: Option<String>,

        /// Do not draw the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}
