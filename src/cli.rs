use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipread")]
#[command(version)]
#[command(about = "List and extract entries from ZIP archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipread data1.zip -x joe       extract all files except joe from data1.zip\n  \
  zipread -p foo.zip notes.txt   send notes.txt from foo.zip to stdout\n  \
  zipread -v archive.zip         list archive contents with details")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entries to extract (default: all)
    #[arg(value_name = "ENTRIES")]
    pub entries: Vec<String>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract entries to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract entries into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude entries that follow
    #[arg(short = 'x', value_name = "ENTRY", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }
}
