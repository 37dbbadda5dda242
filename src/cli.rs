use camino::Utf8PathBuf;

#[derive(Debug, clap::Parser)]
/// Look through a file byte by byte, with search and replace highlighted in place
#[command(version, about)]
pub struct BytelensCli {
    /// File to open
    pub file: Utf8PathBuf,

    /// Start at this offset, given in the configured address radix
    #[clap(short, long)]
    pub offset: Option<String>,

    /// Search for this text and highlight every match
    #[clap(short, long)]
    pub search: Option<String>,

    /// Replace every match of --search with this text
    #[clap(short, long, requires = "search")]
    pub replace: Option<String>,

    /// Encoding of --search and --replace (hex, binary, ascii, latin1, utf-8, utf-16le)
    #[clap(short, long)]
    pub encoding: Option<String>,

    /// Override the configured byte radix (2, 8, 10 or 16)
    #[clap(long)]
    pub radix: Option<u32>,

    /// Override path for configs and logs
    #[clap(short, long)]
    pub config_path: Option<Utf8PathBuf>,

    /// Print the visible rows to stdout instead of opening the terminal UI
    #[clap(short, long)]
    pub dump: bool,
}
