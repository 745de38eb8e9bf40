//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "errlog")]
#[command(about = "Export an ELMAH error log into local XML files")]
#[command(version)]
pub struct Cli {
    /// ELMAH handler URL (e.g. http://www.example.com/elmah.axd) or a local CSV index
    #[arg(value_name = "INDEX_URL")]
    pub index: String,

    /// Directory receiving the error-*.xml files
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Suppress per-error console output
    #[arg(long)]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Config file path (default: ./errlog.toml or ~/.config/errlog/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of errors to export
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

/// Invalid command line, detected before any fetch
#[derive(Debug)]
pub enum ArgumentError {
    /// Index URL not given
    Missing(String),
    Unknown(String),
    /// Flag given without its value
    MissingValue(String),
    Invalid(String),
}

impl std::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(m) | Self::Unknown(m) | Self::MissingValue(m) | Self::Invalid(m) => {
                write!(f, "{m}")
            }
        }
    }
}

impl std::error::Error for ArgumentError {}

impl From<clap::Error> for ArgumentError {
    fn from(e: clap::Error) -> Self {
        let rendered = e.to_string();
        let message = rendered
            .trim_end()
            .trim_start_matches("error: ")
            .to_string();
        match e.kind() {
            ErrorKind::MissingRequiredArgument => Self::Missing(
                "missing ELMAH index URL (e.g. http://www.example.com/elmah.axd)".to_string(),
            ),
            ErrorKind::UnknownArgument => Self::Unknown(message),
            ErrorKind::InvalidValue => Self::MissingValue(message),
            _ => Self::Invalid(message),
        }
    }
}

/// Parse arguments; help and version requests come back as `Ok(Err(..))`
/// so the caller can print them and exit successfully.
pub fn parse_args<I, T>(args: I) -> Result<Result<Cli, clap::Error>, ArgumentError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Ok(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Err(e))
        }
        Err(e) => Err(e.into()),
    }
}

/// Interpret the positional argument as a URL or a local file path.
pub fn index_url(arg: &str) -> Result<Url, ArgumentError> {
    if let Ok(url) = Url::parse(arg) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(url);
        }
    }

    let path = std::path::absolute(arg)
        .map_err(|e| ArgumentError::Invalid(format!("invalid index path '{arg}': {e}")))?;
    Url::from_file_path(&path).map_err(|()| {
        ArgumentError::Invalid(format!("'{arg}' is neither a URL nor a local path"))
    })
}
