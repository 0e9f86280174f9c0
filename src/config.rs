// Command-line surface and the resolved runtime configuration.
//
// `Args` is what clap parses; `Config` is what the rest of the program
// receives once mandatory values have been checked and the access token
// has been looked up.

use crate::error::ConfigError;
use crate::parser::RowPolicy;
use clap::Parser;
use reqwest::header::HeaderValue;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.fountain.com/v2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const TOKEN_FILE_NAME: &str = ".optionbank_token";

/// Create option banks on the remote API from a CSV file.
///
/// The CSV's first row is a header. Each following row is
/// `group_name,label,value`; an empty `group_name` adds the option to the
/// previous bank.
#[derive(Debug, Clone, Parser)]
#[command(name = "optionbank-cli", version)]
pub struct Args {
    /// API access token (falls back to ~/.optionbank_token)
    #[arg(long, env = "OPTIONBANK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File path for the CSV to read option banks from
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Endpoint option banks are POSTed to
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub url: String,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// What to do with a CSV row that cannot be read
    #[arg(long, value_enum, default_value_t = RowPolicy::Stop)]
    pub on_row_error: RowPolicy,

    /// Print the parsed banks as JSON instead of submitting them
    #[arg(long)]
    pub dry_run: bool,

    /// Remember the given token in ~/.optionbank_token
    #[arg(long)]
    pub save_token: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Everything a run needs, with mandatory values present.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub file: PathBuf,
    pub endpoint: String,
    pub timeout: Duration,
    pub row_policy: RowPolicy,
    pub dry_run: bool,
}

impl Config {
    /// Resolve `args`, reading the stored token from the home directory
    /// when none was given.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::resolve(args, token_path().as_deref())
    }

    /// Resolve `args` against an explicit stored-token location.
    pub fn resolve(args: &Args, token_file: Option<&Path>) -> Result<Self, ConfigError> {
        let token = match args.token.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => token_file
                .and_then(load_token)
                .ok_or(ConfigError::Missing("token"))?,
        };
        validate_token(&token)?;

        let file = args
            .file
            .clone()
            .filter(|f| !f.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("file"))?;

        Ok(Config {
            token,
            file,
            endpoint: args.url.clone(),
            timeout: Duration::from_secs(args.timeout),
            row_policy: args.on_row_error,
            dry_run: args.dry_run,
        })
    }
}

/// Location of the persisted token in the user's home directory.
pub fn token_path() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(TOKEN_FILE_NAME))
}

/// Load a previously saved token, ignoring an absent or blank file.
fn load_token(path: &Path) -> Option<String> {
    let data = std::fs::read_to_string(path).ok()?;
    let token = data.trim();
    if token.is_empty() {
        return None;
    }
    debug!("Using token stored in {}", path.display());
    Some(token.to_string())
}

/// A token must be sendable as a header value.
pub fn validate_token(token: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(token)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidToken(e.to_string()))
}

/// Persist `token` so later runs can omit `--token`.
pub fn persist_token(path: &Path, token: &str) -> Result<(), ConfigError> {
    std::fs::write(path, token).map_err(|source| ConfigError::PersistToken {
        path: path.to_path_buf(),
        source,
    })
}
