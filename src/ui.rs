// UI layer: wires configuration, parsing and submission together, shows a
// spinner while banks are being created and prints what was saved.

use crate::api::ApiClient;
use crate::bank::{OptionBank, RunResult};
use crate::config::{self, Args, Config};
use crate::parser;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the whole pipeline for parsed command-line `args`.
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    let config = Config::from_args(&args)?;
    if args.save_token {
        let path = config::token_path().context("Could not locate home directory")?;
        config::persist_token(&path, &config.token)?;
        info!("Token saved to {}", path.display());
    }
    info!("Using endpoint {}", config.endpoint);

    let banks = parser::parse_file_with(&config.file, config.row_policy)
        .context("Unable to read options CSV")?;
    let banks = prepare_banks(banks);

    if config.dry_run {
        let json = serde_json::to_string_pretty(&banks).context("Serializing option banks")?;
        println!("{}", json);
        return Ok(());
    }

    let api = ApiClient::new(&config.endpoint, &config.token, config.timeout)?;
    let result = submit_with_spinner(&api, &banks);

    report(&result, &mut io::stdout().lock())?;
    match result.failure {
        Some(err) => Err(anyhow::Error::new(err).context("Failed to create an option bank")),
        None => Ok(()),
    }
}

/// Drop the empty bank a header-only file produces and flag unnamed ones.
pub fn prepare_banks(banks: Vec<OptionBank>) -> Vec<OptionBank> {
    banks
        .into_iter()
        .filter(|bank| {
            if bank.is_degenerate() {
                warn!("Input has no option rows; nothing to submit");
                return false;
            }
            if !bank.is_named() {
                warn!(
                    "Submitting {} option(s) that precede the first bank name under an empty name",
                    bank.options.len()
                );
            }
            true
        })
        .collect()
}

fn submit_with_spinner(api: &ApiClient, banks: &[OptionBank]) -> RunResult {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    let total = banks.len();
    let result = api.submit_banks_with(banks, |index, bank| {
        debug!("Submitting bank {} of {}", index + 1, total);
        spinner.set_message(format!("Creating {} ({}/{})", bank.name, index + 1, total));
    });

    spinner.finish_and_clear();
    result
}

/// Print the names created and, if the run halted, why.
pub fn report<W: Write>(result: &RunResult, out: &mut W) -> io::Result<()> {
    if !result.succeeded.is_empty() {
        writeln!(out, "Saved:")?;
        for name in &result.succeeded {
            writeln!(out, "{}", name)?;
        }
    }
    if let Some(err) = &result.failure {
        writeln!(out, "Failed to create an option bank")?;
        writeln!(out, "{}", err)?;
    }
    Ok(())
}

/// Set up structured logging on stderr; `RUST_LOG` overrides the flags.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("optionbank_cli={}", args.log_level())));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr),
        )
        .try_init();
}
