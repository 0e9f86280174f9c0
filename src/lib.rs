// Library root
// -----------
// This crate exposes the pieces the CLI is built from. The binary
// (`main.rs`) only parses arguments and hands them to `ui::run`.
//
// Module responsibilities:
// - `bank`: option bank model and the result of a submission run.
// - `parser`: turns CSV rows into ordered option banks.
// - `api`: blocking HTTP client that creates banks one at a time.
// - `config`: command-line arguments and the resolved configuration.
// - `error`: error types for each stage.
// - `ui`: terminal flow (logging, spinner, final report).
pub mod api;
pub mod bank;
pub mod config;
pub mod error;
pub mod parser;
pub mod ui;

pub use bank::{BankOption, OptionBank, RunResult};
pub use error::{ConfigError, ParseError, RowError, SubmitError};
