// Data model shared by the parser and the API client. Serialized field order
// is the order the remote API documents: `name` then `options`, and
// `label` then `value` for each option.

use crate::error::SubmitError;
use serde::{Deserialize, Serialize};

/// A named group of label/value choices, created remotely as one unit.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionBank {
    pub name: String,
    pub options: Vec<BankOption>,
}

/// One choice within a bank.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BankOption {
    pub label: String,
    pub value: String,
}

impl OptionBank {
    pub fn new(name: impl Into<String>) -> Self {
        OptionBank {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.options.push(BankOption {
            label: label.into(),
            value: value.into(),
        });
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// The bank a header-only file produces: no name and no options.
    pub fn is_degenerate(&self) -> bool {
        self.name.is_empty() && self.options.is_empty()
    }
}

/// Outcome of a submission run: the banks confirmed created, in order, and
/// the error that stopped the run if there was one.
#[derive(Debug, Default)]
pub struct RunResult {
    pub succeeded: Vec<String>,
    pub failure: Option<SubmitError>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
