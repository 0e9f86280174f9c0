// Reads option banks from comma-separated input.
//
// The first record is a header and is discarded without inspection. Every
// following record contributes one option: `group_name,label,value`. A
// non-empty `group_name` different from the open bank's name starts a new
// bank; an empty or repeated one continues the bank that is currently open.
//
// Rows are exposed as a lazy sequence of `Result<Row, RowError>` through
// [`rows`], and [`group_rows`] folds them into banks under a [`RowPolicy`]
// that decides what a bad row means.

use crate::bank::OptionBank;
use crate::error::{ParseError, RowError};
use clap::ValueEnum;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One decoded data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: u64,
    pub group: String,
    pub label: String,
    pub value: String,
}

/// What to do when a data row cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RowPolicy {
    /// Treat the bad row as the end of input and keep what was read so far.
    #[default]
    Stop,
    /// Drop the bad row and keep reading.
    Skip,
    /// Fail the whole parse.
    Abort,
}

impl RowError {
    /// Whether the stream itself failed, as opposed to one bad row.
    pub fn is_fatal(&self) -> bool {
        match self {
            RowError::Csv(err) => err.is_io_error(),
            RowError::Short { .. } => false,
        }
    }
}

/// Lazily decode the data rows of `reader`, header excluded.
pub fn rows<R: Read>(reader: R) -> impl Iterator<Item = Result<Row, RowError>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .map(|record| {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match (record.get(0), record.get(1), record.get(2)) {
                (Some(group), Some(label), Some(value)) => Ok(Row {
                    line,
                    group: group.to_string(),
                    label: label.to_string(),
                    value: value.to_string(),
                }),
                _ => Err(RowError::Short {
                    line,
                    found: record.len(),
                }),
            }
        })
}

/// Group rows into banks, preserving input order for banks and options.
///
/// The bank still open when input ends is always emitted, so input with no
/// data rows yields a single bank with an empty name and no options. Rows
/// before the first named row form a leading bank with an empty name.
///
/// A failure of the underlying stream is returned under every policy; the
/// policy only governs rows that fail to decode.
pub fn group_rows<I>(rows: I, policy: RowPolicy) -> Result<Vec<OptionBank>, RowError>
where
    I: IntoIterator<Item = Result<Row, RowError>>,
{
    let mut banks = Vec::new();
    let mut current = OptionBank::default();

    for row in rows {
        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => match policy {
                RowPolicy::Abort => return Err(err),
                RowPolicy::Skip => {
                    warn!("Skipping row: {}", err);
                    continue;
                }
                RowPolicy::Stop => {
                    warn!("Stopped reading input, remaining rows ignored: {}", err);
                    break;
                }
            },
        };

        if !row.group.is_empty() && row.group != current.name {
            if current.is_degenerate() {
                current.name = row.group;
            } else {
                let finished = std::mem::replace(&mut current, OptionBank::new(row.group));
                debug!(bank = %finished.name, options = finished.options.len(), "bank complete");
                banks.push(finished);
            }
        }
        current.push(row.label, row.value);
    }

    banks.push(current);
    Ok(banks)
}

/// Parse banks from `reader`, stopping quietly at the first bad row.
pub fn parse<R: Read>(reader: R) -> Result<Vec<OptionBank>, ParseError> {
    parse_with(reader, RowPolicy::Stop)
}

pub fn parse_with<R: Read>(reader: R, policy: RowPolicy) -> Result<Vec<OptionBank>, ParseError> {
    group_rows(rows(reader), policy).map_err(|err| {
        if err.is_fatal() {
            ParseError::Read(err)
        } else {
            ParseError::Row(err)
        }
    })
}

/// Open `path` and parse banks from it, stopping quietly at the first bad row.
pub fn parse_file(path: &Path) -> Result<Vec<OptionBank>, ParseError> {
    parse_file_with(path, RowPolicy::Stop)
}

pub fn parse_file_with(path: &Path, policy: RowPolicy) -> Result<Vec<OptionBank>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Reading option banks from {}", path.display());
    parse_with(file, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
    }

    fn pairs(bank: &OptionBank) -> Vec<(&str, &str)> {
        bank.options
            .iter()
            .map(|o| (o.label.as_str(), o.value.as_str()))
            .collect()
    }

    #[test]
    fn groups_consecutive_rows_by_name() {
        let input = "header\nBank1,L1,V1\nBank1,L2,V2\nBank2,L3,V3\n";
        let banks = parse(input.as_bytes()).unwrap();

        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "Bank1");
        assert_eq!(pairs(&banks[0]), vec![("L1", "V1"), ("L2", "V2")]);
        assert_eq!(banks[1].name, "Bank2");
        assert_eq!(pairs(&banks[1]), vec![("L3", "V3")]);
    }

    #[test]
    fn blank_group_continues_previous_bank() {
        let input = "group,label,value\nBank1,L1,V1\n,L2,V2\nBank2,L3,V3\n";
        let banks = parse(input.as_bytes()).unwrap();

        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "Bank1");
        assert_eq!(pairs(&banks[0]), vec![("L1", "V1"), ("L2", "V2")]);
        assert_eq!(banks[1].name, "Bank2");
        assert_eq!(pairs(&banks[1]), vec![("L3", "V3")]);
    }

    #[test]
    fn header_only_yields_degenerate_bank() {
        let banks = parse("group,label,value\n".as_bytes()).unwrap();
        assert_eq!(banks, vec![OptionBank::default()]);

        let banks = parse("".as_bytes()).unwrap();
        assert_eq!(banks, vec![OptionBank::default()]);
    }

    #[test]
    fn leading_unnamed_rows_form_their_own_bank() {
        let input = "h,h,h\n,a,1\n,b,2\nColours,red,r\n,blue,b\n";
        let banks = parse(input.as_bytes()).unwrap();

        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "");
        assert_eq!(pairs(&banks[0]), vec![("a", "1"), ("b", "2")]);
        assert_eq!(banks[1].name, "Colours");
        assert_eq!(pairs(&banks[1]), vec![("red", "r"), ("blue", "b")]);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let input = "h,h,h\nSizes,\"Small, fitted\",S\n";
        let banks = parse(input.as_bytes()).unwrap();
        assert_eq!(pairs(&banks[0]), vec![("Small, fitted", "S")]);
    }

    #[test]
    fn short_row_ends_input_by_default() {
        let input = "h,h,h\nA,a,1\nB,b\nC,c,3\n";
        let banks = parse(input.as_bytes()).unwrap();

        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name, "A");
    }

    #[test]
    fn skip_policy_drops_only_the_bad_row() {
        let input = "h,h,h\nA,a,1\nB,b\nC,c,3\n";
        let banks = parse_with(input.as_bytes(), RowPolicy::Skip).unwrap();

        let names: Vec<_> = banks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn abort_policy_surfaces_the_row_error() {
        let input = "h,h,h\nA,a,1\nB,b\n";
        let err = parse_with(input.as_bytes(), RowPolicy::Abort).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Row(RowError::Short { line: 3, found: 2 })
        ));
    }

    #[test]
    fn rows_are_lazy_and_carry_line_numbers() {
        let input = "h,h,h\nA,a,1\n,b,2\n";
        let collected: Vec<_> = rows(input.as_bytes()).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            collected,
            vec![
                Row {
                    line: 2,
                    group: "A".into(),
                    label: "a".into(),
                    value: "1".into()
                },
                Row {
                    line: 3,
                    group: "".into(),
                    label: "b".into(),
                    value: "2".into()
                },
            ]
        );
    }

    #[test]
    fn parsing_twice_gives_same_banks() {
        let input = "h,h,h\nA,a,1\n,b,2\nB,c,3\n";
        assert_eq!(parse(input.as_bytes()).unwrap(), parse(input.as_bytes()).unwrap());
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "h,h,h\nYesNo,Yes,y\n,No,n\n").unwrap();

        let banks = parse_file(file.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(pairs(&banks[0]), vec![("Yes", "y"), ("No", "n")]);
    }

    #[test]
    fn parse_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ParseError::Open { .. }));
    }

    #[test]
    fn failing_stream_is_a_read_error_under_every_policy() {
        for policy in [RowPolicy::Stop, RowPolicy::Skip, RowPolicy::Abort] {
            let err = parse_with(FailingReader, policy).unwrap_err();
            assert!(matches!(err, ParseError::Read(_)), "{policy:?}: {err:?}");
        }
        assert!(matches!(parse(FailingReader), Err(ParseError::Read(_))));
    }

    #[test]
    fn parse_file_on_directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(dir.path()).unwrap_err();
        assert!(matches!(err, ParseError::Read(_) | ParseError::Open { .. }), "{err:?}");
    }
}
