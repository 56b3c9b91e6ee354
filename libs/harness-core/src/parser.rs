//! Reads the structured records a harness prints.
//!
//! ```text
//! @@ <index> OK
//! @@ <index> ER\t<actual>\t<expected>
//! @@ <index> EX\t<message>
//! @@ <index> NA\t<reason>
//! ```
//!
//! Fields are escaped by the harness so every record is a single line. The
//! harness starts each record on a fresh line, so submission output printed
//! without a trailing newline stays on a line of its own. Lines without the
//! prefix are submission output and are skipped.

use tracing::{debug, warn};

pub const RECORD_PREFIX: &str = "@@ ";

/// Verdict for one test case as reported by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed { actual: String, expected: String },
    /// The submission threw or panicked while the case ran.
    Raised { message: String },
    /// The harness could not evaluate the case.
    NotEvaluated { reason: String },
    /// No record was printed for the case.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub index: usize,
    pub outcome: CaseOutcome,
}

/// Inverse of the harness-side escaping of `\\`, `\n`, `\r` and `\t`.
pub fn unescape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub fn parse_record(line: &str) -> Option<Record> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix(RECORD_PREFIX)?;
    let (index, body) = rest.split_once(' ')?;
    let index: usize = index.parse().ok()?;

    let (tag, fields) = match body.split_once('\t') {
        Some((tag, fields)) => (tag, Some(fields)),
        None => (body, None),
    };

    let outcome = match (tag, fields) {
        ("OK", None) => CaseOutcome::Passed,
        ("ER", Some(fields)) => {
            let (actual, expected) = fields.split_once('\t')?;
            CaseOutcome::Failed {
                actual: unescape_field(actual),
                expected: unescape_field(expected),
            }
        }
        ("EX", Some(message)) => CaseOutcome::Raised {
            message: unescape_field(message),
        },
        ("NA", Some(reason)) => CaseOutcome::NotEvaluated {
            reason: unescape_field(reason),
        },
        _ => {
            debug!(line, "Ignoring malformed record");
            return None;
        }
    };

    Some(Record { index, outcome })
}

pub fn parse_records(stdout: &str) -> Vec<Record> {
    stdout.lines().filter_map(parse_record).collect()
}

/// One outcome per test case. The first record for an index wins; records for
/// indices outside `0..count` are dropped.
///
/// Known limitation: records share stdout with the submission, so a submission
/// that prints `@@ <index> OK` for a case that has not run yet is credited
/// with it.
pub fn collect_outcomes(stdout: &str, count: usize) -> Vec<CaseOutcome> {
    let mut outcomes = vec![CaseOutcome::Missing; count];

    for record in parse_records(stdout) {
        match outcomes.get_mut(record.index) {
            Some(slot @ CaseOutcome::Missing) => *slot = record.outcome,
            Some(_) => warn!(test_id = record.index, "Duplicate record ignored"),
            None => warn!(test_id = record.index, count, "Record for unknown test case ignored"),
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_each_record_kind() {
        assert_eq!(
            parse_record("@@ 0 OK"),
            Some(Record { index: 0, outcome: CaseOutcome::Passed })
        );
        assert_eq!(
            parse_record("@@ 12 ER\t{ 1, 2 }\t{ 1, 3 }\r\n"),
            Some(Record {
                index: 12,
                outcome: CaseOutcome::Failed {
                    actual: "{ 1, 2 }".to_string(),
                    expected: "{ 1, 3 }".to_string(),
                },
            })
        );
        assert_eq!(
            parse_record("@@ 3 EX\tZeroDivisionError: division by zero"),
            Some(Record {
                index: 3,
                outcome: CaseOutcome::Raised {
                    message: "ZeroDivisionError: division by zero".to_string(),
                },
            })
        );
        assert_eq!(
            parse_record("@@ 4 NA\tno exact decimal type"),
            Some(Record {
                index: 4,
                outcome: CaseOutcome::NotEvaluated {
                    reason: "no exact decimal type".to_string(),
                },
            })
        );
    }

    #[test]
    fn test_malformed_records_ignored() {
        for line in [
            "",
            "hello world",
            "@@",
            "@@ x OK",
            "@@ -1 OK",
            "@@ 1 OK\textra",
            "@@ 1 ER\tonly-one-field",
            "@@ 1 EX",
            "@@ 1 MAYBE",
            " @@ 1 OK",
        ] {
            assert_eq!(parse_record(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_unescape_round_trips_harness_escaping() {
        assert_eq!(unescape_field(r"a\tb\nc\\d\re"), "a\tb\nc\\d\re");
        assert_eq!(unescape_field(r"C:\path\x"), r"C:\path\x");
        assert_eq!(unescape_field("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_collect_outcomes_skips_submission_output() {
        let stdout = "debug print\n@@ 1 OK\nmore noise\n@@ 0 ER\t4.3\t4.300000001\n";

        let outcomes = collect_outcomes(stdout, 3);

        assert_eq!(
            outcomes,
            vec![
                CaseOutcome::Failed {
                    actual: "4.3".to_string(),
                    expected: "4.300000001".to_string(),
                },
                CaseOutcome::Passed,
                CaseOutcome::Missing,
            ]
        );
    }

    #[test]
    fn test_first_record_wins_and_out_of_range_dropped() {
        let stdout = "@@ 0 OK\n@@ 0 ER\tx\ty\n@@ 7 OK\n";

        let outcomes = collect_outcomes(stdout, 1);

        assert_eq!(outcomes, vec![CaseOutcome::Passed]);
    }

    #[test]
    fn test_records_after_unterminated_output() {
        let stdout = "progress\n@@ 0 OK\nprogress\n@@ 1 ER\t2\t3\n";

        assert_eq!(
            collect_outcomes(stdout, 2),
            vec![
                CaseOutcome::Passed,
                CaseOutcome::Failed {
                    actual: "2".to_string(),
                    expected: "3".to_string()
                },
            ]
        );
    }
}
