//! Output verification.
//!
//! Reconciles the records a mapper emitted against the records the caller
//! expected. Matching is multiset-style: an expectation is satisfied by any
//! remaining equal output, leftmost first, and each output satisfies at most
//! one expectation. Diagnostics always name the expectation's own declaration
//! index.

use crate::record::{Datum, Record};
use std::fmt;

/// How surplus captured records are treated once every expectation has been
/// reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyPolicy {
    /// Every expectation must be met; unconsumed outputs are tolerated.
    #[default]
    Coverage,
    /// As `Coverage`, and every unconsumed output is also reported.
    Strict,
}

/// One discrepancy between expected and captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDiagnostic<K, V> {
    /// The expectation declared at `position` matched no captured record.
    MissingAt {
        position: usize,
        expected: Record<K, V>,
    },
    /// Outputs were captured although none were expected.
    CountMismatch { expected: usize, actual: usize },
    /// A captured record, at its capture index, that no expectation consumed.
    Unexpected { position: usize, actual: Record<K, V> },
}

impl<K: Datum, V: Datum> fmt::Display for OutputDiagnostic<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputDiagnostic::MissingAt { position, expected } => {
                write!(f, "Missing expected output {} at position {}.", expected, position)
            }
            OutputDiagnostic::CountMismatch { expected: 0, actual } => {
                write!(f, "Expected no outputs; got {} outputs.", actual)
            }
            OutputDiagnostic::CountMismatch { expected, actual } => {
                write!(f, "Expected {} outputs; got {} outputs.", expected, actual)
            }
            OutputDiagnostic::Unexpected { position, actual } => {
                write!(f, "Received unexpected output {} at position {}.", actual, position)
            }
        }
    }
}

/// Reconciles `captured` against `expected` under the coverage policy.
pub fn verify<K, V>(expected: &[Record<K, V>], captured: &[Record<K, V>]) -> Vec<OutputDiagnostic<K, V>>
where
    K: Clone + PartialEq,
    V: Clone + PartialEq,
{
    verify_with_policy(expected, captured, VerifyPolicy::Coverage)
}

/// Reconciles `captured` against `expected`, reporting surplus outputs when
/// `policy` is [`VerifyPolicy::Strict`].
pub fn verify_with_policy<K, V>(
    expected: &[Record<K, V>],
    captured: &[Record<K, V>],
    policy: VerifyPolicy,
) -> Vec<OutputDiagnostic<K, V>>
where
    K: Clone + PartialEq,
    V: Clone + PartialEq,
{
    if expected.is_empty() && !captured.is_empty() {
        return vec![OutputDiagnostic::CountMismatch {
            expected: 0,
            actual: captured.len(),
        }];
    }

    // (capture index, record) so strict mode can name where a surplus came from.
    let mut pool: Vec<(usize, &Record<K, V>)> = captured.iter().enumerate().collect();
    let mut diagnostics = Vec::new();

    for (position, wanted) in expected.iter().enumerate() {
        match pool.iter().position(|(_, candidate)| *candidate == wanted) {
            Some(found) => {
                pool.remove(found);
            }
            None => diagnostics.push(OutputDiagnostic::MissingAt {
                position,
                expected: wanted.clone(),
            }),
        }
    }

    if policy == VerifyPolicy::Strict {
        diagnostics.extend(pool.into_iter().map(|(position, actual)| {
            OutputDiagnostic::Unexpected {
                position,
                actual: actual.clone(),
            }
        }));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(k: &'static str, v: &'static str) -> Record<&'static str, &'static str> {
        Record::new(k, v)
    }

    #[test]
    fn both_empty_is_clean() {
        let none: Vec<Record<&str, &str>> = vec![];
        assert!(verify(&none, &none).is_empty());
    }

    #[test]
    fn outputs_without_expectations_give_single_count_mismatch() {
        let captured = vec![rec("a", "1"), rec("b", "2"), rec("c", "3")];
        let diagnostics = verify(&[], &captured);
        assert_eq!(
            diagnostics,
            vec![OutputDiagnostic::CountMismatch { expected: 0, actual: 3 }]
        );
        assert_eq!(diagnostics[0].to_string(), "Expected no outputs; got 3 outputs.");
    }

    #[test]
    fn count_mismatch_is_not_affected_by_strict_policy() {
        let captured = vec![rec("a", "1")];
        assert_eq!(
            verify_with_policy(&[], &captured, VerifyPolicy::Strict),
            vec![OutputDiagnostic::CountMismatch { expected: 0, actual: 1 }]
        );
    }

    #[test]
    fn matching_ignores_capture_order() {
        let expected = vec![rec("b", "2"), rec("a", "1")];
        let captured = vec![rec("a", "1"), rec("b", "2")];
        assert!(verify(&expected, &captured).is_empty());
    }

    #[test]
    fn each_output_satisfies_one_expectation() {
        let expected = vec![rec("foo", "bar"), rec("foo", "bar")];
        let captured = vec![rec("foo", "bar")];
        let diagnostics = verify(&expected, &captured);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "Missing expected output (foo, bar) at position 1."
        );
    }

    #[test]
    fn missing_reports_declaration_index() {
        let expected = vec![rec("someotherkey", "bar"), rec("foo", "bar")];
        let captured = vec![rec("foo", "bar")];
        assert_eq!(
            verify(&expected, &captured),
            vec![OutputDiagnostic::MissingAt {
                position: 0,
                expected: rec("someotherkey", "bar"),
            }]
        );
    }

    #[test]
    fn expectations_against_no_output_are_all_missing() {
        let expected = vec![rec("a", "1"), rec("b", "2")];
        let positions: Vec<usize> = verify(&expected, &[])
            .into_iter()
            .map(|d| match d {
                OutputDiagnostic::MissingAt { position, .. } => position,
                other => panic!("unexpected diagnostic {other:?}"),
            })
            .collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn surplus_outputs_tolerated_under_coverage() {
        let expected = vec![rec("a", "1")];
        let captured = vec![rec("a", "1"), rec("z", "9")];
        assert!(verify(&expected, &captured).is_empty());
    }

    #[test]
    fn strict_reports_surplus_after_missing_with_capture_index() {
        let expected = vec![rec("a", "1"), rec("q", "0")];
        let captured = vec![rec("z", "9"), rec("a", "1"), rec("y", "8")];
        let rendered: Vec<String> = verify_with_policy(&expected, &captured, VerifyPolicy::Strict)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "Missing expected output (q, 0) at position 1.",
                "Received unexpected output (z, 9) at position 0.",
                "Received unexpected output (y, 8) at position 2.",
            ]
        );
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let expected = vec![rec("a", "1"), rec("b", "2"), rec("a", "1")];
        let captured = vec![rec("a", "1"), rec("c", "3")];
        assert_eq!(verify(&expected, &captured), verify(&expected, &captured));
    }
}
