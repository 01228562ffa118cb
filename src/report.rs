//! Aggregate reporting of verification diagnostics.

use crate::errors::HarnessError;
use crate::record::Datum;
use crate::verify::OutputDiagnostic;

/// Formats the aggregate failure message for a non-empty diagnostic list:
/// `"{n} Error(s): (first; second; ...)"`.
pub fn format_failure<K: Datum, V: Datum>(diagnostics: &[OutputDiagnostic<K, V>]) -> String {
    let details: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    format_details(&details)
}

fn format_details(details: &[String]) -> String {
    format!("{} Error(s): ({})", details.len(), details.join("; "))
}

/// Succeeds when `diagnostics` is empty, otherwise raises one
/// [`HarnessError::VerificationFailure`] covering all of them.
pub fn report<K: Datum, V: Datum>(diagnostics: &[OutputDiagnostic<K, V>]) -> Result<(), HarnessError> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    let message = format_details(&details);
    tracing::debug!(count = details.len(), "verification failed");
    Err(HarnessError::VerificationFailure { message, details })
}
