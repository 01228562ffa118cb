//! YAML-described mapper test suites.
//!
//! Suites let a set of library mappers be exercised without writing Rust.
//! Each file under the suite root holds a list of cases:
//!
//! ```yaml
//! - name: "identity echoes input"
//!   mapper: identity
//!   input: [foo, bar]            # optional; omitted means (null, null)
//!   configuration:               # optional
//!     mapunit.regex: "[a-z]+"
//!   expected:
//!     - [foo, bar]
//!   strict: false                # optional, reports surplus outputs
//!   skip: false                  # optional
//!   only: false                  # optional
//! ```
//!
//! Keys and values are compared in their rendered text form, so `1` and
//! `"1"` are the same expectation and `~` stands for `null`. The same
//! comparison means the string `"null"` is indistinguishable from `~`, and a
//! float such as `1.0` renders as `1.0` and never matches an integer `1`.

use crate::configuration::Configuration;
use crate::context::Mapper;
use crate::driver::MapDriver;
use crate::errors::HarnessError;
use crate::library::{IdentityMapper, InverseMapper, LibraryMapper, RegexMapper, TokenCounterMapper};
use crate::record::{Datum, Record};
use crate::report::report;
use crate::verify::{verify_with_policy, VerifyPolicy};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Key/value type fed to library mappers by the suite runner.
pub type Text = Option<String>;

// =============================================================================
// CORE TYPES
// =============================================================================

/// A single suite case as written in YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteCase {
    pub name: String,
    pub mapper: String,
    #[serde(default)]
    pub input: Option<(YamlValue, YamlValue)>,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub expected: Vec<(YamlValue, YamlValue)>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub only: bool,
}

/// The result of one suite case.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseOutcome {
    Pass {
        file: String,
        name: String,
    },
    Fail {
        file: String,
        name: String,
        error: String,
        expected: Vec<String>,
        captured: Vec<String>,
    },
    Skipped {
        file: String,
        name: String,
        reason: String,
    },
}

impl CaseOutcome {
    pub fn name(&self) -> &str {
        match self {
            CaseOutcome::Pass { name, .. }
            | CaseOutcome::Fail { name, .. }
            | CaseOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Fail { .. })
    }
}

/// Totals plus per-case outcomes for a whole suite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<CaseOutcome>,
}

impl SuiteSummary {
    pub fn from_results(results: Vec<CaseOutcome>) -> Self {
        let passed = results
            .iter()
            .filter(|r| matches!(r, CaseOutcome::Pass { .. }))
            .count();
        let failed = results.iter().filter(|r| r.is_failure()).count();
        let skipped = results
            .iter()
            .filter(|r| matches!(r, CaseOutcome::Skipped { .. }))
            .count();
        Self {
            total: results.len(),
            passed,
            failed,
            skipped,
            results,
        }
    }
}

/// Settings for discovering and running suites.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub root: PathBuf,
    /// Case-insensitive substring a case name must contain to run.
    pub filter: Option<String>,
    /// Allow coloured output; each stream is still coloured only when it is
    /// a terminal.
    pub use_colors: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tests/suites"),
            filter: None,
            use_colors: true,
        }
    }
}

/// Failures that prevent a suite file or case from being run at all.
#[derive(Debug, Error, Diagnostic)]
pub enum SuiteError {
    #[error("cannot read suite root '{path}'")]
    #[diagnostic(
        code(mapunit::suite::root),
        help("pass an existing directory of `.yaml`/`.yml` suite files")
    )]
    Root {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read suite file '{path}'")]
    #[diagnostic(code(mapunit::suite::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suite file '{path}'")]
    #[diagnostic(
        code(mapunit::suite::yaml),
        help("a suite file is a YAML list of cases with `name`, `mapper`, and `expected`")
    )]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown mapper '{name}'")]
    #[diagnostic(
        code(mapunit::suite::unknown_mapper),
        help("run `mapunit mappers` to list the available mappers")
    )]
    UnknownMapper { name: String },

    #[error("invalid {field} in case '{case}': only scalars and null are allowed")]
    #[diagnostic(code(mapunit::suite::invalid_field))]
    InvalidField { case: String, field: &'static str },
}

// =============================================================================
// DISCOVERY AND LOADING
// =============================================================================

/// Finds every `.yaml`/`.yml` file under `root`, in a stable order.
///
/// A missing or unreadable root, or any unreadable entry below it, is an
/// error rather than an empty result.
pub fn discover_suite_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, SuiteError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| SuiteError::Root {
            path: root.display().to_string(),
            source,
        })?;
        let is_suite = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
        if is_suite {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn parse_suite(path: &str, text: &str) -> Result<Vec<SuiteCase>, SuiteError> {
    serde_yaml::from_str(text).map_err(|source| SuiteError::Yaml {
        path: path.to_string(),
        source,
    })
}

pub fn load_suite(path: &Path) -> Result<Vec<SuiteCase>, SuiteError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| SuiteError::Io {
        path: display.clone(),
        source,
    })?;
    parse_suite(&display, &text)
}

/// Why a case should not run, if it should not.
pub fn skip_reason(case: &SuiteCase, has_only: bool, filter: Option<&str>) -> Option<String> {
    if has_only && !case.only {
        return Some("Not marked 'only' in 'only' mode".to_string());
    }
    if case.skip {
        return Some("Marked 'skip'".to_string());
    }
    if let Some(f) = filter {
        if !case.name.to_lowercase().contains(&f.to_lowercase()) {
            return Some(format!("Filtered out by substring: {}", f));
        }
    }
    None
}

// =============================================================================
// CASE EXECUTION
// =============================================================================

/// A case with its fields converted to harness records.
struct PreparedCase {
    mapper: LibraryMapper,
    input: Option<Record<Text, Text>>,
    expected: Vec<Record<String, String>>,
    configuration: Configuration,
    policy: VerifyPolicy,
}

fn scalar(value: &YamlValue, case: &str, field: &'static str) -> Result<Text, SuiteError> {
    match value {
        YamlValue::Null => Ok(None),
        YamlValue::Bool(b) => Ok(Some(b.to_string())),
        YamlValue::Number(n) => Ok(Some(n.to_string())),
        YamlValue::String(s) => Ok(Some(s.clone())),
        _ => Err(SuiteError::InvalidField {
            case: case.to_string(),
            field,
        }),
    }
}

fn prepare(case: &SuiteCase) -> Result<PreparedCase, SuiteError> {
    let mapper = LibraryMapper::from_name(&case.mapper).ok_or_else(|| SuiteError::UnknownMapper {
        name: case.mapper.clone(),
    })?;
    let input = case
        .input
        .as_ref()
        .map(|(k, v)| -> Result<_, SuiteError> {
            Ok(Record::new(scalar(k, &case.name, "input")?, scalar(v, &case.name, "input")?))
        })
        .transpose()?;
    let expected = case
        .expected
        .iter()
        .map(|(k, v)| -> Result<_, SuiteError> {
            let record: Record<Text, Text> = Record::new(
                scalar(k, &case.name, "expected output")?,
                scalar(v, &case.name, "expected output")?,
            );
            Ok(record.to_rendered())
        })
        .collect::<Result<Vec<_>, _>>()?;
    let policy = if case.strict {
        VerifyPolicy::Strict
    } else {
        VerifyPolicy::Coverage
    };
    Ok(PreparedCase {
        mapper,
        input,
        expected,
        configuration: case.configuration.clone(),
        policy,
    })
}

/// Runs `mapper` over the prepared input and returns its output in text form.
fn capture<K2, V2, M>(mapper: M, prepared: &PreparedCase) -> Result<Vec<Record<String, String>>, HarnessError>
where
    K2: Datum,
    V2: Datum,
    M: Mapper<Text, Text, K2, V2> + 'static,
{
    let mut driver: MapDriver<Text, Text, K2, V2> = MapDriver::for_mapper(mapper)
        .with_configuration(prepared.configuration.clone());
    if let Some(input) = &prepared.input {
        driver.set_input(Some(input.clone()))?;
    }
    Ok(driver.run()?.iter().map(Record::to_rendered).collect())
}

fn render_all(records: &[Record<String, String>]) -> Vec<String> {
    records.iter().map(ToString::to_string).collect()
}

/// Executes one case and classifies the result.
pub fn run_case(file: &str, case: &SuiteCase) -> CaseOutcome {
    let fail = |error: String, expected: Vec<String>, captured: Vec<String>| CaseOutcome::Fail {
        file: file.to_string(),
        name: case.name.clone(),
        error,
        expected,
        captured,
    };

    let prepared = match prepare(case) {
        Ok(prepared) => prepared,
        Err(e) => return fail(e.to_string(), Vec::new(), Vec::new()),
    };
    let expected = render_all(&prepared.expected);

    let captured = match prepared.mapper {
        LibraryMapper::Identity => capture(IdentityMapper, &prepared),
        LibraryMapper::Inverse => capture(InverseMapper, &prepared),
        LibraryMapper::TokenCounter => capture(TokenCounterMapper, &prepared),
        LibraryMapper::Regex => capture(RegexMapper::new(), &prepared),
    };
    let captured = match captured {
        Ok(captured) => captured,
        Err(e) => return fail(e.to_string(), expected, Vec::new()),
    };

    let diagnostics = verify_with_policy(&prepared.expected, &captured, prepared.policy);
    debug!(case = %case.name, diagnostics = diagnostics.len(), "suite case verified");
    match report(&diagnostics) {
        Ok(()) => CaseOutcome::Pass {
            file: file.to_string(),
            name: case.name.clone(),
        },
        Err(e) => fail(e.to_string(), expected, render_all(&captured)),
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Discovers, filters, and runs every case under `config.root`.
///
/// A file that cannot be loaded counts as one failed case named after the file.
/// A root that cannot be walked fails the whole run.
pub fn run_suites(config: &SuiteConfig) -> Result<SuiteSummary, SuiteError> {
    let files = discover_suite_files(&config.root)?;
    info!(files = files.len(), root = %config.root.display(), "discovered suite files");

    let mut results = Vec::new();
    let mut cases = Vec::new();
    for path in &files {
        let file = path.display().to_string();
        match load_suite(path) {
            Ok(loaded) => cases.extend(loaded.into_iter().map(|case| (file.clone(), case))),
            Err(e) => results.push(CaseOutcome::Fail {
                file: file.clone(),
                name: file,
                error: format!("{e}: {}", source_text(&e)),
                expected: Vec::new(),
                captured: Vec::new(),
            }),
        }
    }

    let has_only = cases.iter().any(|(_, case)| case.only);
    for (file, case) in cases {
        let outcome = match skip_reason(&case, has_only, config.filter.as_deref()) {
            Some(reason) => CaseOutcome::Skipped {
                file,
                name: case.name,
                reason,
            },
            None => run_case(&file, &case),
        };
        results.push(outcome);
    }

    Ok(SuiteSummary::from_results(results))
}

fn source_text(err: &SuiteError) -> String {
    std::error::Error::source(err)
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
- name: identity echoes input
  mapper: identity
  input: [foo, bar]
  expected:
    - [foo, bar]
- name: default input is null
  mapper: identity
  expected:
    - [~, ~]
- name: tokens
  mapper: token_counter
  input: [line, "to be or not to be"]
  expected:
    - [to, 1]
    - [be, 1]
    - [or, 1]
"#;

    fn cases() -> Vec<SuiteCase> {
        parse_suite("inline.yaml", SUITE).unwrap()
    }

    #[test]
    fn parses_cases_with_defaults() {
        let cases = cases();
        assert_eq!(cases.len(), 3);
        assert!(cases[1].input.is_none());
        assert!(!cases[0].strict && !cases[0].skip && !cases[0].only);
    }

    #[test]
    fn passing_cases_pass() {
        for case in cases() {
            let outcome = run_case("inline.yaml", &case);
            assert!(matches!(outcome, CaseOutcome::Pass { .. }), "{outcome:?}");
        }
    }

    #[test]
    fn strict_case_reports_surplus_tokens() {
        let mut case = cases().remove(2);
        case.strict = true;
        match run_case("inline.yaml", &case) {
            CaseOutcome::Fail { error, captured, .. } => {
                assert!(error.starts_with("3 Error(s): (Received unexpected output (not, 1) at position 3."));
                assert_eq!(captured.len(), 6);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mapper_fails_case() {
        let mut case = cases().remove(0);
        case.mapper = "sorter".to_string();
        match run_case("inline.yaml", &case) {
            CaseOutcome::Fail { error, .. } => assert_eq!(error, "unknown mapper 'sorter'"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn rendered_comparison_limits() {
        let suite = r#"
- name: quoted null matches null
  mapper: identity
  expected:
    - ["null", ~]
- name: float never matches integer count
  mapper: token_counter
  input: [k, word]
  expected:
    - [word, 1.0]
"#;
        let cases = parse_suite("limits.yaml", suite).unwrap();
        assert!(matches!(run_case("limits.yaml", &cases[0]), CaseOutcome::Pass { .. }));
        match run_case("limits.yaml", &cases[1]) {
            CaseOutcome::Fail { error, .. } => assert_eq!(
                error,
                "1 Error(s): (Missing expected output (word, 1.0) at position 0.)"
            ),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_is_an_error() {
        match discover_suite_files("tests/no-such-dir") {
            Err(SuiteError::Root { path, .. }) => assert_eq!(path, "tests/no-such-dir"),
            other => panic!("expected root error, got {other:?}"),
        }
    }

    #[test]
    fn only_mode_skips_unmarked_cases() {
        let mut case = cases().remove(0);
        assert!(skip_reason(&case, true, None).is_some());
        case.only = true;
        assert!(skip_reason(&case, true, None).is_none());
        assert!(skip_reason(&case, false, Some("TOKENS")).is_some());
        assert!(skip_reason(&case, false, Some("Identity")).is_none());
    }
}
