//! Handles all user-facing output for the CLI.
//!
//! Suite results are written to stdout, failure details to stderr. Colour is
//! applied through `termcolor` so it degrades cleanly on terminals without
//! ANSI support.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::library::{LibraryMapper, LIBRARY_MAPPERS};
use crate::suite::{CaseOutcome, SuiteSummary};

/// `ColorChoice::Auto` does not check for a terminal, so that is done here
/// per stream.
fn choice(use_colors: bool, stream: atty::Stream) -> ColorChoice {
    stream_choice(use_colors, atty::is(stream))
}

fn stream_choice(use_colors: bool, is_tty: bool) -> ColorChoice {
    if use_colors && is_tty {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn write_tag(stream: &mut StandardStream, tag: &str, color: Color) -> io::Result<()> {
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "{tag}")?;
    stream.reset()
}

// ============================================================================
// SUITE RESULTS
// ============================================================================

/// Prints one line per case, failure details, and a closing summary.
pub fn print_summary(summary: &SuiteSummary, use_colors: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice(use_colors, atty::Stream::Stdout));
    let mut stderr = StandardStream::stderr(choice(use_colors, atty::Stream::Stderr));

    for outcome in &summary.results {
        match outcome {
            CaseOutcome::Pass { file, name } => {
                write_tag(&mut stdout, "PASS", Color::Green)?;
                writeln!(stdout, ": {name} [{file}]")?;
            }
            CaseOutcome::Skipped { file, name, reason } => {
                write_tag(&mut stdout, "SKIP", Color::Yellow)?;
                writeln!(stdout, ": {name} [{file}] ({reason})")?;
            }
            CaseOutcome::Fail { .. } => print_failure(&mut stderr, outcome)?,
        }
    }

    writeln!(stdout)?;
    write!(stdout, "Test summary: total {}, ", summary.total)?;
    write_tag(&mut stdout, "passed", Color::Green)?;
    write!(stdout, " {}, ", summary.passed)?;
    write_tag(&mut stdout, "failed", Color::Red)?;
    write!(stdout, " {}, ", summary.failed)?;
    write_tag(&mut stdout, "skipped", Color::Yellow)?;
    writeln!(stdout, " {}", summary.skipped)?;

    if summary.failed > 0 {
        writeln!(stderr, "\nFailed tests:")?;
        for outcome in summary.results.iter().filter(|r| r.is_failure()) {
            writeln!(stderr, "  - {}", outcome.name())?;
        }
    }
    Ok(())
}

fn print_failure(stderr: &mut StandardStream, outcome: &CaseOutcome) -> io::Result<()> {
    let CaseOutcome::Fail {
        file,
        name,
        error,
        expected,
        captured,
    } = outcome
    else {
        return Ok(());
    };
    write_tag(stderr, "FAIL", Color::Red)?;
    writeln!(stderr, ": {name} [{file}]")?;
    writeln!(stderr, "  Error: {error}")?;
    if expected.is_empty() && captured.is_empty() {
        return Ok(());
    }
    writeln!(stderr, "  Expected vs captured:")?;
    let changeset = Changeset::new(&expected.join("\n"), &captured.join("\n"), "\n");
    print_diff(stderr, &changeset.diffs)
}

fn print_diff(stream: &mut StandardStream, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(lines) => {
                stream.reset()?;
                for line in lines.lines() {
                    writeln!(stream, "     {line}")?;
                }
            }
            Difference::Rem(lines) => {
                stream.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in lines.lines() {
                    writeln!(stream, "   - {line}")?;
                }
            }
            Difference::Add(lines) => {
                stream.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in lines.lines() {
                    writeln!(stream, "   + {line}")?;
                }
            }
        }
    }
    stream.reset()
}

/// Prints the summary as pretty JSON.
pub fn print_json(summary: &SuiteSummary) -> io::Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")
}

// ============================================================================
// MAPPER LISTING
// ============================================================================

pub fn print_mappers() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for name in LIBRARY_MAPPERS {
        if let Some(mapper) = LibraryMapper::from_name(name) {
            writeln!(stdout, "{:<14} {}", mapper.name(), mapper.describe())?;
        }
    }
    Ok(())
}
