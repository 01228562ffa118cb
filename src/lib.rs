//! mapunit: a unit-testing harness for single-record key/value mappers.
//!
//! A [`MapDriver`] feeds one input record to a [`Mapper`], captures every
//! record it emits, and checks the captured output against the expected
//! records, reporting every discrepancy in a single failure.

pub use crate::configuration::Configuration;
pub use crate::context::{from_fn, FnMapper, MapContext, Mapper};
pub use crate::driver::MapDriver;
pub use crate::errors::{HarnessError, MapperError, MapperPhase};
pub use crate::record::{Datum, Record};
pub use crate::verify::{verify, verify_with_policy, OutputDiagnostic, VerifyPolicy};

pub mod cli;
pub mod configuration;
pub mod context;
pub mod driver;
pub mod errors;
pub mod library;
pub mod record;
pub mod report;
pub mod suite;
pub mod verify;
