//! The map driver: provisions one input record, runs a mapper against it,
//! and checks what it emitted.
//!
//! # Example
//!
//! ```rust
//! use mapunit::{library::IdentityMapper, MapDriver};
//!
//! let mut driver: MapDriver<String, String, String, String> =
//!     MapDriver::for_mapper(IdentityMapper)
//!         .with_input("foo".to_string(), "bar".to_string())
//!         .with_output("foo".to_string(), "bar".to_string());
//! driver.run_test().unwrap();
//! ```

use crate::configuration::Configuration;
use crate::context::{MapContext, Mapper};
use crate::errors::{HarnessError, MapperPhase};
use crate::record::{Datum, Record};
use crate::report::report;
use crate::verify::{verify_with_policy, VerifyPolicy};
use tracing::{debug, trace};

type BoxedMapper<K1, V1, K2, V2> = Box<dyn Mapper<K1, V1, K2, V2>>;

/// Test harness for a single mapper invocation.
///
/// Input, configuration, and expected outputs persist across calls to
/// [`run`](Self::run) and [`run_test`](Self::run_test); every call performs a
/// fresh invocation with a fresh output buffer. Expectations may still be
/// added after a run and apply to the next one; use
/// [`reset_output`](Self::reset_output) to start over.
pub struct MapDriver<K1, V1, K2, V2> {
    mapper: Option<BoxedMapper<K1, V1, K2, V2>>,
    input: Option<Record<K1, V1>>,
    expected: Vec<Record<K2, V2>>,
    configuration: Configuration,
    policy: VerifyPolicy,
}

impl<K1, V1, K2, V2> Default for MapDriver<K1, V1, K2, V2> {
    fn default() -> Self {
        Self {
            mapper: None,
            input: None,
            expected: Vec::new(),
            configuration: Configuration::new(),
            policy: VerifyPolicy::default(),
        }
    }
}

impl<K1, V1, K2, V2> MapDriver<K1, V1, K2, V2> {
    /// A driver with no mapper; running it fails until one is supplied.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_mapper<M>(mapper: M) -> Self
    where
        M: Mapper<K1, V1, K2, V2> + 'static,
    {
        Self::new().with_mapper(mapper)
    }

    // ------------------------------------------------------------------------
    // Mapper
    // ------------------------------------------------------------------------

    pub fn set_mapper<M>(&mut self, mapper: M)
    where
        M: Mapper<K1, V1, K2, V2> + 'static,
    {
        self.mapper = Some(Box::new(mapper));
    }

    pub fn with_mapper<M>(mut self, mapper: M) -> Self
    where
        M: Mapper<K1, V1, K2, V2> + 'static,
    {
        self.set_mapper(mapper);
        self
    }

    pub fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Replaces the input record. `None` is rejected and leaves the driver
    /// unchanged.
    pub fn set_input(&mut self, record: Option<Record<K1, V1>>) -> Result<(), HarnessError> {
        let record = record.ok_or_else(HarnessError::null_input)?;
        self.input = Some(record);
        Ok(())
    }

    pub fn with_input(mut self, key: K1, value: V1) -> Self {
        self.input = Some(Record::new(key, value));
        self
    }

    pub fn with_input_record(mut self, record: Record<K1, V1>) -> Self {
        self.input = Some(record);
        self
    }

    /// Forgets the input so the next run uses the sentinel record.
    pub fn clear_input(&mut self) {
        self.input = None;
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    // ------------------------------------------------------------------------
    // Expected outputs
    // ------------------------------------------------------------------------

    /// Appends an expected record. Allowed at any time, including after a run.
    pub fn add_output(&mut self, key: K2, value: V2) {
        self.expected.push(Record::new(key, value));
    }

    pub fn add_output_record(&mut self, record: Record<K2, V2>) {
        self.expected.push(record);
    }

    pub fn with_output(mut self, key: K2, value: V2) -> Self {
        self.add_output(key, value);
        self
    }

    pub fn with_all_output<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = Record<K2, V2>>,
    {
        self.expected.extend(records);
        self
    }

    pub fn expected_outputs(&self) -> &[Record<K2, V2>] {
        &self.expected
    }

    /// Drops every expected record, leaving input and configuration alone.
    pub fn reset_output(&mut self) {
        self.expected.clear();
    }

    // ------------------------------------------------------------------------
    // Configuration and policy
    // ------------------------------------------------------------------------

    pub fn set_configuration(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.configuration.set(name, value);
    }

    /// Replaces the whole configuration.
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn with_policy(mut self, policy: VerifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: VerifyPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> VerifyPolicy {
        self.policy
    }
}

impl<K1, V1, K2, V2> MapDriver<K1, V1, K2, V2>
where
    K1: Clone + Default,
    V1: Clone + Default,
{
    /// The record the next run feeds to the mapper.
    pub fn effective_input(&self) -> Record<K1, V1> {
        self.input.clone().unwrap_or_else(Record::sentinel)
    }

    pub fn input_key(&self) -> K1 {
        self.effective_input().key
    }

    pub fn input_value(&self) -> V1 {
        self.effective_input().value
    }

    /// Invokes the mapper once and returns everything it emitted, in order.
    ///
    /// Expected outputs are not consulted. Emitting nothing is not an error.
    pub fn run(&mut self) -> Result<Vec<Record<K2, V2>>, HarnessError> {
        let (key, value) = self.effective_input().into_parts();
        let mapper = self.mapper.as_mut().ok_or_else(HarnessError::no_mapper)?;

        let mut ctx = MapContext::new(self.configuration.clone());
        trace!(settings = ctx.configuration().len(), "mapper setup");
        mapper
            .setup(&mut ctx)
            .map_err(|e| HarnessError::mapper(MapperPhase::Setup, e))?;
        trace!("mapper map");
        mapper
            .map(key, value, &mut ctx)
            .map_err(|e| HarnessError::mapper(MapperPhase::Map, e))?;
        trace!("mapper cleanup");
        mapper
            .cleanup(&mut ctx)
            .map_err(|e| HarnessError::mapper(MapperPhase::Cleanup, e))?;

        let outputs = ctx.into_outputs();
        debug!(emitted = outputs.len(), "mapper run complete");
        Ok(outputs)
    }
}

impl<K1, V1, K2, V2> MapDriver<K1, V1, K2, V2>
where
    K1: Clone + Default,
    V1: Clone + Default,
    K2: Datum,
    V2: Datum,
{
    /// Runs the mapper and verifies its output against the expected records,
    /// failing once with every discrepancy found.
    pub fn run_test(&mut self) -> Result<(), HarnessError> {
        let captured = self.run()?;
        let diagnostics = verify_with_policy(&self.expected, &captured, self.policy);
        debug!(
            expected = self.expected.len(),
            captured = captured.len(),
            diagnostics = diagnostics.len(),
            "verified mapper output"
        );
        report(&diagnostics)
    }
}
