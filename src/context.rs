use crate::configuration::Configuration;
use crate::errors::MapperError;
use crate::record::Record;

/// The per-invocation services a mapper sees: an output collector and a
/// read-only view of the configuration.
///
/// A context is created fresh for every run and consumed once the mapper
/// returns, so captured output never leaks between invocations.
#[derive(Debug)]
pub struct MapContext<K, V> {
    configuration: Configuration,
    outputs: Vec<Record<K, V>>,
}

impl<K, V> MapContext<K, V> {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            outputs: Vec::new(),
        }
    }

    /// Append one output record.
    pub fn emit(&mut self, key: K, value: V) {
        self.outputs.push(Record::new(key, value));
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Number of records emitted so far.
    pub fn emitted(&self) -> usize {
        self.outputs.len()
    }

    pub fn into_outputs(self) -> Vec<Record<K, V>> {
        self.outputs
    }
}

/// A single-record transformation under test.
///
/// `setup` runs before `map` and `cleanup` after it; both default to doing
/// nothing. Errors returned from any phase propagate out of the harness.
pub trait Mapper<K1, V1, K2, V2> {
    fn setup(&mut self, _ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        Ok(())
    }

    fn map(&mut self, key: K1, value: V1, ctx: &mut MapContext<K2, V2>)
        -> Result<(), MapperError>;

    fn cleanup(&mut self, _ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        Ok(())
    }
}

impl<K1, V1, K2, V2, M> Mapper<K1, V1, K2, V2> for Box<M>
where
    M: Mapper<K1, V1, K2, V2> + ?Sized,
{
    fn setup(&mut self, ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        (**self).setup(ctx)
    }

    fn map(&mut self, key: K1, value: V1, ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        (**self).map(key, value, ctx)
    }

    fn cleanup(&mut self, ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        (**self).cleanup(ctx)
    }
}

/// Adapts a closure into a [`Mapper`] with no setup or cleanup.
pub struct FnMapper<F>(F);

/// Wraps `f` as a mapper.
pub fn from_fn<K1, V1, K2, V2, F>(f: F) -> FnMapper<F>
where
    F: FnMut(K1, V1, &mut MapContext<K2, V2>) -> Result<(), MapperError>,
{
    FnMapper(f)
}

impl<K1, V1, K2, V2, F> Mapper<K1, V1, K2, V2> for FnMapper<F>
where
    F: FnMut(K1, V1, &mut MapContext<K2, V2>) -> Result<(), MapperError>,
{
    fn map(&mut self, key: K1, value: V1, ctx: &mut MapContext<K2, V2>) -> Result<(), MapperError> {
        (self.0)(key, value, ctx)
    }
}
