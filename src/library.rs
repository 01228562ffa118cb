//! Ready-made mappers for common record shapes.

use crate::context::{MapContext, Mapper};
use crate::errors::MapperError;
use crate::record::Datum;
use regex::Regex;

/// Configuration key holding the pattern for [`RegexMapper`].
pub const REGEX_PATTERN_KEY: &str = "mapunit.regex";
/// Configuration key selecting which capture group [`RegexMapper`] emits.
pub const REGEX_GROUP_KEY: &str = "mapunit.regex.group";

/// Names accepted by [`LibraryMapper::from_name`].
pub const LIBRARY_MAPPERS: &[&str] = &["identity", "inverse", "token_counter", "regex"];

/// Emits its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl<K, V> Mapper<K, V, K, V> for IdentityMapper {
    fn map(&mut self, key: K, value: V, ctx: &mut MapContext<K, V>) -> Result<(), MapperError> {
        ctx.emit(key, value);
        Ok(())
    }
}

/// Swaps key and value.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseMapper;

impl<K, V> Mapper<K, V, V, K> for InverseMapper {
    fn map(&mut self, key: K, value: V, ctx: &mut MapContext<V, K>) -> Result<(), MapperError> {
        ctx.emit(value, key);
        Ok(())
    }
}

/// Emits `(token, 1)` for every whitespace-separated token of the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounterMapper;

impl<K, V: Datum> Mapper<K, V, String, u64> for TokenCounterMapper {
    fn map(&mut self, _key: K, value: V, ctx: &mut MapContext<String, u64>) -> Result<(), MapperError> {
        for token in value.rendered().split_whitespace() {
            ctx.emit(token.to_string(), 1);
        }
        Ok(())
    }
}

/// Emits `(match, 1)` for every match of a configured pattern in the value.
///
/// The pattern is read from [`REGEX_PATTERN_KEY`] during setup; the emitted
/// capture group from [`REGEX_GROUP_KEY`] (default `0`, the whole match).
#[derive(Debug, Clone, Default)]
pub struct RegexMapper {
    pattern: Option<Regex>,
    group: usize,
}

impl RegexMapper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V: Datum> Mapper<K, V, String, u64> for RegexMapper {
    fn setup(&mut self, ctx: &mut MapContext<String, u64>) -> Result<(), MapperError> {
        let conf = ctx.configuration();
        let pattern = conf
            .get(REGEX_PATTERN_KEY)
            .ok_or_else(|| format!("missing configuration '{REGEX_PATTERN_KEY}'"))?;
        self.pattern = Some(Regex::new(pattern)?);
        self.group = conf
            .get_or(REGEX_GROUP_KEY, "0")
            .trim()
            .parse()
            .map_err(|e| format!("invalid '{REGEX_GROUP_KEY}': {e}"))?;
        Ok(())
    }

    fn map(&mut self, _key: K, value: V, ctx: &mut MapContext<String, u64>) -> Result<(), MapperError> {
        let pattern = self
            .pattern
            .as_ref()
            .ok_or("regex mapper used before setup")?;
        let text = value.rendered();
        for captures in pattern.captures_iter(&text) {
            if let Some(m) = captures.get(self.group) {
                ctx.emit(m.as_str().to_string(), 1);
            }
        }
        Ok(())
    }
}

/// A library mapper chosen by name, e.g. from a suite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryMapper {
    Identity,
    Inverse,
    TokenCounter,
    Regex,
}

impl LibraryMapper {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(Self::Identity),
            "inverse" => Some(Self::Inverse),
            "token_counter" => Some(Self::TokenCounter),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Inverse => "inverse",
            Self::TokenCounter => "token_counter",
            Self::Regex => "regex",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Identity => "emits the input record unchanged",
            Self::Inverse => "emits (value, key)",
            Self::TokenCounter => "emits (token, 1) for each whitespace-separated token of the value",
            Self::Regex => "emits (match, 1) for each match of 'mapunit.regex' in the value",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use crate::record::Record;

    #[test]
    fn token_counter_splits_on_whitespace() {
        let mut ctx = MapContext::new(Configuration::new());
        TokenCounterMapper
            .map((), "a  b\ta".to_string(), &mut ctx)
            .unwrap();
        assert_eq!(
            ctx.into_outputs(),
            vec![
                Record::new("a".to_string(), 1),
                Record::new("b".to_string(), 1),
                Record::new("a".to_string(), 1),
            ]
        );
    }

    #[test]
    fn regex_mapper_requires_pattern() {
        let mut ctx = MapContext::new(Configuration::new());
        let err = Mapper::<(), String, String, u64>::setup(&mut RegexMapper::new(), &mut ctx)
            .unwrap_err();
        assert!(err.to_string().contains(REGEX_PATTERN_KEY));
    }

    #[test]
    fn regex_mapper_emits_selected_group() {
        let conf: Configuration = [(REGEX_PATTERN_KEY, r"(\w+)@example"), (REGEX_GROUP_KEY, "1")]
            .into_iter()
            .collect();
        let mut ctx = MapContext::new(conf);
        let mut mapper = RegexMapper::new();
        Mapper::<(), String, String, u64>::setup(&mut mapper, &mut ctx).unwrap();
        mapper
            .map((), "ann@example bob@example".to_string(), &mut ctx)
            .unwrap();
        assert_eq!(
            ctx.into_outputs(),
            vec![Record::new("ann".to_string(), 1), Record::new("bob".to_string(), 1)]
        );
    }

    #[test]
    fn every_listed_name_resolves() {
        for name in LIBRARY_MAPPERS {
            assert_eq!(LibraryMapper::from_name(name).map(|m| m.name()), Some(*name));
        }
        assert!(LibraryMapper::from_name("sorter").is_none());
    }
}
