//! Key/value records and the rendering contract for their fields.
//!
//! A [`Record`] is the unit of data flowing in and out of a mapper. Records
//! compare structurally and render as `(key, value)` in diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// DATUM - Rendering contract for keys and values
// ============================================================================

/// A key or value type the harness can carry and render in diagnostics.
///
/// Rendering is plain: text renders without quotes, numbers in their usual
/// decimal form, and an absent `Option` renders as `null`.
pub trait Datum: Clone + PartialEq + fmt::Debug {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Renders into an owned string.
    fn rendered(&self) -> String {
        DatumDisplay(self).to_string()
    }
}

/// Adapter that lets any [`Datum`] be used where `Display` is expected.
pub struct DatumDisplay<'a, T: ?Sized>(pub &'a T);

impl<T: Datum + ?Sized> fmt::Display for DatumDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f)
    }
}

/// Implements [`Datum`] for types whose `Display` output is already the
/// desired rendering.
#[macro_export]
macro_rules! impl_datum_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::record::Datum for $ty {
                fn render(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

impl_datum_via_display!(
    String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Datum for &str {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// The unit type stands in for a field that carries no data.
impl Datum for () {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(null)")
    }
}

impl<T: Datum> Datum for Option<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(inner) => inner.render(f),
            None => f.write_str("null"),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// An immutable key/value pair compared by structural equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Record<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: Default, V: Default> Record<K, V> {
    /// The record fed to a mapper when no input was provisioned.
    ///
    /// For `Option` fields this is `(null, null)`.
    pub fn sentinel() -> Self {
        Self::new(K::default(), V::default())
    }
}

impl<K: Datum, V: Datum> Record<K, V> {
    /// Converts both fields to their rendered text.
    pub fn to_rendered(&self) -> Record<String, String> {
        Record::new(self.key.rendered(), self.value.rendered())
    }
}

impl<K, V> From<(K, V)> for Record<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl<K: Datum, V: Datum> fmt::Display for Record<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", DatumDisplay(&self.key), DatumDisplay(&self.value))
    }
}
