//! Literal values and the constant pool.

use core::{fmt, iter::Enumerate, slice};

use crate::{growth::GrowBuf, ChunkResult, GrowthStats};

/// Values that can live in the constant pool.
///
/// Numbers are the only payload the compiler emits today; the other kinds share
/// the same indexing contract.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `nil`.
    #[default]
    Nil,
    /// Boolean literal.
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    /// String literal (also used for global names).
    Str(String),
}

impl Value {
    /// Numeric payload, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short kind name for diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

/// Renders the way Lox prints values: `nil`, `true`, `100`, `3.33`, raw text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<()> for Value { fn from((): ()) -> Self { Value::Nil } }
impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Number(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::Str(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::Str(v.to_owned()) } }

/// Constant pool with stable indices (0-based, dense, append order).
#[derive(Debug, Clone)]
pub struct ValuePool {
    values: GrowBuf<Value>,
}

impl Default for ValuePool {
    fn default() -> Self { Self::new() }
}

impl ValuePool {
    /// Create an empty pool.
    pub const fn new() -> Self { Self { values: GrowBuf::new("constants") } }

    /// Number of stored constants.
    pub fn len(&self) -> usize { self.values.len() }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool { self.values.len() == 0 }

    /// Allocated slots.
    pub fn capacity(&self) -> usize { self.values.capacity() }

    /// Growth counters of the backing storage.
    pub fn growth_stats(&self) -> GrowthStats { self.values.stats() }

    /// Stores `value` in the next free slot and returns its index.
    ///
    /// Fails only with [`ChunkError::OutOfCapacity`](crate::ChunkError::OutOfCapacity);
    /// the pool is unchanged in that case.
    pub fn append(&mut self, value: Value) -> ChunkResult<usize> {
        let index = self.values.push(value)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(index, "constant added");
        Ok(index)
    }

    #[cfg(test)]
    pub(crate) fn fail_next_reservation(&mut self) { self.values.fail_next_reservation(); }

    /// Constant at `index`, or `IndexOutOfRange`.
    pub fn get(&self, index: usize) -> ChunkResult<&Value> { self.values.get(index) }

    /// All constants in index order.
    pub fn as_slice(&self) -> &[Value] { self.values.as_slice() }

    /// Iterate as `(index, &Value)`.
    pub fn iter(&self) -> ValueIter<'_> { ValueIter { inner: self.values.as_slice().iter().enumerate() } }

    /// Frees the backing storage.
    pub fn release(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(constants = self.len(), "value pool released");
    }
}

/// Iterator returned by [`ValuePool::iter`].
#[derive(Debug, Clone)]
pub struct ValueIter<'a> {
    inner: Enumerate<slice::Iter<'a, Value>>,
}

impl<'a> Iterator for ValueIter<'a> {
    type Item = (usize, &'a Value);

    fn next(&mut self) -> Option<Self::Item> { self.inner.next() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.inner.size_hint() }
}

impl ExactSizeIterator for ValueIter<'_> {}

impl<'a> IntoIterator for &'a ValuePool {
    type Item = (usize, &'a Value);
    type IntoIter = ValueIter<'a>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
