//! Bulk editing of a binding stack.
//!
//! These operations look at or rewrite the whole binding history rather than
//! the active value of one key:
//!
//! - [`BindingStack::snapshot`] and [`BindingStack::values_for`] copy bindings out
//! - [`BindingStack::replace_all`] swaps in a new history, all or nothing
//! - [`BindingStack::replace_for_key`] rewrites the layers of one key in place
//!
//! Inputs are accepted through the [`BindingPair`] and [`BindingSequence`]
//! traits. Typed inputs (tuples, `Vec`, slices) can never be malformed; a
//! [`Value`] can, and is checked before anything is mutated.

use crate::binding::Binding;
use crate::error::{BindingError, BindingResult};
use crate::stack::BindingStack;
use crate::value::Value;

// ============================================================================
// Input traits
// ============================================================================

/// Something that may be interpreted as a `(key, value)` pair.
pub trait BindingPair<K, V> {
    /// Copy out the pair, or describe what was received instead.
    fn to_pair(&self) -> Result<(K, V), String>;
}

impl<K: Clone, V: Clone> BindingPair<K, V> for (K, V) {
    fn to_pair(&self) -> Result<(K, V), String> {
        Ok(self.clone())
    }
}

impl<K: Clone, V: Clone> BindingPair<K, V> for Binding<K, V> {
    fn to_pair(&self) -> Result<(K, V), String> {
        Ok((self.key.clone(), self.value.clone()))
    }
}

impl BindingPair<Value, Value> for Value {
    fn to_pair(&self) -> Result<(Value, Value), String> {
        self.as_pair()
            .map(|(k, v)| (k.clone(), v.clone()))
            .ok_or_else(|| self.to_string())
    }
}

/// Something that may be interpreted as an ordered sequence of values.
pub trait BindingSequence<V> {
    /// Copy out the values, or name the type that was received instead.
    fn to_values(&self) -> Result<Vec<V>, String>;
}

impl<V: Clone> BindingSequence<V> for [V] {
    fn to_values(&self) -> Result<Vec<V>, String> {
        Ok(self.to_vec())
    }
}

impl<V: Clone> BindingSequence<V> for Vec<V> {
    fn to_values(&self) -> Result<Vec<V>, String> {
        Ok(self.clone())
    }
}

impl<V: Clone, const N: usize> BindingSequence<V> for [V; N] {
    fn to_values(&self) -> Result<Vec<V>, String> {
        Ok(self.to_vec())
    }
}

impl BindingSequence<Value> for Value {
    fn to_values(&self) -> Result<Vec<Value>, String> {
        self.as_list()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| self.type_name().to_string())
    }
}

// ============================================================================
// Bulk operations
// ============================================================================

impl<K: Clone, V: Clone> BindingStack<K, V> {
    /// Copy of every binding as `(key, value)`, oldest first.
    ///
    /// Mutating the result does not affect the stack.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.entries
            .iter()
            .map(|b| (b.key.clone(), b.value.clone()))
            .collect()
    }
}

impl<K: PartialEq, V: Clone> BindingStack<K, V> {
    /// Every value bound to `key`, oldest first. Empty if `key` is unbound.
    pub fn values_for(&self, key: &K) -> Vec<V> {
        self.entries
            .iter()
            .filter(|b| b.key == *key)
            .map(|b| b.value.clone())
            .collect()
    }
}

impl<K, V> BindingStack<K, V> {
    /// Replace the whole binding history with `pairs`.
    ///
    /// Every element is validated before the stack is touched: on the first
    /// element that is not a pair the call fails with `MalformedPair` and the
    /// stack is left exactly as it was.
    pub fn replace_all<P: BindingPair<K, V>>(&mut self, pairs: &[P]) -> BindingResult<()> {
        let entries = pairs
            .iter()
            .enumerate()
            .map(|(index, pair)| {
                pair.to_pair()
                    .map(Binding::from)
                    .map_err(|received| BindingError::MalformedPair { index, received })
            })
            .collect::<BindingResult<Vec<_>>>()?;

        tracing::trace!(
            old_len = self.entries.len(),
            new_len = entries.len(),
            "replacing binding history"
        );
        self.entries = entries;
        Ok(())
    }
}

impl<K: PartialEq + Clone, V> BindingStack<K, V> {
    /// Rewrite the layers of `key`.
    ///
    /// The i-th existing binding of `key` (oldest first) takes `values[i]`.
    /// Existing bindings beyond `values.len()` are removed; values beyond the
    /// number of existing bindings are appended at the end of the stack.
    /// Bindings of other keys keep their relative order.
    ///
    /// Returns the values now bound to `key`, oldest first. Fails with
    /// `InvalidSequence`, leaving the stack untouched, if `values` is not a
    /// sequence.
    pub fn replace_for_key<S>(&mut self, key: &K, values: &S) -> BindingResult<Vec<V>>
    where
        S: BindingSequence<V> + ?Sized,
        V: Clone,
    {
        let values = values
            .to_values()
            .map_err(|received| BindingError::InvalidSequence { received })?;
        let wanted = values.len();
        let mut pending = values.clone().into_iter();
        let mut matched = 0usize;

        let old = std::mem::take(&mut self.entries);
        self.entries.reserve(old.len().max(wanted));
        for mut binding in old {
            if binding.key == *key {
                match pending.next() {
                    Some(value) => binding.value = value,
                    None => continue,
                }
                matched += 1;
            }
            self.entries.push(binding);
        }
        for value in pending {
            self.entries.push(Binding::new(key.clone(), value));
        }

        tracing::trace!(
            replaced = matched,
            appended = wanted.saturating_sub(matched),
            "replaced bindings for key"
        );
        Ok(values)
    }
}
