//! Variable-style access to the active value of each key.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::BindingResult;
use crate::store::BindingStore;

/// Read and write active values by key.
///
/// Implemented for every [`BindingStore`]; the values reported are whatever
/// the store considers current, which for a host-mirroring store is the live
/// host value rather than the recorded one.
pub trait VariableAccessor<K, V>: BindingStore<K, V> {
    /// The active value of `key`. Fails with `UnboundVariable` if unbound.
    fn get_variable(&self, key: &K) -> BindingResult<V> {
        self.read(key)
    }

    /// Overwrite the active value of `key`. Fails with `UnboundVariable` if
    /// unbound.
    fn set_variable(&mut self, key: &K, value: V) -> BindingResult<V> {
        self.write(key, value)
    }

    /// One entry per distinct bound key, mapped to its active value.
    fn all_variables(&self) -> BindingResult<FxHashMap<K, V>>
    where
        K: Eq + Hash + Clone,
    {
        let keys = self.bindings().keys();
        let mut variables = FxHashMap::default();
        variables.reserve(keys.len());
        for key in keys {
            let value = self.read(&key)?;
            variables.insert(key, value);
        }
        Ok(variables)
    }

    /// Assign each `(key, value)` in iteration order.
    ///
    /// Not atomic: on the first unbound key the error is returned and every
    /// assignment made before it stays in effect.
    fn set_variables<I>(&mut self, entries: I) -> BindingResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.set_variable(&key, value)?;
        }
        Ok(())
    }
}

impl<K, V, S: BindingStore<K, V> + ?Sized> VariableAccessor<K, V> for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindingError, BindingStack};

    fn xy() -> BindingStack<&'static str, i64> {
        let mut stack = BindingStack::new();
        stack
            .replace_all(&[("x", 1), ("y", 2), ("y", 3), ("x", 4)])
            .unwrap();
        stack
    }

    #[test]
    fn all_variables_collapses_to_active() {
        let vars = xy().all_variables().unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[&"x"], 4);
        assert_eq!(vars[&"y"], 3);
    }

    #[test]
    fn set_variables_from_map() {
        let mut stack = xy();
        let mut update = FxHashMap::default();
        update.insert("x", -1);
        update.insert("y", -2);
        stack.set_variables(update).unwrap();
        assert_eq!(stack.snapshot(), vec![("x", 1), ("y", 2), ("y", -2), ("x", -1)]);
    }

    #[test]
    fn set_variables_from_pairs() {
        let mut stack = xy();
        stack.set_variables(vec![("x", -1), ("y", -2)]).unwrap();
        assert_eq!(stack.snapshot(), vec![("x", 1), ("y", 2), ("y", -2), ("x", -1)]);
    }

    #[test]
    fn unmentioned_keys_keep_their_bindings() {
        let mut stack = xy();
        stack.set_variables([("y", -2)]).unwrap();
        assert_eq!(stack.snapshot(), vec![("x", 1), ("y", 2), ("y", -2), ("x", 4)]);
    }

    #[test]
    fn set_variables_is_not_atomic() {
        let mut stack = xy();
        let err = stack.set_variables(vec![("y", -2), ("z", -3)]).unwrap_err();
        assert_eq!(err, BindingError::unbound(&"z"));
        assert_eq!(stack.get_variable(&"y"), Ok(-2));
    }

    #[test]
    fn get_and_set_variable() {
        let mut stack = xy();
        assert_eq!(stack.set_variable(&"x", 9), Ok(9));
        assert_eq!(stack.get_variable(&"x"), Ok(9));
        assert!(stack.get_variable(&"z").unwrap_err().is_unbound());
    }
}
