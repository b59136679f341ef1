//! The binding stack.
//!
//! `BindingStack` keeps every binding in one ordered `Vec`, in insertion
//! order. Bindings that share a key form an implicit per-key stack interleaved
//! with the bindings of other keys:
//!
//! ```text
//! push(x, 1) push(y, 2) push(y, 3) push(x, 4)
//!
//!   [(x, 1), (y, 2), (y, 3), (x, 4)]
//!     ^                        ^-- active binding for x
//!     '-- shadowed binding for x
//! ```
//!
//! `pop(x)` removes the binding closest to the end for `x` regardless of how
//! many other keys were pushed after it, so scopes that rebind the same key
//! unwind in last-in-first-out order per key.

use std::fmt;

use crate::binding::Binding;
use crate::error::{BindingError, BindingResult};
use crate::key::DefaultKey;

/// Ordered sequence of bindings with per-key LIFO semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingStack<K, V> {
    /// All bindings, oldest first
    pub(crate) entries: Vec<Binding<K, V>>,
    /// Key bound by under-specified scope argument lists
    pub(crate) default_key: K,
}

impl<K: DefaultKey, V> BindingStack<K, V> {
    /// Create an empty stack using the key type's conventional default key.
    pub fn new() -> Self {
        Self::with_default_key(K::default_key())
    }
}

impl<K: DefaultKey, V> Default for BindingStack<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BindingStack<K, V> {
    /// Create an empty stack with an explicit default key.
    pub fn with_default_key(default_key: K) -> Self {
        Self {
            entries: Vec::new(),
            default_key,
        }
    }

    /// The key bound by under-specified scope argument lists.
    #[inline]
    pub fn default_key(&self) -> &K {
        &self.default_key
    }

    /// Number of bindings (counting every layer of every key).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no bindings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over bindings, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Binding<K, V>> {
        self.entries.iter()
    }

    /// Borrow the bindings as a slice, oldest first.
    #[inline]
    pub fn as_slice(&self) -> &[Binding<K, V>] {
        &self.entries
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append a binding and make it the active one for `key`.
    ///
    /// Returns the index of the new binding. Indices shift when earlier
    /// bindings are popped, so the handle is only meaningful until the next
    /// removal.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn push(&mut self, key: K, value: V) -> usize {
        self.entries.push(Binding::new(key, value));
        self.entries.len() - 1
    }
}

impl<K: PartialEq, V> BindingStack<K, V> {
    /// Index of the active binding for `key`.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().rposition(|b| b.key == *key)
    }

    /// Returns true if at least one binding exists for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Number of bindings (layers) for `key`.
    pub fn count(&self, key: &K) -> usize {
        self.entries.iter().filter(|b| b.key == *key).count()
    }

    /// Remove the active binding for `key` and return its value.
    ///
    /// Returns `None` and leaves the stack untouched if `key` is unbound.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn pop(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        Some(self.entries.remove(index).value)
    }

    /// The active value for `key`, if any.
    pub fn active(&self, key: &K) -> Option<&V> {
        self.position(key).map(|i| &self.entries[i].value)
    }

    /// Mutable access to the active value for `key`, if any.
    pub fn active_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.position(key)?;
        Some(&mut self.entries[index].value)
    }
}

impl<K: PartialEq + fmt::Debug, V> BindingStack<K, V> {
    /// The active value for `key`.
    pub fn get(&self, key: &K) -> BindingResult<&V> {
        self.active(key).ok_or_else(|| BindingError::unbound(key))
    }

    /// Overwrite the active value for `key` in place.
    ///
    /// No new binding is created; the shadowed layers are untouched.
    pub fn set_active(&mut self, key: &K, value: V) -> BindingResult<&V> {
        let slot = self
            .active_mut(key)
            .ok_or_else(|| BindingError::unbound(key))?;
        *slot = value;
        Ok(&*slot)
    }
}

impl<K: PartialEq + Clone, V> BindingStack<K, V> {
    /// Distinct keys, in order of first appearance.
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = Vec::new();
        for binding in &self.entries {
            if !keys.contains(&binding.key) {
                keys.push(binding.key.clone());
            }
        }
        keys
    }
}

impl<T: Clone> BindingStack<T, T> {
    /// Create a stack pre-populated from a flattened argument list.
    ///
    /// The list is paired with [`pair_args`]; an empty list yields an empty
    /// stack.
    pub fn from_args(args: Vec<T>) -> Self
    where
        T: DefaultKey,
    {
        let mut stack = Self::new();
        for (key, value) in pair_args(args, &stack.default_key) {
            stack.push(key, value);
        }
        stack
    }
}

/// Pair up a flattened `[k1, v1, k2, v2, ...]` argument list.
///
/// An odd count gets `default_key` inserted before the final element, so the
/// last argument becomes the value of the default key:
///
/// ```
/// use fluidvar_core::pair_args;
///
/// assert_eq!(pair_args(vec![5], &0), vec![(0, 5)]);
/// assert_eq!(pair_args(vec![5, 6], &0), vec![(5, 6)]);
/// assert_eq!(pair_args(vec![5, 6, 7], &0), vec![(5, 6), (0, 7)]);
/// ```
///
/// An empty list yields no pairs.
pub fn pair_args<T: Clone>(mut args: Vec<T>, default_key: &T) -> Vec<(T, T)> {
    if args.len() % 2 == 1 {
        let last = args.len() - 1;
        args.insert(last, default_key.clone());
    }

    let mut pairs = Vec::with_capacity(args.len() / 2);
    let mut iter = args.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((key, value));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy() -> BindingStack<&'static str, i64> {
        let mut stack = BindingStack::new();
        stack.push("x", 1);
        stack.push("y", 2);
        stack.push("y", 3);
        stack.push("x", 4);
        stack
    }

    fn pairs(stack: &BindingStack<&'static str, i64>) -> Vec<(&'static str, i64)> {
        stack.iter().map(|b| (b.key, b.value)).collect()
    }

    #[test]
    fn push_appends_and_returns_index() {
        let mut stack: BindingStack<&str, i64> = BindingStack::new();
        assert_eq!(stack.push("x", 1), 0);
        assert_eq!(stack.push("y", 2), 1);
        assert_eq!(stack.push("x", 3), 2);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn pop_removes_last_occurrence() {
        let mut stack = xy();
        assert_eq!(stack.pop(&"x"), Some(4));
        assert_eq!(pairs(&stack), vec![("x", 1), ("y", 2), ("y", 3)]);
        assert_eq!(stack.pop(&"x"), Some(1));
        assert_eq!(pairs(&stack), vec![("y", 2), ("y", 3)]);
    }

    #[test]
    fn pop_keeps_other_keys_in_order() {
        let mut stack = xy();
        stack.pop(&"y");
        assert_eq!(pairs(&stack), vec![("x", 1), ("y", 2), ("x", 4)]);
        stack.pop(&"y");
        assert_eq!(pairs(&stack), vec![("x", 1), ("x", 4)]);
    }

    #[test]
    fn pop_unknown_key_is_noop() {
        let mut stack = xy();
        assert_eq!(stack.pop(&"z"), None);
        assert_eq!(stack, xy());
    }

    #[test]
    fn get_returns_nearest_binding() {
        let stack = xy();
        assert_eq!(stack.get(&"x"), Ok(&4));
        assert_eq!(stack.get(&"y"), Ok(&3));
        assert_eq!(stack.get(&"z"), Err(BindingError::unbound(&"z")));
    }

    #[test]
    fn set_active_updates_in_place() {
        let mut stack = xy();
        assert_eq!(stack.set_active(&"x", -1), Ok(&-1));
        stack.set_active(&"y", -2).unwrap();
        assert_eq!(pairs(&stack), vec![("x", 1), ("y", 2), ("y", -2), ("x", -1)]);
    }

    #[test]
    fn set_active_unbound_fails_without_change() {
        let mut stack = xy();
        let err = stack.set_active(&"z", -2).unwrap_err();
        assert_eq!(err.to_string(), "unbound variable \"z\"");
        assert_eq!(stack, xy());
    }

    #[test]
    fn keys_are_distinct_in_first_appearance_order() {
        assert_eq!(xy().keys(), vec!["x", "y"]);
        assert_eq!(xy().count(&"y"), 2);
        assert!(!xy().contains(&"z"));
    }

    #[test]
    fn pair_args_rules() {
        assert!(pair_args(Vec::<i32>::new(), &0).is_empty());
        assert_eq!(pair_args(vec![1, 2, 3, 4, 5, 6], &0), vec![(1, 2), (3, 4), (5, 6)]);
        assert_eq!(pair_args(vec![1, 2, 3], &9), vec![(1, 2), (9, 3)]);
    }

    #[test]
    fn from_args_uses_default_key() {
        let stack = BindingStack::<&str, &str>::from_args(vec!["first", "second", "last"]);
        let got: Vec<_> = stack.iter().map(|b| (b.key, b.value)).collect();
        assert_eq!(got, vec![("first", "second"), ("value", "last")]);

        assert!(BindingStack::<&str, &str>::from_args(vec![]).is_empty());
    }

    #[test]
    fn explicit_default_key() {
        let stack: BindingStack<u8, u8> = BindingStack::with_default_key(0);
        assert_eq!(*stack.default_key(), 0);
    }
}
