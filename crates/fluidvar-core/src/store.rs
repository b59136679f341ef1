//! The `BindingStore` seam.
//!
//! Scopes and accessors are written against this trait rather than against
//! [`BindingStack`] directly, so any store that keeps the same per-key LIFO
//! discipline (the host-mirroring stack in the `fluidvar` crate, for one)
//! can stand in wherever a plain stack is expected.

use std::fmt;

use crate::error::BindingResult;
use crate::stack::BindingStack;

/// A store of dynamically scoped bindings.
pub trait BindingStore<K, V> {
    /// Push a new active binding for `key`. Returns the binding's index.
    fn bind(&mut self, key: K, value: V) -> BindingResult<usize>;

    /// Remove the active binding for `key`, returning its recorded value.
    ///
    /// `Ok(None)` means `key` was not bound; nothing changed.
    fn unbind(&mut self, key: &K) -> BindingResult<Option<V>>;

    /// Current value of `key`.
    fn read(&self, key: &K) -> BindingResult<V>;

    /// Overwrite the current value of `key` without adding a layer.
    /// Returns the value now in effect.
    fn write(&mut self, key: &K, value: V) -> BindingResult<V>;

    /// The underlying binding history.
    fn bindings(&self) -> &BindingStack<K, V>;

    /// Key bound by under-specified scope argument lists.
    fn default_key<'a>(&'a self) -> &'a K
    where
        V: 'a,
    {
        self.bindings().default_key()
    }
}

impl<K, V> BindingStore<K, V> for BindingStack<K, V>
where
    K: PartialEq + fmt::Debug,
    V: Clone,
{
    fn bind(&mut self, key: K, value: V) -> BindingResult<usize> {
        Ok(self.push(key, value))
    }

    fn unbind(&mut self, key: &K) -> BindingResult<Option<V>> {
        Ok(self.pop(key))
    }

    fn read(&self, key: &K) -> BindingResult<V> {
        self.get(key).cloned()
    }

    fn write(&mut self, key: &K, value: V) -> BindingResult<V> {
        self.set_active(key, value).cloned()
    }

    fn bindings(&self) -> &BindingStack<K, V> {
        self
    }
}

impl<K, V, S> BindingStore<K, V> for &mut S
where
    S: BindingStore<K, V> + ?Sized,
{
    fn bind(&mut self, key: K, value: V) -> BindingResult<usize> {
        (**self).bind(key, value)
    }

    fn unbind(&mut self, key: &K) -> BindingResult<Option<V>> {
        (**self).unbind(key)
    }

    fn read(&self, key: &K) -> BindingResult<V> {
        (**self).read(key)
    }

    fn write(&mut self, key: &K, value: V) -> BindingResult<V> {
        (**self).write(key, value)
    }

    fn bindings(&self) -> &BindingStack<K, V> {
        (**self).bindings()
    }

    fn default_key<'a>(&'a self) -> &'a K
    where
        V: 'a,
    {
        (**self).default_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_of<S: BindingStore<&'static str, i64> + ?Sized>(store: &S) -> &'static str {
        *store.default_key()
    }

    #[test]
    fn default_key_through_store() {
        let mut stack = BindingStack::with_default_key("it");
        stack.push("x", 1);
        assert_eq!(default_of(&stack), "it");

        let borrowed = &mut stack;
        assert_eq!(default_of(&borrowed), "it");
        assert_eq!(borrowed.bind("y", 2), Ok(1));
        assert_eq!(BindingStore::read(&borrowed, &"y"), Ok(2));
    }
}
