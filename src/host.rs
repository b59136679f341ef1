//! External hosts for [`MirroredBindingStack`](crate::MirroredBindingStack).

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use fluidvar_core::{BindingError, BindingResult};

/// An object whose fields a mirrored stack keeps in sync with its bindings.
///
/// Both methods must fail with `UnboundVariable` when the host has no field
/// for `key`; a host never gains fields through its mirror. `set` returns the
/// value now stored.
pub trait Host<K, V> {
    /// Live value of the field `key`.
    fn get(&self, key: &K) -> BindingResult<V>;

    /// Store `value` into the field `key`.
    fn set(&mut self, key: &K, value: V) -> BindingResult<V>;
}

impl<K, V, S> Host<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone,
    S: BuildHasher,
{
    fn get(&self, key: &K) -> BindingResult<V> {
        HashMap::get(self, key)
            .cloned()
            .ok_or_else(|| BindingError::unbound(key))
    }

    fn set(&mut self, key: &K, value: V) -> BindingResult<V> {
        let field = self.get_mut(key).ok_or_else(|| BindingError::unbound(key))?;
        *field = value.clone();
        Ok(value)
    }
}

impl<K, V, H> Host<K, V> for &mut H
where
    H: Host<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> BindingResult<V> {
        (**self).get(key)
    }

    fn set(&mut self, key: &K, value: V) -> BindingResult<V> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn map_host_reads_and_writes() {
        let mut fields: FxHashMap<&str, i64> = FxHashMap::default();
        fields.insert("x", 4);

        assert_eq!(Host::get(&fields, &"x"), Ok(4));
        assert_eq!(Host::set(&mut fields, &"x", 5), Ok(5));
        assert_eq!(fields["x"], 5);
    }

    #[test]
    fn map_host_missing_field_is_unbound() {
        let fields: FxHashMap<&str, i64> = FxHashMap::default();
        assert_eq!(
            Host::get(&fields, &"nope"),
            Err(BindingError::unbound(&"nope"))
        );
    }

    #[test]
    fn map_host_set_does_not_add_fields() {
        let mut fields: FxHashMap<&str, i64> = FxHashMap::default();
        fields.insert("x", 4);

        assert_eq!(
            Host::set(&mut fields, &"nope", 1),
            Err(BindingError::unbound(&"nope"))
        );
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains_key("nope"));
    }

    #[test]
    fn borrowed_host_forwards() {
        let mut fields: FxHashMap<&str, i64> = FxHashMap::default();
        fields.insert("x", 1);
        {
            let mut borrowed = &mut fields;
            Host::set(&mut borrowed, &"x", 2).unwrap();
            assert_eq!(Host::get(&borrowed, &"x"), Ok(2));
        }
        assert_eq!(fields["x"], 2);
    }
}
