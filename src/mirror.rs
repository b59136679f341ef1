//! A binding stack mirrored onto the fields of an external host.
//!
//! `MirroredBindingStack` rebinds a *live* field: pushing writes the new
//! value into the host, popping writes the previous one back. The stack only
//! records what to restore. For a key with `n` active layers it holds `n + 1`
//! bindings:
//!
//! ```text
//! host.x = 4
//! push(x, 3)            [(x, 4), (x, 3)]          host.x = 3
//! host.x = 2            (out-of-band write)
//! push(x, 1)            [(x, 4), (x, 2), (x, 1)]  host.x = 1
//! pop(x)                [(x, 4), (x, 2)]          host.x = 2
//! pop(x)                []                        host.x = 4
//! ```
//!
//! Every push re-reads the host and refreshes the checkpoint beneath the new
//! layer, so a pop restores the value the field really had when the layer was
//! pushed, even if the host was written to out of band. The bottom binding is
//! the value the field had before the key was first rebound; it is removed
//! together with the last layer so a fully unwound key leaves no bindings.
//!
//! Reads and writes of the active value go straight to the host.

use std::fmt;

use fluidvar_core::{BindingResult, BindingStack, BindingStore, DefaultKey};

use crate::host::Host;

/// Binding stack kept in sync with the fields of a host `H`.
///
/// Single-threaded like [`BindingStack`]; the push and pop sequences are not
/// atomic with respect to anything else touching the same host.
#[derive(Debug)]
pub struct MirroredBindingStack<K, V, H> {
    stack: BindingStack<K, V>,
    host: H,
}

/// What `push` changed beneath the new binding, for rollback.
enum Checkpoint<V> {
    /// An existing active binding was refreshed; holds its previous value.
    Refreshed(V),
    /// A bottom checkpoint binding was created.
    Created,
}

impl<K: DefaultKey, V, H> MirroredBindingStack<K, V, H> {
    /// Mirror onto `host`, using the key type's conventional default key.
    pub fn new(host: H) -> Self {
        Self {
            stack: BindingStack::new(),
            host,
        }
    }
}

impl<K, V, H> MirroredBindingStack<K, V, H> {
    /// Mirror onto `host` with an explicit default key.
    pub fn with_default_key(host: H, default_key: K) -> Self {
        Self {
            stack: BindingStack::with_default_key(default_key),
            host,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for out-of-band writes.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Give the host back.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Recorded bindings, checkpoints included.
    pub fn bindings(&self) -> &BindingStack<K, V> {
        &self.stack
    }
}

impl<K: Clone, V: Clone, H> MirroredBindingStack<K, V, H> {
    /// Copy of the recorded bindings, checkpoints included.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.stack.snapshot()
    }
}

impl<K, V, H> MirroredBindingStack<K, V, H>
where
    K: PartialEq + Clone + fmt::Debug,
    V: Clone,
    H: Host<K, V>,
{
    /// Rebind the host field `key` to `value`.
    ///
    /// Fails, leaving both the stack and the host field untouched, if the
    /// host cannot read or write `key`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn push(&mut self, key: K, value: V) -> BindingResult<usize> {
        let live_old = self.host.get(&key)?;

        let checkpoint = match self.stack.active_mut(&key) {
            Some(recorded) => Checkpoint::Refreshed(std::mem::replace(recorded, live_old)),
            None => {
                self.stack.push(key.clone(), live_old);
                Checkpoint::Created
            }
        };

        if let Err(err) = self.host.set(&key, value.clone()) {
            match checkpoint {
                Checkpoint::Refreshed(prior) => {
                    if let Some(recorded) = self.stack.active_mut(&key) {
                        *recorded = prior;
                    }
                }
                Checkpoint::Created => {
                    self.stack.pop(&key);
                }
            }
            tracing::debug!(?key, %err, "host rejected rebinding, rolled back");
            return Err(err);
        }

        tracing::trace!(?key, "rebound host field");
        Ok(self.stack.push(key, value))
    }

    /// Undo the latest rebinding of `key`, restoring the host field.
    ///
    /// Returns the value recorded for the removed layer, or `None` if `key`
    /// was not rebound. The stack is unwound before the host is written, so a
    /// host failure is reported with the binding already gone.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn pop(&mut self, key: &K) -> BindingResult<Option<V>> {
        let Some(removed) = self.stack.pop(key) else {
            return Ok(None);
        };

        let restore = self.stack.active(key).cloned();
        // A lone remaining binding is the bottom checkpoint; nothing above it
        // is active any more.
        if self.stack.count(key) == 1 {
            self.stack.pop(key);
        }

        if let Some(restore) = restore {
            self.host.set(key, restore)?;
            tracing::trace!(?key, "restored host field");
        }
        Ok(Some(removed))
    }

    /// Live host value of `key`.
    pub fn get(&self, key: &K) -> BindingResult<V> {
        self.host.get(key)
    }

    /// Write `value` through to the host field `key` without adding a layer.
    pub fn set_active(&mut self, key: &K, value: V) -> BindingResult<V> {
        self.host.set(key, value)
    }

    /// Every recorded value for `key`, checkpoints included, oldest first.
    pub fn values_for(&self, key: &K) -> Vec<V> {
        self.stack.values_for(key)
    }
}

impl<K, V, H> BindingStore<K, V> for MirroredBindingStack<K, V, H>
where
    K: PartialEq + Clone + fmt::Debug,
    V: Clone,
    H: Host<K, V>,
{
    fn bind(&mut self, key: K, value: V) -> BindingResult<usize> {
        self.push(key, value)
    }

    fn unbind(&mut self, key: &K) -> BindingResult<Option<V>> {
        self.pop(key)
    }

    fn read(&self, key: &K) -> BindingResult<V> {
        self.get(key)
    }

    fn write(&mut self, key: &K, value: V) -> BindingResult<V> {
        self.set_active(key, value)
    }

    fn bindings(&self) -> &BindingStack<K, V> {
        &self.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluidvar_core::BindingError;
    use rustc_hash::FxHashMap;

    fn host(x: i64) -> FxHashMap<&'static str, i64> {
        let mut fields = FxHashMap::default();
        fields.insert("x", x);
        fields
    }

    #[test]
    fn push_writes_host_and_records_checkpoint() {
        let mut mirror = MirroredBindingStack::new(host(4));
        mirror.push("x", 3).unwrap();
        assert_eq!(mirror.get(&"x"), Ok(3));
        assert_eq!(mirror.snapshot(), vec![("x", 4), ("x", 3)]);
    }

    #[test]
    fn pop_restores_and_drops_checkpoint() {
        let mut mirror = MirroredBindingStack::new(host(4));
        mirror.push("x", 3).unwrap();
        assert_eq!(mirror.pop(&"x"), Ok(Some(3)));
        assert_eq!(mirror.host()["x"], 4);
        assert!(mirror.bindings().is_empty());
    }

    #[test]
    fn out_of_band_write_is_restored_to() {
        let mut mirror = MirroredBindingStack::new(host(4));
        mirror.push("x", 3).unwrap();
        mirror.host_mut().insert("x", 2);
        mirror.push("x", 1).unwrap();
        assert_eq!(mirror.snapshot(), vec![("x", 4), ("x", 2), ("x", 1)]);

        mirror.pop(&"x").unwrap();
        assert_eq!(mirror.get(&"x"), Ok(2));
        mirror.pop(&"x").unwrap();
        assert_eq!(mirror.get(&"x"), Ok(4));
        assert!(mirror.bindings().is_empty());
    }

    #[test]
    fn pop_unbound_key_is_noop() {
        let mut mirror = MirroredBindingStack::new(host(4));
        assert_eq!(mirror.pop(&"x"), Ok(None));
        assert_eq!(mirror.host()["x"], 4);
    }

    #[test]
    fn push_on_missing_field_fails_cleanly() {
        let mut mirror = MirroredBindingStack::new(host(4));
        let err = mirror.push("y", 1).unwrap_err();
        assert_eq!(err, BindingError::unbound(&"y"));
        assert!(mirror.bindings().is_empty());
    }

    #[test]
    fn set_active_writes_through() {
        let mut mirror = MirroredBindingStack::new(host(4));
        mirror.push("x", 3).unwrap();
        assert_eq!(mirror.set_active(&"x", 9), Ok(9));
        assert_eq!(mirror.host()["x"], 9);
        assert_eq!(mirror.snapshot(), vec![("x", 4), ("x", 3)]);
    }

    /// Host whose writes can be switched off.
    struct Flaky {
        x: i64,
        writable: bool,
    }

    impl Host<&'static str, i64> for Flaky {
        fn get(&self, key: &&'static str) -> BindingResult<i64> {
            match *key {
                "x" => Ok(self.x),
                _ => Err(BindingError::unbound(key)),
            }
        }

        fn set(&mut self, key: &&'static str, value: i64) -> BindingResult<i64> {
            if !self.writable {
                return Err(BindingError::host(key, "read-only"));
            }
            self.x = value;
            Ok(value)
        }
    }

    #[test]
    fn failed_first_push_leaves_no_checkpoint() {
        let mut mirror = MirroredBindingStack::new(Flaky { x: 4, writable: false });
        assert!(mirror.push("x", 3).is_err());
        assert!(mirror.bindings().is_empty());
        assert_eq!(mirror.host().x, 4);
    }

    #[test]
    fn failed_nested_push_restores_checkpoint() {
        let mut mirror = MirroredBindingStack::new(Flaky { x: 4, writable: true });
        mirror.push("x", 3).unwrap();
        mirror.host_mut().x = 2;
        mirror.host_mut().writable = false;

        let err = mirror.push("x", 1).unwrap_err();
        assert_eq!(err, BindingError::host(&"x", "read-only"));
        assert_eq!(mirror.snapshot(), vec![("x", 4), ("x", 3)]);
        assert_eq!(mirror.host().x, 2);
    }
}
