//! Scoped rebinding.
//!
//! A scope pushes a set of bindings, runs a body against the store, and pops
//! one binding per pushed key on every way out of the body: normal return,
//! error return or panic. Because `unbind` always removes the *current*
//! binding of a key, popping in push order unwinds repeated keys correctly:
//!
//! ```text
//! with_scope([(x, 1), (x, 2)])   push x=1, push x=2
//!   body                          x == 2
//! exit                            pop x (removes 2), pop x (removes 1)
//! ```
//!
//! Cleanup is owned by [`ScopeGuard`]; dropping the guard pops the bindings
//! it recorded, so a panicking body cannot leak them.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use fluidvar_core::{BindingError, BindingResult, BindingStore, pair_args};

// ============================================================================
// ScopeGuard
// ============================================================================

/// Pops the bindings of one scope when released or dropped.
///
/// Dereferences to the store so the scope body can keep using it. Call
/// [`release`](ScopeGuard::release) to unwind and observe errors; a plain
/// drop unwinds too but can only log failures.
pub struct ScopeGuard<'s, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    store: &'s mut S,
    /// Keys pushed by this scope, in push order
    keys: Vec<K>,
    _value: PhantomData<fn(V)>,
}

impl<'s, S, K, V> ScopeGuard<'s, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    fn new(store: &'s mut S, capacity: usize) -> Self {
        Self {
            store,
            keys: Vec::with_capacity(capacity),
            _value: PhantomData,
        }
    }

    /// Keys this scope will pop, in push order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Pop every binding pushed by this scope.
    ///
    /// All keys are popped even if some fail; the first failure is returned.
    pub fn release(mut self) -> BindingResult<()> {
        let keys = std::mem::take(&mut self.keys);
        unwind(&mut *self.store, &keys)
    }
}

impl<S, K, V> Deref for ScopeGuard<'_, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    type Target = S;

    fn deref(&self) -> &S {
        &*self.store
    }
}

impl<S, K, V> DerefMut for ScopeGuard<'_, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.store
    }
}

impl<S, K, V> Drop for ScopeGuard<'_, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    fn drop(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let keys = std::mem::take(&mut self.keys);
        if let Err(err) = unwind(&mut *self.store, &keys) {
            tracing::warn!(%err, "bindings not fully restored while dropping scope");
        }
    }
}

fn unwind<S, K, V>(store: &mut S, keys: &[K]) -> BindingResult<()>
where
    S: BindingStore<K, V> + ?Sized,
{
    let mut first_err = None;
    for (index, key) in keys.iter().enumerate() {
        if let Err(err) = store.unbind(key) {
            tracing::warn!(index, %err, "failed to pop scoped binding");
            first_err.get_or_insert(err);
        }
    }
    tracing::debug!(bindings = keys.len(), "left scope");
    first_err.map_or(Ok(()), Err)
}

/// Push `pairs` left to right, recording each key on a guard.
///
/// If a push fails the guard is dropped, popping what was already pushed.
fn enter_pairs<'s, S, K, V>(
    store: &'s mut S,
    pairs: Vec<(K, V)>,
) -> BindingResult<ScopeGuard<'s, S, K, V>>
where
    S: BindingStore<K, V> + ?Sized,
    K: Clone,
{
    let mut guard = ScopeGuard::new(store, pairs.len());
    for (key, value) in pairs {
        let recorded = key.clone();
        guard.store.bind(key, value)?;
        guard.keys.push(recorded);
    }
    tracing::debug!(bindings = guard.keys.len(), "entered scope");
    Ok(guard)
}

/// Run `body` inside `guard`, then release it.
///
/// A body error wins over a cleanup error; the cleanup error is logged.
fn run_guarded<S, K, V, F, R, E>(mut guard: ScopeGuard<'_, S, K, V>, body: F) -> Result<R, E>
where
    S: BindingStore<K, V> + ?Sized,
    F: FnOnce(&mut S) -> Result<R, E>,
    E: From<BindingError>,
{
    let outcome = body(&mut *guard);
    let cleanup = guard.release();

    match (outcome, cleanup) {
        (Ok(result), Ok(())) => Ok(result),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            tracing::warn!(err = %cleanup_err, "scope cleanup failed after body error");
            Err(err)
        }
    }
}

// ============================================================================
// ScopeRunner
// ============================================================================

/// Builder for one scoped rebinding.
///
/// ```
/// use fluidvar::{BindingError, BindingStack, WithScope};
///
/// let mut stack: BindingStack<&str, i64> = BindingStack::new();
/// let seen = stack
///     .scope()
///     .bind("x", 1)
///     .bind_default(7)
///     .run(|s| Ok::<_, BindingError>((*s.get(&"x")?, *s.get(&"value")?)))
///     .unwrap();
/// assert_eq!(seen, (1, 7));
/// assert!(stack.is_empty());
/// ```
pub struct ScopeRunner<'s, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
{
    store: &'s mut S,
    pairs: Vec<(K, V)>,
}

impl<'s, S, K, V> ScopeRunner<'s, S, K, V>
where
    S: BindingStore<K, V> + ?Sized,
    K: Clone,
{
    /// Start a scope on `store` with no bindings.
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            pairs: Vec::new(),
        }
    }

    /// Bind `key` to `value` for the scope.
    pub fn bind(mut self, key: K, value: V) -> Self {
        self.pairs.push((key, value));
        self
    }

    /// Bind the store's default key to `value` for the scope.
    pub fn bind_default(mut self, value: V) -> Self {
        let key = self.store.default_key().clone();
        self.pairs.push((key, value));
        self
    }

    /// Bind every pair of `pairs`, left to right.
    pub fn bind_all(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        self.pairs.extend(pairs);
        self
    }

    /// Pairs that will be pushed, in order.
    pub fn pairs(&self) -> &[(K, V)] {
        &self.pairs
    }

    /// Push the bindings and return a guard that pops them.
    pub fn enter(self) -> BindingResult<ScopeGuard<'s, S, K, V>> {
        enter_pairs(self.store, self.pairs)
    }

    /// Push the bindings, run `body`, pop the bindings.
    ///
    /// The bindings are popped whether `body` returns `Ok`, returns `Err`
    /// or panics. Returns the body's result; a failure to push (a host
    /// rejecting the write) is returned without running the body.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run<F, R, E>(self, body: F) -> Result<R, E>
    where
        F: FnOnce(&mut S) -> Result<R, E>,
        E: From<BindingError>,
    {
        let guard = self.enter()?;
        run_guarded(guard, body)
    }

    /// Like [`run`](Self::run) for callers whose body is optional.
    ///
    /// Fails with `MissingBody`, pushing nothing, when `body` is `None`.
    pub fn run_opt<F, R, E>(self, body: Option<F>) -> Result<R, E>
    where
        F: FnOnce(&mut S) -> Result<R, E>,
        E: From<BindingError>,
    {
        match body {
            Some(body) => self.run(body),
            None => Err(BindingError::MissingBody.into()),
        }
    }
}

impl<S, T> ScopeRunner<'_, S, T, T>
where
    S: BindingStore<T, T> + ?Sized,
    T: Clone + Default,
{
    /// Bind a flattened `[k1, v1, k2, v2, ...]` argument list.
    ///
    /// An odd count binds the last element to the default key; an empty list
    /// binds the default key to `T::default()`.
    pub fn args(mut self, args: Vec<T>) -> Self {
        let default_key = self.store.default_key().clone();
        if args.is_empty() {
            self.pairs.push((default_key, T::default()));
        } else {
            self.pairs.extend(pair_args(args, &default_key));
        }
        self
    }
}

// ============================================================================
// Extension traits
// ============================================================================

/// Scoped rebinding on any [`BindingStore`].
pub trait WithScope<K, V>: BindingStore<K, V> {
    /// Start building a scope on this store.
    fn scope(&mut self) -> ScopeRunner<'_, Self, K, V>
    where
        K: Clone,
    {
        ScopeRunner::new(self)
    }

    /// Push `pairs` and return a guard that pops them.
    fn enter<I>(&mut self, pairs: I) -> BindingResult<ScopeGuard<'_, Self, K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Clone,
    {
        enter_pairs(self, pairs.into_iter().collect())
    }

    /// Run `body` with `pairs` bound, restoring on every exit path.
    ///
    /// The pairs are taken as given: an empty `pairs` runs `body` with nothing
    /// bound. Only the flattened form ([`WithArgs::with_args`]) turns an empty
    /// list into a binding of the default key.
    fn with_scope<I, F, R, E>(&mut self, pairs: I, body: F) -> Result<R, E>
    where
        I: IntoIterator<Item = (K, V)>,
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<BindingError>,
        K: Clone,
    {
        self.scope().bind_all(pairs).run(body)
    }

    /// Run `body` with the default key bound to `value`.
    fn with_value<F, R, E>(&mut self, value: V, body: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<BindingError>,
        K: Clone,
    {
        self.scope().bind_default(value).run(body)
    }
}

impl<K, V, S: BindingStore<K, V> + ?Sized> WithScope<K, V> for S {}

/// Scoped rebinding from a flattened argument list, for stores whose keys
/// and values share one type.
pub trait WithArgs<T>: BindingStore<T, T> {
    /// Run `body` with the pairs of `args` bound (see [`ScopeRunner::args`]).
    fn with_args<F, R, E>(&mut self, args: Vec<T>, body: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<BindingError>,
        T: Clone + Default,
    {
        ScopeRunner::new(self).args(args).run(body)
    }
}

impl<T, S: BindingStore<T, T> + ?Sized> WithArgs<T> for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use fluidvar_core::{BindingStack, Value};

    type Stack = BindingStack<&'static str, i64>;

    #[test]
    fn scope_binds_and_cleans_up() {
        let mut stack = Stack::new();
        let result = stack
            .with_scope([("key", 1)], |s| {
                assert_eq!(s.snapshot(), vec![("key", 1)]);
                Ok::<_, BindingError>("result")
            })
            .unwrap();
        assert_eq!(result, "result");
        assert!(stack.is_empty());
    }

    #[test]
    fn nested_scopes_restore_layers() {
        let mut stack = Stack::new();
        stack
            .with_value(1, |s| {
                s.with_value(2, |s| {
                    assert_eq!(s.snapshot(), vec![("value", 1), ("value", 2)]);
                    Ok::<_, BindingError>(())
                })?;
                assert_eq!(s.snapshot(), vec![("value", 1)]);
                Ok::<_, BindingError>(())
            })
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn body_error_still_pops() {
        let mut stack = Stack::new();
        let err = stack
            .with_scope([("x", 1)], |s| -> Result<(), BindingError> {
                s.get(&"missing")?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err, BindingError::unbound(&"missing"));
        assert!(stack.is_empty());
    }

    #[test]
    fn repeated_key_unwinds_both_layers() {
        let mut stack = Stack::new();
        stack
            .with_scope([("var", 1), ("var", 2)], |s| {
                assert_eq!(s.snapshot(), vec![("var", 1), ("var", 2)]);
                Ok::<_, BindingError>(())
            })
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn flattened_args() {
        let mut stack: BindingStack<Value, Value> = BindingStack::new();
        let v = Value::int;

        stack
            .with_args(vec![v(5)], |s| {
                assert_eq!(s.snapshot(), vec![(Value::sym("value"), v(5))]);
                Ok::<_, BindingError>(())
            })
            .unwrap();
        stack
            .with_args(vec![v(5), v(6)], |s| {
                assert_eq!(s.snapshot(), vec![(v(5), v(6))]);
                Ok::<_, BindingError>(())
            })
            .unwrap();
        stack
            .with_args(vec![v(5), v(6), v(7)], |s| {
                assert_eq!(
                    s.snapshot(),
                    vec![(v(5), v(6)), (Value::sym("value"), v(7))]
                );
                Ok::<_, BindingError>(())
            })
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn empty_args_bind_default_to_nil() {
        let mut stack: BindingStack<Value, Value> = BindingStack::new();
        stack
            .with_args(vec![], |s| {
                assert_eq!(s.get(&Value::sym("value")), Ok(&Value::Nil));
                Ok::<_, BindingError>(())
            })
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn empty_pairs_bind_nothing() {
        let mut stack: BindingStack<Value, Value> = BindingStack::new();
        stack
            .with_scope(Vec::new(), |s| {
                assert!(s.is_empty());
                Ok::<_, BindingError>(())
            })
            .unwrap();
        stack
            .with_args(Vec::new(), |s| {
                assert_eq!(s.snapshot(), vec![(Value::sym("value"), Value::Nil)]);
                Ok::<_, BindingError>(())
            })
            .unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn run_opt_without_body_is_missing_body() {
        let mut stack = Stack::new();
        let err = stack
            .scope()
            .bind("key", 1)
            .run_opt::<fn(&mut Stack) -> Result<(), BindingError>, _, _>(None)
            .unwrap_err();
        assert_eq!(err, BindingError::MissingBody);
        assert!(stack.is_empty());
    }

    #[test]
    fn guard_pops_on_drop() {
        let mut stack = Stack::new();
        {
            let mut guard = stack.enter([("x", 1), ("y", 2)]).unwrap();
            assert_eq!(guard.keys(), &["x", "y"]);
            guard.push("z", 3);
            assert_eq!(guard.len(), 3);
        }
        assert_eq!(stack.snapshot(), vec![("z", 3)]);
    }

    #[test]
    fn guard_release_reports_ok() {
        let mut stack = Stack::new();
        let guard = stack.enter([("x", 1)]).unwrap();
        assert_eq!(guard.release(), Ok(()));
        assert!(stack.is_empty());
    }
}
