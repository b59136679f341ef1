//! A single (key, value) entry of a binding stack.

/// One binding: a key and the value currently recorded for it.
///
/// In a plain [`BindingStack`](crate::BindingStack) the value is what the key
/// is bound to. In a mirrored stack the value of a non-top binding is a
/// restore checkpoint for the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding<K, V> {
    /// Bound key
    pub key: K,
    /// Recorded value
    pub value: V,
}

impl<K, V> Binding<K, V> {
    /// Create a binding.
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Split into a `(key, value)` tuple.
    #[inline]
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Binding<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}
