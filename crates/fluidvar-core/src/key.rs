//! Default key selection.

/// Key types with a conventional default key.
///
/// The default key is bound when a flattened scope argument list has an odd
/// number of elements (or none at all). Stacks created with
/// [`BindingStack::new`](crate::BindingStack::new) take it from this trait;
/// [`BindingStack::with_default_key`](crate::BindingStack::with_default_key)
/// works for any key type.
pub trait DefaultKey {
    /// The key substituted for under-specified argument lists.
    fn default_key() -> Self;
}

impl DefaultKey for &'static str {
    fn default_key() -> Self {
        "value"
    }
}

impl DefaultKey for String {
    fn default_key() -> Self {
        "value".to_string()
    }
}
