//! fluidvar proc macros
//!
//! # Macros
//!
//! - `#[derive(Variables)]` - typed accessors for a fixed set of binding keys
//!
//! # Example
//!
//! ```ignore
//! use fluidvar::{BindingStack, Variables};
//!
//! #[derive(Debug, Clone, PartialEq, Variables)]
//! enum Setting {
//!     Verbose,
//!     MaxDepth,
//! }
//!
//! let mut stack: BindingStack<Setting, i64> = BindingStack::with_default_key(Setting::Verbose);
//! stack.push(Setting::MaxDepth, 3);
//! assert_eq!(stack.max_depth(), Ok(3));
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_variables;

/// Derive typed accessors for an enum of binding keys.
///
/// The enum must be fieldless and non-generic, and should also derive
/// `Debug` and `PartialEq` so it can serve as a binding key. The derive
/// generates:
///
/// - `Enum::ALL` and `Enum::name()`
/// - a trait `<Enum>Accessors<V>` with a getter and a `set_` setter per
///   variant, implemented for every `BindingStore<Enum, V>`
///
/// # Attributes
///
/// - `#[variables(accessors = "...")]` on the enum - Override the trait name
/// - `#[variables(rename = "...")]` on a variant - Override the accessor name
#[proc_macro_derive(Variables, attributes(variables))]
pub fn derive_variables(input: TokenStream) -> TokenStream {
    derive_variables::derive_variables_impl(input)
}
