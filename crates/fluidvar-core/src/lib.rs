//! fluidvar core
//!
//! Binding stack primitives for dynamically scoped (fluid) variables.
//!
//! ## Modules
//!
//! - [`stack`]: `BindingStack`, the ordered binding history with per-key LIFO pop
//! - [`bulk`]: snapshot, per-key listing and whole/partial replacement
//! - [`store`]: the `BindingStore` trait that scopes and accessors are written against
//! - [`accessor`]: `VariableAccessor`, get/set and bulk get/set of active values
//! - [`value`]: `Value`, a dynamically typed key/value
//! - [`error`]: `BindingError`
//!
//! ## Example
//!
//! ```
//! use fluidvar_core::{BindingStack, VariableAccessor};
//!
//! let mut stack: BindingStack<&str, i64> = BindingStack::new();
//! stack.push("depth", 1);
//! stack.push("depth", 2);
//! assert_eq!(stack.get_variable(&"depth"), Ok(2));
//!
//! stack.pop(&"depth");
//! assert_eq!(stack.get_variable(&"depth"), Ok(1));
//! ```
//!
//! Stacks are single-threaded: every mutation takes `&mut self` and there is
//! no internal locking.

pub mod accessor;
mod binding;
pub mod bulk;
pub mod error;
mod key;
pub mod stack;
pub mod store;
pub mod value;

pub use accessor::VariableAccessor;
pub use binding::Binding;
pub use bulk::{BindingPair, BindingSequence};
pub use error::{BindingError, BindingResult};
pub use key::DefaultKey;
pub use stack::{BindingStack, pair_args};
pub use store::BindingStore;
pub use value::Value;
