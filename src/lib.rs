//! fluidvar
//!
//! Dynamically scoped (fluid) variables: rebind named values for the extent of
//! a scope and get the previous values back on every way out of it.
//!
//! # Crates
//!
//! - `fluidvar-core` - binding stack, bulk editing, accessors, errors, `Value`
//! - `fluidvar-macros` - `#[derive(Variables)]`
//! - `fluidvar` - scopes, external hosts and the mirrored stack (this crate)
//!
//! # Example
//!
//! ```
//! use fluidvar::prelude::*;
//!
//! let mut stack: BindingStack<&str, i64> = BindingStack::new();
//! stack.push("depth", 0);
//!
//! stack
//!     .with_scope([("depth", 1)], |s| {
//!         assert_eq!(s.get_variable(&"depth")?, 1);
//!         s.with_scope([("depth", 2)], |s| {
//!             assert_eq!(s.get_variable(&"depth")?, 2);
//!             Ok::<_, BindingError>(())
//!         })
//!     })
//!     .unwrap();
//!
//! assert_eq!(stack.snapshot(), vec![("depth", 0)]);
//! ```
//!
//! Mirroring a live field of a host:
//!
//! ```
//! use fluidvar::prelude::*;
//! use std::collections::HashMap;
//!
//! let mut fields = HashMap::new();
//! fields.insert("x", 4);
//!
//! let mut mirror = MirroredBindingStack::new(fields);
//! mirror
//!     .with_scope([("x", 3)], |m| {
//!         assert_eq!(m.host()["x"], 3);
//!         Ok::<_, BindingError>(())
//!     })
//!     .unwrap();
//! assert_eq!(mirror.host()["x"], 4);
//! ```

pub mod host;
pub mod mirror;
pub mod scope;

pub use fluidvar_core::{
    Binding, BindingError, BindingPair, BindingResult, BindingSequence, BindingStack,
    BindingStore, DefaultKey, Value, VariableAccessor, pair_args,
};
pub use fluidvar_macros::Variables;

pub use host::Host;
pub use mirror::MirroredBindingStack;
pub use scope::{ScopeGuard, ScopeRunner, WithArgs, WithScope};

pub mod prelude {
    pub use crate::host::Host;
    pub use crate::mirror::MirroredBindingStack;
    pub use crate::scope::{ScopeGuard, ScopeRunner, WithArgs, WithScope};
    pub use fluidvar_core::{
        BindingError, BindingResult, BindingStack, BindingStore, Value, VariableAccessor,
    };
    pub use fluidvar_macros::Variables;
}
