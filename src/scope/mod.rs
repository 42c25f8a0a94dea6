//! Scope resolution for extracted graph fragments
//!
//! A freshly extracted fragment has not been resolved, so its nested
//! control-flow bodies do not yet know which values come from enclosing
//! scopes. Three passes rebuild that knowledge, in order:
//!
//! 1. [`ContextBuilder`] records what every level produces and consumes
//! 2. [`OuterScopeBinder`] declares outer-scope values and synthesizes
//!    missing top-level inputs
//! 3. [`InputFinalizer`] installs the full input list where synthesis
//!    happened
//!
//! [`Locality`] answers "where does this value live" from the records, and
//! [`verify_closure`] reports what the host's validation would reject.

pub mod binder;
pub mod builder;
pub mod closure;
pub mod context;
pub mod finalizer;
pub mod locality;

pub use binder::{BindReport, Diagnostic, OuterScopeBinder, OuterScopeBinding};
pub use builder::ContextBuilder;
pub use closure::{verify_closure, UnboundValue};
pub use context::{ScopeContextStore, ScopeRecord};
pub use finalizer::{InputFinalizer, InputPolicy};
pub use locality::{Locality, ValueLocality};
