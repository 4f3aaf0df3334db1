//! Scopes: name lookup over the descriptor graph.
//!
//! # Variants
//!
//! A [`Scope`] is one of:
//! - [`Scope::Empty`] - answers nothing; the parent of top-level scopes
//! - [`Scope::Writable`] - built in place by the analyzer and guarded by a
//!   [`LockLevel`]. Namespace and class member scopes, class and function
//!   lexical scopes, blocks, file scopes and alias scopes are all writable
//!   scopes distinguished by their [`ScopeKind`]
//! - [`Scope::Lazy`] - a namespace member scope whose names are materialized
//!   on demand by the lazy analysis session
//!
//! # Lookup
//!
//! ```text
//! file scope
//!   imports: [aliases] [own namespace] [a.*] [lang.*] [root namespace]
//!               │            │          ...
//!               ▼            ▼
//!           alias tables   namespace member scope ── imports: dependency
//!                                                    namespace of same FQ name
//! ```
//!
//! Lookups check own bindings, then imports in list order, then the parent
//! scope. See [`ReadScope`] for the per-kind merge rules.
//!
//! Scopes never own descriptors; they hold [`DescriptorId`]s.
//!
//! [`DescriptorId`]: crate::descriptors::DescriptorId

mod arena;
mod bindings;
mod lazy;
mod lock;
mod read;
mod writable;

pub use arena::ScopeArena;
pub use bindings::{Redeclaration, RedeclarationHandler};
pub use lazy::LazyMemberScope;
pub use lock::LockLevel;
pub use read::{
    ReadScope, ScopeRef, first_classifier, first_local_variable, process_namespaces_in,
    receivers_of, union_functions, union_properties,
};
pub use writable::WritableScope;

/// Handle into a [`ScopeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The empty scope every arena starts with.
    pub const EMPTY: ScopeId = ScopeId(0);

    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

/// What a writable scope is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    NamespaceMembers,
    ClassMembers,
    /// Type parameters and receiver of a class over its member scope.
    ClassResolution,
    /// Type and value parameters of a function.
    FunctionSignature,
    Block,
    File,
    IndividualImports,
    Builtins,
}

#[derive(Debug)]
pub enum Scope {
    Empty,
    Writable(WritableScope),
    Lazy(LazyMemberScope),
}
