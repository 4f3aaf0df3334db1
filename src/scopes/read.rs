//! The read capability and the import-delegation helpers.
//!
//! Every populated scope answers a lookup the same way:
//!
//! ```text
//! own bindings ──► imported scopes (most recent first) ──► parent scope
//! ```
//!
//! Classifiers and local variables stop at the first match. Functions and
//! properties are overloadable, so their candidates are unioned over the
//! whole chain into an order-preserving set.

use indexmap::IndexSet;

use crate::base::Name;
use crate::descriptors::DescriptorId;
use crate::error::ResolveError;

use super::arena::ScopeArena;
use super::bindings::Bindings;
use super::{Scope, ScopeId};

/// Name lookup by kind.
pub trait ReadScope {
    fn classifier(&self, name: &Name) -> Result<Option<DescriptorId>, ResolveError>;

    fn local_variable(&self, name: &Name) -> Result<Option<DescriptorId>, ResolveError>;

    fn collect_functions(
        &self,
        name: &Name,
        out: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError>;

    fn collect_properties(
        &self,
        name: &Name,
        out: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError>;

    /// Offer every namespace named `name` to `visitor` until it returns
    /// `false`. Returns `false` if the search was stopped.
    fn process_namespaces(
        &self,
        name: &Name,
        visitor: &mut dyn FnMut(DescriptorId) -> bool,
    ) -> Result<bool, ResolveError>;

    /// Implicit receivers, innermost first.
    fn collect_implicit_receivers(&self, out: &mut Vec<DescriptorId>) -> Result<(), ResolveError>;
}

// ============================================================================
// IMPORT DELEGATION
// ============================================================================

pub fn first_classifier<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    name: &Name,
) -> Result<Option<DescriptorId>, ResolveError> {
    for scope in scopes {
        if let Some(found) = scope.classifier(name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

pub fn first_local_variable<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    name: &Name,
) -> Result<Option<DescriptorId>, ResolveError> {
    for scope in scopes {
        if let Some(found) = scope.local_variable(name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

pub fn union_functions<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    name: &Name,
    out: &mut IndexSet<DescriptorId>,
) -> Result<(), ResolveError> {
    for scope in scopes {
        scope.collect_functions(name, out)?;
    }
    Ok(())
}

pub fn union_properties<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    name: &Name,
    out: &mut IndexSet<DescriptorId>,
) -> Result<(), ResolveError> {
    for scope in scopes {
        scope.collect_properties(name, out)?;
    }
    Ok(())
}

pub fn process_namespaces_in<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    name: &Name,
    visitor: &mut dyn FnMut(DescriptorId) -> bool,
) -> Result<bool, ResolveError> {
    for scope in scopes {
        if !scope.process_namespaces(name, visitor)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn receivers_of<S: ReadScope>(
    scopes: impl IntoIterator<Item = S>,
    out: &mut Vec<DescriptorId>,
) -> Result<(), ResolveError> {
    for scope in scopes {
        scope.collect_implicit_receivers(out)?;
    }
    Ok(())
}

// ============================================================================
// SCOPE HANDLE
// ============================================================================

/// A scope id paired with the arena that resolves it.
#[derive(Clone, Copy, Debug)]
pub struct ScopeRef<'a> {
    arena: &'a ScopeArena,
    id: ScopeId,
}

/// The pieces of a populated scope a lookup walks through.
struct Layout<'a> {
    bindings: &'a Bindings,
    imports: &'a [ScopeId],
    parent: ScopeId,
    receiver: Option<DescriptorId>,
}

impl<'a> ScopeRef<'a> {
    pub(super) fn new(arena: &'a ScopeArena, id: ScopeId) -> Self {
        Self { arena, id }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// `None` for the empty scope. Fails if the scope is not read-ready.
    fn layout(&self) -> Result<Option<Layout<'a>>, ResolveError> {
        match self.arena.get(self.id) {
            Scope::Empty => Ok(None),
            Scope::Writable(scope) => {
                scope.check_may_read()?;
                Ok(Some(Layout {
                    bindings: &scope.bindings,
                    imports: scope.imports(),
                    parent: scope.parent(),
                    receiver: scope.receiver(),
                }))
            }
            Scope::Lazy(scope) => Ok(Some(Layout {
                bindings: &scope.bindings,
                imports: scope.imports(),
                parent: ScopeId::EMPTY,
                receiver: None,
            })),
        }
    }

    fn refs(&self, ids: &'a [ScopeId]) -> impl Iterator<Item = ScopeRef<'a>> + 'a {
        let arena = self.arena;
        ids.iter().map(move |id| ScopeRef::new(arena, *id))
    }
}

impl ReadScope for ScopeRef<'_> {
    fn classifier(&self, name: &Name) -> Result<Option<DescriptorId>, ResolveError> {
        let Some(layout) = self.layout()? else {
            return Ok(None);
        };
        if let Some(found) = layout.bindings.classifier(name) {
            return Ok(Some(found));
        }
        if let Some(found) = first_classifier(self.refs(layout.imports), name)? {
            return Ok(Some(found));
        }
        ScopeRef::new(self.arena, layout.parent).classifier(name)
    }

    fn local_variable(&self, name: &Name) -> Result<Option<DescriptorId>, ResolveError> {
        let Some(layout) = self.layout()? else {
            return Ok(None);
        };
        if let Some(found) = layout.bindings.variable(name) {
            return Ok(Some(found));
        }
        if let Some(found) = first_local_variable(self.refs(layout.imports), name)? {
            return Ok(Some(found));
        }
        ScopeRef::new(self.arena, layout.parent).local_variable(name)
    }

    fn collect_functions(
        &self,
        name: &Name,
        out: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        let Some(layout) = self.layout()? else {
            return Ok(());
        };
        layout.bindings.collect_functions(name, out);
        union_functions(self.refs(layout.imports), name, out)?;
        ScopeRef::new(self.arena, layout.parent).collect_functions(name, out)
    }

    fn collect_properties(
        &self,
        name: &Name,
        out: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        let Some(layout) = self.layout()? else {
            return Ok(());
        };
        layout.bindings.collect_properties(name, out);
        union_properties(self.refs(layout.imports), name, out)?;
        ScopeRef::new(self.arena, layout.parent).collect_properties(name, out)
    }

    fn process_namespaces(
        &self,
        name: &Name,
        visitor: &mut dyn FnMut(DescriptorId) -> bool,
    ) -> Result<bool, ResolveError> {
        let Some(layout) = self.layout()? else {
            return Ok(true);
        };
        if let Some(own) = layout.bindings.namespace(name) {
            if !visitor(own) {
                return Ok(false);
            }
        }
        if !process_namespaces_in(self.refs(layout.imports), name, visitor)? {
            return Ok(false);
        }
        ScopeRef::new(self.arena, layout.parent).process_namespaces(name, visitor)
    }

    fn collect_implicit_receivers(&self, out: &mut Vec<DescriptorId>) -> Result<(), ResolveError> {
        if let Scope::Writable(scope) = self.arena.get(self.id) {
            if let Some(cached) = scope.cached_receivers() {
                out.extend_from_slice(cached);
                return Ok(());
            }
        }
        let Some(layout) = self.layout()? else {
            return Ok(());
        };
        let mut hierarchy = Vec::new();
        hierarchy.extend(layout.receiver);
        receivers_of(self.refs(layout.imports), &mut hierarchy)?;
        ScopeRef::new(self.arena, layout.parent).collect_implicit_receivers(&mut hierarchy)?;
        if let Scope::Writable(scope) = self.arena.get(self.id) {
            scope.cache_receivers(&hierarchy);
        }
        out.extend(hierarchy);
        Ok(())
    }
}
