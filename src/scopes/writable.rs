//! Writable scopes: populated during analysis, then frozen for lookup.

use std::sync::OnceLock;

use smol_str::SmolStr;
use tracing::trace;

use crate::base::Name;
use crate::descriptors::DescriptorId;
use crate::error::ResolveError;

use super::bindings::{Bindings, Redeclaration, RedeclarationHandler};
use super::lock::LockLevel;
use super::{ScopeId, ScopeKind};

/// A scope built in place by the analyzer.
///
/// Holds its own binding tables, an import list (most recently imported
/// first), an optional parent scope consulted last, and an optional implicit
/// receiver. Every read and write is gated by the [`LockLevel`].
#[derive(Debug)]
pub struct WritableScope {
    kind: ScopeKind,
    debug_name: SmolStr,
    owner: DescriptorId,
    parent: ScopeId,
    lock: LockLevel,
    pub(super) bindings: Bindings,
    receiver: Option<DescriptorId>,
    imports: Vec<ScopeId>,
    pub(super) individual_imports: Option<ScopeId>,
    receivers_cache: OnceLock<Vec<DescriptorId>>,
}

impl WritableScope {
    pub fn new(
        kind: ScopeKind,
        debug_name: impl Into<SmolStr>,
        owner: DescriptorId,
        parent: ScopeId,
    ) -> Self {
        Self {
            kind,
            debug_name: debug_name.into(),
            owner,
            parent,
            lock: LockLevel::Writing,
            bindings: Bindings::new(RedeclarationHandler::Report),
            receiver: None,
            imports: Vec::new(),
            individual_imports: None,
            receivers_cache: OnceLock::new(),
        }
    }

    pub fn with_handler(mut self, handler: RedeclarationHandler) -> Self {
        self.bindings = Bindings::new(handler);
        self
    }

    pub fn with_receiver(mut self, receiver: DescriptorId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    /// The declaration this scope belongs to.
    pub fn owner(&self) -> DescriptorId {
        self.owner
    }

    pub fn parent(&self) -> ScopeId {
        self.parent
    }

    pub fn lock_level(&self) -> LockLevel {
        self.lock
    }

    pub fn receiver(&self) -> Option<DescriptorId> {
        self.receiver
    }

    /// Imported scopes in lookup order.
    pub fn imports(&self) -> &[ScopeId] {
        &self.imports
    }

    // ========================================================================
    // LOCK DISCIPLINE
    // ========================================================================

    pub fn check_may_read(&self) -> Result<(), ResolveError> {
        if self.lock.may_read() {
            Ok(())
        } else {
            Err(ResolveError::read_not_permitted(self.debug_name.as_str(), self.lock))
        }
    }

    pub fn check_may_write(&self) -> Result<(), ResolveError> {
        if self.lock.may_write() {
            Ok(())
        } else {
            Err(ResolveError::write_not_permitted(self.debug_name.as_str(), self.lock))
        }
    }

    /// Move the lock level forward. Staying put is allowed.
    pub fn change_lock_level(&mut self, level: LockLevel) -> Result<(), ResolveError> {
        if level < self.lock {
            return Err(ResolveError::LockLevelLowered {
                scope: self.debug_name.to_string(),
                from: self.lock,
                to: level,
            });
        }
        if level != self.lock {
            trace!("[SCOPE] {}: {} -> {}", self.debug_name, self.lock, level);
        }
        self.lock = level;
        Ok(())
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    pub fn add_classifier(&mut self, name: Name, id: DescriptorId) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.bindings.add_classifier(name, id);
        Ok(())
    }

    pub fn add_function(
        &mut self,
        name: Name,
        id: DescriptorId,
        arity: usize,
    ) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.bindings.add_function(name, id, arity);
        Ok(())
    }

    pub fn add_property(&mut self, name: Name, id: DescriptorId) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.bindings.add_property(name, id);
        Ok(())
    }

    pub fn add_variable(&mut self, name: Name, id: DescriptorId) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.bindings.add_variable(name, id);
        Ok(())
    }

    pub fn add_namespace(&mut self, name: Name, id: DescriptorId) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.bindings.add_namespace(name, id);
        Ok(())
    }

    /// Prepend `scope` to the import list. The self-import check needs the
    /// arena, see [`ScopeArena::import_scope`](super::ScopeArena::import_scope).
    pub(super) fn prepend_import(&mut self, scope: ScopeId) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.imports.insert(0, scope);
        // Aliases added from now on must shadow this import too.
        self.individual_imports = None;
        Ok(())
    }

    pub fn clear_imports(&mut self) -> Result<(), ResolveError> {
        self.check_may_write()?;
        self.imports.clear();
        self.individual_imports = None;
        Ok(())
    }

    pub fn take_redeclarations(&mut self) -> Vec<Redeclaration> {
        self.bindings.take_redeclarations()
    }

    // ========================================================================
    // RECEIVER CACHE
    // ========================================================================

    pub(super) fn cached_receivers(&self) -> Option<&[DescriptorId]> {
        self.receivers_cache.get().map(Vec::as_slice)
    }

    /// Remember the receiver hierarchy once the scope is frozen.
    pub(super) fn cache_receivers(&self, hierarchy: &[DescriptorId]) {
        if self.lock == LockLevel::Reading {
            let _ = self.receivers_cache.set(hierarchy.to_vec());
        }
    }
}
