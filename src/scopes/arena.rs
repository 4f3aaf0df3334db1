//! Arena owning every scope of an analysis run.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use crate::base::Name;
use crate::descriptors::DescriptorId;
use crate::error::ResolveError;

use super::bindings::{Redeclaration, RedeclarationHandler};
use super::lazy::LazyMemberScope;
use super::lock::LockLevel;
use super::read::{ReadScope, ScopeRef};
use super::writable::WritableScope;
use super::{Scope, ScopeId, ScopeKind};

/// Owns scopes; scopes refer to each other by [`ScopeId`].
///
/// Slot 0 always holds [`Scope::Empty`] ([`ScopeId::EMPTY`]).
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::Empty],
        }
    }

    pub fn alloc(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index() as usize]
    }

    fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index() as usize]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.len() <= 1
    }

    pub fn debug_name(&self, id: ScopeId) -> String {
        match self.get(id) {
            Scope::Empty => "<empty>".to_string(),
            Scope::Writable(scope) => scope.debug_name().to_string(),
            Scope::Lazy(scope) => scope.debug_name().to_string(),
        }
    }

    pub fn lock_level(&self, id: ScopeId) -> Option<LockLevel> {
        match self.get(id) {
            Scope::Writable(scope) => Some(scope.lock_level()),
            _ => None,
        }
    }

    pub(crate) fn lazy_mut(&mut self, id: ScopeId) -> Option<&mut LazyMemberScope> {
        match self.get_mut(id) {
            Scope::Lazy(scope) => Some(scope),
            _ => None,
        }
    }

    fn writable_mut(&mut self, id: ScopeId) -> Result<&mut WritableScope, ResolveError> {
        match self.get_mut(id) {
            Scope::Writable(scope) => Ok(scope),
            Scope::Empty => Err(ResolveError::write_not_permitted("<empty>", LockLevel::Reading)),
            Scope::Lazy(scope) => Err(ResolveError::write_not_permitted(
                scope.debug_name(),
                LockLevel::Reading,
            )),
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn reader(&self, id: ScopeId) -> ScopeRef<'_> {
        ScopeRef::new(self, id)
    }

    pub fn classifier(
        &self,
        id: ScopeId,
        name: &Name,
    ) -> Result<Option<DescriptorId>, ResolveError> {
        self.reader(id).classifier(name)
    }

    pub fn local_variable(
        &self,
        id: ScopeId,
        name: &Name,
    ) -> Result<Option<DescriptorId>, ResolveError> {
        self.reader(id).local_variable(name)
    }

    pub fn functions(
        &self,
        id: ScopeId,
        name: &Name,
    ) -> Result<IndexSet<DescriptorId>, ResolveError> {
        let mut out = IndexSet::new();
        self.reader(id).collect_functions(name, &mut out)?;
        Ok(out)
    }

    pub fn properties(
        &self,
        id: ScopeId,
        name: &Name,
    ) -> Result<IndexSet<DescriptorId>, ResolveError> {
        let mut out = IndexSet::new();
        self.reader(id).collect_properties(name, &mut out)?;
        Ok(out)
    }

    pub fn process_namespaces(
        &self,
        id: ScopeId,
        name: &Name,
        visitor: &mut dyn FnMut(DescriptorId) -> bool,
    ) -> Result<bool, ResolveError> {
        self.reader(id).process_namespaces(name, visitor)
    }

    /// The first namespace named `name`.
    pub fn namespace(
        &self,
        id: ScopeId,
        name: &Name,
    ) -> Result<Option<DescriptorId>, ResolveError> {
        let mut found = None;
        self.process_namespaces(id, name, &mut |namespace| {
            found = Some(namespace);
            false
        })?;
        Ok(found)
    }

    /// Every namespace named `name`, in lookup order.
    pub fn namespaces(&self, id: ScopeId, name: &Name) -> Result<Vec<DescriptorId>, ResolveError> {
        let mut found = Vec::new();
        self.process_namespaces(id, name, &mut |namespace| {
            if !found.contains(&namespace) {
                found.push(namespace);
            }
            true
        })?;
        Ok(found)
    }

    pub fn implicit_receivers(&self, id: ScopeId) -> Result<Vec<DescriptorId>, ResolveError> {
        let mut out = Vec::new();
        self.reader(id).collect_implicit_receivers(&mut out)?;
        Ok(out)
    }

    /// Descriptors bound directly in `id`, ignoring imports and parents.
    pub fn own_descriptors(&self, id: ScopeId) -> Vec<DescriptorId> {
        match self.get(id) {
            Scope::Empty => Vec::new(),
            Scope::Writable(scope) => scope.bindings.all(),
            Scope::Lazy(scope) => scope.bindings.all(),
        }
    }

    /// `id` and every scope a lookup in it may reach, breadth first.
    pub fn lookup_chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut seen = FxHashSet::default();
        let mut chain = Vec::new();
        let mut queue = std::collections::VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            chain.push(current);
            match self.get(current) {
                Scope::Empty => {}
                Scope::Writable(scope) => {
                    queue.extend(scope.imports().iter().copied());
                    queue.push_back(scope.parent());
                }
                Scope::Lazy(scope) => queue.extend(scope.imports().iter().copied()),
            }
        }
        chain
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Lazy and empty scopes have no lock level; changes to them are ignored.
    pub fn change_lock_level(&mut self, id: ScopeId, level: LockLevel) -> Result<(), ResolveError> {
        match self.get_mut(id) {
            Scope::Writable(scope) => scope.change_lock_level(level),
            Scope::Empty | Scope::Lazy(_) => Ok(()),
        }
    }

    pub fn add_classifier(
        &mut self,
        id: ScopeId,
        name: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        match self.get_mut(id) {
            Scope::Lazy(scope) => {
                scope.add_classifier(name, descriptor);
                Ok(())
            }
            _ => self.writable_mut(id)?.add_classifier(name, descriptor),
        }
    }

    pub fn add_function(
        &mut self,
        id: ScopeId,
        name: Name,
        descriptor: DescriptorId,
        arity: usize,
    ) -> Result<(), ResolveError> {
        match self.get_mut(id) {
            Scope::Lazy(scope) => {
                scope.add_function(name, descriptor, arity);
                Ok(())
            }
            _ => self.writable_mut(id)?.add_function(name, descriptor, arity),
        }
    }

    pub fn add_property(
        &mut self,
        id: ScopeId,
        name: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        match self.get_mut(id) {
            Scope::Lazy(scope) => {
                scope.add_property(name, descriptor);
                Ok(())
            }
            _ => self.writable_mut(id)?.add_property(name, descriptor),
        }
    }

    pub fn add_namespace(
        &mut self,
        id: ScopeId,
        name: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        match self.get_mut(id) {
            Scope::Lazy(scope) => {
                scope.add_namespace(name, descriptor);
                Ok(())
            }
            _ => self.writable_mut(id)?.add_namespace(name, descriptor),
        }
    }

    /// Local variables only live in writable scopes.
    pub fn add_variable(
        &mut self,
        id: ScopeId,
        name: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        self.writable_mut(id)?.add_variable(name, descriptor)
    }

    pub fn take_redeclarations(&mut self, id: ScopeId) -> Vec<Redeclaration> {
        match self.get_mut(id) {
            Scope::Empty => Vec::new(),
            Scope::Writable(scope) => scope.take_redeclarations(),
            Scope::Lazy(scope) => scope.take_redeclarations(),
        }
    }

    // ========================================================================
    // IMPORTS
    // ========================================================================

    /// Prepend `imported` to `target`'s import list, so it shadows every
    /// scope imported before it.
    pub fn import_scope(&mut self, target: ScopeId, imported: ScopeId) -> Result<(), ResolveError> {
        if target == imported {
            return Err(ResolveError::self_import(self.debug_name(target)));
        }
        match self.get_mut(target) {
            Scope::Lazy(scope) => {
                scope.prepend_import(imported);
                Ok(())
            }
            _ => self.writable_mut(target)?.prepend_import(imported),
        }
    }

    pub fn clear_imports(&mut self, target: ScopeId) -> Result<(), ResolveError> {
        self.writable_mut(target)?.clear_imports()
    }

    pub fn import_classifier_alias(
        &mut self,
        target: ScopeId,
        alias: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        let individual = self.individual_import_scope(target)?;
        self.writable_mut(individual)?.add_classifier(alias, descriptor)
    }

    pub fn import_namespace_alias(
        &mut self,
        target: ScopeId,
        alias: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        let individual = self.individual_import_scope(target)?;
        self.writable_mut(individual)?.add_namespace(alias, descriptor)
    }

    pub fn import_function_alias(
        &mut self,
        target: ScopeId,
        alias: Name,
        descriptor: DescriptorId,
        arity: usize,
    ) -> Result<(), ResolveError> {
        let individual = self.individual_import_scope(target)?;
        self.writable_mut(individual)?.add_function(alias, descriptor, arity)
    }

    /// Alias for a property (a non-local variable).
    pub fn import_variable_alias(
        &mut self,
        target: ScopeId,
        alias: Name,
        descriptor: DescriptorId,
    ) -> Result<(), ResolveError> {
        let individual = self.individual_import_scope(target)?;
        self.writable_mut(individual)?.add_property(alias, descriptor)
    }

    /// The scope holding `target`'s single-name aliases, created and
    /// imported on first use.
    fn individual_import_scope(&mut self, target: ScopeId) -> Result<ScopeId, ResolveError> {
        let scope = self.writable_mut(target)?;
        scope.check_may_write()?;
        if let Some(existing) = scope.individual_imports {
            return Ok(existing);
        }
        let owner = scope.owner();
        let mut individual = WritableScope::new(
            ScopeKind::IndividualImports,
            "individual import scope",
            owner,
            ScopeId::EMPTY,
        )
        .with_handler(RedeclarationHandler::Overwrite);
        individual.change_lock_level(LockLevel::Both)?;
        let id = self.alloc(Scope::Writable(individual));
        self.import_scope(target, id)?;
        self.writable_mut(target)?.individual_imports = Some(id);
        Ok(id)
    }
}
