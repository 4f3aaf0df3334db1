//! Member scopes populated on demand.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::Name;
use crate::descriptors::DescriptorId;

use super::ScopeId;
use super::bindings::{Bindings, Redeclaration, RedeclarationHandler};

/// A namespace member scope whose bindings are materialized name by name.
///
/// The scope itself never resolves anything: the owner of the scope (the
/// lazy analysis session) materializes a name before looking it up. Bindings
/// only grow. There is no lock level; readers only see names that were
/// completely materialized.
#[derive(Debug)]
pub struct LazyMemberScope {
    debug_name: SmolStr,
    owner: DescriptorId,
    pub(super) bindings: Bindings,
    imports: Vec<ScopeId>,
    forced: FxHashSet<Name>,
    complete: bool,
}

impl LazyMemberScope {
    pub fn new(debug_name: impl Into<SmolStr>, owner: DescriptorId) -> Self {
        Self {
            debug_name: debug_name.into(),
            owner,
            bindings: Bindings::new(RedeclarationHandler::Report),
            imports: Vec::new(),
            forced: FxHashSet::default(),
            complete: false,
        }
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub fn owner(&self) -> DescriptorId {
        self.owner
    }

    pub fn imports(&self) -> &[ScopeId] {
        &self.imports
    }

    pub(super) fn prepend_import(&mut self, scope: ScopeId) {
        self.imports.insert(0, scope);
    }

    /// Claim `name` for materialization. `false` if it was already claimed
    /// or the scope is complete, in which case nothing needs to be done.
    pub fn begin_materialize(&mut self, name: &Name) -> bool {
        if self.complete {
            return false;
        }
        self.forced.insert(name.clone())
    }

    pub fn is_materialized(&self, name: &Name) -> bool {
        self.complete || self.forced.contains(name)
    }

    /// Every name has been materialized.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn add_classifier(&mut self, name: Name, id: DescriptorId) {
        self.bindings.add_classifier(name, id);
    }

    pub fn add_function(&mut self, name: Name, id: DescriptorId, arity: usize) {
        self.bindings.add_function(name, id, arity);
    }

    pub fn add_property(&mut self, name: Name, id: DescriptorId) {
        self.bindings.add_property(name, id);
    }

    pub fn add_namespace(&mut self, name: Name, id: DescriptorId) {
        self.bindings.add_namespace(name, id);
    }

    pub fn take_redeclarations(&mut self) -> Vec<Redeclaration> {
        self.bindings.take_redeclarations()
    }
}
