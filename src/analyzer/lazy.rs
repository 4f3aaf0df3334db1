//! Lazy resolution: namespaces and declarations materialize on first lookup.
//!
//! Before any lookup reads a scope chain, [`AnalysisState::prepare_lookup`]
//! lands here:
//!
//! 1. a file scope in the chain whose imports are not resolved yet gets them
//!    resolved first, and the chain is recomputed
//! 2. every lazy namespace scope of this module in the chain materializes the
//!    looked-up name: the child namespace and all declarations of that name,
//!    in file order
//!
//! Materializing never resolves signatures; those stay on demand as well.
//! [`LazySession`] exposes the on-demand queries; [`LazyStrategy`] forces
//! everything so the final trace matches the eager one.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::base::{FileId, FqName, Name};
use crate::descriptors::DescriptorId;
use crate::error::AnalysisError;
use crate::scopes::{LockLevel, Scope, ScopeId};
use crate::syntax::SourceFile;

use super::config::ModuleInfo;
use super::context::GlobalContext;
use super::facade::{AnalyzeExhaust, ResolutionStrategy};
use super::state::AnalysisState;
use super::trace::{BindingContext, BindingTrace};

impl AnalysisState<'_> {
    pub(crate) fn prepare_lazy_lookup(
        &mut self,
        scope: ScopeId,
        name: &Name,
    ) -> Result<(), AnalysisError> {
        loop {
            let chain = self.ctx.scopes.lookup_chain(scope);
            if let Some(file) = self.pending_file_in(&chain) {
                self.ensure_file_scope(file)?;
                continue;
            }
            for id in chain {
                let owner = match self.ctx.scopes.get(id) {
                    Scope::Lazy(lazy) if !lazy.is_complete() => lazy.owner(),
                    _ => continue,
                };
                let Some(fq_name) = self.own_namespace_fq(owner) else {
                    continue;
                };
                self.materialize(id, &fq_name, name)?;
            }
            return Ok(());
        }
    }

    /// A file scope in `chain` still waiting for its imports.
    fn pending_file_in(&self, chain: &[ScopeId]) -> Option<FileId> {
        chain.iter().find_map(|scope| {
            let file = self.scope_files.get(scope)?;
            let pending = self.ctx.scopes.lock_level(*scope) == Some(LockLevel::Writing)
                && !self.files_in_progress.contains(file);
            pending.then_some(*file)
        })
    }

    /// FQ name of `owner` if it is one of this module's namespaces.
    fn own_namespace_fq(&self, owner: DescriptorId) -> Option<FqName> {
        let fq_name = self.ctx.descriptors.get(owner).as_namespace()?.fq_name.clone();
        (self.namespaces.get(&fq_name) == Some(&owner)).then_some(fq_name)
    }

    /// Bring `name` into the lazy member scope of namespace `fq_name`.
    fn materialize(
        &mut self,
        scope: ScopeId,
        fq_name: &FqName,
        name: &Name,
    ) -> Result<(), AnalysisError> {
        let Some(lazy) = self.ctx.scopes.lazy_mut(scope) else {
            return Ok(());
        };
        if !lazy.begin_materialize(name) {
            return Ok(());
        }
        let (Some(index), Some(namespace)) = (&self.index, self.namespaces.get(fq_name).copied()) else {
            return Ok(());
        };
        let has_child = index.has_child_namespace(fq_name, name);
        let declarations = index.declarations_named(fq_name, name);
        trace!(
            "[LAZY] {}::{} ({} declarations)",
            fq_name,
            name,
            declarations.len()
        );

        let child = fq_name.child(name.clone());
        if has_child && !self.namespaces.contains_key(&child) {
            self.create_namespace(Some(namespace), child)?;
        }
        for (file, declaration) in declarations {
            let Some(lexical) = self.file_scopes.get(&file).copied() else {
                continue;
            };
            self.declare(&declaration, namespace, scope, lexical)?;
        }
        Ok(())
    }

    /// This module's namespace at `fq_name`, materializing its ancestors.
    /// `None` when no file of the module declares it.
    pub(crate) fn lazy_namespace(
        &mut self,
        fq_name: &FqName,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        if let Some(namespace) = self.namespaces.get(fq_name) {
            return Ok(Some(*namespace));
        }
        let (Some(parent_fq), Some(short)) = (fq_name.parent(), fq_name.short_name().cloned()) else {
            return Ok(None);
        };
        let Some(parent) = self.lazy_namespace(&parent_fq)? else {
            return Ok(None);
        };
        let scope = self.ctx.descriptors.namespace_scope(parent)?;
        self.materialize(scope, &parent_fq, &short)?;
        Ok(self.namespaces.get(fq_name).copied())
    }

    /// Resolve the imports of `file` unless that already started.
    fn ensure_file_scope(&mut self, file: FileId) -> Result<(), AnalysisError> {
        if !self.files_in_progress.insert(file) {
            return Ok(());
        }
        let Some(source) = self.files.iter().find(|f| f.id == file).cloned() else {
            return Ok(());
        };
        self.resolve_file_imports(&source)
    }

    /// Materialize every namespace and name, then resolve every file scope,
    /// signature and body.
    pub(crate) fn force_resolve_all(&mut self) -> Result<(), AnalysisError> {
        let namespaces = match &self.index {
            Some(index) => index.namespaces(),
            None => return Ok(()),
        };
        for fq_name in namespaces {
            let Some(namespace) = self.lazy_namespace(&fq_name)? else {
                continue;
            };
            let scope = self.ctx.descriptors.namespace_scope(namespace)?;
            let names = self
                .index
                .as_ref()
                .map(|index| index.names_in(&fq_name))
                .unwrap_or_default();
            for name in &names {
                self.materialize(scope, &fq_name, name)?;
            }
            if let Some(lazy) = self.ctx.scopes.lazy_mut(scope) {
                lazy.mark_complete();
            }
        }
        for file in self.usable_files() {
            self.ensure_file_scope(file.id)?;
        }
        for id in self.declared() {
            self.resolve_signature(id)?;
        }
        for id in self.declared() {
            self.resolve_body(id)?;
        }
        debug!(
            "[LAZY] {}: forced {} declarations",
            self.info.name(),
            self.syntax.len()
        );
        Ok(())
    }
}

// ============================================================================
// STRATEGY
// ============================================================================

/// Lazy analysis forced to completion.
#[derive(Debug, Default)]
pub(crate) struct LazyStrategy;

impl ResolutionStrategy for LazyStrategy {
    fn resolve(&self, state: &mut AnalysisState<'_>) -> Result<(), AnalysisError> {
        state.force_resolve_all()
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// A lazy analysis run answering queries on demand.
///
/// Nothing is declared up front. Each query materializes what its lookups
/// touch; [`finish`](Self::finish) forces the rest and publishes the result
/// on the module.
pub struct LazySession<'a> {
    state: AnalysisState<'a>,
}

impl<'a> LazySession<'a> {
    pub fn new(
        ctx: &'a mut GlobalContext,
        info: &'a ModuleInfo,
        files: &[Arc<SourceFile>],
    ) -> Result<Self, AnalysisError> {
        info.check_dependencies()?;
        let trace = BindingTrace::new();
        let state = AnalysisState::new(ctx, info, files, trace, true)?;
        Ok(Self { state })
    }

    pub fn module(&self) -> DescriptorId {
        self.state.module
    }

    pub fn global(&self) -> &GlobalContext {
        &*self.state.ctx
    }

    /// The trace recorded so far.
    pub fn context(&self) -> &BindingContext {
        self.state.trace.context()
    }

    /// Descriptors declared so far, in allocation order.
    pub fn declared(&self) -> Vec<DescriptorId> {
        self.state.declared()
    }

    pub fn resolve_namespace(
        &mut self,
        fq_name: &FqName,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        self.state.lazy_namespace(fq_name)
    }

    /// Classifier `name` as seen from the member scope of namespace
    /// `namespace`, dependencies included.
    pub fn resolve_classifier(
        &mut self,
        namespace: &FqName,
        name: &Name,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        let Some(scope) = self.namespace_scope(namespace)? else {
            return Ok(None);
        };
        self.state.prepare_lookup(scope, name)?;
        Ok(self.state.ctx.scopes.classifier(scope, name)?)
    }

    pub fn resolve_functions(
        &mut self,
        namespace: &FqName,
        name: &Name,
    ) -> Result<Vec<DescriptorId>, AnalysisError> {
        let Some(scope) = self.namespace_scope(namespace)? else {
            return Ok(Vec::new());
        };
        self.state.prepare_lookup(scope, name)?;
        Ok(self.state.ctx.scopes.functions(scope, name)?.into_iter().collect())
    }

    /// Resolve the signature and body of a declared descriptor.
    pub fn resolve_declaration(&mut self, id: DescriptorId) -> Result<(), AnalysisError> {
        self.state.resolve_signature(id)?;
        self.state.resolve_body(id)
    }

    pub fn force_resolve_all(&mut self) -> Result<(), AnalysisError> {
        self.state.force_resolve_all()
    }

    /// Force everything and publish the trace on the module.
    pub fn finish(mut self) -> Result<AnalyzeExhaust, AnalysisError> {
        self.state.force_resolve_all()?;
        let info = self.state.info;
        let (module, context) = self.state.finish();
        info.set_analyzed(module, context.clone())?;
        Ok(AnalyzeExhaust { module, context })
    }

    fn namespace_scope(&mut self, namespace: &FqName) -> Result<Option<ScopeId>, AnalysisError> {
        match self.state.lazy_namespace(namespace)? {
            Some(id) => Ok(Some(self.state.ctx.descriptors.namespace_scope(id)?)),
            None => Ok(None),
        }
    }
}
