//! Per-run state shared by the eager and lazy strategies.
//!
//! Both strategies drive the same declaration, import and reference
//! resolution code over an [`AnalysisState`]. The only difference is
//! [`AnalysisState::prepare_lookup`]: in lazy mode it materializes whatever a
//! lookup is about to read, in eager mode everything already exists.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{FileId, FqName, Name, NodeId};
use crate::descriptors::DescriptorId;
use crate::error::AnalysisError;
use crate::scopes::{Scope, ScopeId, ScopeKind, WritableScope};
use crate::syntax::{Declaration, SourceFile};

use super::config::ModuleInfo;
use super::context::GlobalContext;
use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::index::ModuleIndex;
use super::trace::{BindingContext, BindingTrace};

pub(crate) struct AnalysisState<'a> {
    pub(crate) ctx: &'a mut GlobalContext,
    pub(crate) info: &'a ModuleInfo,
    pub(crate) files: Vec<Arc<SourceFile>>,
    pub(crate) module: DescriptorId,
    pub(crate) root: DescriptorId,
    pub(crate) trace: BindingTrace,
    /// Present in lazy mode.
    pub(crate) index: Option<ModuleIndex>,
    pub(crate) namespaces: FxHashMap<FqName, DescriptorId>,
    pub(crate) file_scopes: FxHashMap<FileId, ScopeId>,
    pub(crate) scope_files: FxHashMap<ScopeId, FileId>,
    pub(crate) files_in_progress: FxHashSet<FileId>,
    /// Top-level declarations and imports taken out by syntax errors.
    pub(crate) skipped: FxHashSet<NodeId>,
    pub(crate) syntax: FxHashMap<DescriptorId, Arc<Declaration>>,
    /// Scope a declaration's signature and initializer are resolved in.
    pub(crate) lexical: FxHashMap<DescriptorId, ScopeId>,
    pub(crate) signature_scopes: FxHashMap<DescriptorId, ScopeId>,
    pub(crate) signatures_done: FxHashSet<DescriptorId>,
    pub(crate) bodies_done: FxHashSet<DescriptorId>,
}

impl<'a> AnalysisState<'a> {
    pub(crate) fn new(
        ctx: &'a mut GlobalContext,
        info: &'a ModuleInfo,
        files: &[Arc<SourceFile>],
        trace: BindingTrace,
        lazy: bool,
    ) -> Result<Self, AnalysisError> {
        let module = ctx.descriptors.create_module(
            info.module_name(),
            info.default_imports().to_vec(),
            info.platform_classes().clone(),
        )?;
        let index = lazy.then(|| ctx.indexer.index_module(files));
        let mut state = Self {
            ctx,
            info,
            files: files.to_vec(),
            module,
            root: module,
            trace,
            index,
            namespaces: FxHashMap::default(),
            file_scopes: FxHashMap::default(),
            scope_files: FxHashMap::default(),
            files_in_progress: FxHashSet::default(),
            skipped: FxHashSet::default(),
            syntax: FxHashMap::default(),
            lexical: FxHashMap::default(),
            signature_scopes: FxHashMap::default(),
            signatures_done: FxHashSet::default(),
            bodies_done: FxHashSet::default(),
        };
        state.record_syntax_errors();
        state.root = state.create_namespace(None, FqName::root())?;
        state.create_file_scopes();
        Ok(state)
    }

    pub(crate) fn is_lazy(&self) -> bool {
        self.index.is_some()
    }

    /// Freeze the trace. The module descriptor and its context are the
    /// result of the run.
    pub(crate) fn finish(self) -> (DescriptorId, Arc<BindingContext>) {
        (self.module, self.trace.freeze())
    }

    /// Files whose declarations take part in the analysis.
    pub(crate) fn usable_files(&self) -> Vec<Arc<SourceFile>> {
        self.files
            .iter()
            .filter(|file| !self.skipped.contains(&file.node))
            .cloned()
            .collect()
    }

    // ========================================================================
    // SYNTAX ERRORS
    // ========================================================================

    /// Bind every node made unusable by a syntax error to a diagnostic, so
    /// the trace stays total without resolving malformed syntax.
    fn record_syntax_errors(&mut self) {
        let files = self.files.clone();
        for file in &files {
            let damage = file.damage();
            if let Some(message) = &damage.broken {
                debug!("[SYNTAX] {} skipped: {}", file.path, message);
                self.skipped.insert(file.node);
                for node in file.nodes() {
                    self.report_syntax(node, message);
                }
                continue;
            }
            for (node, message) in &damage.imports {
                self.skipped.insert(*node);
                self.report_syntax(*node, message);
            }
            for declaration in &file.declarations {
                let Some((_, message)) = damage
                    .declarations
                    .iter()
                    .find(|(node, _)| *node == declaration.node)
                else {
                    continue;
                };
                debug!("[SYNTAX] {}: skipping `{}`", file.path, declaration.name);
                self.skipped.insert(declaration.node);
                let mut nodes = Vec::new();
                declaration.collect_nodes(&mut nodes);
                for node in nodes {
                    self.report_syntax(node, message);
                }
            }
        }
    }

    fn report_syntax(&mut self, node: NodeId, message: &SmolStr) {
        self.trace.report(Diagnostic::new(
            node,
            DiagnosticKind::SyntaxError {
                message: message.clone(),
            },
        ));
    }

    /// One writable shell per usable file, filled once its imports resolve.
    fn create_file_scopes(&mut self) {
        for file in self.usable_files() {
            let scope = self.ctx.scopes.alloc(Scope::Writable(WritableScope::new(
                ScopeKind::File,
                format!("file scope for {}", file.path),
                self.module,
                ScopeId::EMPTY,
            )));
            self.file_scopes.insert(file.id, scope);
            self.scope_files.insert(scope, file.id);
        }
    }

    // ========================================================================
    // TRACE HELPERS
    // ========================================================================

    /// Bind `node` to `target`, or record it as unresolved.
    pub(crate) fn bind(&mut self, node: NodeId, target: Option<DescriptorId>, name: &Name) {
        match target {
            Some(descriptor) => self.trace.record_reference(node, descriptor),
            None => self.unresolved(node, name),
        }
    }

    pub(crate) fn unresolved(&mut self, node: NodeId, name: &Name) {
        self.trace.report(Diagnostic::unresolved(node, name.clone()));
    }

    pub(crate) fn report(&mut self, node: NodeId, kind: DiagnosticKind) {
        self.trace.report(Diagnostic::new(node, kind));
    }

    /// Turn pending redeclarations of `scope` into diagnostics on the
    /// conflicting declarations.
    pub(crate) fn drain_redeclarations(&mut self, scope: ScopeId) {
        for redeclaration in self.ctx.scopes.take_redeclarations(scope) {
            let Some(node) = self.trace.context().declaration_node(redeclaration.conflicting) else {
                continue;
            };
            self.report(
                node,
                DiagnosticKind::Redeclaration {
                    name: redeclaration.name,
                    existing: redeclaration.existing,
                },
            );
        }
    }

    // ========================================================================
    // LOOKUP PREPARATION
    // ========================================================================

    /// Make sure a lookup of `name` starting at `scope` reads complete
    /// scopes. No-op in eager mode.
    pub(crate) fn prepare_lookup(
        &mut self,
        scope: ScopeId,
        name: &Name,
    ) -> Result<(), AnalysisError> {
        if !self.is_lazy() {
            return Ok(());
        }
        self.prepare_lazy_lookup(scope, name)
    }

    /// Member scope of a namespace or class descriptor.
    pub(crate) fn member_scope(&self, container: DescriptorId) -> Option<ScopeId> {
        self.ctx.descriptors.get(container).member_scope()
    }
}
