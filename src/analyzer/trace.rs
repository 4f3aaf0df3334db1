//! Binding trace, the analyzer's output.
//!
//! A [`BindingTrace`] is filled in while a module is analyzed and frozen
//! into a shareable [`BindingContext`] afterwards. Entries are append-only:
//! the first association recorded for a node stays.
//!
//! A trace may delegate reads to a parent context (a library analyzed
//! first). Writes always stay local, so the parent is never affected.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, FqName, NodeId};
use crate::descriptors::DescriptorId;

use super::diagnostics::{Diagnostic, DiagnosticSink};

/// Read-only view of a finished trace.
#[derive(Debug, Default)]
pub struct BindingContext {
    declarations: FxHashMap<NodeId, DescriptorId>,
    references: FxHashMap<NodeId, DescriptorId>,
    declaration_nodes: FxHashMap<DescriptorId, NodeId>,
    namespaces: IndexMap<FqName, DescriptorId>,
    file_namespaces: FxHashMap<FileId, DescriptorId>,
    label_targets: FxHashMap<NodeId, DescriptorId>,
    diagnostics: IndexMap<NodeId, Vec<Diagnostic>>,
    parent: Option<Arc<BindingContext>>,
}

impl BindingContext {
    pub fn parent(&self) -> Option<&Arc<BindingContext>> {
        self.parent.as_ref()
    }

    /// Descriptor declared by `node`.
    pub fn declaration(&self, node: NodeId) -> Option<DescriptorId> {
        self.declarations
            .get(&node)
            .copied()
            .or_else(|| self.parent.as_ref()?.declaration(node))
    }

    /// Descriptor `node` refers to.
    pub fn reference(&self, node: NodeId) -> Option<DescriptorId> {
        self.references
            .get(&node)
            .copied()
            .or_else(|| self.parent.as_ref()?.reference(node))
    }

    /// Declared or referenced descriptor of `node`.
    pub fn descriptor(&self, node: NodeId) -> Option<DescriptorId> {
        self.declaration(node).or_else(|| self.reference(node))
    }

    /// Declaration node of `descriptor`.
    pub fn declaration_node(&self, descriptor: DescriptorId) -> Option<NodeId> {
        self.declaration_nodes
            .get(&descriptor)
            .copied()
            .or_else(|| self.parent.as_ref()?.declaration_node(descriptor))
    }

    /// This module's namespace at `fq_name`.
    pub fn namespace(&self, fq_name: &FqName) -> Option<DescriptorId> {
        self.namespaces
            .get(fq_name)
            .copied()
            .or_else(|| self.parent.as_ref()?.namespace(fq_name))
    }

    /// Namespaces recorded locally, in creation order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&FqName, DescriptorId)> {
        self.namespaces.iter().map(|(fq, id)| (fq, *id))
    }

    pub fn file_namespace(&self, file: FileId) -> Option<DescriptorId> {
        self.file_namespaces
            .get(&file)
            .copied()
            .or_else(|| self.parent.as_ref()?.file_namespace(file))
    }

    /// Class a `this@Label` expression points at.
    pub fn label_target(&self, node: NodeId) -> Option<DescriptorId> {
        self.label_targets
            .get(&node)
            .copied()
            .or_else(|| self.parent.as_ref()?.label_target(node))
    }

    pub fn diagnostics_for(&self, node: NodeId) -> &[Diagnostic] {
        match self.diagnostics.get(&node) {
            Some(diagnostics) => diagnostics,
            None => match &self.parent {
                Some(parent) => parent.diagnostics_for(node),
                None => &[],
            },
        }
    }

    /// Local diagnostics in report order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.values().flatten()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(Diagnostic::is_error)
    }

    /// Whether `node` carries a descriptor or a diagnostic.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.descriptor(node).is_some() || !self.diagnostics_for(node).is_empty()
    }

    /// Nodes with a local declaration or reference, sorted.
    pub fn bound_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<_> = self
            .declarations
            .keys()
            .chain(self.references.keys())
            .copied()
            .collect();
        nodes.sort();
        nodes.dedup();
        nodes
    }

    /// Local declaration entries, sorted by node.
    pub fn declarations(&self) -> Vec<(NodeId, DescriptorId)> {
        sorted(&self.declarations)
    }

    /// Local reference entries, sorted by node.
    pub fn references(&self) -> Vec<(NodeId, DescriptorId)> {
        sorted(&self.references)
    }

    /// Local label entries, sorted by node.
    pub fn label_targets(&self) -> Vec<(NodeId, DescriptorId)> {
        sorted(&self.label_targets)
    }

    /// Forward local diagnostics to `sink`.
    pub fn report_to(&self, sink: &mut dyn DiagnosticSink) {
        for diagnostic in self.diagnostics() {
            sink.report(diagnostic.clone());
        }
    }
}

fn sorted(map: &FxHashMap<NodeId, DescriptorId>) -> Vec<(NodeId, DescriptorId)> {
    let mut entries: Vec<_> = map.iter().map(|(node, id)| (*node, *id)).collect();
    entries.sort();
    entries
}

// ============================================================================
// TRACE
// ============================================================================

/// Append-only builder for a [`BindingContext`].
#[derive(Debug, Default)]
pub struct BindingTrace {
    context: BindingContext,
}

impl BindingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace whose reads fall back to `parent`.
    pub fn delegating(parent: Arc<BindingContext>) -> Self {
        Self {
            context: BindingContext {
                parent: Some(parent),
                ..BindingContext::default()
            },
        }
    }

    pub fn context(&self) -> &BindingContext {
        &self.context
    }

    pub fn record_declaration(&mut self, node: NodeId, descriptor: DescriptorId) {
        self.context.declarations.entry(node).or_insert(descriptor);
        self.context
            .declaration_nodes
            .entry(descriptor)
            .or_insert(node);
    }

    pub fn record_reference(&mut self, node: NodeId, descriptor: DescriptorId) {
        self.context.references.entry(node).or_insert(descriptor);
    }

    pub fn record_namespace(&mut self, fq_name: FqName, namespace: DescriptorId) {
        self.context.namespaces.entry(fq_name).or_insert(namespace);
    }

    pub fn record_file_namespace(&mut self, file: FileId, namespace: DescriptorId) {
        self.context.file_namespaces.entry(file).or_insert(namespace);
    }

    pub fn record_label_target(&mut self, node: NodeId, class: DescriptorId) {
        self.context.label_targets.entry(node).or_insert(class);
    }

    pub fn freeze(self) -> Arc<BindingContext> {
        Arc::new(self.context)
    }
}

impl DiagnosticSink for BindingTrace {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.context
            .diagnostics
            .entry(diagnostic.node)
            .or_default()
            .push(diagnostic);
    }
}
