//! Declaration index backing the lazy strategy.
//!
//! Each file's top-level declarations are grouped by name through a salsa
//! query, so indexing an unchanged file again is a cache hit. The per-module
//! [`ModuleIndex`] answers the two questions lazy materialization asks:
//! "does namespace `N` have a child namespace `x`?" and "which declarations
//! named `x` live in `N`, in source order?".

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::base::{FileId, FqName, Name};
use crate::syntax::{Declaration, SourceFile};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: one file's syntax tree.
///
/// A changed file gets a fresh input rather than an update.
#[salsa::input]
pub struct SourceInput {
    pub file: FileId,
    #[return_ref]
    pub syntax: Arc<SourceFile>,
}

// ============================================================================
// DATABASE
// ============================================================================

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {}
}

impl RootDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Usable top-level declarations of a file, grouped by name in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDeclarations {
    pub file: FileId,
    /// `None` when syntax errors make the whole file unusable.
    pub package: Option<FqName>,
    pub by_name: IndexMap<Name, Vec<Arc<Declaration>>>,
}

#[salsa::tracked]
pub fn file_declarations(db: &dyn salsa::Database, input: SourceInput) -> FileDeclarations {
    let syntax = input.syntax(db);
    let damage = syntax.damage();
    let mut by_name: IndexMap<Name, Vec<Arc<Declaration>>> = IndexMap::new();
    if damage.is_broken() {
        return FileDeclarations {
            file: input.file(db),
            package: None,
            by_name,
        };
    }
    for declaration in &syntax.declarations {
        if damage.skips_declaration(declaration.node) {
            continue;
        }
        by_name
            .entry(declaration.name.clone())
            .or_default()
            .push(declaration.clone());
    }
    FileDeclarations {
        file: input.file(db),
        package: Some(syntax.package.fq_name.clone()),
        by_name,
    }
}

// ============================================================================
// MODULE INDEX
// ============================================================================

/// Namespaces and declarations of one module, keyed for lazy lookup.
#[derive(Debug, Default)]
pub(crate) struct ModuleIndex {
    /// Every namespace with its child namespace names, parents first.
    namespaces: IndexMap<FqName, IndexSet<Name>>,
    declarations: FxHashMap<FqName, IndexMap<Name, Vec<(FileId, Arc<Declaration>)>>>,
}

impl ModuleIndex {
    fn add(&mut self, declarations: &FileDeclarations) {
        let Some(package) = &declarations.package else {
            return;
        };
        for ancestor in package.ancestors_and_self() {
            let child = ancestor.short_name().cloned();
            let parent = ancestor.parent();
            self.namespaces.entry(ancestor).or_default();
            if let (Some(parent), Some(child)) = (parent, child) {
                self.namespaces.entry(parent).or_default().insert(child);
            }
        }
        let names = self.declarations.entry(package.clone()).or_default();
        for (name, group) in &declarations.by_name {
            let entries = names.entry(name.clone()).or_default();
            entries.extend(group.iter().map(|d| (declarations.file, d.clone())));
        }
    }

    pub(crate) fn has_child_namespace(&self, namespace: &FqName, name: &Name) -> bool {
        self.namespaces
            .get(namespace)
            .is_some_and(|children| children.contains(name))
    }

    /// Declarations named `name` directly in `namespace`, in file order.
    pub(crate) fn declarations_named(
        &self,
        namespace: &FqName,
        name: &Name,
    ) -> Vec<(FileId, Arc<Declaration>)> {
        self.declarations
            .get(namespace)
            .and_then(|names| names.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Every known namespace, parents before children.
    pub(crate) fn namespaces(&self) -> Vec<FqName> {
        self.namespaces.keys().cloned().collect()
    }

    /// Child namespace names followed by declaration names of `namespace`.
    pub(crate) fn names_in(&self, namespace: &FqName) -> Vec<Name> {
        let mut names: IndexSet<Name> = self
            .namespaces
            .get(namespace)
            .cloned()
            .unwrap_or_default();
        if let Some(declared) = self.declarations.get(namespace) {
            names.extend(declared.keys().cloned());
        }
        names.into_iter().collect()
    }
}

// ============================================================================
// INDEXER
// ============================================================================

/// Owns the salsa database and one input per file seen.
#[derive(Default)]
pub(crate) struct DeclarationIndexer {
    db: RootDatabase,
    inputs: FxHashMap<FileId, (Arc<SourceFile>, SourceInput)>,
}

impl fmt::Debug for DeclarationIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationIndexer")
            .field("inputs", &self.inputs.len())
            .finish()
    }
}

impl DeclarationIndexer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn input_for(&mut self, file: &Arc<SourceFile>) -> SourceInput {
        if let Some((known, input)) = self.inputs.get(&file.id) {
            if known == file {
                return *input;
            }
        }
        trace!("[INDEX] new input for {}", file.path);
        let input = SourceInput::new(&self.db, file.id, file.clone());
        self.inputs.insert(file.id, (file.clone(), input));
        input
    }

    pub(crate) fn file_declarations(&mut self, file: &Arc<SourceFile>) -> FileDeclarations {
        let input = self.input_for(file);
        file_declarations(&self.db, input)
    }

    pub(crate) fn index_module(&mut self, files: &[Arc<SourceFile>]) -> ModuleIndex {
        let mut index = ModuleIndex::default();
        index.namespaces.entry(FqName::root()).or_default();
        for file in files {
            let declarations = self.file_declarations(file);
            index.add(&declarations);
        }
        index
    }

    #[cfg(test)]
    pub(crate) fn input_count(&self) -> usize {
        self.inputs.len()
    }
}
