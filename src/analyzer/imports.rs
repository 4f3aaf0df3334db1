//! Import resolution: building a file's lexical scope.
//!
//! The file scope is an empty writable scope whose imports are, in lookup
//! order:
//!
//! ```text
//! [aliases] → [own namespace] → [explicit a.*, latest first] → [defaults] → [root]
//! ```
//!
//! `import_scope` prepends, so the list is built back to front.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::base::{FqName, ImportPath, Name};
use crate::descriptors::DescriptorId;
use crate::error::AnalysisError;
use crate::scopes::{LockLevel, ScopeId};
use crate::syntax::{ImportDirective, SourceFile};

use super::diagnostics::DiagnosticKind;
use super::state::AnalysisState;

/// Everything one single-name import binds.
#[derive(Debug, Default)]
struct ImportedEntities {
    classifier: Option<DescriptorId>,
    ambiguous: Vec<DescriptorId>,
    namespace: Option<DescriptorId>,
    functions: IndexSet<DescriptorId>,
    properties: IndexSet<DescriptorId>,
}

impl ImportedEntities {
    fn is_empty(&self) -> bool {
        self.classifier.is_none()
            && self.namespace.is_none()
            && self.functions.is_empty()
            && self.properties.is_empty()
    }

    /// What the import directive node itself is bound to.
    fn representative(&self) -> Option<DescriptorId> {
        self.classifier
            .or(self.namespace)
            .or_else(|| self.functions.first().copied())
            .or_else(|| self.properties.first().copied())
    }
}

impl AnalysisState<'_> {
    /// Resolve `file`'s package and imports into its file scope, then
    /// freeze the scope.
    pub(crate) fn resolve_file_imports(
        &mut self,
        file: &Arc<SourceFile>,
    ) -> Result<(), AnalysisError> {
        let Some(scope) = self.file_scopes.get(&file.id).copied() else {
            return Ok(());
        };
        trace!("[IMPORTS] {}", file.path);

        let root_scope = self.ctx.descriptors.namespace_scope(self.root)?;
        self.ctx.scopes.import_scope(scope, root_scope)?;

        let defaults: Vec<ImportPath> = self
            .ctx
            .descriptors
            .module_data(self.module)
            .map(|data| data.default_imports().to_vec())
            .unwrap_or_default();
        for default in defaults.iter().rev() {
            if !default.is_all_under() {
                debug!("[IMPORTS] ignoring single-name default import {default}");
                continue;
            }
            let candidates = self.namespace_candidates(default.fq_name())?;
            if candidates.is_empty() {
                debug!("[IMPORTS] default import {default} does not resolve");
            }
            self.import_namespaces(scope, &candidates)?;
        }

        let (stars, singles): (Vec<&ImportDirective>, Vec<&ImportDirective>) = file
            .imports
            .iter()
            .filter(|import| !self.skipped.contains(&import.node))
            .partition(|import| import.path.is_all_under());

        for import in stars {
            let candidates = self.namespace_candidates(import.path.fq_name())?;
            match candidates.first() {
                Some(first) => self.trace.record_reference(import.node, *first),
                None => self.report(
                    import.node,
                    DiagnosticKind::UnresolvedImport {
                        path: import.path.clone(),
                    },
                ),
            }
            self.import_namespaces(scope, &candidates)?;
        }

        let package = self.package_namespace(&file.package.fq_name)?;
        let package_scope = self.ctx.descriptors.namespace_scope(package)?;
        self.ctx.scopes.import_scope(scope, package_scope)?;
        self.trace.record_file_namespace(file.id, package);
        self.trace.record_reference(file.node, package);
        self.trace.record_reference(file.package.node, package);

        for import in singles {
            self.resolve_single_import(scope, import)?;
        }

        self.ctx.scopes.change_lock_level(scope, LockLevel::Reading)?;
        Ok(())
    }

    /// Import candidate namespaces so the first candidate is checked first.
    fn import_namespaces(
        &mut self,
        scope: ScopeId,
        candidates: &[DescriptorId],
    ) -> Result<(), AnalysisError> {
        for namespace in candidates.iter().rev() {
            let member_scope = self.ctx.descriptors.namespace_scope(*namespace)?;
            self.ctx.scopes.import_scope(scope, member_scope)?;
        }
        Ok(())
    }

    fn package_namespace(&mut self, fq_name: &FqName) -> Result<DescriptorId, AnalysisError> {
        if self.is_lazy() {
            if let Some(namespace) = self.lazy_namespace(fq_name)? {
                return Ok(namespace);
            }
        }
        self.ensure_namespace(fq_name)
    }

    /// Every namespace at `fq_name` visible from this module's root: its own
    /// and the ones contributed by dependencies and the built-ins.
    pub(crate) fn namespace_candidates(
        &mut self,
        fq_name: &FqName,
    ) -> Result<Vec<DescriptorId>, AnalysisError> {
        let mut current = vec![self.root];
        for segment in fq_name.segments() {
            let mut next = Vec::new();
            for namespace in current {
                let scope = self.ctx.descriptors.namespace_scope(namespace)?;
                self.prepare_lookup(scope, segment)?;
                for child in self.ctx.scopes.namespaces(scope, segment)? {
                    if !next.contains(&child) {
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }

    fn resolve_single_import(
        &mut self,
        scope: ScopeId,
        import: &ImportDirective,
    ) -> Result<(), AnalysisError> {
        let path = &import.path;
        let (Some(parent), Some(short), Some(alias)) = (
            path.fq_name().parent(),
            path.fq_name().short_name().cloned(),
            path.imported_name().cloned(),
        ) else {
            self.report(
                import.node,
                DiagnosticKind::UnresolvedImport { path: path.clone() },
            );
            return Ok(());
        };

        let candidates = self.namespace_candidates(&parent)?;
        let mut entities = self.collect_imported(&candidates, &short)?;

        if let Some(builtin_fq) = self.info.platform_classes().builtin_for(path.fq_name()).cloned() {
            if let Some(builtin) = self.ctx.builtins().class_at(&builtin_fq) {
                self.report(
                    import.node,
                    DiagnosticKind::PlatformClassMapped {
                        platform: path.fq_name().clone(),
                        builtin: builtin_fq,
                    },
                );
                entities.classifier.get_or_insert(builtin);
            }
        }

        if entities.is_empty() {
            self.report(
                import.node,
                DiagnosticKind::UnresolvedImport { path: path.clone() },
            );
            return Ok(());
        }
        if entities.ambiguous.len() > 1 {
            self.report(
                import.node,
                DiagnosticKind::AmbiguousImport {
                    path: path.clone(),
                    candidates: entities.ambiguous.clone(),
                },
            );
        }
        if let Some(representative) = entities.representative() {
            self.trace.record_reference(import.node, representative);
        }

        let scopes = &mut self.ctx.scopes;
        if let Some(classifier) = entities.classifier {
            scopes.import_classifier_alias(scope, alias.clone(), classifier)?;
        }
        if let Some(namespace) = entities.namespace {
            scopes.import_namespace_alias(scope, alias.clone(), namespace)?;
        }
        for function in &entities.functions {
            let arity = self
                .ctx
                .descriptors
                .get(*function)
                .as_function()
                .map(|data| data.arity)
                .unwrap_or_default();
            self.ctx
                .scopes
                .import_function_alias(scope, alias.clone(), *function, arity)?;
        }
        for property in &entities.properties {
            self.ctx
                .scopes
                .import_variable_alias(scope, alias.clone(), *property)?;
        }
        Ok(())
    }

    /// Collect every entity named `name` across `candidates`. Classifiers
    /// differing between candidates are ambiguous; the first one wins.
    fn collect_imported(
        &mut self,
        candidates: &[DescriptorId],
        name: &Name,
    ) -> Result<ImportedEntities, AnalysisError> {
        let mut entities = ImportedEntities::default();
        for namespace in candidates {
            let scope = self.ctx.descriptors.namespace_scope(*namespace)?;
            self.prepare_lookup(scope, name)?;
            let scopes = &self.ctx.scopes;
            if let Some(classifier) = scopes.classifier(scope, name)? {
                entities.classifier.get_or_insert(classifier);
                if !entities.ambiguous.contains(&classifier) {
                    entities.ambiguous.push(classifier);
                }
            }
            if entities.namespace.is_none() {
                entities.namespace = scopes.namespace(scope, name)?;
            }
            entities.functions.extend(scopes.functions(scope, name)?);
            entities.properties.extend(scopes.properties(scope, name)?);
        }
        Ok(entities)
    }
}
