//! Eager resolution: every phase runs over the whole module before the next.

use tracing::debug;

use crate::error::AnalysisError;
use crate::scopes::LockLevel;

use super::facade::ResolutionStrategy;
use super::state::AnalysisState;

/// Declare everything, freeze namespaces, resolve imports, then signatures,
/// then bodies.
#[derive(Debug, Default)]
pub(crate) struct EagerStrategy;

impl ResolutionStrategy for EagerStrategy {
    fn resolve(&self, state: &mut AnalysisState<'_>) -> Result<(), AnalysisError> {
        let files = state.usable_files();

        for file in &files {
            let namespace = state.ensure_namespace(&file.package.fq_name)?;
            let member_scope = state.ctx.descriptors.namespace_scope(namespace)?;
            let Some(lexical) = state.file_scopes.get(&file.id).copied() else {
                continue;
            };
            for declaration in &file.declarations {
                if state.skipped.contains(&declaration.node) {
                    continue;
                }
                state.declare(declaration, namespace, member_scope, lexical)?;
            }
        }

        let namespaces: Vec<_> = state.namespaces.values().copied().collect();
        for namespace in namespaces {
            let scope = state.ctx.descriptors.namespace_scope(namespace)?;
            state.ctx.scopes.change_lock_level(scope, LockLevel::Reading)?;
        }

        for file in &files {
            state.resolve_file_imports(file)?;
        }

        let declared = state.declared();
        for id in &declared {
            state.resolve_signature(*id)?;
        }
        for id in &declared {
            state.resolve_body(*id)?;
        }
        debug!(
            "[EAGER] {}: {} declarations in {} files",
            state.info.name(),
            declared.len(),
            files.len()
        );
        Ok(())
    }
}
