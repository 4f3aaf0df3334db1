//! Module descriptors and namespace lookup by qualified name.
//!
//! A module owns exactly one root namespace, attached once. Namespaces below
//! the root are found by walking the path segment by segment through each
//! namespace's member scope, so namespaces contributed by imported scopes
//! (dependency modules, built-ins) are found as well.

use std::sync::OnceLock;

use indexmap::IndexMap;
use tracing::trace;

use crate::base::{FqName, ImportPath, Name};
use crate::error::ResolveError;
use crate::scopes::ScopeArena;

use super::arena::DescriptorArena;
use super::descriptor::{Descriptor, DescriptorData, DescriptorId, DescriptorKind, ModuleData};

/// Maps platform class names to the built-in classes that replace them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformClassMap {
    mapping: IndexMap<FqName, FqName>,
}

impl PlatformClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, platform: &str, builtin: &str) -> Self {
        self.insert(FqName::parse(platform), FqName::parse(builtin));
        self
    }

    pub fn insert(&mut self, platform: FqName, builtin: FqName) {
        self.mapping.insert(platform, builtin);
    }

    /// Built-in class replacing the platform class `platform`.
    pub fn builtin_for(&self, platform: &FqName) -> Option<&FqName> {
        self.mapping.get(platform)
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl ModuleData {
    pub fn root_namespace(&self) -> Option<DescriptorId> {
        self.root_namespace.get().copied()
    }

    pub fn default_imports(&self) -> &[ImportPath] {
        &self.default_imports
    }

    pub fn platform_classes(&self) -> &PlatformClassMap {
        &self.platform_classes
    }
}

// ============================================================================
// MODULE OPERATIONS
// ============================================================================

impl DescriptorArena {
    /// Create an empty module. Module names must be special.
    pub fn create_module(
        &mut self,
        name: Name,
        default_imports: Vec<ImportPath>,
        platform_classes: PlatformClassMap,
    ) -> Result<DescriptorId, ResolveError> {
        if !name.is_special() {
            return Err(ResolveError::InvalidModuleName { name });
        }
        Ok(self.alloc(Descriptor::new(
            name,
            None,
            DescriptorData::Module(ModuleData {
                root_namespace: OnceLock::new(),
                default_imports,
                platform_classes,
            }),
        )))
    }

    pub fn module_data(&self, module: DescriptorId) -> Option<&ModuleData> {
        self.get(module).as_module()
    }

    /// Attach the root namespace. Fails on the second call, whatever the
    /// namespace passed.
    pub fn set_root_namespace(
        &self,
        module: DescriptorId,
        namespace: DescriptorId,
    ) -> Result<(), ResolveError> {
        let module_name = self.name(module).clone();
        let data = self
            .module_data(module)
            .ok_or_else(|| ResolveError::InvalidModuleName {
                name: module_name.clone(),
            })?;
        let belongs = self.kind(namespace) == DescriptorKind::Namespace
            && self.get(namespace).containing_declaration() == Some(module);
        if !belongs {
            return Err(ResolveError::ForeignRootNamespace {
                module: module_name,
                namespace: self.name(namespace).clone(),
            });
        }
        data.root_namespace
            .set(namespace)
            .map_err(|_| ResolveError::RootNamespaceAlreadySet {
                module: module_name,
            })
    }

    pub fn root_namespace(&self, module: DescriptorId) -> Option<DescriptorId> {
        self.module_data(module)?.root_namespace()
    }
}

/// The first namespace at `fq_name` visible from `module`'s root.
///
/// The root path returns the root namespace itself. `None` when the root is
/// not attached or any segment fails to resolve.
pub fn find_namespace(
    descriptors: &DescriptorArena,
    scopes: &ScopeArena,
    module: DescriptorId,
    fq_name: &FqName,
) -> Result<Option<DescriptorId>, ResolveError> {
    Ok(walk_namespaces(descriptors, scopes, module, fq_name, true)?
        .into_iter()
        .next())
}

/// Every namespace at `fq_name` visible from `module`'s root, for example
/// the module's own plus the ones contributed by dependencies.
pub fn collect_namespaces(
    descriptors: &DescriptorArena,
    scopes: &ScopeArena,
    module: DescriptorId,
    fq_name: &FqName,
) -> Result<Vec<DescriptorId>, ResolveError> {
    walk_namespaces(descriptors, scopes, module, fq_name, false)
}

fn walk_namespaces(
    descriptors: &DescriptorArena,
    scopes: &ScopeArena,
    module: DescriptorId,
    fq_name: &FqName,
    stop_at_first: bool,
) -> Result<Vec<DescriptorId>, ResolveError> {
    let Some(root) = descriptors.root_namespace(module) else {
        trace!("[NAMESPACE] module {} has no root namespace", descriptors.name(module));
        return Ok(Vec::new());
    };
    let mut found = Vec::new();
    visit_path(
        descriptors,
        scopes,
        root,
        fq_name.segments(),
        &mut found,
        stop_at_first,
    )?;
    Ok(found)
}

/// Depth-first walk over namespace candidates. Returns `false` once the
/// search should stop.
fn visit_path(
    descriptors: &DescriptorArena,
    scopes: &ScopeArena,
    namespace: DescriptorId,
    rest: &[Name],
    found: &mut Vec<DescriptorId>,
    stop_at_first: bool,
) -> Result<bool, ResolveError> {
    let Some((first, tail)) = rest.split_first() else {
        if !found.contains(&namespace) {
            found.push(namespace);
        }
        return Ok(!stop_at_first);
    };
    let scope = descriptors.namespace_scope(namespace)?;
    let mut failure = None;
    let keep_going = scopes.process_namespaces(scope, first, &mut |child| {
        match visit_path(descriptors, scopes, child, tail, found, stop_at_first) {
            Ok(keep_going) => keep_going,
            Err(err) => {
                failure = Some(err);
                false
            }
        }
    })?;
    match failure {
        Some(err) => Err(err),
        None => Ok(keep_going),
    }
}
