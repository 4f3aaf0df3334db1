//! Analysis configuration: parameters and per-module settings.
//!
//! # Namespace-scope extension
//!
//! When a namespace member scope is created, exactly one rule extends it,
//! checked in this order:
//!
//! 1. dependencies analyzed a namespace with the same FQ name: import each
//!    of their member scopes
//! 2. it is the root namespace of a module without dependencies: import the
//!    built-ins scope
//! 3. otherwise: the module's [`NamespaceScopeExtension`]

use std::fmt;
use std::sync::{Arc, OnceLock};

use smol_str::SmolStr;
use tracing::trace;

use crate::base::constants::{DEFAULT_IMPORT_PATHS, DEFAULT_MODULE};
use crate::base::{FqName, ImportPath, Name};
use crate::descriptors::{DescriptorId, PlatformClassMap};
use crate::error::{AnalysisError, ResolveError};
use crate::scopes::ScopeId;

use super::context::GlobalContext;
use super::trace::BindingContext;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Which strategy builds the binding trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strategy {
    /// One top-down pass over everything.
    #[default]
    Eager,
    /// Declarations on first lookup, signatures and bodies on demand.
    Lazy,
}

/// What to do with files that have syntax errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SyntaxErrorPolicy {
    /// Refuse to start semantic analysis.
    FailFast,
    /// Skip the affected declarations and record a diagnostic.
    #[default]
    SkipDeclaration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisParameters {
    pub strategy: Strategy,
    pub syntax_errors: SyntaxErrorPolicy,
}

impl AnalysisParameters {
    pub fn eager() -> Self {
        Self::default()
    }

    pub fn lazy() -> Self {
        Self {
            strategy: Strategy::Lazy,
            ..Self::default()
        }
    }

    pub fn fail_fast(mut self) -> Self {
        self.syntax_errors = SyntaxErrorPolicy::FailFast;
        self
    }

    /// Parse parameters from JSON, e.g. `{"strategy": "lazy"}`.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// ============================================================================
// SCOPE EXTENSION
// ============================================================================

/// Fallback rule for extending a namespace member scope.
pub trait NamespaceScopeExtension: Send + Sync + fmt::Debug {
    fn extend_namespace_scope(
        &self,
        ctx: &mut GlobalContext,
        namespace_fq: &FqName,
        member_scope: ScopeId,
    ) -> Result<(), ResolveError>;
}

/// Imports the built-ins into the root namespace and nothing elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardExtension;

impl NamespaceScopeExtension for StandardExtension {
    fn extend_namespace_scope(
        &self,
        ctx: &mut GlobalContext,
        namespace_fq: &FqName,
        member_scope: ScopeId,
    ) -> Result<(), ResolveError> {
        if namespace_fq.is_root() {
            let builtins = ctx.builtins().scope();
            ctx.scopes.import_scope(member_scope, builtins)?;
        }
        Ok(())
    }
}

// ============================================================================
// MODULE INFO
// ============================================================================

/// Configuration of one module and, after analysis, its results.
pub struct ModuleInfo {
    name: SmolStr,
    dependencies: Vec<Arc<ModuleInfo>>,
    default_imports: Vec<ImportPath>,
    platform_classes: PlatformClassMap,
    extension: Arc<dyn NamespaceScopeExtension>,
    binding_context: OnceLock<Arc<BindingContext>>,
    descriptor: OnceLock<DescriptorId>,
}

impl fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInfo")
            .field("name", &self.name)
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("default_imports", &self.default_imports)
            .field("analyzed", &self.binding_context.get().is_some())
            .finish()
    }
}

impl Default for ModuleInfo {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE)
    }
}

impl ModuleInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            dependencies: Vec::new(),
            default_imports: DEFAULT_IMPORT_PATHS.iter().map(|p| ImportPath::parse(p)).collect(),
            platform_classes: PlatformClassMap::new(),
            extension: Arc::new(StandardExtension),
            binding_context: OnceLock::new(),
            descriptor: OnceLock::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Arc<ModuleInfo>>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_dependency(mut self, dependency: Arc<ModuleInfo>) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_default_imports(mut self, imports: Vec<ImportPath>) -> Self {
        self.default_imports = imports;
        self
    }

    pub fn with_platform_classes(mut self, platform_classes: PlatformClassMap) -> Self {
        self.platform_classes = platform_classes;
        self
    }

    pub fn with_extension(mut self, extension: Arc<dyn NamespaceScopeExtension>) -> Self {
        self.extension = extension;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The special name of the module descriptor, `<name>`.
    pub fn module_name(&self) -> Name {
        Name::special(&self.name)
    }

    pub fn dependencies(&self) -> &[Arc<ModuleInfo>] {
        &self.dependencies
    }

    pub fn default_imports(&self) -> &[ImportPath] {
        &self.default_imports
    }

    pub fn platform_classes(&self) -> &PlatformClassMap {
        &self.platform_classes
    }

    pub fn binding_context(&self) -> Option<&Arc<BindingContext>> {
        self.binding_context.get()
    }

    pub fn module_descriptor(&self) -> Option<DescriptorId> {
        self.descriptor.get().copied()
    }

    pub fn is_analyzed(&self) -> bool {
        self.binding_context.get().is_some()
    }

    /// Publish the analysis result. Only the first call succeeds.
    pub(crate) fn set_analyzed(
        &self,
        module: DescriptorId,
        context: Arc<BindingContext>,
    ) -> Result<(), ResolveError> {
        self.binding_context
            .set(context)
            .map_err(|_| ResolveError::BindingContextAlreadySet {
                module: self.name.to_string(),
            })?;
        let _ = self.descriptor.set(module);
        Ok(())
    }

    /// Fails on the first dependency that has no binding context yet.
    pub(crate) fn check_dependencies(&self) -> Result<(), AnalysisError> {
        match self.dependencies.iter().find(|d| !d.is_analyzed()) {
            Some(missing) => Err(AnalysisError::DependencyNotAnalyzed {
                module: self.name.to_string(),
                dependency: missing.name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Apply the extension rules to a freshly created member scope.
    pub(crate) fn extend_namespace_scope(
        &self,
        ctx: &mut GlobalContext,
        namespace_fq: &FqName,
        member_scope: ScopeId,
    ) -> Result<(), AnalysisError> {
        let mut contributed = Vec::new();
        for dependency in &self.dependencies {
            let context = dependency.binding_context().ok_or_else(|| {
                AnalysisError::DependencyNotAnalyzed {
                    module: self.name.to_string(),
                    dependency: dependency.name.to_string(),
                }
            })?;
            if let Some(namespace) = context.namespace(namespace_fq) {
                contributed.push((dependency.name(), ctx.descriptors.namespace_scope(namespace)?));
            }
        }

        if !contributed.is_empty() {
            // Prepending in reverse keeps dependency order as lookup order.
            for (dependency, scope) in contributed.into_iter().rev() {
                trace!("[EXTEND] {} imports {} from {}", self.name, namespace_fq, dependency);
                ctx.scopes.import_scope(member_scope, scope)?;
            }
        } else if namespace_fq.is_root() && self.dependencies.is_empty() {
            let builtins = ctx.builtins().scope();
            ctx.scopes.import_scope(member_scope, builtins)?;
        } else {
            self.extension
                .extend_namespace_scope(ctx, namespace_fq, member_scope)?;
        }
        Ok(())
    }
}
