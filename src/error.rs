//! Fatal errors.
//!
//! These indicate a bug in analysis ordering or configuration, never a
//! problem with user code. User-code problems are diagnostics recorded in the
//! binding trace (see [`crate::analyzer::Diagnostic`]).

use thiserror::Error;

use crate::base::{FileId, Name};
use crate::scopes::LockLevel;

/// Programming errors raised by scopes and descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Lookup in a scope that is not yet read-ready.
    #[error("cannot read from scope `{scope}` at lock level {level}")]
    ReadNotPermitted { scope: String, level: LockLevel },

    /// Write to a scope that has been frozen.
    #[error("cannot write to scope `{scope}` at lock level {level}")]
    WriteNotPermitted { scope: String, level: LockLevel },

    /// Attempt to move a scope's lock level backwards.
    #[error("cannot lower lock level of scope `{scope}` from {from} to {to}")]
    LockLevelLowered {
        scope: String,
        from: LockLevel,
        to: LockLevel,
    },

    #[error("scope `{scope}` cannot import itself")]
    SelfImport { scope: String },

    #[error("root namespace of module `{module}` is already set")]
    RootNamespaceAlreadySet { module: Name },

    /// Root namespace whose containing declaration is another module.
    #[error("namespace `{namespace}` does not belong to module `{module}`")]
    ForeignRootNamespace { module: Name, namespace: Name },

    /// Modules must carry special names.
    #[error("module name must be special, got `{name}`")]
    InvalidModuleName { name: Name },

    /// A descriptor expected to be a namespace is something else.
    #[error("descriptor `{name}` is not a namespace")]
    NotANamespace { name: Name },

    #[error("binding context of module `{module}` is already set")]
    BindingContextAlreadySet { module: String },
}

impl ResolveError {
    /// Create a read-not-permitted error.
    pub fn read_not_permitted(scope: impl Into<String>, level: LockLevel) -> Self {
        Self::ReadNotPermitted {
            scope: scope.into(),
            level,
        }
    }

    /// Create a write-not-permitted error.
    pub fn write_not_permitted(scope: impl Into<String>, level: LockLevel) -> Self {
        Self::WriteNotPermitted {
            scope: scope.into(),
            level,
        }
    }

    /// Create a self-import error.
    pub fn self_import(scope: impl Into<String>) -> Self {
        Self::SelfImport {
            scope: scope.into(),
        }
    }
}

/// Errors that abort a whole analysis run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Strict analysis found syntax errors before semantic work began.
    #[error("syntax errors in {file}: {}", .messages.join("; "))]
    Syntax { file: FileId, messages: Vec<String> },

    /// A module was analyzed before one of its dependencies.
    #[error("dependency `{dependency}` of module `{module}` has not been analyzed")]
    DependencyNotAnalyzed { module: String, dependency: String },
}
