//! Diagnostics: semantic problems recorded during analysis.
//!
//! Diagnostics are structured data attached to syntax nodes. The core never
//! formats user-facing text; presentation layers render [`DiagnosticKind`]
//! however they like. `Display` exists as a debugging default.

use std::fmt;

use smol_str::SmolStr;

use crate::base::{FileId, FqName, ImportPath, Name, NodeId};
use crate::descriptors::{DescriptorArena, DescriptorId};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnresolvedReference {
        name: Name,
    },
    AmbiguousReference {
        name: Name,
        candidates: Vec<DescriptorId>,
    },
    Redeclaration {
        name: Name,
        existing: DescriptorId,
    },
    UnresolvedImport {
        path: ImportPath,
    },
    AmbiguousImport {
        path: ImportPath,
        candidates: Vec<DescriptorId>,
    },
    SyntaxError {
        message: SmolStr,
    },
    /// An imported platform class is replaced by a built-in.
    PlatformClassMapped {
        platform: FqName,
        builtin: FqName,
    },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedReference { .. } => codes::UNRESOLVED_REFERENCE,
            DiagnosticKind::AmbiguousReference { .. } => codes::AMBIGUOUS_REFERENCE,
            DiagnosticKind::Redeclaration { .. } => codes::REDECLARATION,
            DiagnosticKind::UnresolvedImport { .. } => codes::UNRESOLVED_IMPORT,
            DiagnosticKind::AmbiguousImport { .. } => codes::AMBIGUOUS_IMPORT,
            DiagnosticKind::SyntaxError { .. } => codes::SYNTAX_ERROR,
            DiagnosticKind::PlatformClassMapped { .. } => codes::PLATFORM_CLASS_MAPPED,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::PlatformClassMapped { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Like `Display`, but with descriptors rendered structurally instead
    /// of by id.
    pub fn render(&self, descriptors: &DescriptorArena) -> String {
        let list = |ids: &[DescriptorId]| {
            let mut rendered: Vec<_> = ids.iter().map(|id| descriptors.render(*id)).collect();
            rendered.sort();
            rendered.join(", ")
        };
        match self {
            DiagnosticKind::AmbiguousReference { name, candidates } => {
                format!("ambiguous reference `{name}`: {}", list(candidates))
            }
            DiagnosticKind::Redeclaration { name, existing } => {
                format!("redeclaration of `{name}`, first declared as {}", descriptors.render(*existing))
            }
            DiagnosticKind::AmbiguousImport { path, candidates } => {
                format!("ambiguous import `{path}`: {}", list(candidates))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnresolvedReference { name } => write!(f, "unresolved reference `{name}`"),
            DiagnosticKind::AmbiguousReference { name, candidates } => {
                write!(f, "ambiguous reference `{name}` ({} candidates)", candidates.len())
            }
            DiagnosticKind::Redeclaration { name, .. } => write!(f, "redeclaration of `{name}`"),
            DiagnosticKind::UnresolvedImport { path } => write!(f, "unresolved import `{path}`"),
            DiagnosticKind::AmbiguousImport { path, candidates } => {
                write!(f, "ambiguous import `{path}` ({} candidates)", candidates.len())
            }
            DiagnosticKind::SyntaxError { message } => write!(f, "syntax error: {message}"),
            DiagnosticKind::PlatformClassMapped { platform, builtin } => {
                write!(f, "`{platform}` is mapped to built-in `{builtin}`")
            }
        }
    }
}

/// A diagnostic attached to a syntax node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub node: NodeId,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// A diagnostic with the kind's default severity.
    pub fn new(node: NodeId, kind: DiagnosticKind) -> Self {
        Self {
            node,
            severity: kind.default_severity(),
            kind,
        }
    }

    pub fn unresolved(node: NodeId, name: Name) -> Self {
        Self::new(node, DiagnosticKind::UnresolvedReference { name })
    }

    pub fn file(&self) -> FileId {
        self.node.file()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable diagnostic codes.
///
/// ## Ranges
///
/// - **E0001-E0099**: Name resolution errors
/// - **E0100-E0199**: Syntax errors surfaced by the parser collaborator
/// - **W0001-W0099**: Warnings
pub mod codes {
    /// Name not found.
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Several candidates, none preferred.
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// Name declared twice in one scope.
    pub const REDECLARATION: &str = "E0004";
    /// Import path does not resolve.
    pub const UNRESOLVED_IMPORT: &str = "E0014";
    /// Import path names different classes in different modules.
    pub const AMBIGUOUS_IMPORT: &str = "E0015";
    /// Declaration skipped because of a syntax error.
    pub const SYNTAX_ERROR: &str = "E0100";
    /// Platform class replaced by a built-in.
    pub const PLATFORM_CLASS_MAPPED: &str = "W0004";
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in report order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Diagnostics with the given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code() == code)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
