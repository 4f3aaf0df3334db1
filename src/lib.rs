//! # lexscope-base
//!
//! Lexical scope graph and lazy symbol resolution for a compiler frontend.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! analyzer    → Strategies (eager, lazy), facade, binding trace, diagnostics
//!   ↓
//! scopes      → Scope read capability, WritableScope lock levels, lazy member scopes
//!   ↓
//! descriptors → Descriptor arena, Module, namespace lookup
//!   ↓
//! syntax      → Syntax-tree shape consumed by the analyzer
//!   ↓
//! base        → Primitives (Name, FqName, FileId, NodeId)
//! ```
//!
//! `error` holds the fatal error taxonomy shared by every layer.

// ============================================================================
// MODULES (dependency order: base → syntax → descriptors → scopes → analyzer)
// ============================================================================

/// Foundation types: Name, FqName, ImportPath, FileId, NodeId
pub mod base;

/// Syntax trees handed to the analyzer by the parser collaborator
pub mod syntax;

/// Semantic declaration graph
pub mod descriptors;

/// Name lookup: scope variants and the lock-level discipline
pub mod scopes;

/// Orchestration: eager and lazy resolution producing a binding trace
pub mod analyzer;

/// Fatal errors
pub mod error;

// Re-export foundation types
pub use base::{FileId, FqName, ImportPath, Interner, Name, NodeId};

// Re-export the main entry points
pub use analyzer::{
    AnalysisParameters, AnalyzeExhaust, AnalyzerFacade, BindingContext, Diagnostic,
    DiagnosticKind, GlobalContext, ModuleInfo, Strategy, SyntaxErrorPolicy,
};
pub use error::{AnalysisError, ResolveError};
