//! Analyzer: builds the scope graph of a module and its binding trace.
//!
//! # Architecture
//!
//! ```text
//! AnalyzerFacade::analyze_files(ctx, module_info, files, params)
//!   │
//!   ├─ AnalysisState        module descriptor, root namespace, file scopes
//!   │
//!   ├─ EagerStrategy        declare all → freeze namespaces → imports →
//!   │                       signatures → bodies
//!   └─ LazyStrategy         declarations materialize on first lookup
//!                           (salsa-backed declaration index), then
//!                           force_resolve_all
//!   │
//!   ▼
//! AnalyzeExhaust { module, context: Arc<BindingContext> }
//! ```
//!
//! Both strategies share declaration, import and reference resolution, and
//! their traces are equal up to descriptor identity (see [`TraceSnapshot`]).
//!
//! A [`GlobalContext`] owns the descriptor and scope arenas, the built-ins
//! and the intrinsic table. Modules analyzed against the same context can
//! import each other's namespaces.

mod cache;
mod config;
mod context;
mod declarations;
mod diagnostics;
mod eager;
mod facade;
mod imports;
mod index;
mod intrinsics;
mod lazy;
mod references;
mod snapshot;
mod state;
mod trace;

pub use cache::{DeclarationsCache, ModificationTracker};
pub use config::{
    AnalysisParameters, ModuleInfo, NamespaceScopeExtension, StandardExtension, Strategy,
    SyntaxErrorPolicy,
};
pub use context::{BuiltIns, GlobalContext};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, DiagnosticSink, Severity, codes,
};
pub use facade::{AnalyzeExhaust, AnalyzerFacade};
pub use index::{FileDeclarations, RootDatabase, SourceInput, file_declarations};
pub use intrinsics::{Intrinsic, IntrinsicFactory, IntrinsicPattern, IntrinsicTable};
pub use lazy::LazySession;
pub use snapshot::TraceSnapshot;
pub use trace::{BindingContext, BindingTrace};
