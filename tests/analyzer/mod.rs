//! Analyzer tests
//!
//! End-to-end tests over the public facade:
//! - Reference resolution inside a module
//! - Imports, aliases and the file scope
//! - Module dependencies and namespace-scope extension
//! - Eager and lazy strategies producing the same trace
//! - Syntax-error policies
//! - Intrinsics, caching and the lazy session

pub mod tests_imports;
pub mod tests_resolution;
pub mod tests_services;
