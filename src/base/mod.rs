//! Foundation types for the resolution core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Name`], [`Interner`] - Identifiers with identity semantics
//! - [`FqName`], [`ImportPath`] - Dotted paths and import directives
//! - [`FileId`], [`NodeId`] - Stable identities for files and syntax nodes
//! - Crate constants (built-in namespace, default imports)
//!
//! This module has NO dependencies on other lexscope modules.

pub mod constants;
mod fq_name;
mod ids;
mod name;

pub use fq_name::{FqName, ImportPath};
pub use ids::{FileId, NodeId};
pub use name::{Interner, Name};
