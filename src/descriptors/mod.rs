//! Descriptors: the semantic declaration graph.
//!
//! Every declaration the analyzer understands becomes a [`Descriptor`] owned
//! by a [`DescriptorArena`]. Descriptors form a tree through their
//! containing-declaration handle:
//!
//! ```text
//! Module <app>
//!   └─ Namespace <root>
//!        └─ Namespace a
//!             ├─ Class C ── Receiver <this>, TypeParameter T
//!             └─ Function f/1 ── Variable x (parameter)
//! ```
//!
//! Handles are plain indices, so a namespace and its members never own each
//! other. A module owns its root namespace through a set-once slot.

mod arena;
mod descriptor;
mod module;

pub use arena::DescriptorArena;
pub use descriptor::{
    ClassData, Descriptor, DescriptorData, DescriptorId, DescriptorKind, FunctionData,
    ModuleData, NamespaceData, PropertyData, ReceiverData, TypeParameterData, VariableData,
};
pub use module::{PlatformClassMap, collect_namespaces, find_namespace};
