//! Descriptor node types.

use std::fmt;
use std::sync::OnceLock;

use crate::base::{FqName, ImportPath, Name};
use crate::scopes::ScopeId;

use super::module::PlatformClassMap;

/// Handle into a [`DescriptorArena`](super::DescriptorArena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DescriptorId(u32);

impl DescriptorId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

/// The variant of a descriptor, without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorKind {
    Module,
    Namespace,
    Class,
    Function,
    Property,
    Variable,
    TypeParameter,
    Receiver,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Module => "module",
            DescriptorKind::Namespace => "namespace",
            DescriptorKind::Class => "class",
            DescriptorKind::Function => "fun",
            DescriptorKind::Property => "property",
            DescriptorKind::Variable => "val",
            DescriptorKind::TypeParameter => "type-parameter",
            DescriptorKind::Receiver => "receiver",
        }
    }

    /// Kinds a classifier lookup may return.
    pub fn is_classifier(&self) -> bool {
        matches!(self, DescriptorKind::Class | DescriptorKind::TypeParameter)
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// A node of the semantic declaration graph.
///
/// `containing` is a non-owning handle; the arena owns every descriptor.
#[derive(Debug)]
pub struct Descriptor {
    name: Name,
    containing: Option<DescriptorId>,
    annotations: Vec<Name>,
    data: DescriptorData,
}

#[derive(Debug)]
pub enum DescriptorData {
    Module(ModuleData),
    Namespace(NamespaceData),
    Class(ClassData),
    Function(FunctionData),
    Property(PropertyData),
    Variable(VariableData),
    TypeParameter(TypeParameterData),
    Receiver(ReceiverData),
}

#[derive(Debug)]
pub struct ModuleData {
    pub(super) root_namespace: OnceLock<DescriptorId>,
    pub(super) default_imports: Vec<ImportPath>,
    pub(super) platform_classes: PlatformClassMap,
}

#[derive(Debug)]
pub struct NamespaceData {
    pub fq_name: FqName,
    pub member_scope: ScopeId,
}

#[derive(Debug)]
pub struct ClassData {
    /// Members declared in the class body.
    pub member_scope: ScopeId,
    /// Lexical scope for resolving the class's members: type parameters,
    /// the `this` receiver and the member scope over the outer scope.
    pub resolution_scope: ScopeId,
    pub receiver: Option<DescriptorId>,
    pub type_parameters: Vec<DescriptorId>,
    pub supertypes: Vec<DescriptorId>,
}

#[derive(Debug, Default)]
pub struct FunctionData {
    pub arity: usize,
    pub type_parameters: Vec<DescriptorId>,
    pub value_parameters: Vec<DescriptorId>,
    pub return_type: Option<DescriptorId>,
}

#[derive(Debug, Default)]
pub struct PropertyData {
    pub ty: Option<DescriptorId>,
}

#[derive(Debug, Default)]
pub struct VariableData {
    pub ty: Option<DescriptorId>,
    pub is_parameter: bool,
}

#[derive(Debug)]
pub struct TypeParameterData {
    pub index: usize,
}

#[derive(Debug)]
pub struct ReceiverData {
    pub class: DescriptorId,
}

impl Descriptor {
    pub fn new(name: Name, containing: Option<DescriptorId>, data: DescriptorData) -> Self {
        Self {
            name,
            containing,
            annotations: Vec::new(),
            data,
        }
    }

    pub fn with_annotations(mut self, annotations: impl IntoIterator<Item = Name>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn containing_declaration(&self) -> Option<DescriptorId> {
        self.containing
    }

    pub fn annotations(&self) -> &[Name] {
        &self.annotations
    }

    pub fn data(&self) -> &DescriptorData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut DescriptorData {
        &mut self.data
    }

    pub fn kind(&self) -> DescriptorKind {
        match &self.data {
            DescriptorData::Module(_) => DescriptorKind::Module,
            DescriptorData::Namespace(_) => DescriptorKind::Namespace,
            DescriptorData::Class(_) => DescriptorKind::Class,
            DescriptorData::Function(_) => DescriptorKind::Function,
            DescriptorData::Property(_) => DescriptorKind::Property,
            DescriptorData::Variable(_) => DescriptorKind::Variable,
            DescriptorData::TypeParameter(_) => DescriptorKind::TypeParameter,
            DescriptorData::Receiver(_) => DescriptorKind::Receiver,
        }
    }

    /// Scope holding the members of a namespace or class.
    pub fn member_scope(&self) -> Option<ScopeId> {
        match &self.data {
            DescriptorData::Namespace(namespace) => Some(namespace.member_scope),
            DescriptorData::Class(class) => Some(class.member_scope),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleData> {
        match &self.data {
            DescriptorData::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        match &self.data {
            DescriptorData::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.data {
            DescriptorData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.data {
            DescriptorData::Function(function) => Some(function),
            _ => None,
        }
    }
}
