//! Arena owning every descriptor of an analysis run.

use crate::base::{FqName, Name};
use crate::error::ResolveError;
use crate::scopes::ScopeId;

use super::descriptor::{Descriptor, DescriptorData, DescriptorId, DescriptorKind};

/// Owns descriptors; everything else refers to them by [`DescriptorId`].
///
/// Descriptors are only ever appended, so ids stay valid for the lifetime
/// of the arena.
#[derive(Debug, Default)]
pub struct DescriptorArena {
    descriptors: Vec<Descriptor>,
}

impl DescriptorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, descriptor: Descriptor) -> DescriptorId {
        let id = self.next_id();
        self.descriptors.push(descriptor);
        id
    }

    /// The id the next [`alloc`](Self::alloc) will return.
    ///
    /// Lets a caller build scopes owned by a descriptor before the
    /// descriptor itself exists.
    pub fn next_id(&self) -> DescriptorId {
        DescriptorId::new(self.descriptors.len() as u32)
    }

    pub fn get(&self, id: DescriptorId) -> &Descriptor {
        &self.descriptors[id.index() as usize]
    }

    pub(crate) fn get_mut(&mut self, id: DescriptorId) -> &mut Descriptor {
        &mut self.descriptors[id.index() as usize]
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DescriptorId, &Descriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (DescriptorId::new(i as u32), d))
    }

    pub fn kind(&self, id: DescriptorId) -> DescriptorKind {
        self.get(id).kind()
    }

    pub fn name(&self, id: DescriptorId) -> &Name {
        self.get(id).name()
    }

    // ========================================================================
    // CONTAINMENT
    // ========================================================================

    /// `id` followed by its containing declarations, outermost last.
    pub fn containment_chain(&self, id: DescriptorId) -> Vec<DescriptorId> {
        let mut chain = vec![id];
        let mut current = self.get(id).containing_declaration();
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).containing_declaration();
        }
        chain
    }

    /// The module at the root of `id`'s containment chain.
    pub fn module_of(&self, id: DescriptorId) -> Option<DescriptorId> {
        self.containment_chain(id)
            .into_iter()
            .find(|d| self.kind(*d) == DescriptorKind::Module)
    }

    /// The nearest enclosing namespace of `id`, or `id` itself.
    pub fn namespace_of(&self, id: DescriptorId) -> Option<DescriptorId> {
        self.containment_chain(id)
            .into_iter()
            .find(|d| self.kind(*d) == DescriptorKind::Namespace)
    }

    /// Fully-qualified name of a namespace, class, function or property
    /// declared in a namespace or class. Locals have none.
    pub fn fq_name(&self, id: DescriptorId) -> Option<FqName> {
        let descriptor = self.get(id);
        match descriptor.data() {
            DescriptorData::Namespace(namespace) => Some(namespace.fq_name.clone()),
            DescriptorData::Class(_) | DescriptorData::Function(_) | DescriptorData::Property(_) => {
                let parent = descriptor.containing_declaration()?;
                match self.kind(parent) {
                    DescriptorKind::Namespace | DescriptorKind::Class => {
                        Some(self.fq_name(parent)?.child(descriptor.name().clone()))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Member scope of a namespace descriptor.
    pub fn namespace_scope(&self, id: DescriptorId) -> Result<ScopeId, ResolveError> {
        self.get(id)
            .as_namespace()
            .map(|namespace| namespace.member_scope)
            .ok_or_else(|| ResolveError::NotANamespace {
                name: self.name(id).clone(),
            })
    }

    // ========================================================================
    // STRUCTURAL RENDERING
    // ========================================================================

    /// Identity-free rendering: kind, owning module and containment path.
    ///
    /// Two descriptors built by different strategies from the same
    /// declaration render identically, e.g. `fun <app>::a.b.f/1`.
    pub fn render(&self, id: DescriptorId) -> String {
        let descriptor = self.get(id);
        if descriptor.kind() == DescriptorKind::Module {
            return format!("module {}", descriptor.name());
        }
        let chain = self.containment_chain(id);
        let mut module = String::from("?");
        let mut segments = Vec::new();
        for ancestor in chain.iter().rev() {
            let ancestor_descriptor = self.get(*ancestor);
            match ancestor_descriptor.data() {
                DescriptorData::Module(_) => module = ancestor_descriptor.name().to_string(),
                DescriptorData::Namespace(namespace) if namespace.fq_name.is_root() => {}
                DescriptorData::Function(function) => {
                    segments.push(format!("{}/{}", ancestor_descriptor.name(), function.arity))
                }
                _ => segments.push(ancestor_descriptor.name().to_string()),
            }
        }
        let path = if segments.is_empty() {
            "<root>".to_string()
        } else {
            segments.join(".")
        };
        format!("{} {}::{}", descriptor.kind(), module, path)
    }
}
