//! Explicit binding tables shared by the populated scope variants.

use indexmap::{IndexMap, IndexSet};

use crate::base::Name;
use crate::descriptors::DescriptorId;

/// What a table does when a name is bound twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RedeclarationHandler {
    /// Keep the first binding and record a [`Redeclaration`].
    #[default]
    Report,
    /// Later bindings replace earlier ones; overload tables accumulate.
    /// Used for import aliases, where the latest import wins.
    Overwrite,
}

/// Two declarations competing for one name in one scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Redeclaration {
    pub name: Name,
    pub existing: DescriptorId,
    pub conflicting: DescriptorId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FunctionEntry {
    id: DescriptorId,
    arity: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Bindings {
    handler: RedeclarationHandler,
    classifiers: IndexMap<Name, DescriptorId>,
    functions: IndexMap<Name, Vec<FunctionEntry>>,
    properties: IndexMap<Name, Vec<DescriptorId>>,
    variables: IndexMap<Name, DescriptorId>,
    namespaces: IndexMap<Name, DescriptorId>,
    redeclarations: Vec<Redeclaration>,
}

impl Bindings {
    pub(crate) fn new(handler: RedeclarationHandler) -> Self {
        Self {
            handler,
            ..Self::default()
        }
    }

    fn bind_single(
        handler: RedeclarationHandler,
        table: &mut IndexMap<Name, DescriptorId>,
        redeclarations: &mut Vec<Redeclaration>,
        name: Name,
        id: DescriptorId,
    ) {
        match table.get(&name).copied() {
            Some(existing) if existing == id => {}
            Some(existing) if handler == RedeclarationHandler::Report => {
                redeclarations.push(Redeclaration {
                    name,
                    existing,
                    conflicting: id,
                });
            }
            _ => {
                table.insert(name, id);
            }
        }
    }

    pub(crate) fn add_classifier(&mut self, name: Name, id: DescriptorId) {
        Self::bind_single(self.handler, &mut self.classifiers, &mut self.redeclarations, name, id);
    }

    pub(crate) fn add_variable(&mut self, name: Name, id: DescriptorId) {
        Self::bind_single(self.handler, &mut self.variables, &mut self.redeclarations, name, id);
    }

    pub(crate) fn add_namespace(&mut self, name: Name, id: DescriptorId) {
        Self::bind_single(self.handler, &mut self.namespaces, &mut self.redeclarations, name, id);
    }

    /// Overloads coexist unless they share an arity.
    pub(crate) fn add_function(&mut self, name: Name, id: DescriptorId, arity: usize) {
        let overloads = self.functions.entry(name.clone()).or_default();
        if overloads.iter().any(|entry| entry.id == id) {
            return;
        }
        if self.handler == RedeclarationHandler::Report {
            if let Some(existing) = overloads.iter().find(|entry| entry.arity == arity) {
                self.redeclarations.push(Redeclaration {
                    name,
                    existing: existing.id,
                    conflicting: id,
                });
                return;
            }
        }
        overloads.push(FunctionEntry { id, arity });
    }

    pub(crate) fn add_property(&mut self, name: Name, id: DescriptorId) {
        let properties = self.properties.entry(name.clone()).or_default();
        if properties.contains(&id) {
            return;
        }
        if self.handler == RedeclarationHandler::Report {
            if let Some(existing) = properties.first() {
                self.redeclarations.push(Redeclaration {
                    name,
                    existing: *existing,
                    conflicting: id,
                });
                return;
            }
        }
        properties.push(id);
    }

    pub(crate) fn classifier(&self, name: &Name) -> Option<DescriptorId> {
        self.classifiers.get(name).copied()
    }

    pub(crate) fn variable(&self, name: &Name) -> Option<DescriptorId> {
        self.variables.get(name).copied()
    }

    pub(crate) fn namespace(&self, name: &Name) -> Option<DescriptorId> {
        self.namespaces.get(name).copied()
    }

    pub(crate) fn collect_functions(&self, name: &Name, out: &mut IndexSet<DescriptorId>) {
        if let Some(overloads) = self.functions.get(name) {
            out.extend(overloads.iter().map(|entry| entry.id));
        }
    }

    pub(crate) fn collect_properties(&self, name: &Name, out: &mut IndexSet<DescriptorId>) {
        if let Some(properties) = self.properties.get(name) {
            out.extend(properties.iter().copied());
        }
    }

    pub(crate) fn take_redeclarations(&mut self) -> Vec<Redeclaration> {
        std::mem::take(&mut self.redeclarations)
    }

    /// Every bound descriptor: classifiers, namespaces, functions,
    /// properties, then variables, each in binding order.
    pub(crate) fn all(&self) -> Vec<DescriptorId> {
        let mut out: Vec<DescriptorId> = self.classifiers.values().copied().collect();
        out.extend(self.namespaces.values().copied());
        out.extend(self.functions.values().flatten().map(|entry| entry.id));
        out.extend(self.properties.values().flatten().copied());
        out.extend(self.variables.values().copied());
        out
    }
}
