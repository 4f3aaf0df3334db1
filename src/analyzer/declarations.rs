//! Declaring descriptors and resolving their signatures and bodies.
//!
//! Declaring registers a descriptor in its container's member scope before
//! anything about it is resolved, so recursive references always find it.
//! Signatures and bodies are resolved later, at most once per descriptor.

use std::sync::Arc;

use tracing::trace;

use crate::base::{FqName, Name};
use crate::descriptors::{
    ClassData, Descriptor, DescriptorArena, DescriptorData, DescriptorId, FunctionData,
    NamespaceData, PropertyData, ReceiverData, TypeParameterData, VariableData,
};
use crate::error::{AnalysisError, ResolveError};
use crate::scopes::{LazyMemberScope, LockLevel, Scope, ScopeArena, ScopeId, ScopeKind, WritableScope};
use crate::syntax::{Declaration, DeclarationKind};

use super::state::AnalysisState;

// ============================================================================
// DESCRIPTOR SHELLS
// ============================================================================

/// A class descriptor with its scopes. The member scope is left writable.
#[derive(Debug)]
pub(crate) struct ClassShell {
    pub(crate) id: DescriptorId,
    pub(crate) member_scope: ScopeId,
    pub(crate) resolution_scope: ScopeId,
    pub(crate) type_parameters: Vec<DescriptorId>,
}

/// Allocate a class, its receiver, its type parameters and its scopes.
///
/// The resolution scope (type parameters and `this`, over the member scope,
/// with `lexical_scope` as parent) is frozen right away.
pub(crate) fn alloc_class(
    descriptors: &mut DescriptorArena,
    scopes: &mut ScopeArena,
    name: Name,
    containing: DescriptorId,
    annotations: Vec<Name>,
    type_parameters: &[Name],
    lexical_scope: ScopeId,
) -> Result<ClassShell, ResolveError> {
    let id = descriptors.next_id();
    let member_scope = scopes.alloc(Scope::Writable(WritableScope::new(
        ScopeKind::ClassMembers,
        format!("members of class {name}"),
        id,
        ScopeId::EMPTY,
    )));
    let class = descriptors.alloc(
        Descriptor::new(
            name.clone(),
            Some(containing),
            DescriptorData::Class(ClassData {
                member_scope,
                resolution_scope: ScopeId::EMPTY,
                receiver: None,
                type_parameters: Vec::new(),
                supertypes: Vec::new(),
            }),
        )
        .with_annotations(annotations),
    );
    let receiver = descriptors.alloc(Descriptor::new(
        Name::special("this"),
        Some(class),
        DescriptorData::Receiver(ReceiverData { class }),
    ));

    let mut resolution = WritableScope::new(
        ScopeKind::ClassResolution,
        format!("scope for class {name}"),
        class,
        lexical_scope,
    )
    .with_receiver(receiver);
    let mut parameters = Vec::with_capacity(type_parameters.len());
    for (index, parameter) in type_parameters.iter().enumerate() {
        let parameter_id = descriptors.alloc(Descriptor::new(
            parameter.clone(),
            Some(class),
            DescriptorData::TypeParameter(TypeParameterData { index }),
        ));
        resolution.add_classifier(parameter.clone(), parameter_id)?;
        parameters.push(parameter_id);
    }
    let resolution_scope = scopes.alloc(Scope::Writable(resolution));
    scopes.import_scope(resolution_scope, member_scope)?;
    scopes.change_lock_level(resolution_scope, LockLevel::Reading)?;

    if let DescriptorData::Class(data) = descriptors.get_mut(class).data_mut() {
        data.resolution_scope = resolution_scope;
        data.receiver = Some(receiver);
        data.type_parameters = parameters.clone();
    }
    Ok(ClassShell {
        id: class,
        member_scope,
        resolution_scope,
        type_parameters: parameters,
    })
}

/// A function descriptor with its frozen signature scope.
#[derive(Debug)]
pub(crate) struct FunctionShell {
    pub(crate) id: DescriptorId,
    pub(crate) signature_scope: ScopeId,
    pub(crate) type_parameters: Vec<DescriptorId>,
    pub(crate) value_parameters: Vec<DescriptorId>,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn alloc_function(
    descriptors: &mut DescriptorArena,
    scopes: &mut ScopeArena,
    name: Name,
    containing: DescriptorId,
    annotations: Vec<Name>,
    type_parameters: &[Name],
    parameters: &[Name],
    lexical_scope: ScopeId,
) -> Result<FunctionShell, ResolveError> {
    let function = descriptors.alloc(
        Descriptor::new(
            name.clone(),
            Some(containing),
            DescriptorData::Function(FunctionData {
                arity: parameters.len(),
                ..FunctionData::default()
            }),
        )
        .with_annotations(annotations),
    );
    let mut signature = WritableScope::new(
        ScopeKind::FunctionSignature,
        format!("signature of {name}"),
        function,
        lexical_scope,
    );
    let mut type_parameter_ids = Vec::with_capacity(type_parameters.len());
    for (index, parameter) in type_parameters.iter().enumerate() {
        let id = descriptors.alloc(Descriptor::new(
            parameter.clone(),
            Some(function),
            DescriptorData::TypeParameter(TypeParameterData { index }),
        ));
        signature.add_classifier(parameter.clone(), id)?;
        type_parameter_ids.push(id);
    }
    let mut value_parameter_ids = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let id = descriptors.alloc(Descriptor::new(
            parameter.clone(),
            Some(function),
            DescriptorData::Variable(VariableData {
                ty: None,
                is_parameter: true,
            }),
        ));
        signature.add_variable(parameter.clone(), id)?;
        value_parameter_ids.push(id);
    }
    signature.change_lock_level(LockLevel::Reading)?;
    let signature_scope = scopes.alloc(Scope::Writable(signature));

    if let DescriptorData::Function(data) = descriptors.get_mut(function).data_mut() {
        data.type_parameters = type_parameter_ids.clone();
        data.value_parameters = value_parameter_ids.clone();
    }
    Ok(FunctionShell {
        id: function,
        signature_scope,
        type_parameters: type_parameter_ids,
        value_parameters: value_parameter_ids,
    })
}

// ============================================================================
// NAMESPACES AND DECLARATIONS
// ============================================================================

impl AnalysisState<'_> {
    /// Create the namespace `fq_name` under `parent` (the root when `None`)
    /// and extend its member scope.
    pub(crate) fn create_namespace(
        &mut self,
        parent: Option<DescriptorId>,
        fq_name: FqName,
    ) -> Result<DescriptorId, AnalysisError> {
        let id = self.ctx.descriptors.next_id();
        let debug_name = format!("members of namespace {fq_name}");
        let scope = if self.is_lazy() {
            Scope::Lazy(LazyMemberScope::new(debug_name, id))
        } else {
            Scope::Writable(WritableScope::new(
                ScopeKind::NamespaceMembers,
                debug_name,
                id,
                ScopeId::EMPTY,
            ))
        };
        let member_scope = self.ctx.scopes.alloc(scope);
        let (name, containing) = match (parent, fq_name.short_name()) {
            (Some(parent), Some(short)) => (short.clone(), parent),
            _ => (Name::special("root"), self.module),
        };
        let namespace = self.ctx.descriptors.alloc(Descriptor::new(
            name.clone(),
            Some(containing),
            DescriptorData::Namespace(NamespaceData {
                fq_name: fq_name.clone(),
                member_scope,
            }),
        ));
        match parent {
            Some(parent) => {
                let parent_scope = self.ctx.descriptors.namespace_scope(parent)?;
                self.ctx.scopes.add_namespace(parent_scope, name, namespace)?;
            }
            None => self.ctx.descriptors.set_root_namespace(self.module, namespace)?,
        }
        self.info
            .extend_namespace_scope(self.ctx, &fq_name, member_scope)?;
        trace!("[NAMESPACE] {} created in {}", fq_name, self.info.name());
        self.trace.record_namespace(fq_name.clone(), namespace);
        self.namespaces.insert(fq_name, namespace);
        Ok(namespace)
    }

    /// The namespace at `fq_name`, creating it and its ancestors as needed.
    pub(crate) fn ensure_namespace(
        &mut self,
        fq_name: &FqName,
    ) -> Result<DescriptorId, AnalysisError> {
        if let Some(namespace) = self.namespaces.get(fq_name) {
            return Ok(*namespace);
        }
        let parent = match fq_name.parent() {
            Some(parent_fq) => self.ensure_namespace(&parent_fq)?,
            None => self.root,
        };
        self.create_namespace(Some(parent), fq_name.clone())
    }

    /// Register `declaration` in `member_scope`, owned by `container`.
    ///
    /// Classes are declared with all their members; the member scope is
    /// frozen afterwards.
    pub(crate) fn declare(
        &mut self,
        declaration: &Arc<Declaration>,
        container: DescriptorId,
        member_scope: ScopeId,
        lexical_scope: ScopeId,
    ) -> Result<DescriptorId, AnalysisError> {
        let name = declaration.name.clone();
        let annotations = declaration.annotations.clone();
        let id = match &declaration.kind {
            DeclarationKind::Class(class) => {
                let type_parameters: Vec<_> =
                    class.type_parameters.iter().map(|p| p.name.clone()).collect();
                let shell = alloc_class(
                    &mut self.ctx.descriptors,
                    &mut self.ctx.scopes,
                    name.clone(),
                    container,
                    annotations,
                    &type_parameters,
                    lexical_scope,
                )?;
                self.trace.record_declaration(declaration.node, shell.id);
                for (parameter, id) in class.type_parameters.iter().zip(&shell.type_parameters) {
                    self.trace.record_declaration(parameter.node, *id);
                }
                self.drain_redeclarations(shell.resolution_scope);
                self.ctx.scopes.add_classifier(member_scope, name, shell.id)?;
                for member in &class.members {
                    self.declare(member, shell.id, shell.member_scope, shell.resolution_scope)?;
                }
                self.ctx
                    .scopes
                    .change_lock_level(shell.member_scope, LockLevel::Reading)?;
                shell.id
            }
            DeclarationKind::Function(function) => {
                let type_parameters: Vec<_> =
                    function.type_parameters.iter().map(|p| p.name.clone()).collect();
                let parameters: Vec<_> = function.parameters.iter().map(|p| p.name.clone()).collect();
                let shell = alloc_function(
                    &mut self.ctx.descriptors,
                    &mut self.ctx.scopes,
                    name.clone(),
                    container,
                    annotations,
                    &type_parameters,
                    &parameters,
                    lexical_scope,
                )?;
                self.trace.record_declaration(declaration.node, shell.id);
                for (parameter, id) in function.type_parameters.iter().zip(&shell.type_parameters) {
                    self.trace.record_declaration(parameter.node, *id);
                }
                for (parameter, id) in function.parameters.iter().zip(&shell.value_parameters) {
                    self.trace.record_declaration(parameter.node, *id);
                }
                self.drain_redeclarations(shell.signature_scope);
                self.ctx
                    .scopes
                    .add_function(member_scope, name, shell.id, parameters.len())?;
                self.signature_scopes.insert(shell.id, shell.signature_scope);
                shell.id
            }
            DeclarationKind::Property(_) => {
                let id = self.ctx.descriptors.alloc(
                    Descriptor::new(
                        name.clone(),
                        Some(container),
                        DescriptorData::Property(PropertyData::default()),
                    )
                    .with_annotations(annotations),
                );
                self.trace.record_declaration(declaration.node, id);
                self.ctx.scopes.add_property(member_scope, name, id)?;
                id
            }
        };
        self.syntax.insert(id, declaration.clone());
        self.lexical.insert(id, lexical_scope);
        self.drain_redeclarations(member_scope);
        Ok(id)
    }

    // ========================================================================
    // SIGNATURES AND BODIES
    // ========================================================================

    /// Resolve supertypes, parameter, return and property types once.
    pub(crate) fn resolve_signature(&mut self, id: DescriptorId) -> Result<(), AnalysisError> {
        if !self.signatures_done.insert(id) {
            return Ok(());
        }
        let Some(declaration) = self.syntax.get(&id).cloned() else {
            return Ok(());
        };
        match &declaration.kind {
            DeclarationKind::Class(class) => {
                let scope = match self.ctx.descriptors.get(id).as_class() {
                    Some(data) => data.resolution_scope,
                    None => return Ok(()),
                };
                let mut supertypes = Vec::new();
                for supertype in &class.supertypes {
                    supertypes.extend(self.resolve_type_ref(scope, supertype)?);
                }
                if let DescriptorData::Class(data) = self.ctx.descriptors.get_mut(id).data_mut() {
                    data.supertypes = supertypes;
                }
            }
            DeclarationKind::Function(function) => {
                let Some(scope) = self.signature_scopes.get(&id).copied() else {
                    return Ok(());
                };
                let value_parameters = self
                    .ctx
                    .descriptors
                    .get(id)
                    .as_function()
                    .map(|data| data.value_parameters.clone())
                    .unwrap_or_default();
                for (parameter, parameter_id) in function.parameters.iter().zip(value_parameters) {
                    let ty = self.resolve_type_ref(scope, &parameter.ty)?;
                    if let DescriptorData::Variable(data) =
                        self.ctx.descriptors.get_mut(parameter_id).data_mut()
                    {
                        data.ty = ty;
                    }
                }
                if let Some(return_type) = &function.return_type {
                    let ty = self.resolve_type_ref(scope, return_type)?;
                    if let DescriptorData::Function(data) = self.ctx.descriptors.get_mut(id).data_mut() {
                        data.return_type = ty;
                    }
                }
            }
            DeclarationKind::Property(property) => {
                let (Some(ty), Some(scope)) = (&property.ty, self.lexical.get(&id).copied()) else {
                    return Ok(());
                };
                let ty = self.resolve_type_ref(scope, ty)?;
                if let DescriptorData::Property(data) = self.ctx.descriptors.get_mut(id).data_mut() {
                    data.ty = ty;
                }
            }
        }
        Ok(())
    }

    /// Resolve a function body or property initializer once, after the
    /// signature.
    pub(crate) fn resolve_body(&mut self, id: DescriptorId) -> Result<(), AnalysisError> {
        if !self.bodies_done.insert(id) {
            return Ok(());
        }
        self.resolve_signature(id)?;
        let Some(declaration) = self.syntax.get(&id).cloned() else {
            return Ok(());
        };
        match &declaration.kind {
            DeclarationKind::Function(function) => {
                if let (Some(body), Some(scope)) = (&function.body, self.signature_scopes.get(&id).copied()) {
                    self.resolve_block(scope, body, id)?;
                }
            }
            DeclarationKind::Property(property) => {
                if let (Some(initializer), Some(scope)) =
                    (&property.initializer, self.lexical.get(&id).copied())
                {
                    self.resolve_expr(scope, initializer)?;
                }
            }
            DeclarationKind::Class(_) => {}
        }
        Ok(())
    }

    /// Every declared descriptor, in allocation order.
    pub(crate) fn declared(&self) -> Vec<DescriptorId> {
        let mut declared: Vec<_> = self.syntax.keys().copied().collect();
        declared.sort();
        declared
    }
}
