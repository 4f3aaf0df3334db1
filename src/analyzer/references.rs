//! Reference resolution inside signatures and bodies.
//!
//! Every node visited here ends up in the trace, bound to a descriptor or
//! to a diagnostic.

use tracing::trace;

use crate::base::{Name, NodeId};
use crate::descriptors::{Descriptor, DescriptorData, DescriptorId, DescriptorKind, VariableData};
use crate::error::AnalysisError;
use crate::scopes::{LockLevel, Scope, ScopeId, ScopeKind, WritableScope};
use crate::syntax::{Block, Expr, LocalDecl, Path, PathSegment, Statement, TypeRef};

use super::diagnostics::DiagnosticKind;
use super::state::AnalysisState;

impl AnalysisState<'_> {
    // ========================================================================
    // TYPES AND PATHS
    // ========================================================================

    /// Resolve a type reference and its generic arguments. Returns the
    /// classifier of the outer type.
    pub(crate) fn resolve_type_ref(
        &mut self,
        scope: ScopeId,
        ty: &TypeRef,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        let classifier = self.resolve_classifier_path(scope, &ty.path)?;
        for argument in &ty.arguments {
            self.resolve_type_ref(scope, argument)?;
        }
        Ok(classifier)
    }

    fn resolve_classifier_path(
        &mut self,
        scope: ScopeId,
        path: &Path,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        let Some((last, qualifier)) = path.segments.split_last() else {
            return Ok(None);
        };
        let lookup_scope = if qualifier.is_empty() {
            scope
        } else {
            match self.resolve_qualifier(scope, qualifier)? {
                Some(container) => match self.member_scope(container) {
                    Some(member_scope) => member_scope,
                    None => {
                        self.unresolved(last.node, &last.name);
                        return Ok(None);
                    }
                },
                None => {
                    self.unresolved(last.node, &last.name);
                    return Ok(None);
                }
            }
        };
        self.prepare_lookup(lookup_scope, &last.name)?;
        let classifier = self.ctx.scopes.classifier(lookup_scope, &last.name)?;
        self.bind(last.node, classifier, &last.name);
        Ok(classifier)
    }

    /// Resolve a qualifier path to a namespace or class, binding every
    /// segment. Segments after the first failure are bound as unresolved.
    ///
    /// Each segment prefers a namespace over a class of the same name.
    pub(crate) fn resolve_qualifier(
        &mut self,
        scope: ScopeId,
        segments: &[PathSegment],
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        let mut current_scope = scope;
        let mut container = None;
        for (position, segment) in segments.iter().enumerate() {
            self.prepare_lookup(current_scope, &segment.name)?;
            let scopes = &self.ctx.scopes;
            let found = match scopes.namespace(current_scope, &segment.name)? {
                Some(namespace) => Some(namespace),
                None => scopes.classifier(current_scope, &segment.name)?,
            };
            let next_scope = found.and_then(|id| self.member_scope(id));
            match (found, next_scope) {
                (Some(id), Some(member_scope)) => {
                    self.trace.record_reference(segment.node, id);
                    container = Some(id);
                    current_scope = member_scope;
                }
                _ => {
                    for rest in &segments[position..] {
                        self.unresolved(rest.node, &rest.name);
                    }
                    return Ok(None);
                }
            }
        }
        Ok(container)
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    pub(crate) fn resolve_expr(
        &mut self,
        scope: ScopeId,
        expr: &Expr,
    ) -> Result<(), AnalysisError> {
        match expr {
            Expr::Name { node, name } => {
                let target = self.lookup_value(scope, name)?;
                self.bind(*node, target, name);
            }
            Expr::Call {
                node,
                callee,
                arguments,
            } => {
                for argument in arguments {
                    self.resolve_expr(scope, argument)?;
                }
                self.resolve_call(scope, *node, callee, arguments.len())?;
            }
            Expr::Qualified {
                qualifier,
                selector,
            } => match self.resolve_qualifier(scope, &qualifier.segments)? {
                Some(container) => self.resolve_selector(scope, container, selector)?,
                None => match selector.as_ref() {
                    Expr::Name { node, name } => self.unresolved(*node, name),
                    Expr::Call {
                        node,
                        callee,
                        arguments,
                    } => {
                        for argument in arguments {
                            self.resolve_expr(scope, argument)?;
                        }
                        self.unresolved(*node, callee);
                    }
                    other => self.resolve_expr(scope, other)?,
                },
            },
            Expr::This { node, label } => self.resolve_this(scope, *node, label.as_ref())?,
            Expr::Literal(_) => {}
        }
        Ok(())
    }

    /// A local variable, then a property.
    fn lookup_value(
        &mut self,
        scope: ScopeId,
        name: &Name,
    ) -> Result<Option<DescriptorId>, AnalysisError> {
        self.prepare_lookup(scope, name)?;
        if let Some(local) = self.ctx.scopes.local_variable(scope, name)? {
            return Ok(Some(local));
        }
        Ok(self.ctx.scopes.properties(scope, name)?.first().copied())
    }

    fn resolve_call(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        callee: &Name,
        argument_count: usize,
    ) -> Result<(), AnalysisError> {
        self.prepare_lookup(scope, callee)?;
        let candidates: Vec<_> = self
            .ctx
            .scopes
            .functions(scope, callee)?
            .into_iter()
            .filter(|id| {
                self.ctx
                    .descriptors
                    .get(*id)
                    .as_function()
                    .is_some_and(|data| data.arity == argument_count)
            })
            .collect();
        match candidates.len() {
            1 => self.trace.record_reference(node, candidates[0]),
            0 => {
                // Constructor call.
                let class = self
                    .ctx
                    .scopes
                    .classifier(scope, callee)?
                    .filter(|id| self.ctx.descriptors.kind(*id) == DescriptorKind::Class);
                self.bind(node, class, callee);
            }
            _ => self.report(
                node,
                DiagnosticKind::AmbiguousReference {
                    name: callee.clone(),
                    candidates,
                },
            ),
        }
        Ok(())
    }

    /// `container.selector`: the selector is looked up in the container's
    /// member scope only.
    fn resolve_selector(
        &mut self,
        scope: ScopeId,
        container: DescriptorId,
        selector: &Expr,
    ) -> Result<(), AnalysisError> {
        let Some(member_scope) = self.member_scope(container) else {
            return Ok(());
        };
        match selector {
            Expr::Name { node, name } => {
                self.prepare_lookup(member_scope, name)?;
                let property = self.ctx.scopes.properties(member_scope, name)?.first().copied();
                let target = match property {
                    Some(property) => Some(property),
                    None => self.ctx.scopes.classifier(member_scope, name)?,
                };
                self.bind(*node, target, name);
            }
            Expr::Call {
                node,
                callee,
                arguments,
            } => {
                for argument in arguments {
                    self.resolve_expr(scope, argument)?;
                }
                self.resolve_call(member_scope, *node, callee, arguments.len())?;
            }
            other => self.resolve_expr(scope, other)?,
        }
        Ok(())
    }

    /// `this` binds the innermost receiver; `this@L` the receiver of the
    /// innermost enclosing class named `L`.
    fn resolve_this(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        label: Option<&Name>,
    ) -> Result<(), AnalysisError> {
        let receivers = self.ctx.scopes.implicit_receivers(scope)?;
        let Some(label) = label else {
            self.bind(node, receivers.first().copied(), &Name::special("this"));
            return Ok(());
        };
        let target = receivers.into_iter().find_map(|receiver| {
            let class = match self.ctx.descriptors.get(receiver).data() {
                DescriptorData::Receiver(data) => data.class,
                _ => return None,
            };
            (self.ctx.descriptors.name(class) == label).then_some((receiver, class))
        });
        match target {
            Some((receiver, class)) => {
                self.trace.record_reference(node, receiver);
                self.trace.record_label_target(node, class);
            }
            None => self.unresolved(node, label),
        }
        Ok(())
    }

    // ========================================================================
    // BLOCKS
    // ========================================================================

    /// Resolve a block in a fresh scope below `parent`. Locals become
    /// visible after their declaration.
    pub(crate) fn resolve_block(
        &mut self,
        parent: ScopeId,
        block: &Block,
        owner: DescriptorId,
    ) -> Result<(), AnalysisError> {
        let mut scope = WritableScope::new(ScopeKind::Block, "block", owner, parent);
        scope.change_lock_level(LockLevel::Both)?;
        let scope = self.ctx.scopes.alloc(Scope::Writable(scope));

        for statement in &block.statements {
            match statement {
                Statement::Local(local) => self.resolve_local(scope, local, owner)?,
                Statement::Expr(expr) => self.resolve_expr(scope, expr)?,
                Statement::Block(inner) => self.resolve_block(scope, inner, owner)?,
                Statement::Function(function) => {
                    if self.skipped.contains(&function.node) {
                        continue;
                    }
                    let id = self.declare(function, owner, scope, scope)?;
                    trace!("[LOCAL] {}", self.ctx.descriptors.render(id));
                    self.resolve_signature(id)?;
                    self.resolve_body(id)?;
                }
            }
        }
        self.ctx.scopes.change_lock_level(scope, LockLevel::Reading)?;
        Ok(())
    }

    fn resolve_local(
        &mut self,
        scope: ScopeId,
        local: &LocalDecl,
        owner: DescriptorId,
    ) -> Result<(), AnalysisError> {
        let ty = match &local.ty {
            Some(ty) => self.resolve_type_ref(scope, ty)?,
            None => None,
        };
        if let Some(initializer) = &local.initializer {
            self.resolve_expr(scope, initializer)?;
        }
        let id = self.ctx.descriptors.alloc(Descriptor::new(
            local.name.clone(),
            Some(owner),
            DescriptorData::Variable(VariableData {
                ty,
                is_parameter: false,
            }),
        ));
        self.trace.record_declaration(local.node, id);
        self.ctx.scopes.add_variable(scope, local.name.clone(), id)?;
        self.drain_redeclarations(scope);
        Ok(())
    }
}
