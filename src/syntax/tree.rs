//! Syntax-tree types.
//!
//! The tree carries only what name resolution reads. Every bindable node has
//! a [`NodeId`]; the binding trace is keyed by it.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{FileId, FqName, ImportPath, Name, NodeId};

// ============================================================================
// FILE LEVEL
// ============================================================================

/// One parsed source unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub id: FileId,
    pub node: NodeId,
    pub path: SmolStr,
    pub package: PackageDirective,
    pub imports: Vec<ImportDirective>,
    pub declarations: Vec<Arc<Declaration>>,
    pub errors: Vec<SyntaxError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackageDirective {
    pub node: NodeId,
    pub fq_name: FqName,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportDirective {
    pub node: NodeId,
    pub path: ImportPath,
}

/// A syntax error attached to the node it makes unusable.
///
/// When `node` is the file node the whole file is affected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SyntaxError {
    pub node: NodeId,
    pub message: SmolStr,
}

impl SourceFile {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether a syntax error makes the whole file unusable.
    pub fn is_broken(&self) -> bool {
        self.errors.iter().any(|e| e.node == self.node)
    }

    /// The first syntax error attached to `node`, if any.
    pub fn error_for(&self, node: NodeId) -> Option<&SyntaxError> {
        self.errors.iter().find(|e| e.node == node)
    }

    /// Every node in the file, in source order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = vec![self.node, self.package.node];
        out.extend(self.imports.iter().map(|i| i.node));
        for declaration in &self.declarations {
            declaration.collect_nodes(&mut out);
        }
        out
    }

    /// Which parts of the file its syntax errors make unusable.
    ///
    /// An error inside a declaration takes out the whole top-level
    /// declaration. Errors on the file node, the package directive or on a
    /// node the file does not contain break the whole file.
    pub fn damage(&self) -> SyntaxDamage {
        let mut damage = SyntaxDamage::default();
        for error in &self.errors {
            if error.node == self.node || error.node == self.package.node {
                damage.broken.get_or_insert_with(|| error.message.clone());
                continue;
            }
            if let Some(import) = self.imports.iter().find(|i| i.node == error.node) {
                if !damage.imports.iter().any(|(node, _)| *node == import.node) {
                    damage.imports.push((import.node, error.message.clone()));
                }
                continue;
            }
            let owner = self.declarations.iter().find(|declaration| {
                let mut nodes = Vec::new();
                declaration.collect_nodes(&mut nodes);
                nodes.contains(&error.node)
            });
            match owner {
                Some(declaration) => {
                    if !damage.declarations.iter().any(|(node, _)| *node == declaration.node) {
                        damage.declarations.push((declaration.node, error.message.clone()));
                    }
                }
                None => {
                    damage.broken.get_or_insert_with(|| error.message.clone());
                }
            }
        }
        damage
    }
}

/// Result of [`SourceFile::damage`]; each entry carries the first message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyntaxDamage {
    /// Set when the whole file is unusable.
    pub broken: Option<SmolStr>,
    /// Top-level declarations to skip.
    pub declarations: Vec<(NodeId, SmolStr)>,
    /// Import directives to skip.
    pub imports: Vec<(NodeId, SmolStr)>,
}

impl SyntaxDamage {
    pub fn is_broken(&self) -> bool {
        self.broken.is_some()
    }

    pub fn skips_declaration(&self, node: NodeId) -> bool {
        self.broken.is_some() || self.declarations.iter().any(|(skipped, _)| *skipped == node)
    }

    pub fn skips_import(&self, node: NodeId) -> bool {
        self.broken.is_some() || self.imports.iter().any(|(skipped, _)| *skipped == node)
    }
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub node: NodeId,
    pub name: Name,
    pub annotations: Vec<Name>,
    pub kind: DeclarationKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class(ClassDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassDecl {
    pub type_parameters: Vec<TypeParameterDecl>,
    pub supertypes: Vec<TypeRef>,
    pub members: Vec<Arc<Declaration>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionDecl {
    pub type_parameters: Vec<TypeParameterDecl>,
    pub parameters: Vec<ParameterDecl>,
    pub return_type: Option<TypeRef>,
    pub body: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyDecl {
    pub ty: Option<TypeRef>,
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParameterDecl {
    pub node: NodeId,
    pub name: Name,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterDecl {
    pub node: NodeId,
    pub name: Name,
    pub ty: TypeRef,
}

impl Declaration {
    pub fn is_class(&self) -> bool {
        matches!(self.kind, DeclarationKind::Class(_))
    }

    /// Number of value parameters of a function, `None` otherwise.
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            DeclarationKind::Function(function) => Some(function.parameters.len()),
            _ => None,
        }
    }

    /// This declaration's node followed by every node nested in it.
    pub fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        out.push(self.node);
        match &self.kind {
            DeclarationKind::Class(class) => {
                out.extend(class.type_parameters.iter().map(|p| p.node));
                for supertype in &class.supertypes {
                    supertype.collect_nodes(out);
                }
                for member in &class.members {
                    member.collect_nodes(out);
                }
            }
            DeclarationKind::Function(function) => {
                out.extend(function.type_parameters.iter().map(|p| p.node));
                for parameter in &function.parameters {
                    out.push(parameter.node);
                    parameter.ty.collect_nodes(out);
                }
                if let Some(ty) = &function.return_type {
                    ty.collect_nodes(out);
                }
                if let Some(body) = &function.body {
                    body.collect_nodes(out);
                }
            }
            DeclarationKind::Property(property) => {
                if let Some(ty) = &property.ty {
                    ty.collect_nodes(out);
                }
                if let Some(init) = &property.initializer {
                    init.collect_nodes(out);
                }
            }
        }
    }
}

// ============================================================================
// TYPE REFERENCES AND PATHS
// ============================================================================

/// A possibly qualified reference such as `a.b.C`; one node per segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub node: NodeId,
    pub name: Name,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub path: Path,
    pub arguments: Vec<TypeRef>,
}

impl Path {
    pub fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        out.extend(self.segments.iter().map(|s| s.node));
    }
}

impl TypeRef {
    pub fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        self.path.collect_nodes(out);
        for argument in &self.arguments {
            argument.collect_nodes(out);
        }
    }
}

// ============================================================================
// BODIES
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Statement {
    Local(LocalDecl),
    Expr(Expr),
    Block(Block),
    Function(Arc<Declaration>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalDecl {
    pub node: NodeId,
    pub name: Name,
    pub ty: Option<TypeRef>,
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    /// A simple name: local variable or property.
    Name { node: NodeId, name: Name },
    /// `callee(arguments)`.
    Call {
        node: NodeId,
        callee: Name,
        arguments: Vec<Expr>,
    },
    /// `a.b.selector`, where `a.b` names a namespace or class.
    Qualified {
        qualifier: Path,
        selector: Box<Expr>,
    },
    /// `this` or `this@Label`.
    This { node: NodeId, label: Option<Name> },
    Literal(Literal),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Str(SmolStr),
    Bool(bool),
}

impl Block {
    pub fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        for statement in &self.statements {
            match statement {
                Statement::Local(local) => {
                    out.push(local.node);
                    if let Some(ty) = &local.ty {
                        ty.collect_nodes(out);
                    }
                    if let Some(init) = &local.initializer {
                        init.collect_nodes(out);
                    }
                }
                Statement::Expr(expr) => expr.collect_nodes(out),
                Statement::Block(block) => block.collect_nodes(out),
                Statement::Function(function) => function.collect_nodes(out),
            }
        }
    }
}

impl Expr {
    pub fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        match self {
            Expr::Name { node, .. } | Expr::This { node, .. } => out.push(*node),
            Expr::Call {
                node, arguments, ..
            } => {
                out.push(*node);
                for argument in arguments {
                    argument.collect_nodes(out);
                }
            }
            Expr::Qualified {
                qualifier,
                selector,
            } => {
                qualifier.collect_nodes(out);
                selector.collect_nodes(out);
            }
            Expr::Literal(_) => {}
        }
    }
}
