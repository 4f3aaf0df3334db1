//! Syntax trees consumed by the analyzer.
//!
//! Parsing is an external collaborator: it produces [`SourceFile`]s, using a
//! [`SyntaxFactory`] to hand out node identities. The analyzer never looks at
//! source text, only at this tree shape.

mod factory;
mod tree;

pub use factory::SyntaxFactory;
pub use tree::{
    Block, ClassDecl, Declaration, DeclarationKind, Expr, FunctionDecl, ImportDirective, Literal,
    LocalDecl, PackageDirective, ParameterDecl, Path, PathSegment, PropertyDecl, SourceFile,
    Statement, SyntaxDamage, SyntaxError, TypeParameterDecl, TypeRef,
};
