//! Node-allocating constructors for syntax trees.
//!
//! The parser collaborator (and tests) build trees through a
//! [`SyntaxFactory`], which hands out unique [`NodeId`]s per file and interns
//! identifier text.
//!
//! ```ignore
//! let mut f = SyntaxFactory::new(FileId::new(0));
//! let body = f.block(vec![f.expr_stmt(call)]);
//! let main = f.function("main", vec![], Some(body));
//! let file = f.file("main.src", "app", &["lib.*"], vec![main]);
//! ```

use std::sync::Arc;

use smol_str::SmolStr;

use super::tree::*;
use crate::base::{FileId, FqName, ImportPath, Interner, Name, NodeId};

/// Builds syntax trees for one file.
#[derive(Debug)]
pub struct SyntaxFactory {
    file: FileId,
    next: u32,
    interner: Interner,
    pending_errors: Vec<SyntaxError>,
}

impl SyntaxFactory {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            next: 0,
            interner: Interner::new(),
            pending_errors: Vec::new(),
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file
    }

    /// Allocate a fresh node identity.
    pub fn node(&mut self) -> NodeId {
        let id = NodeId::new(self.file, self.next);
        self.next += 1;
        id
    }

    pub fn name(&mut self, text: &str) -> Name {
        self.interner.identifier(text)
    }

    // ========================================================================
    // DECLARATIONS
    // ========================================================================

    pub fn class(&mut self, name: &str, members: Vec<Arc<Declaration>>) -> Arc<Declaration> {
        self.class_with(name, &[], Vec::new(), members)
    }

    pub fn class_with(
        &mut self,
        name: &str,
        type_parameters: &[&str],
        supertypes: Vec<TypeRef>,
        members: Vec<Arc<Declaration>>,
    ) -> Arc<Declaration> {
        let type_parameters = self.type_parameters(type_parameters);
        self.declaration(
            name,
            DeclarationKind::Class(ClassDecl {
                type_parameters,
                supertypes,
                members,
            }),
        )
    }

    pub fn function(
        &mut self,
        name: &str,
        parameters: Vec<ParameterDecl>,
        body: Option<Block>,
    ) -> Arc<Declaration> {
        self.function_with(name, &[], parameters, None, body)
    }

    pub fn function_with(
        &mut self,
        name: &str,
        type_parameters: &[&str],
        parameters: Vec<ParameterDecl>,
        return_type: Option<TypeRef>,
        body: Option<Block>,
    ) -> Arc<Declaration> {
        let type_parameters = self.type_parameters(type_parameters);
        self.declaration(
            name,
            DeclarationKind::Function(FunctionDecl {
                type_parameters,
                parameters,
                return_type,
                body,
            }),
        )
    }

    pub fn property(
        &mut self,
        name: &str,
        ty: Option<TypeRef>,
        initializer: Option<Expr>,
    ) -> Arc<Declaration> {
        self.declaration(name, DeclarationKind::Property(PropertyDecl { ty, initializer }))
    }

    pub fn param(&mut self, name: &str, ty: &str) -> ParameterDecl {
        let ty = self.type_ref(ty);
        ParameterDecl {
            node: self.node(),
            name: self.name(name),
            ty,
        }
    }

    /// Copy of `declaration` carrying the given annotations.
    pub fn annotated(
        &mut self,
        declaration: Arc<Declaration>,
        annotations: &[&str],
    ) -> Arc<Declaration> {
        let mut declaration = Arc::unwrap_or_clone(declaration);
        declaration
            .annotations
            .extend(annotations.iter().map(|a| self.interner.identifier(a)));
        Arc::new(declaration)
    }

    fn declaration(&mut self, name: &str, kind: DeclarationKind) -> Arc<Declaration> {
        Arc::new(Declaration {
            node: self.node(),
            name: self.name(name),
            annotations: Vec::new(),
            kind,
        })
    }

    fn type_parameters(&mut self, names: &[&str]) -> Vec<TypeParameterDecl> {
        names
            .iter()
            .map(|name| TypeParameterDecl {
                node: self.node(),
                name: self.name(name),
            })
            .collect()
    }

    // ========================================================================
    // TYPES AND PATHS
    // ========================================================================

    /// A path from dotted text; one node per segment.
    pub fn path(&mut self, text: &str) -> Path {
        Path {
            segments: text
                .split('.')
                .map(|segment| PathSegment {
                    node: self.node(),
                    name: self.name(segment),
                })
                .collect(),
        }
    }

    pub fn type_ref(&mut self, path: &str) -> TypeRef {
        self.generic_type(path, Vec::new())
    }

    pub fn generic_type(&mut self, path: &str, arguments: Vec<TypeRef>) -> TypeRef {
        TypeRef {
            path: self.path(path),
            arguments,
        }
    }

    // ========================================================================
    // BODIES
    // ========================================================================

    pub fn block(&mut self, statements: Vec<Statement>) -> Block {
        Block { statements }
    }

    pub fn local(
        &mut self,
        name: &str,
        ty: Option<TypeRef>,
        initializer: Option<Expr>,
    ) -> Statement {
        Statement::Local(LocalDecl {
            node: self.node(),
            name: self.name(name),
            ty,
            initializer,
        })
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Statement {
        Statement::Expr(expr)
    }

    pub fn name_ref(&mut self, name: &str) -> Expr {
        Expr::Name {
            node: self.node(),
            name: self.name(name),
        }
    }

    pub fn call(&mut self, callee: &str, arguments: Vec<Expr>) -> Expr {
        Expr::Call {
            node: self.node(),
            callee: self.name(callee),
            arguments,
        }
    }

    pub fn qualified(&mut self, qualifier: &str, selector: Expr) -> Expr {
        Expr::Qualified {
            qualifier: self.path(qualifier),
            selector: Box::new(selector),
        }
    }

    pub fn this(&mut self, label: Option<&str>) -> Expr {
        Expr::This {
            node: self.node(),
            label: label.map(|l| self.interner.identifier(l)),
        }
    }

    pub fn int(&mut self, value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        Expr::Literal(Literal::Str(SmolStr::new(value)))
    }

    // ========================================================================
    // ERRORS AND FILES
    // ========================================================================

    /// Attach a syntax error to `node`; it lands in the next built file.
    pub fn error(&mut self, node: NodeId, message: &str) {
        self.pending_errors.push(SyntaxError {
            node,
            message: SmolStr::new(message),
        });
    }

    /// Assemble the file. `imports` use [`ImportPath::parse`] syntax.
    pub fn file(
        &mut self,
        path: &str,
        package: &str,
        imports: &[&str],
        declarations: Vec<Arc<Declaration>>,
    ) -> SourceFile {
        let node = self.node();
        let package = PackageDirective {
            node: self.node(),
            fq_name: FqName::parse(package),
        };
        let imports = imports
            .iter()
            .map(|text| ImportDirective {
                node: self.node(),
                path: ImportPath::parse(text),
            })
            .collect();
        SourceFile {
            id: self.file,
            node,
            path: SmolStr::new(path),
            package,
            imports,
            declarations,
            errors: std::mem::take(&mut self.pending_errors),
        }
    }

    /// Node the next [`file`](Self::file) call will give the file itself.
    pub fn next_file_node(&self) -> NodeId {
        NodeId::new(self.file, self.next)
    }
}
