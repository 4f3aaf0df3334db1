//! Syntax-tree fixtures built with the factory.

use std::sync::Arc;

use lexscope::base::{FileId, NodeId};
use lexscope::syntax::{Expr, SourceFile, Statement, SyntaxFactory};
use once_cell::sync::Lazy;

/// Node of an expression that carries one.
pub fn expr_node(expr: &Expr) -> NodeId {
    match expr {
        Expr::Name { node, .. } | Expr::Call { node, .. } | Expr::This { node, .. } => *node,
        Expr::Qualified { selector, .. } => expr_node(selector),
        Expr::Literal(_) => panic!("literals carry no node"),
    }
}

/// `fun f() {}` and `fun main() { f() }` in the root package.
pub struct SingleFunction {
    pub files: Vec<Arc<SourceFile>>,
    pub f: NodeId,
    pub call: NodeId,
}

pub fn single_function(file: u32) -> SingleFunction {
    let mut f = SyntaxFactory::new(FileId::new(file));
    let target = f.function("f", vec![], None);
    let call = f.call("f", vec![]);
    let call_node = expr_node(&call);
    let stmt = f.expr_stmt(call);
    let body = f.block(vec![stmt]);
    let main = f.function("main", vec![], Some(body));
    let source = f.file("m.src", "", &[], vec![target.clone(), main]);
    SingleFunction {
        files: vec![Arc::new(source)],
        f: target.node,
        call: call_node,
    }
}

/// Library with `class C` in package `package`.
pub struct Library {
    pub files: Vec<Arc<SourceFile>>,
    pub class: NodeId,
}

pub fn library(file: u32, package: &str) -> Library {
    let mut f = SyntaxFactory::new(FileId::new(file));
    let class = f.class("C", vec![]);
    let source = f.file("lib.src", package, &[], vec![class.clone()]);
    Library {
        files: vec![Arc::new(source)],
        class: class.node,
    }
}

/// `fun use(c: C)` in package `package`; `reference` is the `C` type node.
pub struct Client {
    pub files: Vec<Arc<SourceFile>>,
    pub reference: NodeId,
}

pub fn client(file: u32, package: &str, imports: &[&str]) -> Client {
    let mut f = SyntaxFactory::new(FileId::new(file));
    let parameter = f.param("c", "C");
    let reference = parameter.ty.path.segments[0].node;
    let function = f.function("use", vec![parameter], None);
    let source = f.file("app.src", package, imports, vec![function]);
    Client {
        files: vec![Arc::new(source)],
        reference,
    }
}

/// A module exercising every construct the analyzer resolves, including
/// broken syntax and unresolvable names.
pub fn corpus() -> Vec<Arc<SourceFile>> {
    vec![
        Arc::new(shapes()),
        Arc::new(util()),
        Arc::new(broken()),
        Arc::new(garbage()),
        Arc::new(overloads("amb.a", 4)),
        Arc::new(overloads("amb.b", 5)),
    ]
}

pub static CORPUS: Lazy<Vec<Arc<SourceFile>>> = Lazy::new(corpus);

/// `package geo`: a generic class with a nested class, labels and
/// constructor calls.
fn shapes() -> SourceFile {
    let mut f = SyntaxFactory::new(FileId::new(0));

    let x_type = f.type_ref("T");
    let x = f.property("x", Some(x_type), None);

    let read_x = f.name_ref("x");
    let read_x = f.expr_stmt(read_x);
    let this_point = f.this(Some("Point"));
    let this_point = f.expr_stmt(this_point);
    let norm_body = f.block(vec![read_x, this_point]);
    let double = f.type_ref("Double");
    let norm = f.function_with("norm", &[], vec![], Some(double), Some(norm_body));

    let outer = f.this(Some("Point"));
    let outer = f.expr_stmt(outer);
    let inner_this = f.this(None);
    let inner_this = f.expr_stmt(inner_this);
    let missing_label = f.this(Some("Nowhere"));
    let missing_label = f.expr_stmt(missing_label);
    let up_body = f.block(vec![outer, inner_this, missing_label]);
    let up = f.function("up", vec![], Some(up_body));
    let inner = f.class("Inner", vec![up]);

    let any = f.type_ref("Any");
    let point = f.class_with("Point", &["T"], vec![any], vec![x, norm, inner]);

    let int = f.type_ref("Int");
    let return_type = f.generic_type("Point", vec![int]);
    let int = f.type_ref("Int");
    let local_type = f.generic_type("Point", vec![int]);
    let construct = f.call("Point", vec![]);
    let local = f.local("p", Some(local_type), Some(construct));
    let read_p = f.name_ref("p");
    let read_p = f.expr_stmt(read_p);
    let origin_body = f.block(vec![local, read_p]);
    let origin = f.function_with("origin", &[], vec![], Some(return_type), Some(origin_body));

    let shape = f.class("Shape", vec![]);
    let s = f.param("s", "Shape");
    let int = f.type_ref("lang.Int");
    let area = f.function_with("area", &[], vec![s], Some(int), None);

    f.file("shapes.src", "geo", &["lang.*"], vec![point, origin, shape, area])
}

/// `package geo.util`: imports, aliases, qualified calls, overloads,
/// redeclarations and local functions.
fn util() -> SourceFile {
    let mut f = SyntaxFactory::new(FileId::new(1));

    let int = f.type_ref("Int");
    let return_type = f.generic_type("Point", vec![int]);
    let construct = f.call("Point", vec![]);
    let construct = f.expr_stmt(construct);
    let make_body = f.block(vec![construct]);
    let make = f.function_with("make", &[], vec![], Some(return_type), Some(make_body));

    let s = f.param("s", "S");
    let read_s = f.name_ref("s");
    let area = f.call("area", vec![read_s]);
    let qualified = f.qualified("geo", area);
    let local = f.local("n", None, Some(qualified));
    let read_n = f.name_ref("n");
    let print = f.call("println", vec![read_n]);
    let print = f.expr_stmt(print);
    let size_body = f.block(vec![local, print]);
    let size = f.function("size", vec![s], Some(size_body));

    let dup = f.function("dup", vec![], None);
    let dup_again = f.function("dup", vec![], None);

    let a = f.param("a", "Int");
    let over_one = f.function("over", vec![a], None);
    let a = f.param("a", "Int");
    let b = f.param("b", "Int");
    let over_two = f.function("over", vec![a, b], None);

    let one = f.int(1);
    let call_one = f.call("over", vec![one]);
    let call_one = f.expr_stmt(call_one);
    let one = f.int(1);
    let two = f.int(2);
    let call_two = f.call("over", vec![one, two]);
    let call_two = f.expr_stmt(call_two);
    let call_none = f.call("over", vec![]);
    let call_none = f.expr_stmt(call_none);
    let unknown = f.name_ref("unknownThing");
    let unknown = f.expr_stmt(unknown);
    let ambiguous = f.call("h", vec![]);
    let ambiguous = f.expr_stmt(ambiguous);
    let call_over_body = f.block(vec![call_one, call_two, call_none, unknown, ambiguous]);
    let call_over = f.function("callOver", vec![], Some(call_over_body));

    let k = f.param("k", "Int");
    let read_k = f.name_ref("k");
    let read_k = f.expr_stmt(read_k);
    let helper_body = f.block(vec![read_k]);
    let helper = f.function("helper", vec![k], Some(helper_body));
    let two = f.int(2);
    let call_helper = f.call("helper", vec![two]);
    let call_helper = f.expr_stmt(call_helper);
    let one = f.int(1);
    let outer_local = f.local("a", None, Some(one));
    let read_a = f.name_ref("a");
    let inner_local = f.local("b", None, Some(read_a));
    let read_b = f.name_ref("b");
    let read_b = f.expr_stmt(read_b);
    let nested = f.block(vec![inner_local, read_b]);
    let outer_body = f.block(vec![
        Statement::Function(helper),
        call_helper,
        outer_local,
        Statement::Block(nested),
    ]);
    let outer = f.function("outer", vec![], Some(outer_body));

    let limit_type = f.type_ref("Int");
    let limit = f.property("limit", Some(limit_type), None);
    let read_limit = f.name_ref("limit");
    let total = f.property("total", None, Some(read_limit));
    let missing_type = f.type_ref("geo.missing.Thing");
    let dangling = f.property("dangling", Some(missing_type), None);

    f.file(
        "util.src",
        "geo.util",
        &[
            "geo.Point",
            "geo.Shape as S",
            "geo.missing.*",
            "geo.Nope",
            "amb.a.*",
            "amb.b.*",
        ],
        vec![
            make, size, dup, dup_again, over_one, over_two, call_over, outer, limit, total,
            dangling,
        ],
    )
}

/// `package geo`: one usable class and one declaration with a syntax
/// error inside its body.
fn broken() -> SourceFile {
    let mut f = SyntaxFactory::new(FileId::new(2));
    let good = f.class("Good", vec![]);
    let inner = f.name_ref("oops");
    let bad_node = expr_node(&inner);
    let inner = f.expr_stmt(inner);
    let body = f.block(vec![inner]);
    let bad = f.function("bad", vec![], Some(body));
    f.error(bad_node, "unexpected token");
    f.file("broken.src", "geo", &["geo.util.*"], vec![good, bad])
}

/// A file whose syntax error is on the file node itself.
fn garbage() -> SourceFile {
    let mut f = SyntaxFactory::new(FileId::new(3));
    let class = f.class("Lost", vec![]);
    let file_node = f.next_file_node();
    f.error(file_node, "not a source file");
    f.file("garbage.src", "junk", &[], vec![class])
}

/// `fun h()` in `package`.
fn overloads(package: &str, file: u32) -> SourceFile {
    let mut f = SyntaxFactory::new(FileId::new(file));
    let h = f.function("h", vec![], None);
    f.file("h.src", package, &[], vec![h])
}
