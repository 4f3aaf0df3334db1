//! Reference resolution inside one module.

use std::sync::Arc;

use lexscope::analyzer::{DiagnosticKind, Strategy, codes};
use lexscope::base::{FileId, Name};
use lexscope::syntax::{Statement, SyntaxFactory};
use rstest::rstest;

use crate::helpers::fixtures::{expr_node, single_function};
use crate::helpers::trace_assertions::{
    analyze, assert_no_errors, assert_trace_total, codes_at, rendered_at,
};

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_call_resolves_to_module_function(#[case] strategy: Strategy) {
    let fixture = single_function(0);
    let (ctx, exhaust) = analyze(&fixture.files, strategy);
    let context = &exhaust.context;

    let declared = context.declaration(fixture.f).expect("f is declared");
    assert_eq!(context.reference(fixture.call), Some(declared));
    assert_eq!(ctx.render(declared), "fun <m>::f/0");
    assert_eq!(context.diagnostics().count(), 0);
    assert_trace_total(context, &fixture.files);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_builtins_visible_through_default_import(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let x = f.param("x", "Int");
    let int_node = x.ty.path.segments[0].node;
    let read_x = f.name_ref("x");
    let print = f.call("println", vec![read_x]);
    let print_node = expr_node(&print);
    let print = f.expr_stmt(print);
    let body = f.block(vec![print]);
    let show = f.function("show", vec![x], Some(body));
    let files = vec![Arc::new(f.file("a.src", "app", &[], vec![show]))];

    let (ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    assert_no_errors(context);
    assert_eq!(
        rendered_at(&ctx, context, int_node).as_deref(),
        Some("class <builtins>::lang.Int")
    );
    assert_eq!(
        rendered_at(&ctx, context, print_node).as_deref(),
        Some("fun <builtins>::lang.println/1")
    );
    assert_eq!(
        ctx.intrinsics()
            .intrinsic_for(ctx.descriptors(), context.reference(print_node).unwrap())
            .map(|i| i.name().to_string()),
        Some("print-line".to_string())
    );
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_locals_shadow_properties_and_follow_declaration_order(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let value = f.property("value", None, None);

    let before = f.name_ref("value");
    let before_node = expr_node(&before);
    let before = f.expr_stmt(before);
    let one = f.int(1);
    let local = f.local("value", None, Some(one));
    let Statement::Local(local_decl) = &local else {
        unreachable!()
    };
    let local_node = local_decl.node;
    let after = f.name_ref("value");
    let after_node = expr_node(&after);
    let after = f.expr_stmt(after);
    let body = f.block(vec![before, local, after]);
    let run = f.function("run", vec![], Some(body));
    let files = vec![Arc::new(f.file("a.src", "p", &[], vec![value.clone(), run]))];

    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    assert_eq!(context.reference(before_node), context.declaration(value.node));
    assert_eq!(context.reference(after_node), context.declaration(local_node));
    assert_no_errors(context);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_this_and_labeled_this(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let plain = f.this(None);
    let plain_node = expr_node(&plain);
    let labeled = f.this(Some("Outer"));
    let labeled_node = expr_node(&labeled);
    let unknown = f.this(Some("Elsewhere"));
    let unknown_node = expr_node(&unknown);
    let body = f.block(vec![
        Statement::Expr(plain),
        Statement::Expr(labeled),
        Statement::Expr(unknown),
    ]);
    let g = f.function("g", vec![], Some(body));
    let inner = f.class("Inner", vec![g]);
    let outer = f.class("Outer", vec![inner.clone()]);
    let files = vec![Arc::new(f.file("a.src", "p", &[], vec![outer.clone()]))];

    let (ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;

    let outer_class = context.declaration(outer.node).unwrap();
    let inner_class = context.declaration(inner.node).unwrap();
    let descriptors = ctx.descriptors();
    assert_eq!(
        context.reference(plain_node),
        descriptors.get(inner_class).as_class().unwrap().receiver
    );
    assert_eq!(
        context.reference(labeled_node),
        descriptors.get(outer_class).as_class().unwrap().receiver
    );
    assert_eq!(context.label_target(labeled_node), Some(outer_class));
    assert_eq!(codes_at(context, unknown_node), vec![codes::UNRESOLVED_REFERENCE]);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_calls_filter_by_arity(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let one = f.function("over", vec![], None);
    let a = f.param("a", "Int");
    let two = f.function("over", vec![a], None);
    let class = f.class("Widget", vec![]);

    let zero_args = f.call("over", vec![]);
    let zero_node = expr_node(&zero_args);
    let arg = f.int(1);
    let one_arg = f.call("over", vec![arg]);
    let one_node = expr_node(&one_arg);
    let (x, y) = (f.int(1), f.int(2));
    let two_args = f.call("over", vec![x, y]);
    let two_node = expr_node(&two_args);
    let constructor = f.call("Widget", vec![]);
    let constructor_node = expr_node(&constructor);
    let body = f.block(vec![
        Statement::Expr(zero_args),
        Statement::Expr(one_arg),
        Statement::Expr(two_args),
        Statement::Expr(constructor),
    ]);
    let run = f.function("run", vec![], Some(body));
    let files = vec![Arc::new(f.file(
        "a.src",
        "p",
        &[],
        vec![one.clone(), two.clone(), class.clone(), run],
    ))];

    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    assert_eq!(context.reference(zero_node), context.declaration(one.node));
    assert_eq!(context.reference(one_node), context.declaration(two.node));
    assert_eq!(codes_at(context, two_node), vec![codes::UNRESOLVED_REFERENCE]);
    assert_eq!(context.reference(constructor_node), context.declaration(class.node));
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_redeclaration_keeps_first(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let first = f.class("C", vec![]);
    let second = f.class("C", vec![]);
    let ty = f.type_ref("C");
    let reference = ty.path.segments[0].node;
    let user = f.property("user", Some(ty), None);
    let files = vec![Arc::new(f.file(
        "a.src",
        "p",
        &[],
        vec![first.clone(), second.clone(), user],
    ))];

    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    let kept = context.declaration(first.node).unwrap();
    assert_eq!(context.reference(reference), Some(kept));
    assert!(context.declaration(second.node).is_some());
    let diagnostics = context.diagnostics_for(second.node);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::Redeclaration {
            name: Name::identifier("C"),
            existing: kept,
        }
    );
    assert_trace_total(context, &files);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_qualified_paths(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let helper = f.function("helper", vec![], None);
    let nested = f.class("Nested", vec![]);
    let holder = f.class("Holder", vec![nested.clone()]);
    let lib = Arc::new(f.file("lib.src", "a.b", &[], vec![helper.clone(), holder]));

    let mut f = SyntaxFactory::new(FileId::new(1));
    let call = f.call("helper", vec![]);
    let qualified = f.qualified("a.b", call);
    let call_node = expr_node(&qualified);
    let Some(first_segment) = (match &qualified {
        lexscope::syntax::Expr::Qualified { qualifier, .. } => Some(qualifier.segments[0].node),
        _ => None,
    }) else {
        unreachable!()
    };
    let missing = f.call("helper", vec![]);
    let missing = f.qualified("a.zz", missing);
    let missing_node = expr_node(&missing);
    let nested_type = f.type_ref("a.b.Holder.Nested");
    let nested_node = nested_type.path.segments[3].node;
    let field = f.property("field", Some(nested_type), None);
    let body = f.block(vec![Statement::Expr(qualified), Statement::Expr(missing)]);
    let run = f.function("run", vec![], Some(body));
    let app = Arc::new(f.file("app.src", "app", &[], vec![run, field]));
    let files = vec![lib, app];

    let (ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    assert_eq!(context.reference(call_node), context.declaration(helper.node));
    assert_eq!(
        rendered_at(&ctx, context, first_segment).as_deref(),
        Some("namespace <m>::a")
    );
    assert_eq!(codes_at(context, missing_node), vec![codes::UNRESOLVED_REFERENCE]);
    assert_eq!(context.reference(nested_node), context.declaration(nested.node));
    assert_trace_total(context, &files);
}
