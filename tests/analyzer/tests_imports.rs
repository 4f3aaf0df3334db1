//! Imports, aliases and the file scope.

use std::sync::Arc;

use lexscope::analyzer::{
    AnalysisParameters, AnalyzeExhaust, AnalyzerFacade, DiagnosticKind, GlobalContext, ModuleInfo,
    Strategy, codes,
};
use lexscope::base::{FileId, FqName, ImportPath};
use lexscope::descriptors::PlatformClassMap;
use lexscope::syntax::{SourceFile, SyntaxFactory};
use rstest::rstest;

use crate::helpers::fixtures::{client, expr_node, library};
use crate::helpers::trace_assertions::{
    analyze, assert_no_errors, assert_trace_total, codes_at, params, rendered_at,
};

fn analyze_with(
    ctx: &mut GlobalContext,
    info: &ModuleInfo,
    files: &[Arc<SourceFile>],
    strategy: Strategy,
) -> AnalyzeExhaust {
    AnalyzerFacade::analyze_files(ctx, info, files, params(strategy)).expect("analysis succeeds")
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_alias_binds_only_the_new_name(#[case] strategy: Strategy) {
    let lib = library(0, "lib");
    let aliased = client(1, "app", &["lib.C as D"]);

    let mut f = SyntaxFactory::new(FileId::new(2));
    let d = f.param("d", "D");
    let d_node = d.ty.path.segments[0].node;
    let takes_d = f.function("takesD", vec![d], None);
    let extra = Arc::new(f.file("d.src", "app", &["lib.C as D"], vec![takes_d]));

    let files = vec![lib.files[0].clone(), aliased.files[0].clone(), extra];
    let (ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;

    // `C` itself is not imported, only `D`.
    assert_eq!(codes_at(context, aliased.reference), vec![codes::UNRESOLVED_REFERENCE]);
    assert_eq!(context.reference(d_node), context.declaration(lib.class));
    assert_eq!(
        rendered_at(&ctx, context, d_node).as_deref(),
        Some("class <m>::lib.C")
    );
    let import = files[2].imports[0].node;
    assert_eq!(context.reference(import), context.declaration(lib.class));
    assert_trace_total(context, &files);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_unresolved_imports_are_reported_on_the_directive(#[case] strategy: Strategy) {
    let lib = library(0, "lib");
    let app = client(1, "app", &["lib.Missing", "nowhere.*", "lib.C"]);
    let files = vec![lib.files[0].clone(), app.files[0].clone()];
    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;

    let imports = &files[1].imports;
    assert_eq!(codes_at(context, imports[0].node), vec![codes::UNRESOLVED_IMPORT]);
    assert_eq!(codes_at(context, imports[1].node), vec![codes::UNRESOLVED_IMPORT]);
    assert_eq!(
        context.diagnostics_for(imports[0].node)[0].kind,
        DiagnosticKind::UnresolvedImport {
            path: ImportPath::parse("lib.Missing"),
        }
    );
    assert!(codes_at(context, imports[2].node).is_empty());
    assert_eq!(context.reference(app.reference), context.declaration(lib.class));
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_star_import_shadows_default_import(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let own_int = f.class("Int", vec![]);
    let numbers = Arc::new(f.file("numbers.src", "numbers", &[], vec![own_int.clone()]));

    let mut f = SyntaxFactory::new(FileId::new(1));
    let starred = f.param("a", "Int");
    let starred_node = starred.ty.path.segments[0].node;
    let g = f.function("g", vec![starred], None);
    let with_star = Arc::new(f.file("star.src", "app", &["numbers.*"], vec![g]));

    let mut f = SyntaxFactory::new(FileId::new(2));
    let plain = f.param("a", "Int");
    let plain_node = plain.ty.path.segments[0].node;
    let h = f.function("h", vec![plain], None);
    let without_star = Arc::new(f.file("plain.src", "other", &[], vec![h]));

    let files = vec![numbers, with_star, without_star];
    let (ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;

    assert_eq!(context.reference(starred_node), context.declaration(own_int.node));
    assert_eq!(
        rendered_at(&ctx, context, plain_node).as_deref(),
        Some("class <builtins>::lang.Int")
    );
    assert_no_errors(context);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_own_namespace_shadows_star_import(#[case] strategy: Strategy) {
    let lib = library(0, "lib");
    let mut f = SyntaxFactory::new(FileId::new(1));
    let own = f.class("C", vec![]);
    let local = Arc::new(f.file("own.src", "app", &[], vec![own.clone()]));
    let app = client(2, "app", &["lib.*"]);

    let files = vec![lib.files[0].clone(), local, app.files[0].clone()];
    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    assert_eq!(context.reference(app.reference), context.declaration(own.node));
    assert_no_errors(context);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_two_star_imports_make_a_call_ambiguous(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let first = f.function("h", vec![], None);
    let a = Arc::new(f.file("a.src", "amb.a", &[], vec![first]));
    let mut f = SyntaxFactory::new(FileId::new(1));
    let second = f.function("h", vec![], None);
    let b = Arc::new(f.file("b.src", "amb.b", &[], vec![second]));

    let mut f = SyntaxFactory::new(FileId::new(2));
    let call = f.call("h", vec![]);
    let call_node = expr_node(&call);
    let call = f.expr_stmt(call);
    let body = f.block(vec![call]);
    let run = f.function("run", vec![], Some(body));
    let user = Arc::new(f.file("user.src", "app", &["amb.a.*", "amb.b.*"], vec![run]));

    let files = vec![a, b, user];
    let (_ctx, exhaust) = analyze(&files, strategy);
    let context = &exhaust.context;
    let diagnostics = context.diagnostics_for(call_node);
    assert_eq!(diagnostics.len(), 1);
    let DiagnosticKind::AmbiguousReference { candidates, .. } = &diagnostics[0].kind else {
        panic!("expected an ambiguous reference, got {:?}", diagnostics[0].kind);
    };
    assert_eq!(candidates.len(), 2);
    assert_eq!(context.reference(call_node), None);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_same_class_from_two_dependencies_is_an_ambiguous_import(#[case] strategy: Strategy) {
    let mut ctx = GlobalContext::new().unwrap();
    let one_lib = library(0, "a");
    let two_lib = library(1, "a");
    let one = Arc::new(ModuleInfo::new("one"));
    let two = Arc::new(ModuleInfo::new("two"));
    analyze_with(&mut ctx, &one, &one_lib.files, strategy);
    analyze_with(&mut ctx, &two, &two_lib.files, strategy);

    let app = client(2, "app", &["a.C"]);
    let info = ModuleInfo::new("app").with_dependencies(vec![one.clone(), two.clone()]);
    let exhaust = analyze_with(&mut ctx, &info, &app.files, strategy);
    let context = &exhaust.context;

    let import = app.files[0].imports[0].node;
    assert_eq!(codes_at(context, import), vec![codes::AMBIGUOUS_IMPORT]);

    let first = one.binding_context().unwrap().declaration(one_lib.class);
    assert_eq!(context.reference(app.reference), first);
    assert_eq!(
        rendered_at(&ctx, context, app.reference).as_deref(),
        Some("class <one>::a.C")
    );
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_platform_class_maps_to_builtin(#[case] strategy: Strategy) {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let boxed = f.param("n", "Integer");
    let boxed_node = boxed.ty.path.segments[0].node;
    let g = f.function("g", vec![boxed], None);
    let files = vec![Arc::new(f.file("a.src", "app", &["java.lang.Integer"], vec![g]))];

    let mut ctx = GlobalContext::new().unwrap();
    let info = ModuleInfo::new("m")
        .with_platform_classes(PlatformClassMap::new().with("java.lang.Integer", "lang.Int"));
    let exhaust = analyze_with(&mut ctx, &info, &files, strategy);
    let context = &exhaust.context;

    let import = files[0].imports[0].node;
    let diagnostics = context.diagnostics_for(import);
    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics[0].is_error());
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::PlatformClassMapped {
            platform: FqName::parse("java.lang.Integer"),
            builtin: FqName::parse("lang.Int"),
        }
    );
    assert_eq!(
        rendered_at(&ctx, context, boxed_node).as_deref(),
        Some("class <builtins>::lang.Int")
    );
    assert_no_errors(context);
}

#[rstest]
#[case::eager(Strategy::Eager)]
#[case::lazy(Strategy::Lazy)]
fn test_default_imports_are_configurable(#[case] strategy: Strategy) {
    let lib = library(0, "lib");
    let app = client(1, "app", &[]);
    let files = vec![lib.files[0].clone(), app.files[0].clone()];

    let mut ctx = GlobalContext::new().unwrap();
    let info = ModuleInfo::new("m").with_default_imports(vec![
        ImportPath::parse("lang.*"),
        ImportPath::parse("lib.*"),
    ]);
    let exhaust = analyze_with(&mut ctx, &info, &files, strategy);
    assert_eq!(
        exhaust.context.reference(app.reference),
        exhaust.context.declaration(lib.class)
    );
    assert_no_errors(&exhaust.context);
}

#[test]
fn test_default_imports_only_apply_when_configured() {
    let lib = library(0, "lib");
    let app = client(1, "app", &[]);
    let files = vec![lib.files[0].clone(), app.files[0].clone()];

    let mut ctx = GlobalContext::new().unwrap();
    let info = ModuleInfo::new("m");
    let exhaust =
        AnalyzerFacade::analyze_files(&mut ctx, &info, &files, AnalysisParameters::eager()).unwrap();
    assert_eq!(
        codes_at(&exhaust.context, app.reference),
        vec![codes::UNRESOLVED_REFERENCE]
    );
}
