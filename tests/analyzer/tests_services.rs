//! Intrinsics, caching, diagnostics sinks and the lazy session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lexscope::analyzer::{
    AnalyzerFacade, DeclarationsCache, DiagnosticCollector, GlobalContext, Intrinsic,
    IntrinsicPattern, LazySession, ModificationTracker, ModuleInfo, Strategy, TraceSnapshot, codes,
};
use lexscope::base::{FileId, FqName, Name};
use lexscope::descriptors::{DescriptorArena, DescriptorId};
use lexscope::syntax::SyntaxFactory;

use crate::helpers::fixtures::{CORPUS, single_function};
use crate::helpers::trace_assertions::{analyze, params, snapshot};

#[test]
fn test_intrinsic_lookup_order() {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let x = f.param("x", "Int");
    let abs = f.function("abs", vec![x], None);
    let math = f.class("Math", vec![abs.clone()]);
    let fast = f.function("fast", vec![], None);
    let slow = f.function("slow", vec![], None);
    let marked = f.function("marked", vec![], None);
    let marked = f.annotated(marked, &["intrinsic"]);
    let plain = f.function("plain", vec![], None);
    let files = vec![Arc::new(f.file(
        "ops.src",
        "ops",
        &[],
        vec![math, fast.clone(), slow.clone(), marked.clone(), plain.clone()],
    ))];

    let (mut ctx, exhaust) = analyze(&files, Strategy::Lazy);
    let context = &exhaust.context;
    let id = |node| context.declaration(node).unwrap();

    let table = ctx.intrinsics_mut();
    table.register(IntrinsicPattern::member("ops", "abs").in_class("Math"), Intrinsic::new("abs"));
    table.register(IntrinsicPattern::member("ops", "fast"), Intrinsic::new("fast-op"));
    table.register(IntrinsicPattern::any_member("ops"), Intrinsic::new("ops-any"));
    table.register_factory(Box::new(|descriptors: &DescriptorArena, function: DescriptorId| {
        descriptors
            .get(function)
            .annotations()
            .contains(&Name::identifier("intrinsic"))
            .then(|| Intrinsic::new(descriptors.name(function).as_str()))
    }));

    let lookup = |node| {
        ctx.intrinsics()
            .intrinsic_for(ctx.descriptors(), id(node))
            .map(|i| i.name().to_string())
    };
    assert_eq!(lookup(abs.node).as_deref(), Some("abs"));
    assert_eq!(lookup(fast.node).as_deref(), Some("fast-op"));
    assert_eq!(lookup(slow.node).as_deref(), Some("ops-any"));
    // Patterns match before factories.
    assert_eq!(lookup(marked.node).as_deref(), Some("ops-any"));
    assert_eq!(lookup(plain.node).as_deref(), Some("ops-any"));
}

#[test]
fn test_factory_applies_where_no_pattern_does() {
    let mut f = SyntaxFactory::new(FileId::new(0));
    let marked = f.function("marked", vec![], None);
    let marked = f.annotated(marked, &["intrinsic"]);
    let plain = f.function("plain", vec![], None);
    let files = vec![Arc::new(f.file("a.src", "user", &[], vec![marked.clone(), plain.clone()]))];

    let (mut ctx, exhaust) = analyze(&files, Strategy::Eager);
    ctx.intrinsics_mut().register_factory(Box::new(
        |descriptors: &DescriptorArena, function: DescriptorId| {
            descriptors
                .get(function)
                .annotations()
                .contains(&Name::identifier("intrinsic"))
                .then(|| Intrinsic::new("annotated"))
        },
    ));
    let marked = exhaust.context.declaration(marked.node).unwrap();
    let plain = exhaust.context.declaration(plain.node).unwrap();
    assert_eq!(
        ctx.intrinsics().intrinsic_for(ctx.descriptors(), marked),
        Some(Intrinsic::new("annotated"))
    );
    assert_eq!(ctx.intrinsics().intrinsic_for(ctx.descriptors(), plain), None);
}

#[test]
fn test_cache_recomputes_after_modification() {
    let tracker = ModificationTracker::new();
    let cache: DeclarationsCache<TraceSnapshot> = DeclarationsCache::new();
    let computations = AtomicUsize::new(0);
    let files = single_function(0).files;

    let compute = || {
        computations.fetch_add(1, Ordering::SeqCst);
        snapshot(&files, Strategy::Lazy)
    };
    let first = cache.get_or_compute(tracker.current(), compute);
    let again = cache.get_or_compute(tracker.current(), compute);
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(computations.load(Ordering::SeqCst), 1);

    let count = tracker.increment();
    let fresh = cache.get_or_compute(count, compute);
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert_eq!(*first, *fresh);
    assert_eq!(computations.load(Ordering::SeqCst), 2);
    assert_eq!(cache.cached_count(), Some(count));

    cache.invalidate();
    assert_eq!(cache.cached_count(), None);
}

#[test]
fn test_diagnostics_forwarded_to_collector() {
    let (_ctx, exhaust) = analyze(&CORPUS, Strategy::Eager);
    let mut collector = DiagnosticCollector::new();
    exhaust.context.report_to(&mut collector);

    assert_eq!(collector.len(), exhaust.context.diagnostics().count());
    assert!(collector.has_errors());
    assert_eq!(collector.warning_count(), 0);
    assert!(collector.with_code(codes::AMBIGUOUS_REFERENCE).count() >= 1);
    assert!(collector.with_code(codes::SYNTAX_ERROR).count() >= 1);
}

#[test]
fn test_lazy_session_resolves_on_demand() {
    let mut ctx = GlobalContext::new().unwrap();
    let info = ModuleInfo::new("m");
    let mut session = LazySession::new(&mut ctx, &info, &CORPUS).unwrap();
    let geo = FqName::parse("geo");

    let point = session
        .resolve_classifier(&geo, &Name::identifier("Point"))
        .unwrap()
        .expect("Point is declared");
    assert_eq!(session.global().render(point), "class <m>::geo.Point");
    let declared: Vec<String> = session
        .declared()
        .into_iter()
        .map(|id| session.global().descriptors().name(id).to_string())
        .collect();
    assert!(declared.contains(&"Point".to_string()));
    assert!(!declared.contains(&"Shape".to_string()));

    let area = session.resolve_functions(&geo, &Name::identifier("area")).unwrap();
    assert_eq!(area.len(), 1);
    session.resolve_declaration(area[0]).unwrap();
    assert!(session.resolve_namespace(&FqName::parse("junk")).unwrap().is_none());
    assert!(
        session
            .resolve_classifier(&FqName::parse("nope"), &Name::identifier("X"))
            .unwrap()
            .is_none()
    );

    let exhaust = session.finish().unwrap();
    assert!(info.is_analyzed());
    let lazy = TraceSnapshot::capture(&ctx, &exhaust.context, &CORPUS);
    let eager = snapshot(&CORPUS, Strategy::Eager);
    assert!(lazy.diff(&eager).is_empty(), "{}", lazy.diff(&eager).join("\n"));
}

#[test]
fn test_lazy_session_rejects_unanalyzed_dependency() {
    let mut ctx = GlobalContext::new().unwrap();
    let dependency = Arc::new(ModuleInfo::new("lib"));
    let info = ModuleInfo::new("app").with_dependency(dependency.clone());
    assert!(LazySession::new(&mut ctx, &info, &CORPUS).is_err());

    let files = single_function(9).files;
    AnalyzerFacade::analyze_files(&mut ctx, &dependency, &files, params(Strategy::Eager)).unwrap();
    assert!(LazySession::new(&mut ctx, &info, &CORPUS).is_ok());
}

#[cfg(feature = "serde")]
mod serde_support {
    use lexscope::analyzer::{AnalysisParameters, Strategy, SyntaxErrorPolicy};

    use crate::helpers::fixtures::single_function;
    use crate::helpers::trace_assertions::snapshot;

    #[test]
    fn test_parameters_from_json() {
        let params = AnalysisParameters::from_json(r#"{"strategy": "lazy"}"#).unwrap();
        assert_eq!(params.strategy, Strategy::Lazy);
        assert_eq!(params.syntax_errors, SyntaxErrorPolicy::SkipDeclaration);

        let strict = AnalysisParameters::from_json(r#"{"syntax_errors": "fail_fast"}"#).unwrap();
        assert_eq!(strict, AnalysisParameters::eager().fail_fast());
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = snapshot(&single_function(0).files, Strategy::Eager).to_json().unwrap();
        assert!(json.contains("fun <m>::f/0"));
    }
}
