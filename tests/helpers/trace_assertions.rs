//! Analysis runners and binding-trace assertions.

use std::sync::Arc;

use lexscope::analyzer::{
    AnalysisParameters, AnalyzeExhaust, AnalyzerFacade, BindingContext, GlobalContext, ModuleInfo,
    Strategy, TraceSnapshot,
};
use lexscope::base::NodeId;
use lexscope::syntax::SourceFile;

pub fn params(strategy: Strategy) -> AnalysisParameters {
    match strategy {
        Strategy::Eager => AnalysisParameters::eager(),
        Strategy::Lazy => AnalysisParameters::lazy(),
    }
}

/// Analyze `files` as module `<m>` in a fresh context.
pub fn analyze(files: &[Arc<SourceFile>], strategy: Strategy) -> (GlobalContext, AnalyzeExhaust) {
    let mut ctx = GlobalContext::new().expect("built-ins");
    let info = ModuleInfo::new("m");
    let exhaust = AnalyzerFacade::analyze_files(&mut ctx, &info, files, params(strategy))
        .expect("analysis succeeds");
    (ctx, exhaust)
}

pub fn snapshot(files: &[Arc<SourceFile>], strategy: Strategy) -> TraceSnapshot {
    let (ctx, exhaust) = analyze(files, strategy);
    TraceSnapshot::capture(&ctx, &exhaust.context, files)
}

/// Every node of `files` is bound to a descriptor or carries a diagnostic.
pub fn assert_trace_total(context: &BindingContext, files: &[Arc<SourceFile>]) {
    let missing: Vec<NodeId> = files
        .iter()
        .flat_map(|file| file.nodes())
        .filter(|node| !context.is_bound(*node))
        .collect();
    assert!(missing.is_empty(), "unbound nodes: {missing:?}");
}

pub fn assert_no_errors(context: &BindingContext) {
    let errors: Vec<String> = context
        .diagnostics()
        .filter(|d| d.is_error())
        .map(|d| format!("{:?}: {}", d.node, d.kind))
        .collect();
    assert!(errors.is_empty(), "unexpected errors:\n{}", errors.join("\n"));
}

/// Diagnostic codes recorded on `node`.
pub fn codes_at(context: &BindingContext, node: NodeId) -> Vec<&'static str> {
    context.diagnostics_for(node).iter().map(|d| d.code()).collect()
}

/// Rendered descriptor bound to `node`.
pub fn rendered_at(ctx: &GlobalContext, context: &BindingContext, node: NodeId) -> Option<String> {
    context.descriptor(node).map(|id| ctx.render(id))
}
