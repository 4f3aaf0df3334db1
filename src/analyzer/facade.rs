//! Entry points for analyzing a module.

use std::sync::Arc;

use tracing::{info, warn};

use crate::descriptors::DescriptorId;
use crate::error::AnalysisError;
use crate::syntax::SourceFile;

use super::config::{AnalysisParameters, ModuleInfo, Strategy, SyntaxErrorPolicy};
use super::context::GlobalContext;
use super::eager::EagerStrategy;
use super::lazy::LazyStrategy;
use super::state::AnalysisState;
use super::trace::{BindingContext, BindingTrace};

/// One way of driving an [`AnalysisState`] to completion.
pub(crate) trait ResolutionStrategy {
    fn resolve(&self, state: &mut AnalysisState<'_>) -> Result<(), AnalysisError>;
}

/// Result of analyzing one module.
#[derive(Clone, Debug)]
pub struct AnalyzeExhaust {
    pub module: DescriptorId,
    pub context: Arc<BindingContext>,
}

/// Analyzes modules against a shared [`GlobalContext`].
///
/// Dependencies must be analyzed first, with the same context, so their
/// namespaces can be imported.
pub struct AnalyzerFacade;

impl AnalyzerFacade {
    pub fn analyze_files(
        ctx: &mut GlobalContext,
        info: &ModuleInfo,
        files: &[Arc<SourceFile>],
        params: AnalysisParameters,
    ) -> Result<AnalyzeExhaust, AnalysisError> {
        Self::analyze_with_trace(ctx, info, files, params, BindingTrace::new())
    }

    /// Same as [`analyze_files`](Self::analyze_files) but any syntax error
    /// aborts the run.
    pub fn analyze_files_and_check_errors(
        ctx: &mut GlobalContext,
        info: &ModuleInfo,
        files: &[Arc<SourceFile>],
        params: AnalysisParameters,
    ) -> Result<AnalyzeExhaust, AnalysisError> {
        Self::analyze_files(ctx, info, files, params.fail_fast())
    }

    /// Analyze `library` strictly, then `sources` on top of it.
    ///
    /// The sources module depends on the library and its trace reads through
    /// to the library's, which stays untouched.
    pub fn analyze_files_with_library(
        ctx: &mut GlobalContext,
        library: Arc<ModuleInfo>,
        library_files: &[Arc<SourceFile>],
        sources: ModuleInfo,
        files: &[Arc<SourceFile>],
        params: AnalysisParameters,
    ) -> Result<(Arc<ModuleInfo>, AnalyzeExhaust), AnalysisError> {
        let library_exhaust = Self::analyze_files(ctx, &library, library_files, params.fail_fast())?;
        let sources = Arc::new(sources.with_dependency(library));
        let trace = BindingTrace::delegating(library_exhaust.context);
        let exhaust = Self::analyze_with_trace(ctx, &sources, files, params, trace)?;
        Ok((sources, exhaust))
    }

    /// Fail on the first file carrying syntax errors.
    pub fn check_syntax(files: &[Arc<SourceFile>]) -> Result<(), AnalysisError> {
        match files.iter().find(|file| file.has_errors()) {
            Some(file) => Err(AnalysisError::Syntax {
                file: file.id,
                messages: file.errors.iter().map(|e| e.message.to_string()).collect(),
            }),
            None => Ok(()),
        }
    }

    fn analyze_with_trace(
        ctx: &mut GlobalContext,
        info: &ModuleInfo,
        files: &[Arc<SourceFile>],
        params: AnalysisParameters,
        trace: BindingTrace,
    ) -> Result<AnalyzeExhaust, AnalysisError> {
        Self::run(ctx, info, files, params, trace)
            .inspect_err(|err| warn!("[ANALYZE] module {} failed: {}", info.name(), err))
    }

    fn run(
        ctx: &mut GlobalContext,
        info: &ModuleInfo,
        files: &[Arc<SourceFile>],
        params: AnalysisParameters,
        trace: BindingTrace,
    ) -> Result<AnalyzeExhaust, AnalysisError> {
        info.check_dependencies()?;
        if params.syntax_errors == SyntaxErrorPolicy::FailFast {
            Self::check_syntax(files)?;
        }
        let lazy = params.strategy == Strategy::Lazy;
        let mut state = AnalysisState::new(ctx, info, files, trace, lazy)?;
        let strategy: &dyn ResolutionStrategy = if lazy { &LazyStrategy } else { &EagerStrategy };
        strategy.resolve(&mut state)?;

        let (module, context) = state.finish();
        info.set_analyzed(module, context.clone())?;
        info!(
            "[ANALYZE] module {} ({:?}): {} files, {} diagnostics",
            info.name(),
            params.strategy,
            files.len(),
            context.diagnostics().count()
        );
        Ok(AnalyzeExhaust { module, context })
    }
}
