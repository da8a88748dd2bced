use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::complexity::analyze_complexity;
use crate::config::Config;
use crate::context::AnalysisContext;
use crate::cycles::{cycle_violations, find_cycles};
use crate::error::EngineError;
use crate::facts::FactSet;
use crate::graph::DependencyGraph;
use crate::report::Report;
use crate::rules::evaluate_rules;
use crate::types::Violation;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The phase a cancelled run stopped before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    GraphBuild,
    Analysis,
    Assembly,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::GraphBuild => write!(f, "graph build"),
            Phase::Analysis => write!(f, "analysis"),
            Phase::Assembly => write!(f, "report assembly"),
        }
    }
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed(Report),
    Cancelled { phase: Phase },
}

impl AnalysisOutcome {
    pub fn report(self) -> Option<Report> {
        match self {
            AnalysisOutcome::Completed(report) => Some(report),
            AnalysisOutcome::Cancelled { .. } => None,
        }
    }
}

/// Runs graph construction, the three analysis passes and report assembly
/// over a fact set.
pub struct AnalysisEngine {
    context: AnalysisContext,
}

impl AnalysisEngine {
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        Ok(Self {
            context: AnalysisContext::compile(config)?,
        })
    }

    /// Run to completion.
    pub fn analyze(&self, facts: &FactSet) -> Result<Report, EngineError> {
        let graph = self.build_graph(facts)?;
        let violations = self.analyze_graph(&graph);
        Ok(self.assemble(violations))
    }

    /// Run, checking `token` at every phase boundary. A cancelled run yields
    /// no partial results.
    pub fn run(
        &self,
        facts: &FactSet,
        token: &CancellationToken,
    ) -> Result<AnalysisOutcome, EngineError> {
        self.run_until(facts, |_| token.is_cancelled())
    }

    /// Run, asking `stop` before each phase whether to give up. `stop` sees the
    /// phase about to start.
    pub fn run_until<F>(&self, facts: &FactSet, stop: F) -> Result<AnalysisOutcome, EngineError>
    where
        F: Fn(Phase) -> bool,
    {
        if stop(Phase::GraphBuild) {
            return Ok(cancelled(Phase::GraphBuild));
        }
        let graph = self.build_graph(facts)?;

        if stop(Phase::Analysis) {
            return Ok(cancelled(Phase::Analysis));
        }
        let violations = self.analyze_graph(&graph);

        if stop(Phase::Assembly) {
            return Ok(cancelled(Phase::Assembly));
        }
        Ok(AnalysisOutcome::Completed(self.assemble(violations)))
    }

    pub fn build_graph(&self, facts: &FactSet) -> Result<DependencyGraph, EngineError> {
        tracing::debug!(files = facts.files.len(), "building dependency graph");
        Ok(DependencyGraph::build(facts, &self.context)?)
    }

    /// Rule matching, cycle detection and complexity run concurrently over
    /// the finished graph.
    pub fn analyze_graph(&self, graph: &DependencyGraph) -> Vec<Violation> {
        let ctx = &self.context;
        let (layer, (circular, complexity)) = rayon::join(
            || evaluate_rules(graph, ctx.rules()),
            || {
                rayon::join(
                    || cycle_violations(graph, &find_cycles(graph)),
                    || analyze_complexity(graph, ctx.max_function_lines()),
                )
            },
        );

        let mut violations = layer;
        violations.extend(circular);
        violations.extend(complexity);
        violations
    }

    pub fn assemble(&self, violations: Vec<Violation>) -> Report {
        let report = Report::assemble(violations, self.context.scoring());
        tracing::info!(
            total = report.health_score.total,
            grade = %report.health_score.grade,
            violations = report.summary.total_violations,
            "analysis complete"
        );
        report
    }
}

fn cancelled(phase: Phase) -> AnalysisOutcome {
    tracing::debug!(%phase, "analysis cancelled");
    AnalysisOutcome::Cancelled { phase }
}

/// Analyze a fact set with a config in one call.
pub fn analyze(facts: &FactSet, config: &Config) -> Result<Report, EngineError> {
    AnalysisEngine::new(config)?.analyze(facts)
}
