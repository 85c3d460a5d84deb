//! Concurrent tool orchestration
//!
//! Dispatches every enabled adapter against one shared read-only request
//! on a bounded worker pool. A failing, panicking, or hung tool only
//! loses its own scores; the run continues with the survivors.

use super::AnalysisTool;
use crate::models::{AnalysisRequest, ToolResult};
use anyhow::Result;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 6;

/// One adapter's outcome, paired with its identity for reporting.
#[derive(Debug)]
pub struct ToolRun {
    pub name: &'static str,
    pub key: &'static str,
    pub result: ToolResult,
}

impl ToolRun {
    pub fn excluded(&self) -> bool {
        !self.result.success
    }
}

/// Orchestrates the analysis tools.
pub struct Engine {
    tools: Vec<Box<dyn AnalysisTool>>,
    workers: usize,
    skip_on_failure: bool,
}

impl Engine {
    /// Create an empty engine with `workers` pool threads.
    pub fn new(workers: usize) -> Self {
        Self {
            tools: Vec::new(),
            workers: workers.max(1),
            skip_on_failure: true,
        }
    }

    /// Engine loaded with the full adapter registry.
    pub fn with_default_tools(workers: usize) -> Self {
        let mut engine = Self::new(workers);
        engine.register_all(super::registry());
        engine
    }

    /// Register a tool.
    pub fn register(&mut self, tool: Box<dyn AnalysisTool>) {
        debug!("registering tool: {}", tool.name());
        self.tools.push(tool);
    }

    /// Register multiple tools at once.
    pub fn register_all(&mut self, tools: impl IntoIterator<Item = Box<dyn AnalysisTool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Debugging mode: adapter errors abort the run instead of excluding
    /// the tool.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.skip_on_failure = !strict;
        self
    }

    /// Drop tools by key before dispatch.
    pub fn without_tools(mut self, skipped: &[String]) -> Self {
        self.tools
            .retain(|t| !skipped.iter().any(|s| s.eq_ignore_ascii_case(t.key())));
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Run all enabled tools concurrently and gather their results.
    ///
    /// Tools whose external prerequisite is missing never reach the pool;
    /// they are reported as excluded up front. The collect below is the
    /// only synchronization point.
    pub fn run(&self, request: &AnalysisRequest) -> Result<Vec<ToolRun>> {
        let start = Instant::now();

        let (ready, missing): (Vec<_>, Vec<_>) =
            self.tools.iter().partition(|t| t.enabled(request));

        let mut runs: Vec<ToolRun> = missing
            .iter()
            .map(|tool| {
                info!("{} prerequisite missing; excluded before dispatch", tool.name());
                ToolRun {
                    name: tool.name(),
                    key: tool.key(),
                    result: ToolResult::failed(tool.subscore_count()),
                }
            })
            .collect();

        info!(
            "dispatching {} tools on {} workers",
            ready.len(),
            self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let dispatched: Result<Vec<ToolRun>> = pool.install(|| {
            ready
                .par_iter()
                .map(|tool| {
                    let result = run_guarded(tool.as_ref(), request, self.skip_on_failure)?;
                    Ok(ToolRun {
                        name: tool.name(),
                        key: tool.key(),
                        result,
                    })
                })
                .collect()
        });
        runs.extend(dispatched?);

        let scored = runs.iter().filter(|r| !r.excluded()).count();
        info!(
            "analysis finished: {}/{} tools scored in {:?}",
            scored,
            runs.len(),
            start.elapsed()
        );

        Ok(runs)
    }
}

/// Run one adapter with failure isolation.
///
/// With `skip_on_failure`, any adapter error or panic becomes a zeroed
/// failed result; otherwise adapter errors propagate to the caller
/// (panics still become errors).
pub fn run_guarded(
    tool: &dyn AnalysisTool,
    request: &AnalysisRequest,
    skip_on_failure: bool,
) -> Result<ToolResult> {
    let name = tool.name();
    let start = Instant::now();

    let outcome =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| tool.execute(request)));

    match outcome {
        Ok(Ok(result)) => {
            debug!("{name} finished in {:?}", start.elapsed());
            Ok(result)
        }
        Ok(Err(e)) => {
            if skip_on_failure {
                warn!("{name} failed: {e:#}");
                Ok(ToolResult::failed(tool.subscore_count()))
            } else {
                Err(e.context(format!("{name} failed")))
            }
        }
        Err(panic) => {
            let message = panic_message(panic);
            error!("{name} panicked: {message}");
            if skip_on_failure {
                Ok(ToolResult::failed(tool.subscore_count()))
            } else {
                anyhow::bail!("{name} panicked: {message}")
            }
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
