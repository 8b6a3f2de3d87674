//! Plan executor for aeroexec
//!
//! Drives a stage tree from the root until exhaustion.
//!
//! Execution flow per call to `get_next`:
//! 1. Stop if the root reports EOF
//! 2. Work the root once
//! 3. `NEED_TIME`: work again
//! 4. `NEED_YIELD`: run the yield hook, then work again
//! 5. `ADVANCED`: take the document out of the member, free it, return it
//! 6. `FAILURE`: read the status out of the member, free it, return `Err`

use std::sync::Arc;

use crate::document::Document;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::status::{ErrorCode, Status};
use crate::working_set::{WorkingSet, WorkingSetId};

use super::stage::{BoxedPlanStage, StageState};
use super::stats::PlanStageStats;

/// Result type for plan execution
pub type ExecResult<T> = Result<T, Status>;

/// Hook run whenever the tree asks to yield
pub type YieldHook = Box<dyn FnMut()>;

/// Owns a working set and the root of a stage tree
pub struct PlanExecutor {
    ws: WorkingSet,
    root: BoxedPlanStage,
    yield_hook: Option<YieldHook>,
    metrics: Option<Arc<MetricsRegistry>>,
    failed: bool,
}

impl PlanExecutor {
    /// Creates an executor over a tree built against `ws`
    pub fn new(ws: WorkingSet, root: BoxedPlanStage) -> Self {
        Self {
            ws,
            root,
            yield_hook: None,
            metrics: None,
            failed: false,
        }
    }

    /// Run `hook` whenever the tree returns `NEED_YIELD`
    pub fn with_yield_hook(mut self, hook: YieldHook) -> Self {
        self.yield_hook = Some(hook);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Whether the tree will produce no more results
    pub fn is_eof(&self) -> bool {
        self.failed || self.root.is_eof()
    }

    /// Produce the next result document, `Ok(None)` at end of stream
    pub fn get_next(&mut self) -> ExecResult<Option<Document>> {
        while !self.is_eof() {
            match self.root.work(&mut self.ws) {
                StageState::Advanced(id) => {
                    let doc = self.take_result(id);
                    if let Some(metrics) = &self.metrics {
                        metrics.increment_documents_returned();
                    }
                    return Ok(Some(doc));
                }
                StageState::NeedTime => continue,
                StageState::NeedYield => {
                    if let Some(metrics) = &self.metrics {
                        metrics.increment_yields();
                    }
                    if let Some(hook) = self.yield_hook.as_mut() {
                        hook();
                    }
                }
                StageState::Failure(id) => {
                    self.failed = true;
                    let status = self.take_status(id);
                    log_event_with_fields(
                        Event::PlanExecutionFailed,
                        &[("code", status.code().code()), ("reason", status.reason())],
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.increment_plan_failures();
                    }
                    return Err(status);
                }
            }
        }
        Ok(None)
    }

    /// Drain the tree into a vector
    pub fn collect_all(&mut self) -> ExecResult<Vec<Document>> {
        let mut out = Vec::new();
        while let Some(doc) = self.get_next()? {
            out.push(doc);
        }
        if let Some(metrics) = &self.metrics {
            metrics.increment_plans_executed();
        }
        Ok(out)
    }

    /// Stats tree of the whole plan
    pub fn explain(&self) -> PlanStageStats {
        self.root.get_stats()
    }

    /// Number of members still live in the working set
    pub fn live_members(&self) -> usize {
        self.ws.live_count()
    }

    fn take_result(&mut self, id: WorkingSetId) -> Document {
        let member = self.ws.get_mut(id);
        let doc = member
            .take_document()
            .or_else(|| member.metadata().index_key().cloned())
            .unwrap_or_default();
        self.ws.free(id);
        doc
    }

    fn take_status(&mut self, id: WorkingSetId) -> Status {
        let status = self.ws.get(id).status().cloned().unwrap_or_else(|| {
            Status::new(
                ErrorCode::InternalError,
                "stage reported FAILURE without error detail",
            )
        });
        self.ws.free(id);
        status
    }
}
