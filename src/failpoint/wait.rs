//! Cooperative wait on a failpoint
//!
//! While the failpoint stays enabled the current operation sleeps in short
//! intervals, runs the caller's hook each iteration, and checks for
//! interruption when the failpoint's data asks for it. The operation's
//! progress message is swapped for the caller's message during the wait and
//! restored on every exit path.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::operation::OperationContext;
use crate::status::Status;

use super::fail_point::{FailPoint, FailPointOptions};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Tunables for the wait loop
#[derive(Debug, Clone)]
pub struct WaitSettings {
    pub poll_interval: Duration,
    pub metrics: Option<Arc<MetricsRegistry>>,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            metrics: None,
        }
    }
}

/// Restores the operation's progress message when dropped
struct MessageRestore<'a> {
    op_ctx: &'a OperationContext,
    original: Option<String>,
}

impl<'a> MessageRestore<'a> {
    fn replace(op_ctx: &'a OperationContext, message: &str) -> Self {
        let original = op_ctx.set_message(message);
        Self {
            op_ctx,
            original: Some(original),
        }
    }
}

impl Drop for MessageRestore<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.op_ctx.set_message(original);
        }
    }
}

/// Block while `fail_point` is enabled, with default settings
pub fn wait_while_fail_point_enabled(
    fail_point: &FailPoint,
    op_ctx: &OperationContext,
    cur_op_msg: &str,
    while_waiting: Option<&mut dyn FnMut()>,
) -> Result<(), Status> {
    wait_while_fail_point_enabled_with(
        fail_point,
        op_ctx,
        cur_op_msg,
        while_waiting,
        &WaitSettings::default(),
    )
}

/// Block while `fail_point` is enabled
///
/// Returns `Err` with the interruption status if the failpoint's data sets
/// `shouldCheckForInterrupt` and the operation is killed during the wait.
pub fn wait_while_fail_point_enabled_with(
    fail_point: &FailPoint,
    op_ctx: &OperationContext,
    cur_op_msg: &str,
    mut while_waiting: Option<&mut dyn FnMut()>,
    settings: &WaitSettings,
) -> Result<(), Status> {
    let _restore = MessageRestore::replace(op_ctx, cur_op_msg);

    let Some(data) = fail_point.check() else {
        return Ok(());
    };
    let options = FailPointOptions::from_data(&data);
    let op_id = op_ctx.op_id().to_string();

    log_event_with_fields(
        Event::FailPointWaitBegin,
        &[("fail_point", fail_point.name()), ("op_id", &op_id)],
    );
    if let Some(metrics) = &settings.metrics {
        metrics.increment_fail_point_waits();
    }

    while fail_point.should_fail() {
        thread::sleep(settings.poll_interval);
        if let Some(hook) = while_waiting.as_mut() {
            hook();
        }

        if options.should_check_for_interrupt {
            if let Err(status) = op_ctx.check_for_interrupt() {
                log_event_with_fields(
                    Event::FailPointWaitInterrupted,
                    &[("fail_point", fail_point.name()), ("op_id", &op_id)],
                );
                if let Some(metrics) = &settings.metrics {
                    metrics.increment_fail_point_wait_interrupts();
                }
                return Err(status);
            }
        }
    }

    log_event_with_fields(
        Event::FailPointWaitEnd,
        &[("fail_point", fail_point.name()), ("op_id", &op_id)],
    );
    Ok(())
}
