//! Failpoint Cooperative Wait Tests
//!
//! A waiting operation runs on its own thread while the test thread
//! reconfigures the failpoint or kills the operation:
//! - Turning the failpoint off releases the wait
//! - killOp aborts the wait only when the failpoint asks for interrupt checks
//! - The progress message is swapped during the wait and restored after

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use aeroexec::failpoint::{
    wait_while_fail_point_enabled_with, FailPointError, FailPointMode, FailPointRegistry,
    WaitSettings,
};
use aeroexec::observability::MetricsRegistry;
use aeroexec::operation::{convert_op_id, OperationRegistry};
use aeroexec::status::ErrorCode;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn settings(metrics: &Arc<MetricsRegistry>) -> WaitSettings {
    WaitSettings {
        poll_interval: Duration::from_millis(2),
        metrics: Some(Arc::clone(metrics)),
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(2));
    }
}

// =============================================================================
// Tests
// =============================================================================

/// Turning the failpoint off from another thread ends the wait cleanly.
#[test]
fn test_wait_released_by_configure_off() {
    let fail_points = Arc::new(FailPointRegistry::new());
    let fp = fail_points.register("hangBeforeReturn").unwrap();
    fail_points
        .configure_from_command(&json!({
            "configureFailPoint": "hangBeforeReturn",
            "mode": "alwaysOn"
        }))
        .unwrap();

    let ops = OperationRegistry::new();
    let ctx = ops.register();
    ctx.set_message("query");
    let metrics = Arc::new(MetricsRegistry::new());

    let waiter = {
        let ctx = Arc::clone(&ctx);
        let fp = Arc::clone(&fp);
        let settings = settings(&metrics);
        thread::spawn(move || {
            wait_while_fail_point_enabled_with(
                &fp,
                &ctx,
                "waiting in hangBeforeReturn",
                None,
                &settings,
            )
        })
    };

    wait_until(|| ctx.message() == "waiting in hangBeforeReturn");
    fail_points
        .configure("hangBeforeReturn", FailPointMode::Off, Default::default())
        .unwrap();

    assert!(waiter.join().unwrap().is_ok());
    assert_eq!(ctx.message(), "query");
    assert_eq!(metrics.snapshot().fail_point_waits, 1);
    assert_eq!(metrics.snapshot().fail_point_wait_interrupts, 0);
}

/// killOp interrupts a wait whose data sets shouldCheckForInterrupt.
#[test]
fn test_kill_op_interrupts_wait() {
    let fail_points = FailPointRegistry::new();
    let fp = fail_points.register("hangAfterPlanning").unwrap();
    fail_points
        .configure_from_command(&json!({
            "configureFailPoint": "hangAfterPlanning",
            "mode": "alwaysOn",
            "data": { "shouldCheckForInterrupt": true }
        }))
        .unwrap();

    let ops = OperationRegistry::new();
    let ctx = ops.register();
    ctx.set_message("find");
    let metrics = Arc::new(MetricsRegistry::new());

    let waiter = {
        let ctx = Arc::clone(&ctx);
        let fp = Arc::clone(&fp);
        let settings = settings(&metrics);
        thread::spawn(move || {
            wait_while_fail_point_enabled_with(&fp, &ctx, "hanging", None, &settings)
        })
    };

    wait_until(|| ctx.message() == "hanging");
    let op_id = convert_op_id(i64::from(ctx.op_id())).unwrap();
    ops.kill_op(op_id).unwrap();

    let err = waiter.join().unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Interrupted);
    assert_eq!(ctx.message(), "find");
    assert!(fp.is_enabled());
    assert_eq!(metrics.snapshot().fail_point_wait_interrupts, 1);
}

/// Without the option a kill is ignored until the failpoint turns itself off.
#[test]
fn test_kill_ignored_without_interrupt_option() {
    let fail_points = FailPointRegistry::new();
    let fp = fail_points.register("hangTimes").unwrap();
    fail_points
        .configure_from_command(&json!({
            "configureFailPoint": "hangTimes",
            "mode": { "times": 5 },
            "data": { "shouldCheckForInterrupt": "yes" }
        }))
        .unwrap();

    let ops = OperationRegistry::new();
    let ctx = ops.register();
    ops.kill_op(ctx.op_id()).unwrap();

    let metrics = Arc::new(MetricsRegistry::new());
    wait_while_fail_point_enabled_with(&fp, &ctx, "hanging", None, &settings(&metrics)).unwrap();
    assert_eq!(fp.mode(), FailPointMode::Off);
    assert!(ctx.is_killed());
}

/// Misconfiguration is reported, not applied.
#[test]
fn test_configure_errors() {
    let fail_points = FailPointRegistry::new();
    fail_points.register("known").unwrap();

    assert!(matches!(
        fail_points.register("known"),
        Err(FailPointError::AlreadyRegistered(_))
    ));
    assert!(matches!(
        fail_points.configure_from_command(&json!({
            "configureFailPoint": "unknown",
            "mode": "alwaysOn"
        })),
        Err(FailPointError::UnknownFailPoint(_))
    ));
    assert!(matches!(
        fail_points.configure_from_command(&json!({
            "configureFailPoint": "known",
            "mode": "sometimes"
        })),
        Err(FailPointError::InvalidMode(_))
    ));
    assert!(!fail_points.get("known").unwrap().is_enabled());

    let ops = OperationRegistry::new();
    assert_eq!(ops.kill_op(4242).unwrap_err().code(), ErrorCode::NoSuchKey);
}
