//! Failpoints
//!
//! A failpoint is a named runtime gate used in tests and diagnostics to
//! pause or alter execution at a fixed point. Modes are `off`, `alwaysOn`
//! and `{times: n}`; the optional `data` document carries options such as
//! `shouldCheckForInterrupt`.

mod errors;
mod fail_point;
mod registry;
mod wait;

pub use errors::{FailPointError, FailPointResult};
pub use fail_point::{FailPoint, FailPointMode, FailPointOptions};
pub use registry::FailPointRegistry;
pub use wait::{
    wait_while_fail_point_enabled, wait_while_fail_point_enabled_with, WaitSettings,
    DEFAULT_POLL_INTERVAL,
};
