//! Per-operation context
//!
//! Holds the state other threads may touch while the operation runs: the
//! progress message shown by current-op reporting and the kill flag. The
//! message lives behind a mutex; every read-modify-write of it happens in
//! one critical section.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::status::{ErrorCode, Status};

/// Operation identifier, unique per registry
pub type OpId = u32;

#[derive(Debug)]
pub struct OperationContext {
    op_id: OpId,
    message: Mutex<String>,
    kill_status: Mutex<Option<Status>>,
}

impl OperationContext {
    pub fn new(op_id: OpId) -> Self {
        Self {
            op_id,
            message: Mutex::new(String::new()),
            kill_status: Mutex::new(None),
        }
    }

    pub fn op_id(&self) -> OpId {
        self.op_id
    }

    // A panic while holding either lock cannot leave a torn value behind,
    // so poisoned locks are recovered.
    fn message_lock(&self) -> MutexGuard<'_, String> {
        self.message.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn kill_lock(&self) -> MutexGuard<'_, Option<Status>> {
        self.kill_status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn message(&self) -> String {
        self.message_lock().clone()
    }

    /// Replace the progress message, returning the previous one
    pub fn set_message(&self, message: impl Into<String>) -> String {
        let mut guard = self.message_lock();
        std::mem::replace(&mut *guard, message.into())
    }

    /// Mark the operation killed. The first kill wins.
    pub fn mark_killed(&self, code: ErrorCode) {
        let mut guard = self.kill_lock();
        if guard.is_none() {
            *guard = Some(Status::new(
                code,
                format!("operation {} was interrupted", self.op_id),
            ));
        }
    }

    pub fn is_killed(&self) -> bool {
        self.kill_lock().is_some()
    }

    /// `Err` with the kill status once the operation has been killed
    pub fn check_for_interrupt(&self) -> Result<(), Status> {
        match &*self.kill_lock() {
            Some(status) => Err(status.clone()),
            None => Ok(()),
        }
    }
}
