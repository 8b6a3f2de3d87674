//! Registry of running operations, addressable by id for `killOp`

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::status::{ErrorCode, Status};

use super::context::{OpId, OperationContext};

#[derive(Debug)]
pub struct OperationRegistry {
    next_id: AtomicU32,
    ops: Mutex<HashMap<OpId, Arc<OperationContext>>>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            ops: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn ops(&self) -> MutexGuard<'_, HashMap<OpId, Arc<OperationContext>>> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create and register a new operation
    pub fn register(&self) -> Arc<OperationContext> {
        // Ids wrap; skip 0 and any id still in use.
        let mut ops = self.ops();
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 && !ops.contains_key(&id) {
                let ctx = Arc::new(OperationContext::new(id));
                ops.insert(id, Arc::clone(&ctx));
                return ctx;
            }
        }
    }

    pub fn deregister(&self, op_id: OpId) -> Option<Arc<OperationContext>> {
        self.ops().remove(&op_id)
    }

    pub fn get(&self, op_id: OpId) -> Option<Arc<OperationContext>> {
        self.ops().get(&op_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.ops().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops().is_empty()
    }

    /// Interrupt a running operation
    pub fn kill_op(&self, op_id: OpId) -> Result<(), Status> {
        let ctx = self.get(op_id).ok_or_else(|| {
            Status::new(ErrorCode::NoSuchKey, format!("Could not access opID: {}", op_id))
        })?;
        ctx.mark_killed(ErrorCode::Interrupted);

        log_event_with_fields(Event::OperationKilled, &[("op_id", &op_id.to_string())]);
        if let Some(metrics) = &self.metrics {
            metrics.increment_operations_killed();
        }
        Ok(())
    }
}

/// Map a client-supplied op id back to the internal 32-bit id
///
/// Ids above `i32::MAX` reach clients as negative 32-bit integers; those
/// are unwrapped here so `kill_op` accepts the value the client saw.
pub fn convert_op_id(op: i64) -> Result<OpId, Status> {
    let op = if (i64::from(i32::MIN)..0).contains(&op) {
        op + (1i64 << 32)
    } else {
        op
    };
    OpId::try_from(op).map_err(|_| Status::bad_value(format!("invalid op : {}", op)))
}
