//! Named failpoints, configurable by command document
//!
//! ```json
//! {"configureFailPoint": "hangAfterScan", "mode": {"times": 2}, "data": {"shouldCheckForInterrupt": true}}
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::document::{Document, Value};
use crate::observability::{log_event_with_fields, Event};

use super::errors::{FailPointError, FailPointResult};
use super::fail_point::{FailPoint, FailPointMode};

#[derive(Debug, Default)]
pub struct FailPointRegistry {
    points: RwLock<HashMap<String, Arc<FailPoint>>>,
}

impl FailPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str) -> FailPointResult<Arc<FailPoint>> {
        let mut points = self
            .points
            .write()
            .map_err(|_| FailPointError::InvalidCommand("registry lock poisoned".into()))?;
        if points.contains_key(name) {
            return Err(FailPointError::AlreadyRegistered(name.to_string()));
        }
        let fp = Arc::new(FailPoint::new(name));
        points.insert(name.to_string(), Arc::clone(&fp));
        Ok(fp)
    }

    pub fn get(&self, name: &str) -> Option<Arc<FailPoint>> {
        self.points.read().ok()?.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .points
            .read()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn configure(&self, name: &str, mode: FailPointMode, data: Document) -> FailPointResult<()> {
        let fp = self
            .get(name)
            .ok_or_else(|| FailPointError::UnknownFailPoint(name.to_string()))?;
        fp.set_mode(mode, data);
        log_event_with_fields(
            Event::FailPointConfigured,
            &[("fail_point", name), ("mode", &mode.to_string())],
        );
        Ok(())
    }

    /// Apply a `configureFailPoint` command document
    pub fn configure_from_command(&self, command: &Value) -> FailPointResult<()> {
        let obj = command
            .as_object()
            .ok_or_else(|| FailPointError::InvalidCommand("command must be an object".into()))?;
        let name = obj
            .get("configureFailPoint")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FailPointError::InvalidCommand("missing string field configureFailPoint".into())
            })?;
        let mode = obj
            .get("mode")
            .ok_or_else(|| FailPointError::InvalidCommand("missing field mode".into()))
            .and_then(FailPointMode::from_value)?;
        let data = match obj.get("data") {
            None => Document::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(FailPointError::InvalidCommand("data must be an object".into()))
            }
        };
        self.configure(name, mode, data)
    }
}
