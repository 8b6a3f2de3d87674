//! Runtime-toggleable gates

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use crate::document::{Document, Value};

use super::errors::{FailPointError, FailPointResult};

/// When a failpoint fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPointMode {
    Off,
    AlwaysOn,
    /// Fires on the next `n` checks, then turns itself off
    Times(u64),
}

impl FailPointMode {
    /// Parse the `mode` field of a configure command: `"off"`,
    /// `"alwaysOn"` or `{"times": n}`
    pub fn from_value(value: &Value) -> FailPointResult<Self> {
        match value {
            Value::String(s) if s == "off" => Ok(FailPointMode::Off),
            Value::String(s) if s == "alwaysOn" => Ok(FailPointMode::AlwaysOn),
            Value::Object(map) => {
                let times = map
                    .get("times")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| FailPointError::InvalidMode(value.to_string()))?;
                if times == 0 {
                    Ok(FailPointMode::Off)
                } else {
                    Ok(FailPointMode::Times(times))
                }
            }
            other => Err(FailPointError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for FailPointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailPointMode::Off => write!(f, "off"),
            FailPointMode::AlwaysOn => write!(f, "alwaysOn"),
            FailPointMode::Times(n) => write!(f, "times({})", n),
        }
    }
}

/// Options recognized in a failpoint's `data` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPointOptions {
    /// Check for interruption on every wait iteration
    #[serde(default)]
    pub should_check_for_interrupt: bool,
}

impl FailPointOptions {
    /// Lenient: a non-boolean option reads as false, unknown fields are ignored
    pub fn from_data(data: &Document) -> Self {
        Self {
            should_check_for_interrupt: data
                .get("shouldCheckForInterrupt")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug)]
struct FailPointState {
    mode: FailPointMode,
    data: Document,
}

#[derive(Debug)]
pub struct FailPoint {
    name: String,
    state: Mutex<FailPointState>,
}

impl FailPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(FailPointState {
                mode: FailPointMode::Off,
                data: Document::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> MutexGuard<'_, FailPointState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_mode(&self, mode: FailPointMode, data: Document) {
        let mut state = self.state();
        state.mode = mode;
        state.data = data;
    }

    pub fn mode(&self) -> FailPointMode {
        self.state().mode
    }

    pub fn data(&self) -> Document {
        self.state().data.clone()
    }

    /// Whether the next check would fire, without consuming it
    pub fn is_enabled(&self) -> bool {
        self.state().mode != FailPointMode::Off
    }

    /// Evaluate the failpoint once. `Times` mode consumes one firing.
    pub fn should_fail(&self) -> bool {
        self.check().is_some()
    }

    /// Evaluate once and return the data document if it fired
    pub fn check(&self) -> Option<Document> {
        let mut state = self.state();
        match state.mode {
            FailPointMode::Off => None,
            FailPointMode::AlwaysOn => Some(state.data.clone()),
            FailPointMode::Times(n) => {
                state.mode = if n <= 1 {
                    FailPointMode::Off
                } else {
                    FailPointMode::Times(n - 1)
                };
                Some(state.data.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_times_mode_turns_itself_off() {
        let fp = FailPoint::new("hangBeforeReturn");
        fp.set_mode(FailPointMode::Times(2), Document::new());
        assert!(fp.should_fail());
        assert_eq!(fp.mode(), FailPointMode::Times(1));
        assert!(fp.should_fail());
        assert!(!fp.should_fail());
        assert!(!fp.is_enabled());
    }

    #[test]
    fn test_mode_from_value() {
        assert_eq!(FailPointMode::from_value(&json!("off")).unwrap(), FailPointMode::Off);
        assert_eq!(FailPointMode::from_value(&json!("alwaysOn")).unwrap(), FailPointMode::AlwaysOn);
        assert_eq!(FailPointMode::from_value(&json!({"times": 3})).unwrap(), FailPointMode::Times(3));
        assert_eq!(FailPointMode::from_value(&json!({"times": 0})).unwrap(), FailPointMode::Off);
        assert!(FailPointMode::from_value(&json!("sometimes")).is_err());
        assert!(FailPointMode::from_value(&json!({"skip": 1})).is_err());
    }

    #[test]
    fn test_options_default_false_and_lenient() {
        let data = crate::document::into_document(json!({"shouldCheckForInterrupt": true})).unwrap();
        assert!(FailPointOptions::from_data(&data).should_check_for_interrupt);

        let data = crate::document::into_document(json!({"shouldCheckForInterrupt": "yes"})).unwrap();
        assert!(!FailPointOptions::from_data(&data).should_check_for_interrupt);
        assert!(!FailPointOptions::from_data(&Document::new()).should_check_for_interrupt);
    }

    #[test]
    fn test_options_deserialize() {
        let opts: FailPointOptions =
            serde_json::from_value(json!({"shouldCheckForInterrupt": true, "other": 1})).unwrap();
        assert!(opts.should_check_for_interrupt);
    }

    #[test]
    fn test_check_returns_data() {
        let fp = FailPoint::new("fp");
        let data = crate::document::into_document(json!({"k": 1})).unwrap();
        fp.set_mode(FailPointMode::AlwaysOn, data.clone());
        assert_eq!(fp.check(), Some(data));
    }
}
