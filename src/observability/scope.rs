//! Begin/complete logging around a unit of work
//!
//! - `{name}_BEGIN` on creation
//! - `{name}_COMPLETE` with `elapsed_ms` on `complete()`
//! - `{name}_FAILED` on `fail()`
//! - `{name}_INCOMPLETE` if dropped without either

use std::time::Instant;

use super::logger::Logger;

pub struct ObservationScope {
    name: String,
    timer: Timer,
    fields: Vec<(String, String)>,
    finished: bool,
}

impl ObservationScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_fields(name, &[])
    }

    /// Fields given here are repeated on the completion line
    pub fn with_fields(name: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let name = name.into();
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            timer: Timer::new(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            finished: false,
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.timer.elapsed_ms();
        let mut all: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all.extend(extra.iter().copied());
        all.push(("elapsed_ms", &elapsed));
        Logger::info(&format!("{}_COMPLETE", self.name), &all);
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for elapsed-time log fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lifecycle() {
        let scope = ObservationScope::with_fields("TEST", &[("plan", "limit")]);
        assert!(!scope.is_finished());
        scope.complete_with_fields(&[("returned", "3")]);
    }

    #[test]
    fn test_scope_fail_and_drop() {
        ObservationScope::new("TEST").fail("boom");
        drop(ObservationScope::new("TEST"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 5);
    }
}
