//! Sort patterns and the sort key comparator
//!
//! A sort pattern is an ordered list of `(path, direction)` components. Sort
//! keys produced for a single-component pattern are the bare value; keys for
//! multi-component patterns are arrays with one element per component.
//!
//! The comparator is a raw comparator: string collation, if any, was already
//! applied when the key was generated.

use std::cmp::Ordering;
use std::fmt;

use crate::document::{compare_values, Document, Value};
use crate::status::Status;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub(crate) fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// One component of a sort pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortComponent {
    pub path: String,
    pub direction: SortDirection,
}

/// Ordered sort pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPattern {
    components: Vec<SortComponent>,
}

impl SortPattern {
    /// Build a pattern. Must have at least one component.
    pub fn new(components: Vec<SortComponent>) -> Result<Self, Status> {
        if components.is_empty() {
            return Err(Status::bad_value("sort pattern must not be empty"));
        }
        Ok(Self { components })
    }

    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            components: vec![SortComponent {
                path: path.into(),
                direction: SortDirection::Asc,
            }],
        }
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            components: vec![SortComponent {
                path: path.into(),
                direction: SortDirection::Desc,
            }],
        }
    }

    /// Parse from a pattern document such as `{"a": 1, "b": -1}`
    pub fn from_document(pattern: &Document) -> Result<Self, Status> {
        let mut components = Vec::with_capacity(pattern.len());
        for (path, dir) in pattern {
            let direction = match dir.as_f64() {
                Some(d) if d > 0.0 => SortDirection::Asc,
                Some(d) if d < 0.0 => SortDirection::Desc,
                _ => {
                    return Err(Status::bad_value(format!(
                        "sort direction for '{}' must be 1 or -1",
                        path
                    )))
                }
            };
            components.push(SortComponent {
                path: path.clone(),
                direction,
            });
        }
        Self::new(components)
    }

    /// Parse from the CLI form `a:asc,b:desc` (direction defaults to asc)
    pub fn parse(spec: &str) -> Result<Self, Status> {
        let mut components = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (path, dir) = match part.split_once(':') {
                Some((path, dir)) => (path, dir),
                None => (part, "asc"),
            };
            let direction = match dir {
                "asc" | "1" => SortDirection::Asc,
                "desc" | "-1" => SortDirection::Desc,
                other => {
                    return Err(Status::bad_value(format!(
                        "unknown sort direction '{}'",
                        other
                    )))
                }
            };
            components.push(SortComponent {
                path: path.to_string(),
                direction,
            });
        }
        Self::new(components)
    }

    pub fn components(&self) -> &[SortComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for SortPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .components
            .iter()
            .map(|c| format!("{}:{}", c.path, c.direction.as_str()))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Compares sort keys generated for a pattern
#[derive(Debug, Clone)]
pub struct SortKeyComparator {
    directions: Vec<SortDirection>,
}

impl SortKeyComparator {
    pub fn new(pattern: &SortPattern) -> Self {
        Self {
            directions: pattern.components.iter().map(|c| c.direction).collect(),
        }
    }

    /// Compare two sort keys
    pub fn compare(&self, lhs: &Value, rhs: &Value) -> Ordering {
        if self.directions.len() == 1 {
            return self.directions[0].apply(compare_values(lhs, rhs));
        }

        let (Value::Array(l), Value::Array(r)) = (lhs, rhs) else {
            panic!("multi-component sort keys must be arrays");
        };
        for ((lv, rv), dir) in l.iter().zip(r.iter()).zip(self.directions.iter()) {
            let ord = dir.apply(compare_values(lv, rv));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_cli_form() {
        let p = SortPattern::parse("a:asc, b:desc,c").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.components()[1].direction, SortDirection::Desc);
        assert_eq!(p.components()[2].direction, SortDirection::Asc);
        assert_eq!(p.to_string(), "a:asc,b:desc,c:asc");
    }

    #[test]
    fn test_parse_rejects_bad_direction() {
        assert!(SortPattern::parse("a:sideways").is_err());
        assert!(SortPattern::parse("").is_err());
    }

    #[test]
    fn test_from_document() {
        let pattern = crate::document::into_document(json!({"a": 1, "b": -1})).unwrap();
        let p = SortPattern::from_document(&pattern).unwrap();
        assert_eq!(p.components()[0].direction, SortDirection::Asc);
        assert_eq!(p.components()[1].direction, SortDirection::Desc);

        let bad = crate::document::into_document(json!({"a": "up"})).unwrap();
        assert!(SortPattern::from_document(&bad).is_err());
    }

    #[test]
    fn test_single_component_compare() {
        let asc = SortKeyComparator::new(&SortPattern::asc("a"));
        let desc = SortKeyComparator::new(&SortPattern::desc("a"));
        assert_eq!(asc.compare(&json!(1), &json!(2)), Ordering::Less);
        assert_eq!(desc.compare(&json!(1), &json!(2)), Ordering::Greater);
    }

    #[test]
    fn test_compound_compare() {
        let cmp = SortKeyComparator::new(&SortPattern::parse("a:asc,b:desc").unwrap());
        assert_eq!(cmp.compare(&json!([1, 5]), &json!([1, 3])), Ordering::Less);
        assert_eq!(cmp.compare(&json!([0, 1]), &json!([1, 9])), Ordering::Less);
        assert_eq!(cmp.compare(&json!([1, 3]), &json!([1, 3])), Ordering::Equal);
    }
}
