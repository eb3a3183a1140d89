//! Field paths into schema-shaped data.
//!
//! A selector is the part of an identifier after the subject alias:
//! in `pass.address.city` the alias is `pass` and the selector is
//! `address.city`. Segments that are plain decimal numbers index into lists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered path of field names navigating a schema to a leaf.
///
/// # Examples
///
/// ```
/// # use strata_ast::foundation::Selector;
/// let selector = Selector::from("address.city");
/// assert_eq!(selector.segments(), &["address", "city"]);
/// assert_eq!(selector.to_string(), "address.city");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    segments: Vec<String>,
}

/// One step of a selector, as interpreted against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

impl Selector {
    /// Create a new selector from a vector of segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Get the raw segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Iterate over the segments, classifying list indices.
    pub fn steps(&self) -> impl Iterator<Item = Segment<'_>> {
        self.segments.iter().map(|s| match s.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Field(s.as_str()),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment to create a new selector.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return Self::new(Vec::new());
        }
        Self::new(s.split('.').map(String::from).collect())
    }
}

impl From<Vec<String>> for Selector {
    fn from(segments: Vec<String>) -> Self {
        Self::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_creation() {
        let selector = Selector::from("a.b.c");
        assert_eq!(selector.segments(), &["a", "b", "c"]);
        assert_eq!(selector.len(), 3);
        assert!(Selector::from("").is_empty());
    }

    #[test]
    fn test_selector_steps() {
        let selector = Selector::from("children.1.name");
        let steps: Vec<_> = selector.steps().collect();
        assert_eq!(
            steps,
            vec![
                Segment::Field("children"),
                Segment::Index(1),
                Segment::Field("name")
            ]
        );
    }

    #[test]
    fn test_selector_append() {
        assert_eq!(Selector::from("a.b").append("c").to_string(), "a.b.c");
    }

    #[test]
    fn test_selector_serializes_as_list() {
        let json = serde_json::to_string(&Selector::from("a.b")).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }
}
