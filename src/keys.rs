//! Query keys identifying cached resource views.
//!
//! A query key is an ordered tuple of scalars naming one cacheable view of
//! server state (the job collection, a single job, a job's logs, a job's
//! files). Keys are the unit of caching, subscription, and invalidation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One scalar segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    /// Textual segment (resource and sub-resource names)
    Text(String),
    /// Numeric segment (server-assigned ids)
    Int(i64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Text(s) => write!(f, "{}", s),
            KeyPart::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Text(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Text(s)
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        KeyPart::Int(n)
    }
}

impl From<i32> for KeyPart {
    fn from(n: i32) -> Self {
        KeyPart::Int(n as i64)
    }
}

/// Ordered tuple of scalars identifying one cacheable resource view.
///
/// Two keys are equal iff their segments are elementwise equal. Keys form a
/// naming hierarchy (`[jobs]`, `[jobs, 7]`, `[jobs, 7, logs]`) but each key is
/// an independent cache entry: invalidating `[jobs]` says nothing about
/// `[jobs, 7]`.
///
/// # Examples
///
/// ```rust
/// use kiln_link::{keys, QueryKey};
///
/// let list = keys::jobs();
/// let detail = keys::job(7);
/// assert_ne!(list, detail);
/// assert!(detail.starts_with(&list));
/// assert_eq!(detail.to_string(), "[jobs, 7]");
///
/// // Ad-hoc keys compose the same way
/// let custom = QueryKey::root("jobs").push(7).push("metrics");
/// assert_eq!(custom.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Create a key from pre-built segments.
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Create a single-segment key.
    pub fn root(part: impl Into<KeyPart>) -> Self {
        Self(vec![part.into()])
    }

    /// Append a segment, returning the extended key.
    pub fn push(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// The ordered segments of this key.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the key has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `prefix` matches this key's leading segments.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

const JOBS_SEGMENT: &str = "jobs";
const LOGS_SEGMENT: &str = "logs";
const FILES_SEGMENT: &str = "files";

/// Key for the training-job collection: `[jobs]`.
pub fn jobs() -> QueryKey {
    QueryKey::root(JOBS_SEGMENT)
}

/// Key for one training job: `[jobs, id]`.
pub fn job(id: i64) -> QueryKey {
    QueryKey::root(JOBS_SEGMENT).push(id)
}

/// Key for one job's log payload: `[jobs, id, logs]`.
pub fn job_logs(id: i64) -> QueryKey {
    QueryKey::root(JOBS_SEGMENT).push(id).push(LOGS_SEGMENT)
}

/// Key for one job's uploaded-file listing: `[jobs, id, files]`.
pub fn job_files(id: i64) -> QueryKey {
    QueryKey::root(JOBS_SEGMENT).push(id).push(FILES_SEGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_keys_equal_iff_segments_equal() {
        assert_eq!(jobs(), jobs());
        assert_eq!(job(7), job(7));
        assert_ne!(job(7), job(8));
        assert_ne!(jobs(), job(7));
        assert_ne!(job_logs(7), job_files(7));
    }

    #[test]
    fn test_segment_order_matters() {
        let a = QueryKey::root("jobs").push(7);
        let b = QueryKey::root(7i64).push("jobs");
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(jobs().to_string(), "[jobs]");
        assert_eq!(job(42).to_string(), "[jobs, 42]");
        assert_eq!(job_logs(7).to_string(), "[jobs, 7, logs]");
        assert_eq!(job_files(7).to_string(), "[jobs, 7, files]");
    }

    #[test]
    fn test_starts_with() {
        assert!(job(7).starts_with(&jobs()));
        assert!(job_logs(7).starts_with(&job(7)));
        assert!(!jobs().starts_with(&job(7)));
        assert!(!job_logs(8).starts_with(&job(7)));
    }

    #[test]
    fn test_keys_usable_as_map_keys() {
        let mut map = HashMap::new();
        map.insert(jobs(), "list");
        map.insert(job(7), "detail");

        assert_eq!(map.get(&jobs()), Some(&"list"));
        assert_eq!(map.get(&job(7)), Some(&"detail"));
        assert_eq!(map.get(&job(8)), None);
    }

    #[test]
    fn test_key_part_conversions() {
        let from_str: KeyPart = "jobs".into();
        let from_string: KeyPart = String::from("jobs").into();
        assert_eq!(from_str, from_string);

        let from_i64: KeyPart = 7i64.into();
        let from_i32: KeyPart = 7i32.into();
        assert_eq!(from_i64, from_i32);
    }

    #[test]
    fn test_serde_round_trip() {
        let key = job_logs(7);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"["jobs",7,"logs"]"#);

        let parsed: QueryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
