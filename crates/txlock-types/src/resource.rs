// Resource names
//
// A resource is identified by its path from the root of the lock hierarchy,
// e.g. `database/orders/17`. The lock table only relies on equality and
// hashing; the path structure is there for the context registry.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use txlock_error::{TypesError, TypesResult};

/// Separator used when rendering and parsing resource names
pub const SEPARATOR: char = '/';

/// Name of a lockable resource
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName {
    segments: Arc<[String]>,
}

impl ResourceName {
    /// Create a top-level resource name with a single segment
    ///
    /// Fails if `name` is empty or contains the separator.
    pub fn new(name: impl Into<String>) -> TypesResult<Self> {
        let name = name.into();
        check_segment(&name)?;
        Ok(Self {
            segments: Arc::from(vec![name]),
        })
    }

    /// Create the name of a child resource
    ///
    /// Fails if `name` is empty or contains the separator.
    pub fn child(&self, name: impl Into<String>) -> TypesResult<Self> {
        let name = name.into();
        check_segment(&name)?;
        let mut segments = self.segments.to_vec();
        segments.push(name);
        Ok(Self {
            segments: Arc::from(segments),
        })
    }

    /// Get the parent resource name, if this is not a top-level name
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: Arc::from(&self.segments[..self.segments.len() - 1]),
        })
    }

    /// The individual path segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last path segment
    pub fn leaf(&self) -> &str {
        // segments is never empty
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments in the name
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether `self` lies strictly below `ancestor` in the hierarchy
    pub fn is_descendant_of(&self, ancestor: &ResourceName) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }
}

/// A single path segment must be non-empty and free of separators, so that
/// the rendered form parses back to an equal name.
fn check_segment(segment: &str) -> TypesResult<()> {
    if segment.is_empty() {
        return Err(TypesError::parse_error("resource name segment is empty"));
    }
    if segment.contains(SEPARATOR) {
        return Err(TypesError::parse_error(format!(
            "resource name segment '{}' contains '{}'",
            segment, SEPARATOR
        )));
    }
    Ok(())
}

impl FromStr for ResourceName {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        let segments: Vec<String> = s.split(SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(TypesError::parse_error(format!(
                "resource name '{}' contains an empty segment",
                s
            )));
        }
        Ok(Self {
            segments: Arc::from(segments),
        })
    }
}

impl TryFrom<String> for ResourceName {
    type Error = TypesError;

    fn try_from(s: String) -> TypesResult<Self> {
        s.parse()
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.to_string()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceName({})", self)
    }
}
