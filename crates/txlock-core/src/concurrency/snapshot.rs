// Point-in-time views of a resource entry

use std::fmt;

use serde::{Deserialize, Serialize};
use txlock_types::{Lock, ResourceName};

use super::request::LockRequest;
use super::resource_entry::ResourceEntry;

/// A waiting request as seen in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedRequest {
    /// The lock being asked for
    pub lock: Lock,
    /// Locks that will be released once the request is granted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_on_grant: Vec<Lock>,
}

impl From<&LockRequest> for QueuedRequest {
    fn from(request: &LockRequest) -> Self {
        Self {
            lock: request.lock.clone(),
            release_on_grant: request.release_on_grant.clone(),
        }
    }
}

impl fmt::Display for QueuedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request for {}", self.lock)?;
        if !self.release_on_grant.is_empty() {
            let released: Vec<String> = self.release_on_grant.iter().map(|l| l.to_string()).collect();
            write!(f, " (releasing {})", released.join(", "))?;
        }
        Ok(())
    }
}

/// Copy of one resource's active locks and wait queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Resource the snapshot describes
    pub name: ResourceName,
    /// Granted locks, in acquisition order
    pub active: Vec<Lock>,
    /// Waiting requests, front first
    pub queued: Vec<QueuedRequest>,
}

impl ResourceSnapshot {
    pub(crate) fn capture(name: &ResourceName, entry: Option<&ResourceEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                name: name.clone(),
                active: entry.locks().to_vec(),
                queued: entry.waiting().map(QueuedRequest::from).collect(),
            },
            None => Self {
                name: name.clone(),
                active: Vec::new(),
                queued: Vec::new(),
            },
        }
    }

    /// Whether nothing is held or waiting on the resource
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.queued.is_empty()
    }
}

impl fmt::Display for ResourceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active: Vec<String> = self.active.iter().map(|l| l.to_string()).collect();
        let queued: Vec<String> = self.queued.iter().map(|r| r.to_string()).collect();
        write!(
            f,
            "Active Locks: [{}], Queue: [{}]",
            active.join(", "),
            queued.join(", ")
        )
    }
}
