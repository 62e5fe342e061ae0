//! The kinds of resource the dashboard loads, and the cached value type.

use super::{Analytics, Notification, Post, User};
use crate::framework::{FetchError, ResourceKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four resource kinds served by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Posts,
    Analytics,
    Notifications,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Posts,
        ResourceKind::Analytics,
        ResourceKind::Notifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Posts => "posts",
            ResourceKind::Analytics => "analytics",
            ResourceKind::Notifications => "notifications",
        }
    }

    /// The cache key for this kind of resource belonging to entity `id`.
    pub fn key(self, id: &str) -> ResourceKey {
        ResourceKey::new([self.as_str(), id])
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded resource, as stored in the dashboard's cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    User(User),
    Posts(Vec<Post>),
    Analytics(Analytics),
    Notifications(Vec<Notification>),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::User(_) => ResourceKind::User,
            Resource::Posts(_) => ResourceKind::Posts,
            Resource::Analytics(_) => ResourceKind::Analytics,
            Resource::Notifications(_) => ResourceKind::Notifications,
        }
    }

    /// Decodes a JSON payload into the record shape expected for `kind`.
    pub fn decode(kind: ResourceKind, payload: serde_json::Value) -> Result<Self, FetchError> {
        let decoded = match kind {
            ResourceKind::User => serde_json::from_value(payload).map(Resource::User),
            ResourceKind::Posts => serde_json::from_value(payload).map(Resource::Posts),
            ResourceKind::Analytics => serde_json::from_value(payload).map(Resource::Analytics),
            ResourceKind::Notifications => {
                serde_json::from_value(payload).map(Resource::Notifications)
            }
        };
        decoded.map_err(|e| FetchError::Decode {
            kind: kind.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn as_user(&self) -> Result<&User, FetchError> {
        match self {
            Resource::User(user) => Ok(user),
            other => Err(other.mismatch(ResourceKind::User)),
        }
    }

    pub fn as_posts(&self) -> Result<&[Post], FetchError> {
        match self {
            Resource::Posts(posts) => Ok(posts),
            other => Err(other.mismatch(ResourceKind::Posts)),
        }
    }

    pub fn as_analytics(&self) -> Result<&Analytics, FetchError> {
        match self {
            Resource::Analytics(analytics) => Ok(analytics),
            other => Err(other.mismatch(ResourceKind::Analytics)),
        }
    }

    pub fn as_notifications(&self) -> Result<&[Notification], FetchError> {
        match self {
            Resource::Notifications(notifications) => Ok(notifications),
            other => Err(other.mismatch(ResourceKind::Notifications)),
        }
    }

    fn mismatch(&self, expected: ResourceKind) -> FetchError {
        FetchError::Decode {
            kind: expected.to_string(),
            reason: format!("cached value is {}", self.kind()),
        }
    }
}
