use serde::{Deserialize, Serialize};

/// Engagement counters for the user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analytics {
    pub views: u64,
    pub likes: u64,
}
